//! Tests for the `ChatRequest` wire body.

use serde_json::json;
use ucore::{
    Message, MultiChoice, Part, Property, Request, Schema, Streamable, Tool, ToolCall,
    ToolCalling, ToolResult,
};
use ullm_openai::{ChatRequest, ChatResponse};

fn weather() -> Tool {
    Tool::new(
        "get_weather",
        Schema::object().required("location", Property::new("string")),
        |_| async { Ok(Some("sunny".to_owned())) },
    )
    .description("Get the weather")
}

#[test]
fn encodes_minimal_body() {
    let request = ChatRequest::new("gpt-4o", vec![Message::user("hi")]);
    assert_eq!(
        serde_json::to_value(&request).unwrap(),
        json!({
            "model": "gpt-4o",
            "messages": [{ "role": "user", "content": "hi" }],
        })
    );
}

#[test]
fn encodes_tools_stream_and_extras() {
    let request = ChatRequest::new("gpt-4o", vec![Message::user("hi")])
        .with_tools(vec![weather()])
        .with_choices(2)
        .with_extra("temperature", 0.5)
        .streaming(true);

    let body = serde_json::to_value(&request).unwrap();
    assert_eq!(body["stream"], json!(true));
    assert_eq!(body["n"], json!(2));
    assert_eq!(body["temperature"], json!(0.5));
    assert_eq!(
        body["tools"],
        json!([{
            "type": "function",
            "function": {
                "name": "get_weather",
                "description": "Get the weather",
                "parameters": {
                    "type": "object",
                    "properties": { "location": { "type": "string" } },
                    "required": ["location"],
                },
            },
        }])
    );
}

#[test]
fn encodes_tool_rounds() {
    let call = ToolCall::new("call_1", "get_weather", r#"{"location":"Boston"}"#);
    let request = ChatRequest::new(
        "gpt-4o",
        vec![
            Message::user("weather?"),
            Message::assistant_calls("", &[call]),
            Message::tool(ToolResult::new("call_1", "sunny")),
        ],
    );

    let body = serde_json::to_value(&request).unwrap();
    assert_eq!(
        body["messages"][1],
        json!({
            "role": "assistant",
            "content": null,
            "tool_calls": [{
                "id": "call_1",
                "type": "function",
                "function": { "name": "get_weather", "arguments": "{\"location\":\"Boston\"}" },
            }],
        })
    );
    assert_eq!(
        body["messages"][2],
        json!({ "role": "tool", "content": "sunny", "tool_call_id": "call_1" })
    );
}

#[test]
fn encodes_content_parts() {
    let request = ChatRequest::new(
        "gpt-4o",
        vec![Message::user(vec![
            Part::text("what is this?"),
            Part::image("https://example.com/cat.png"),
        ])],
    );

    let body = serde_json::to_value(&request).unwrap();
    assert_eq!(
        body["messages"][0]["content"],
        json!([
            { "type": "text", "text": "what is this?" },
            { "type": "image_url", "image_url": { "url": "https://example.com/cat.png" } },
        ])
    );
}

#[test]
fn updates_return_new_values() {
    let request = ChatRequest::new("gpt-4o", vec![Message::user("hi")]);
    let streaming = request.streaming(true);
    let longer = request.appending([Message::assistant("hello")]);

    assert!(!request.is_streaming());
    assert!(streaming.is_streaming());
    assert_eq!(request.messages().len(), 1);
    assert_eq!(longer.messages().len(), 2);
    assert_eq!(request.route(), "/chat/completions");
}

#[test]
fn tool_calls_come_from_the_picked_choice() {
    let response: ChatResponse = serde_json::from_value(json!({
        "choices": [
            {
                "index": 0,
                "message": {
                    "role": "assistant",
                    "content": "let me check",
                    "tool_calls": [{
                        "id": "call_1",
                        "type": "function",
                        "function": { "name": "get_weather", "arguments": "{}" },
                    }],
                },
                "finish_reason": "tool_calls",
            },
            {
                "index": 1,
                "message": { "role": "assistant", "content": "no idea" },
                "finish_reason": "stop",
            },
        ],
    }))
    .unwrap();

    let request = ChatRequest::new("gpt-4o", vec![]).with_choices(2);
    assert_eq!(request.choices(), 2);
    assert_eq!(request.pick(&response.choices).map(|c| c.index), Some(0));

    let calls = request.tool_calls(&response);
    assert_eq!(calls.len(), 1);
    let message = request.assistant_message(&response, &calls);
    assert_eq!(message.content().text(), "let me check");
    assert_eq!(message.tool_calls(), calls.as_slice());
}
