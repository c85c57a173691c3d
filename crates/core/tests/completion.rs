//! Tests for tool-calling completion rounds.

use schemars::JsonSchema;
use serde::Deserialize;
use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};
use ullm_core::{
    Completable, Error, Message, Property, Role, Schema, Tool, ToolCall, Value,
    testing::{Chat, Reply},
};

fn weather(calls: Arc<AtomicUsize>) -> Tool {
    Tool::new(
        "get_weather",
        Schema::object().required("location", Property::new("string")),
        move |args| {
            let calls = calls.clone();
            async move {
                calls.fetch_add(1, Ordering::SeqCst);
                let location = args
                    .get("location")
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_owned();
                Ok(Some(format!("{location}: sunny")))
            }
        },
    )
}

fn chat(tool: Tool) -> Chat {
    Chat::new("test-model")
        .message(Message::user("what's the weather in Boston?"))
        .tool(tool)
}

#[tokio::test]
async fn no_pending_calls_finishes() {
    let request = chat(weather(Arc::default()));
    let next = request.complete(&Reply::text("hello")).await.unwrap();
    assert!(next.is_none());
}

#[tokio::test]
async fn results_extend_the_conversation() {
    let request = chat(weather(Arc::default()));
    let response = Reply::calls(vec![ToolCall::new(
        "call_1",
        "get_weather",
        r#"{"location":"Boston"}"#,
    )]);

    let next = request.complete(&response).await.unwrap().unwrap();
    let messages = &next.messages;
    assert_eq!(messages.len(), 3);
    assert_eq!(messages[0], request.messages[0]);
    assert_eq!(messages[1].role(), Role::Assistant);
    assert_eq!(messages[1].tool_calls(), response.tool_calls.as_slice());
    assert_eq!(messages[2].role(), Role::Tool);
    assert_eq!(messages[2].tool_call_id(), Some("call_1"));
    assert_eq!(messages[2].content().text(), "Boston: sunny");

    // the original request is untouched
    assert_eq!(request.messages.len(), 1);
}

#[tokio::test]
async fn completion_is_deterministic() {
    let request = chat(weather(Arc::default()));
    let response = Reply::calls(vec![ToolCall::new(
        "call_1",
        "get_weather",
        r#"{"location":"Boston"}"#,
    )]);

    let first = request.complete(&response).await.unwrap().unwrap();
    let second = request.complete(&response).await.unwrap().unwrap();
    assert_eq!(first.messages, second.messages);
}

#[tokio::test]
async fn missing_argument_aborts_before_any_callback() {
    let calls = Arc::new(AtomicUsize::new(0));
    let request = chat(weather(calls.clone()));
    let response = Reply::calls(vec![
        ToolCall::new("call_1", "get_weather", r#"{"location":"Boston"}"#),
        ToolCall::new("call_2", "get_weather", r#"{"units":"c"}"#),
    ]);

    match request.complete(&response).await {
        Err(Error::MissingRequiredToolArguments { tool, missing }) => {
            assert_eq!(tool, "get_weather");
            assert_eq!(missing, ["location"]);
        }
        other => panic!("expected missing arguments, got {other:?}"),
    }
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn malformed_arguments_fail_to_decode() {
    let calls = Arc::new(AtomicUsize::new(0));
    let request = chat(weather(calls.clone()));
    let response = Reply::calls(vec![ToolCall::new("call_1", "get_weather", "{not json")]);

    let result = request.complete(&response).await;
    assert!(matches!(
        result,
        Err(Error::FailedToDecodeToolArguments { ref tool, .. }) if tool == "get_weather"
    ));
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn undeclared_tools_are_skipped() {
    let calls = Arc::new(AtomicUsize::new(0));
    let request = chat(weather(calls.clone()));
    let response = Reply::calls(vec![
        ToolCall::new("call_0", "launch_rockets", "{}"),
        ToolCall::new("call_1", "get_weather", r#"{"location":"Boston"}"#),
    ]);

    let next = request.complete(&response).await.unwrap().unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 1);

    // only the answered call is recorded, so every call id has a result
    let recorded = next.messages[1].tool_calls();
    assert_eq!(recorded.len(), 1);
    assert_eq!(recorded[0].id, "call_1");
    assert_eq!(next.messages.len(), 3);
    assert_eq!(next.messages[2].tool_call_id(), Some("call_1"));
}

#[tokio::test]
async fn calls_without_results_are_not_recorded() {
    let quiet = Tool::new("notify", Schema::object(), |_| async { Ok(None) });
    let request = chat(weather(Arc::default())).tool(quiet);
    let response = Reply::calls(vec![
        ToolCall::new("call_1", "notify", "{}"),
        ToolCall::new("call_2", "get_weather", r#"{"location":"Boston"}"#),
    ]);

    let next = request.complete(&response).await.unwrap().unwrap();
    let ids: Vec<_> = next.messages[1]
        .tool_calls()
        .iter()
        .map(|call| call.id.as_str())
        .collect();
    assert_eq!(ids, ["call_2"]);
    assert_eq!(next.messages[2].tool_call_id(), Some("call_2"));
}

#[tokio::test]
async fn only_undeclared_tools_finish() {
    let calls = Arc::new(AtomicUsize::new(0));
    let request = chat(weather(calls.clone()));
    let response = Reply::calls(vec![ToolCall::new("call_0", "launch_rockets", "{}")]);

    assert!(request.complete(&response).await.unwrap().is_none());
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn callbacks_without_results_finish() {
    let quiet = Tool::new("notify", Schema::object(), |_| async { Ok(None) });
    let request = chat(quiet);
    let response = Reply::calls(vec![ToolCall::new("call_1", "notify", "")]);

    assert!(request.complete(&response).await.unwrap().is_none());
}

#[tokio::test]
async fn callback_errors_pass_through() {
    let failing = Tool::new("explode", Schema::object(), |_| async {
        Err(anyhow::anyhow!("the tool exploded"))
    });
    let request = chat(failing);
    let response = Reply::calls(vec![ToolCall::new("call_1", "explode", "{}")]);

    let err = request.complete(&response).await.unwrap_err();
    assert!(matches!(err, Error::Tool(_)));
    assert_eq!(err.to_string(), "the tool exploded");
}

#[derive(Deserialize, JsonSchema)]
struct Location {
    /// The city to look up
    location: String,
    #[allow(dead_code)]
    units: Option<String>,
}

fn typed() -> Tool {
    Tool::typed("get_weather", |args: Location| async move {
        Ok(Some(format!("{}: sunny", args.location)))
    })
    .description("Get the current weather")
}

#[test]
fn typed_tools_derive_their_schema() {
    let tool = typed();
    assert_eq!(tool.schema.kind, "object");
    assert_eq!(tool.schema.required, ["location"]);
    assert_eq!(tool.schema.properties["location"].kind, "string");
    assert_eq!(tool.schema.properties["units"].kind, "string");
    assert_eq!(
        tool.schema.properties["location"].description.as_deref(),
        Some("The city to look up")
    );
}

#[tokio::test]
async fn typed_tools_decode_arguments() {
    let request = chat(typed());
    let response = Reply::calls(vec![ToolCall::new(
        "call_1",
        "get_weather",
        r#"{"location":"Boston"}"#,
    )]);

    let next = request.complete(&response).await.unwrap().unwrap();
    assert_eq!(next.messages[2].content().text(), "Boston: sunny");
}

#[tokio::test]
async fn typed_tools_reject_mistyped_arguments() {
    let request = chat(typed());
    let response = Reply::calls(vec![ToolCall::new(
        "call_1",
        "get_weather",
        r#"{"location":42}"#,
    )]);

    let err = request.complete(&response).await.unwrap_err();
    assert!(matches!(err, Error::FailedToDecodeToolArguments { .. }));
}
