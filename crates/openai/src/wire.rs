//! Chat completions wire shapes
//!
//! The vendor-neutral types carry no vendor layout, so messages, tools and
//! tool calls are converted here on the way in and out.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use ucore::{Content, Message, Part, Role, Tool, ToolCall, VendorError};

/// Serialize a conversation in chat completions layout.
pub fn messages<S: Serializer>(messages: &[Message], serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_seq(messages.iter().map(WireMessage::from))
}

/// Serialize tool declarations as `function` tools.
pub fn tools<S: Serializer>(tools: &[Tool], serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_seq(tools.iter().map(|function| WireTool {
        kind: "function",
        function,
    }))
}

/// Deserialize tool calls, filling absent indices with list positions.
pub fn tool_calls<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<ToolCall>, D::Error> {
    let calls = Option::<Vec<WireToolCall>>::deserialize(deserializer)?.unwrap_or_default();
    Ok(calls
        .into_iter()
        .enumerate()
        .map(|(position, call)| ToolCall {
            id: call.id.unwrap_or_default(),
            index: call.index.unwrap_or(position as u32),
            name: call.function.name.unwrap_or_default(),
            arguments: call.function.arguments.unwrap_or_default(),
        })
        .collect())
}

/// Decode an `{"error": {...}}` payload.
pub fn vendor_error(text: &str) -> Option<VendorError> {
    #[derive(Deserialize)]
    struct Envelope {
        error: WireError,
    }

    #[derive(Deserialize)]
    struct WireError {
        #[serde(default)]
        message: String,
        #[serde(default, rename = "type")]
        kind: Option<String>,
        #[serde(default)]
        code: Option<serde_json::Value>,
    }

    let error = serde_json::from_str::<Envelope>(text.trim()).ok()?.error;
    let code = error.code.and_then(|code| match code {
        serde_json::Value::Null => None,
        serde_json::Value::String(code) => Some(code),
        code => Some(code.to_string()),
    });
    Some(VendorError {
        message: error.message,
        kind: error.kind,
        code,
    })
}

#[derive(Serialize)]
struct WireMessage<'m> {
    role: Role,
    content: Option<WireContent<'m>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<&'m str>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tool_calls: Vec<WireCall<'m>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_call_id: Option<&'m str>,
}

impl<'m> From<&'m Message> for WireMessage<'m> {
    fn from(message: &'m Message) -> Self {
        let content = match message.content() {
            content if content.is_empty() && !message.tool_calls().is_empty() => None,
            Content::Text(text) => Some(WireContent::Text(text)),
            Content::Parts(parts) => Some(WireContent::Parts(
                parts.iter().map(WirePart::from).collect(),
            )),
        };
        Self {
            role: message.role(),
            content,
            name: message.name(),
            tool_calls: message
                .tool_calls()
                .iter()
                .map(|call| WireCall {
                    id: &call.id,
                    kind: "function",
                    function: WireFunction {
                        name: &call.name,
                        arguments: &call.arguments,
                    },
                })
                .collect(),
            tool_call_id: message.tool_call_id(),
        }
    }
}

#[derive(Serialize)]
#[serde(untagged)]
enum WireContent<'m> {
    Text(&'m str),
    Parts(Vec<WirePart<'m>>),
}

#[derive(Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum WirePart<'m> {
    Text {
        text: &'m str,
    },
    ImageUrl {
        image_url: WireImage<'m>,
    },
    InputAudio {
        input_audio: WireAudio<'m>,
    },
}

impl<'m> From<&'m Part> for WirePart<'m> {
    fn from(part: &'m Part) -> Self {
        match part {
            Part::Text { text } => Self::Text { text },
            Part::Image { url, detail } => Self::ImageUrl {
                image_url: WireImage {
                    url,
                    detail: detail.as_deref(),
                },
            },
            Part::Audio { data, format } => Self::InputAudio {
                input_audio: WireAudio { data, format },
            },
            // chat completions carries tool results as tool messages
            Part::ToolResult { content, .. } => Self::Text { text: content },
        }
    }
}

#[derive(Serialize)]
struct WireImage<'m> {
    url: &'m str,
    #[serde(skip_serializing_if = "Option::is_none")]
    detail: Option<&'m str>,
}

#[derive(Serialize)]
struct WireAudio<'m> {
    data: &'m str,
    format: &'m str,
}

#[derive(Serialize)]
struct WireTool<'t> {
    #[serde(rename = "type")]
    kind: &'static str,
    function: &'t Tool,
}

#[derive(Serialize)]
struct WireCall<'m> {
    id: &'m str,
    #[serde(rename = "type")]
    kind: &'static str,
    function: WireFunction<'m>,
}

#[derive(Serialize)]
struct WireFunction<'m> {
    name: &'m str,
    arguments: &'m str,
}

#[derive(Deserialize)]
struct WireToolCall {
    #[serde(default)]
    index: Option<u32>,
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    function: WireCallFunction,
}

#[derive(Default, Deserialize)]
struct WireCallFunction {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    arguments: Option<String>,
}
