//! OpenAI-compatible chat completions request

use crate::{ChatChoice, ChatResponse, wire};
use serde::Serialize;
use std::collections::BTreeMap;
use ucore::{
    Choices, Message, MultiChoice, Request, Streamable, Tool, ToolCall, ToolCalling, ToolResult,
    Value,
};

/// Chat completions request body.
///
/// Vendor-specific fields the unified contract does not model, like
/// `temperature` or DeepSeek's `thinking`, go in [`ChatRequest::extra`]
/// and are flattened into the body.
#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest {
    /// The model identifier
    model: String,

    /// The conversation
    #[serde(serialize_with = "wire::messages")]
    messages: Vec<Message>,

    /// Tools the model may call
    #[serde(serialize_with = "wire::tools", skip_serializing_if = "Vec::is_empty")]
    tools: Vec<Tool>,

    /// Number of candidates to generate
    #[serde(skip_serializing_if = "Option::is_none")]
    n: Option<u32>,

    /// Whether to stream the response
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    stream: bool,

    /// Vendor extras
    #[serde(flatten)]
    extra: BTreeMap<String, Value>,
}

impl ChatRequest {
    /// Create a request for `model` over a conversation.
    pub fn new(model: impl Into<String>, messages: Vec<Message>) -> Self {
        Self {
            model: model.into(),
            messages,
            tools: Vec::new(),
            n: None,
            stream: false,
            extra: BTreeMap::new(),
        }
    }

    /// A copy with the tools replaced.
    pub fn with_tools(&self, tools: Vec<Tool>) -> Self {
        Self {
            tools,
            ..self.clone()
        }
    }

    /// A copy asking for `n` candidates.
    pub fn with_choices(&self, n: u32) -> Self {
        Self {
            n: Some(n),
            ..self.clone()
        }
    }

    /// A copy with a vendor extra set.
    pub fn with_extra(&self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        let mut extra = self.extra.clone();
        extra.insert(key.into(), value.into());
        Self {
            extra,
            ..self.clone()
        }
    }

    /// The number of requested candidates.
    pub fn choices(&self) -> u32 {
        self.n.unwrap_or(1)
    }

    /// The vendor extras.
    pub fn extra(&self) -> &BTreeMap<String, Value> {
        &self.extra
    }

    fn picked<'r>(&self, response: &'r ChatResponse) -> Option<&'r ChatChoice> {
        self.pick(response.choices())
    }
}

impl Request for ChatRequest {
    type Message = Message;
    type Response = ChatResponse;

    fn route(&self) -> &str {
        "/chat/completions"
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn messages(&self) -> &[Message] {
        &self.messages
    }

    fn with_messages(&self, messages: Vec<Message>) -> Self {
        Self {
            messages,
            ..self.clone()
        }
    }
}

impl Streamable for ChatRequest {
    fn is_streaming(&self) -> bool {
        self.stream
    }

    fn streaming(&self, stream: bool) -> Self {
        Self {
            stream,
            ..self.clone()
        }
    }
}

impl MultiChoice for ChatRequest {}

impl ToolCalling for ChatRequest {
    fn tools(&self) -> &[Tool] {
        &self.tools
    }

    fn tool_calls(&self, response: &ChatResponse) -> Vec<ToolCall> {
        self.picked(response)
            .map(|choice| choice.message.tool_calls.clone())
            .unwrap_or_default()
    }

    fn assistant_message(&self, response: &ChatResponse, calls: &[ToolCall]) -> Message {
        let content = self
            .picked(response)
            .and_then(|choice| choice.message.content.clone())
            .unwrap_or_default();
        Message::assistant_calls(content, calls)
    }

    fn tool_message(&self, result: ToolResult) -> Message {
        Message::tool(result)
    }
}
