//! In-memory adapter for tests
//!
//! [`Scripted`] replays canned replies and stream rounds instead of
//! talking to a backend, recording every request it receives.

use crate::{
    Adapter, BoxError, Decode, FinishReason, Message, Request, Response, Result, Streamable,
    StreamableResponse, Tool, ToolCall, ToolCalling, ToolResult, VendorError, merge_tool_calls,
};
use futures_core::Stream;
use futures_util::stream;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::{collections::VecDeque, marker::PhantomData, sync::Arc};

/// A minimal chat request.
#[derive(Debug, Clone, Default)]
pub struct Chat {
    /// The target model
    pub model: String,

    /// The conversation
    pub messages: Vec<Message>,

    /// The declared tools
    pub tools: Vec<Tool>,

    /// Whether streaming is requested
    pub stream: bool,
}

impl Chat {
    /// Create a request for `model`.
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            ..Default::default()
        }
    }

    /// Append a message.
    pub fn message(mut self, message: Message) -> Self {
        self.messages.push(message);
        self
    }

    /// Declare a tool.
    pub fn tool(mut self, tool: Tool) -> Self {
        self.tools.push(tool);
        self
    }
}

impl Request for Chat {
    type Message = Message;
    type Response = Reply;

    fn route(&self) -> &str {
        "/chat"
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

impl Streamable for Chat {
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

impl ToolCalling for Chat {
    fn tools(&self) -> &[Tool] {
        &self.tools
    }

    fn assistant_message(&self, response: &Reply, calls: &[ToolCall]) -> Message {
        Message::assistant_calls(response.content.as_str(), calls)
    }

    fn tool_message(&self, result: ToolResult) -> Message {
        Message::tool(result)
    }
}

/// A single-candidate reply, complete or partial.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Reply {
    /// The text produced so far
    #[serde(default)]
    pub content: String,

    /// Tool calls, possibly fragments while streaming
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tool_calls: Vec<ToolCall>,

    /// Why generation stopped
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finish_reason: Option<FinishReason>,
}

impl Reply {
    /// A text reply that finished naturally.
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            finish_reason: Some(FinishReason::Stop),
            ..Default::default()
        }
    }

    /// A reply waiting on tool calls.
    pub fn calls(calls: Vec<ToolCall>) -> Self {
        Self {
            tool_calls: calls,
            finish_reason: Some(FinishReason::ToolCalls),
            ..Default::default()
        }
    }
}

impl Response for Reply {
    type Message = Message;

    fn messages(&self) -> Vec<Message> {
        vec![Message::assistant_calls(self.content.as_str(), &self.tool_calls)]
    }

    fn tool_calls(&self) -> Vec<ToolCall> {
        self.tool_calls.clone()
    }

    fn finish_reason(&self) -> Option<FinishReason> {
        self.finish_reason
    }
}

impl StreamableResponse for Reply {
    fn combine(&mut self, partial: &Self) {
        self.content.push_str(&partial.content);
        merge_tool_calls(&mut self.tool_calls, &partial.tool_calls);
        if partial.finish_reason.is_some() {
            self.finish_reason = partial.finish_reason;
        }
    }
}

#[derive(Default)]
struct Script {
    replies: VecDeque<Reply>,
    rounds: VecDeque<Vec<String>>,
    requests: Vec<Chat>,
}

/// An adapter replaying scripted replies.
///
/// `T` only distinguishes adapter types, so several scripted adapters can
/// live in one registry.
pub struct Scripted<T = ()> {
    prefix: Option<String>,
    script: Arc<Mutex<Script>>,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Default for Scripted<T> {
    fn default() -> Self {
        Self {
            prefix: None,
            script: Arc::default(),
            _marker: PhantomData,
        }
    }
}

impl<T> Clone for Scripted<T> {
    fn clone(&self) -> Self {
        Self {
            prefix: self.prefix.clone(),
            script: self.script.clone(),
            _marker: PhantomData,
        }
    }
}

impl<T> Scripted<T> {
    /// An adapter accepting every request
    pub fn new() -> Self {
        Self::default()
    }

    /// Only accept models starting with `prefix`.
    pub fn accepting(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    /// Queue the reply to the next non-streaming call.
    pub fn reply(self, reply: Reply) -> Self {
        self.script.lock().replies.push_back(reply);
        self
    }

    /// Queue the raw units of the next stream.
    pub fn round<I, S>(self, units: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let units = units.into_iter().map(Into::into).collect();
        self.script.lock().rounds.push_back(units);
        self
    }

    /// The requests received so far, in order.
    pub fn requests(&self) -> Vec<Chat> {
        self.script.lock().requests.clone()
    }
}

impl<T: 'static> Decode for Scripted<T> {
    type Partial = Reply;

    fn decode(&self, buffer: &str) -> std::result::Result<Reply, BoxError> {
        Ok(serde_json::from_str(buffer)?)
    }

    fn vendor_error(&self, unit: &str) -> Option<VendorError> {
        #[derive(Deserialize)]
        struct Frame {
            error: VendorError,
        }

        serde_json::from_str::<Frame>(unit).ok().map(|f| f.error)
    }
}

impl<T: 'static> Adapter for Scripted<T> {
    type Request = Chat;

    fn accepts(&self, request: &Chat) -> bool {
        self.prefix
            .as_deref()
            .is_none_or(|prefix| request.model.starts_with(prefix))
    }

    async fn send(&self, request: &Chat) -> Result<Reply> {
        let mut script = self.script.lock();
        script.requests.push(request.clone());
        Ok(script.replies.pop_front().unwrap_or_default())
    }

    fn open(&self, request: &Chat) -> impl Stream<Item = Result<String>> + Send {
        let mut script = self.script.lock();
        script.requests.push(request.clone());
        let units = script.rounds.pop_front().unwrap_or_default();
        stream::iter(units.into_iter().map(Ok))
    }
}
