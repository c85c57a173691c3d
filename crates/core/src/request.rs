//! Request capability contracts
//!
//! Adapters implement these on their own request types. There is no
//! shared base type: a request gains a capability by implementing the
//! matching trait.

use crate::{
    Choices, Result, StreamableResponse, Tool, ToolCall, ToolResult, completion,
    response::Response,
};
use std::future::Future;

/// A request to a model backend.
///
/// Requests are values. Every update returns a new request, so one
/// instance can be shared by concurrent exchanges.
pub trait Request: Clone + Send + Sync + 'static {
    /// The conversation message type.
    type Message: Clone + Send + Sync + 'static;

    /// The response this request produces.
    type Response: Response<Message = Self::Message>;

    /// The route the request targets, e.g. an endpoint path.
    fn route(&self) -> &str;

    /// The target model id.
    fn model(&self) -> &str;

    /// The conversation so far.
    fn messages(&self) -> &[Self::Message];

    /// A copy of this request with the conversation replaced.
    fn with_messages(&self, messages: Vec<Self::Message>) -> Self;

    /// A copy of this request with messages appended to the conversation.
    fn appending(&self, messages: impl IntoIterator<Item = Self::Message>) -> Self {
        let mut all = self.messages().to_vec();
        all.extend(messages);
        self.with_messages(all)
    }
}

/// A request whose response can be streamed.
pub trait Streamable: Request<Response: StreamableResponse> {
    /// Whether streaming is requested.
    fn is_streaming(&self) -> bool;

    /// A copy of this request with streaming toggled.
    fn streaming(&self, stream: bool) -> Self;
}

/// A request whose response may carry several candidates.
pub trait MultiChoice: Request<Response: Choices> {
    /// Pick the candidate the exchange continues with.
    fn pick<'c>(
        &self,
        choices: &'c [<Self::Response as Choices>::Choice],
    ) -> Option<&'c <Self::Response as Choices>::Choice> {
        choices.first()
    }
}

/// A request that declares tools the model may call.
pub trait ToolCalling: Request {
    /// The declared tools.
    fn tools(&self) -> &[Tool];

    /// The tool calls a response is waiting on.
    fn tool_calls(&self, response: &Self::Response) -> Vec<ToolCall> {
        response.tool_calls()
    }

    /// The assistant message recording the answered `calls` of `response`.
    fn assistant_message(&self, response: &Self::Response, calls: &[ToolCall]) -> Self::Message;

    /// The message carrying one tool result.
    fn tool_message(&self, result: ToolResult) -> Self::Message;
}

/// A request that knows how to continue after a response.
pub trait Completable: Request {
    /// The next round's request, or `None` when the exchange is finished.
    fn complete(
        &self,
        response: &Self::Response,
    ) -> impl Future<Output = Result<Option<Self>>> + Send;
}

impl<R: ToolCalling> Completable for R {
    fn complete(
        &self,
        response: &Self::Response,
    ) -> impl Future<Output = Result<Option<Self>>> + Send {
        completion::complete(self, response)
    }
}
