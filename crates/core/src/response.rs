//! Response capability contracts

use crate::ToolCall;
use serde::{Deserialize, Serialize};

/// A response produced by an adapter.
pub trait Response: Clone + Send + Sync + 'static {
    /// The message type the response produces.
    type Message: Clone + Send + Sync + 'static;

    /// The produced messages, one per candidate.
    fn messages(&self) -> Vec<Self::Message>;

    /// Tool calls the model is waiting on, if any.
    fn tool_calls(&self) -> Vec<ToolCall>;

    /// Why the model stopped generating.
    fn finish_reason(&self) -> Option<FinishReason>;
}

/// A response that arrives in partial pieces.
///
/// [`Default`] is the empty response a stream accumulates into.
pub trait StreamableResponse: Response + Default {
    /// Fold a later partial response into this accumulated one.
    fn combine(&mut self, partial: &Self);

    /// Vendor-neutral cleanup applied to each partial before it is emitted.
    fn post_process(self) -> Self {
        self
    }
}

/// A response that may carry several parallel candidates.
pub trait Choices: Response {
    /// The candidate type.
    type Choice: Candidate;

    /// The candidates, in arrival order.
    fn choices(&self) -> &[Self::Choice];
}

/// One candidate of a multi-choice response.
pub trait Candidate: Clone + Send + Sync {
    /// The candidate index assigned by the vendor.
    fn index(&self) -> u32;

    /// Fold a later fragment of the same candidate into this one.
    fn combine(&mut self, fragment: &Self);
}

/// Merge candidate fragments into `choices` by candidate index.
///
/// Vendors may emit candidates out of order, so list position is ignored.
/// `choices` stays sorted by index, matching a full response.
pub fn merge_choices<C: Candidate>(choices: &mut Vec<C>, fragments: &[C]) {
    for fragment in fragments {
        match choices.binary_search_by_key(&fragment.index(), |c| c.index()) {
            Ok(at) => choices[at].combine(fragment),
            Err(at) => choices.insert(at, fragment.clone()),
        }
    }
}

/// The reason the model stopped generating
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FinishReason {
    /// The model finished naturally
    #[serde(alias = "end_turn", alias = "stop_sequence")]
    Stop,

    /// The model hit the max token limit
    #[serde(alias = "max_tokens")]
    Length,

    /// Content was filtered
    ContentFilter,

    /// The model is making tool calls
    #[serde(alias = "tool_use", alias = "function_call")]
    ToolCalls,

    /// Any reason this crate does not know
    #[serde(other)]
    Other,
}
