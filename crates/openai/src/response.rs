//! Chat completions responses, full and streamed

use crate::wire;
use serde::Deserialize;
use ucore::{
    Candidate, Choices, FinishReason, Message, Response, Role, StreamableResponse, ToolCall,
    merge_choices, merge_tool_calls,
};

/// A chat completions response or stream chunk.
///
/// Full responses and `chat.completion.chunk` frames share this type: a
/// chunk is a response whose choices carry `delta` fragments.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ChatResponse {
    /// The completion id
    #[serde(default)]
    pub id: String,

    /// The model that produced the completion
    #[serde(default)]
    pub model: String,

    /// Creation time in unix seconds
    #[serde(default)]
    pub created: u64,

    /// The candidates
    #[serde(default)]
    pub choices: Vec<ChatChoice>,

    /// Token usage, usually only on the last chunk
    #[serde(default)]
    pub usage: Option<Usage>,
}

impl ChatResponse {
    /// The text of the first candidate.
    pub fn content(&self) -> &str {
        self.choices
            .first()
            .and_then(|choice| choice.message.content.as_deref())
            .unwrap_or_default()
    }

    /// The reasoning text of the first candidate, if the model exposes it.
    pub fn reasoning(&self) -> Option<&str> {
        self.choices
            .first()
            .and_then(|choice| choice.message.reasoning_content.as_deref())
    }
}

impl Response for ChatResponse {
    type Message = Message;

    fn messages(&self) -> Vec<Message> {
        self.choices.iter().map(ChatChoice::to_message).collect()
    }

    fn tool_calls(&self) -> Vec<ToolCall> {
        self.choices
            .first()
            .map(|choice| choice.message.tool_calls.clone())
            .unwrap_or_default()
    }

    fn finish_reason(&self) -> Option<FinishReason> {
        self.choices.first().and_then(|choice| choice.finish_reason)
    }
}

impl StreamableResponse for ChatResponse {
    fn combine(&mut self, partial: &Self) {
        if !partial.id.is_empty() {
            self.id.clone_from(&partial.id);
        }
        if !partial.model.is_empty() {
            self.model.clone_from(&partial.model);
        }
        if partial.created != 0 {
            self.created = partial.created;
        }
        if partial.usage.is_some() {
            self.usage.clone_from(&partial.usage);
        }
        merge_choices(&mut self.choices, &partial.choices);
    }

    fn post_process(mut self) -> Self {
        self.choices.sort_by_key(|choice| choice.index);
        self
    }
}

impl Choices for ChatResponse {
    type Choice = ChatChoice;

    fn choices(&self) -> &[ChatChoice] {
        &self.choices
    }
}

/// One candidate of a response.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ChatChoice {
    /// The candidate index
    #[serde(default)]
    pub index: u32,

    /// The message, or the delta of a stream chunk
    #[serde(default, alias = "delta")]
    pub message: Delta,

    /// Why the candidate stopped
    #[serde(default)]
    pub finish_reason: Option<FinishReason>,
}

impl ChatChoice {
    /// The candidate as a conversation message.
    pub fn to_message(&self) -> Message {
        let content = self.message.content.clone().unwrap_or_default();
        match self.message.role {
            Some(role) if role != Role::Assistant => Message::new(role, content),
            _ => Message::assistant_calls(content, &self.message.tool_calls),
        }
    }
}

impl Candidate for ChatChoice {
    fn index(&self) -> u32 {
        self.index
    }

    fn combine(&mut self, fragment: &Self) {
        let (message, delta) = (&mut self.message, &fragment.message);
        if delta.role.is_some() {
            message.role = delta.role;
        }
        append(&mut message.content, &delta.content);
        append(&mut message.reasoning_content, &delta.reasoning_content);
        merge_tool_calls(&mut message.tool_calls, &delta.tool_calls);
        if fragment.finish_reason.is_some() {
            self.finish_reason = fragment.finish_reason;
        }
    }
}

/// A message or message fragment.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Delta {
    /// The role, usually only on the first fragment
    #[serde(default)]
    pub role: Option<Role>,

    /// The text
    #[serde(default)]
    pub content: Option<String>,

    /// The reasoning text of thinking models
    #[serde(default)]
    pub reasoning_content: Option<String>,

    /// Tool calls, fragments while streaming
    #[serde(default, deserialize_with = "wire::tool_calls")]
    pub tool_calls: Vec<ToolCall>,
}

/// Token usage
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct Usage {
    /// Tokens in the prompt
    #[serde(default)]
    pub prompt_tokens: u32,

    /// Tokens in the completion
    #[serde(default)]
    pub completion_tokens: u32,

    /// Prompt and completion tokens
    #[serde(default)]
    pub total_tokens: u32,
}

fn append(text: &mut Option<String>, fragment: &Option<String>) {
    if let Some(fragment) = fragment {
        text.get_or_insert_default().push_str(fragment);
    }
}
