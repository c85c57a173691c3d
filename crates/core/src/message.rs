//! Vendor-neutral conversation turns

use crate::{ToolCall, ToolResult};
use serde::{Deserialize, Deserializer, Serialize};

/// A message in the conversation.
///
/// Messages are values: once built they are only appended to a
/// conversation, never edited in place.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Message {
    /// The role of the message
    role: Role,

    /// The content of the message
    #[serde(default, deserialize_with = "nullable")]
    content: Content,

    /// The participant name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    name: Option<String>,

    /// The tool calls issued by the assistant
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    tool_calls: Vec<ToolCall>,

    /// The tool call this message answers
    #[serde(default, skip_serializing_if = "Option::is_none")]
    tool_call_id: Option<String>,
}

impl Message {
    /// Create a message with the given role and content.
    pub fn new(role: Role, content: impl Into<Content>) -> Self {
        Self {
            role,
            content: content.into(),
            name: None,
            tool_calls: Vec::new(),
            tool_call_id: None,
        }
    }

    /// Create a new system message
    pub fn system(content: impl Into<Content>) -> Self {
        Self::new(Role::System, content)
    }

    /// Create a new user message
    pub fn user(content: impl Into<Content>) -> Self {
        Self::new(Role::User, content)
    }

    /// Create a new assistant message
    pub fn assistant(content: impl Into<Content>) -> Self {
        Self::new(Role::Assistant, content)
    }

    /// Create an assistant message recording the given tool calls.
    pub fn assistant_calls(content: impl Into<Content>, calls: &[ToolCall]) -> Self {
        Self {
            tool_calls: calls.to_vec(),
            ..Self::assistant(content)
        }
    }

    /// Create a tool message answering one tool call.
    pub fn tool(result: ToolResult) -> Self {
        Self {
            tool_call_id: Some(result.id),
            ..Self::new(Role::Tool, result.content)
        }
    }

    /// Return a copy carrying the participant name.
    pub fn with_name(self, name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..self
        }
    }

    /// The role of the message
    pub fn role(&self) -> Role {
        self.role
    }

    /// The content of the message
    pub fn content(&self) -> &Content {
        &self.content
    }

    /// The participant name
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// The tool calls recorded on this message
    pub fn tool_calls(&self) -> &[ToolCall] {
        &self.tool_calls
    }

    /// The tool call this message answers
    pub fn tool_call_id(&self) -> Option<&str> {
        self.tool_call_id.as_deref()
    }
}

/// The role of a message
///
/// Vendor synonyms are accepted on decode and normalized; encoding always
/// writes the canonical name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize, Default)]
pub enum Role {
    /// The system role
    #[serde(rename = "system", alias = "developer")]
    System,
    /// The user role
    #[serde(rename = "user", alias = "human")]
    #[default]
    User,
    /// The assistant role
    #[serde(rename = "assistant", alias = "model", alias = "ai", alias = "bot")]
    Assistant,
    /// The tool role
    #[serde(rename = "tool", alias = "function")]
    Tool,
}

/// Vendors send `"content": null` next to tool calls.
fn nullable<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Content, D::Error> {
    Ok(Option::<Content>::deserialize(deserializer)?.unwrap_or_default())
}

/// Content of a message: plain text or ordered typed parts.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum Content {
    /// Plain text
    Text(String),
    /// Ordered typed parts
    Parts(Vec<Part>),
}

impl Content {
    /// The text of the content.
    ///
    /// Parts are joined by their text segments; non-text parts are skipped.
    pub fn text(&self) -> String {
        match self {
            Self::Text(text) => text.clone(),
            Self::Parts(parts) => parts
                .iter()
                .filter_map(|part| match part {
                    Part::Text { text } => Some(text.as_str()),
                    _ => None,
                })
                .collect(),
        }
    }

    /// Whether there is nothing to send.
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Text(text) => text.is_empty(),
            Self::Parts(parts) => parts.is_empty(),
        }
    }
}

impl Default for Content {
    fn default() -> Self {
        Self::Text(String::new())
    }
}

impl From<&str> for Content {
    fn from(text: &str) -> Self {
        Self::Text(text.to_owned())
    }
}

impl From<&String> for Content {
    fn from(text: &String) -> Self {
        Self::Text(text.clone())
    }
}

impl From<String> for Content {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<Vec<Part>> for Content {
    fn from(parts: Vec<Part>) -> Self {
        Self::Parts(parts)
    }
}

/// A typed content part
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Part {
    /// A text segment
    Text {
        /// The text
        text: String,
    },
    /// An image by URL or data URI
    Image {
        /// The image URL or `data:` URI
        url: String,
        /// Optional detail hint
        #[serde(default, skip_serializing_if = "Option::is_none")]
        detail: Option<String>,
    },
    /// Base64 audio
    Audio {
        /// The base64 payload
        data: String,
        /// The audio format, e.g. `wav`
        format: String,
    },
    /// The result of a tool call
    ToolResult {
        /// The tool call id
        id: String,
        /// The result text
        content: String,
    },
}

impl Part {
    /// Create a text part
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }

    /// Create an image part
    pub fn image(url: impl Into<String>) -> Self {
        Self::Image {
            url: url.into(),
            detail: None,
        }
    }
}

impl From<ToolResult> for Part {
    fn from(result: ToolResult) -> Self {
        Self::ToolResult {
            id: result.id,
            content: result.content,
        }
    }
}
