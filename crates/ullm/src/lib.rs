//! Unified LLM Interface
//!
//! This is the umbrella crate that re-exports all ullm components.

pub use openai::{self, ChatRequest, ChatResponse, Client, HttpProvider, OpenAI, ProviderConfig};
pub use ucore::{
    self, Adapter, Completable, Content, Error, Message, MultiChoice, Object, Part, Property,
    Registry, Request, Response, Result, Role, Schema, Streamable, StreamableResponse, Tool,
    ToolCall, ToolCalling, ToolResult, Value,
};
