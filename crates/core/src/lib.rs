//! Core abstractions for the unified LLM interface.
//!
//! This crate provides the vendor-neutral pieces every adapter builds on:
//! `Value`, `Message`, the request and response capability traits, the
//! streaming `Decoder` and `Merger`, tool-calling completion, and the
//! `Registry` that routes requests to adapters.
//!
//! Tool callbacks run on spawned tokio tasks, so exchanges with tools must
//! be driven inside a tokio runtime.

pub use adapter::Adapter;
pub use error::{BoxError, Error, Result, VendorError};
pub use exchange::{MAX_ROUNDS, perform, stream};
pub use message::{Content, Message, Part, Role};
pub use registry::Registry;
pub use request::{Completable, MultiChoice, Request, Streamable, ToolCalling};
pub use response::{
    Candidate, Choices, FinishReason, Response, StreamableResponse, merge_choices,
};
pub use stream::{Decode, Decoder, Merger, collect, partials};
pub use tool::{Callback, Property, Schema, Tool, ToolCall, ToolResult, merge_tool_calls};
pub use value::{Object, Value};

mod adapter;
mod completion;
mod error;
mod exchange;
mod message;
mod registry;
mod request;
mod response;
mod stream;
#[cfg(feature = "testing")]
pub mod testing;
mod tool;
mod value;
