//! The vendor adapter contract

use crate::{Decode, Result, Streamable, ToolCalling};
use futures_core::Stream;
use std::future::Future;

/// A vendor backend.
///
/// An adapter owns its transport: [`Adapter::send`] performs one
/// non-streaming call and [`Adapter::open`] opens a stream of raw units
/// that the [`Decode`] half turns into partial responses. Tool-calling
/// rounds and stream splicing live in [`crate::perform`] and
/// [`crate::stream()`].
pub trait Adapter: Decode + 'static {
    /// The request type this adapter serves.
    type Request: Streamable + ToolCalling<Response = Self::Partial>;

    /// Whether this adapter can serve the request.
    fn accepts(&self, _request: &Self::Request) -> bool {
        true
    }

    /// Perform one non-streaming call.
    fn send(&self, request: &Self::Request) -> impl Future<Output = Result<Self::Partial>> + Send;

    /// Open a stream of raw units for one call.
    ///
    /// Dropping the stream must tear down the connection.
    fn open(&self, request: &Self::Request) -> impl Stream<Item = Result<String>> + Send;
}
