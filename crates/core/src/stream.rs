//! Streaming decoder and merger
//!
//! Raw protocol units carry no guarantee that one unit holds one complete
//! payload. [`Decoder`] buffers units until the vendor decode succeeds and
//! [`Merger`] folds every decoded partial into the accumulated response.

use crate::{BoxError, Error, Result, StreamableResponse, VendorError};
use async_stream::try_stream;
use futures_core::Stream;
use futures_util::StreamExt;

/// Vendor decoding of stream units.
pub trait Decode: Send + Sync {
    /// The partial response a complete payload decodes into.
    type Partial: StreamableResponse;

    /// Decode the buffered text into a partial response.
    ///
    /// An error means the buffer is not complete yet.
    fn decode(&self, buffer: &str) -> std::result::Result<Self::Partial, BoxError>;

    /// Recognise a vendor error frame, checked before a unit is buffered.
    fn vendor_error(&self, _unit: &str) -> Option<VendorError> {
        None
    }
}

/// Buffers stream units until they decode.
#[derive(Debug, Default)]
pub struct Decoder {
    buffer: String,
    error: Option<BoxError>,
}

impl Decoder {
    /// Create an empty decoder
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one unit.
    ///
    /// Returns the decoded partial once the buffer forms a complete payload,
    /// `None` while more data is needed.
    pub fn feed<D: Decode>(&mut self, decode: &D, unit: &str) -> Result<Option<D::Partial>> {
        if let Some(error) = decode.vendor_error(unit) {
            return Err(Error::Vendor(error));
        }

        self.buffer.push_str(unit);
        match decode.decode(&self.buffer) {
            Ok(partial) => {
                self.buffer.clear();
                self.error = None;
                Ok(Some(partial))
            }
            Err(cause) => {
                tracing::trace!("buffering {} bytes: {cause}", self.buffer.len());
                self.error = Some(cause);
                Ok(None)
            }
        }
    }

    /// The text buffered so far.
    pub fn buffer(&self) -> &str {
        &self.buffer
    }

    /// End the stream.
    ///
    /// Fails if text is left over from a decode attempt that errored.
    pub fn finish(self) -> Result<()> {
        match self.error {
            Some(cause) if !self.buffer.is_empty() => Err(Error::StreamDecodeFailed {
                buffer: self.buffer,
                cause,
            }),
            _ => Ok(()),
        }
    }
}

/// Folds partial responses into one accumulated response.
#[derive(Debug, Default)]
pub struct Merger<R> {
    merged: R,
}

impl<R: StreamableResponse> Merger<R> {
    /// Start from the empty response
    pub fn new() -> Self {
        Self {
            merged: R::default(),
        }
    }

    /// Post-process a partial, fold it in and hand it back for emission.
    pub fn push(&mut self, partial: R) -> R {
        let partial = partial.post_process();
        self.merged.combine(&partial);
        partial
    }

    /// The response accumulated so far.
    pub fn merged(&self) -> &R {
        &self.merged
    }

    /// Take the accumulated response.
    pub fn finish(self) -> R {
        self.merged
    }
}

/// Decode a stream of raw units into partial responses.
///
/// This is a single round without tool calling; [`crate::stream()`] runs
/// the full exchange.
pub fn partials<S, D>(units: S, decode: D) -> impl Stream<Item = Result<D::Partial>> + Send
where
    S: Stream<Item = Result<String>> + Send,
    D: Decode,
{
    try_stream! {
        let mut decoder = Decoder::new();
        futures_util::pin_mut!(units);
        while let Some(unit) = units.next().await {
            let unit = unit?;
            if let Some(partial) = decoder.feed(&decode, &unit)? {
                yield partial.post_process();
            }
        }
        decoder.finish()?;
    }
}

/// Fold a stream of partial responses into the final response.
pub async fn collect<S, R>(partials: S) -> Result<R>
where
    S: Stream<Item = Result<R>>,
    R: StreamableResponse,
{
    futures_util::pin_mut!(partials);
    let mut merged = R::default();
    while let Some(partial) = partials.next().await {
        merged.combine(&partial?);
    }
    Ok(merged)
}
