//! Exchange drivers: one call or one stream, with tool-calling rounds.

use crate::{Adapter, Completable, Decoder, Merger, Result, Streamable};
use async_stream::try_stream;
use futures_core::Stream;
use futures_util::StreamExt;
use std::sync::Arc;

/// Upper bound on tool-calling rounds in one exchange.
pub const MAX_ROUNDS: usize = 16;

/// Perform a non-streaming exchange.
///
/// Follow-up requests produced by tool calls are sent automatically; the
/// last response is returned.
///
/// Needs a tokio runtime when the model calls tools.
pub async fn perform<A: Adapter>(adapter: &A, request: A::Request) -> Result<A::Partial> {
    let mut request = request.streaming(false);
    let mut round = 0;
    loop {
        round += 1;
        let response = adapter.send(&request).await?;
        if round == MAX_ROUNDS {
            tracing::warn!("stopping after {MAX_ROUNDS} tool-calling rounds");
            return Ok(response);
        }

        match request.complete(&response).await? {
            Some(next) => {
                tracing::debug!("round {round} produced tool results, continuing");
                request = next;
            }
            None => return Ok(response),
        }
    }
}

/// Stream an exchange.
///
/// Yields post-processed partial responses in delivery order. When the
/// accumulated response of a round has pending tool calls, the follow-up
/// stream is spliced onto this one, so callers see one continuous stream.
pub fn stream<A: Adapter>(
    adapter: Arc<A>,
    request: A::Request,
) -> impl Stream<Item = Result<A::Partial>> + Send {
    try_stream! {
        let mut request = request.streaming(true);
        let mut round = 0;
        loop {
            round += 1;
            let mut decoder = Decoder::new();
            let mut merger = Merger::new();
            {
                let units = adapter.open(&request);
                futures_util::pin_mut!(units);
                while let Some(unit) = units.next().await {
                    let unit = unit?;
                    tracing::trace!("unit: {unit}");
                    if let Some(partial) = decoder.feed(adapter.as_ref(), &unit)? {
                        yield merger.push(partial);
                    }
                }
            }
            decoder.finish()?;

            let merged = merger.finish();
            if round == MAX_ROUNDS {
                tracing::warn!("stopping after {MAX_ROUNDS} tool-calling rounds");
                break;
            }
            match request.complete(&merged).await? {
                Some(next) => {
                    tracing::debug!("round {round} produced tool results, splicing follow-up");
                    request = next;
                }
                None => break,
            }
        }
    }
}
