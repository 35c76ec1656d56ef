//! Shared SSE -> [`LLMStream`] adapter.

use eventsource_stream::Eventsource;
use futures_util::{future, stream, StreamExt};
use reqwest::Response;

use crate::provider::{LLMError, LLMStream, Result};
use crate::types::LLMChunk;

fn to_stream_error(err: LLMError) -> LLMError {
    match err {
        LLMError::Stream(msg) => LLMError::Stream(msg),
        other => LLMError::Stream(other.to_string()),
    }
}

/// Convert an SSE HTTP [`Response`] into an [`LLMStream`].
///
/// `handler` receives the SSE event name and data payload for each event, and can either:
/// - return `Ok(chunks)` to emit zero or more chunks in order
/// - return `Err(_)` to emit a stream error (mapped to `LLMError::Stream`)
///
/// The stream ends at the first [`LLMChunk::Done`], which is not emitted, even
/// if the server keeps the connection open afterwards.
pub fn llm_stream_from_sse<H>(response: Response, mut handler: H) -> LLMStream
where
    H: FnMut(&str, &str) -> Result<Vec<LLMChunk>> + Send + 'static,
{
    let stream = response
        .bytes_stream()
        .eventsource()
        .map(move |event| {
            let event = event.map_err(|e| LLMError::Stream(e.to_string()))?;
            handler(event.event.as_str(), event.data.as_str()).map_err(to_stream_error)
        })
        .flat_map(|result| {
            let items: Vec<Result<LLMChunk>> = match result {
                Ok(chunks) => chunks.into_iter().map(Ok).collect(),
                Err(err) => vec![Err(err)],
            };
            stream::iter(items)
        })
        .take_while(|result| future::ready(!matches!(result, Ok(LLMChunk::Done))));

    Box::pin(stream)
}
