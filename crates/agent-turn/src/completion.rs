use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use futures::{Stream, StreamExt};
use tokio::sync::mpsc;

use agent_core::tools::ToolSet;
use agent_core::{validate_history, Message};
use agent_llm::{LLMChunk, LLMProvider, LLMStream, StreamToolAccumulator};
use agent_mcp::{McpServerConfig, ToolDirectory};

use crate::error::{Result, TurnError};

const EVENT_BUFFER: usize = 64;

enum CompletionEvent {
    Text(String),
    Finished(Vec<Message>),
    Failed(TurnError),
}

/// Live output of one completion turn.
///
/// Yields text fragments as the model produces them. Once the stream is
/// exhausted without error, [`CompletionStream::take_messages`] returns the
/// messages the turn appended to history.
///
/// Generation runs on its own task: dropping this stream stops delivery but
/// the provider call and the tool-server session run to completion.
pub struct CompletionStream {
    events: mpsc::Receiver<CompletionEvent>,
    messages: Option<Vec<Message>>,
    done: bool,
}

impl CompletionStream {
    /// Finalized messages, available once the text stream has ended cleanly.
    pub fn take_messages(&mut self) -> Option<Vec<Message>> {
        self.messages.take()
    }
}

impl Stream for CompletionStream {
    type Item = Result<String>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        if self.done {
            return Poll::Ready(None);
        }

        match self.events.poll_recv(cx) {
            Poll::Ready(Some(CompletionEvent::Text(text))) => Poll::Ready(Some(Ok(text))),
            Poll::Ready(Some(CompletionEvent::Finished(messages))) => {
                self.messages = Some(messages);
                self.done = true;
                Poll::Ready(None)
            }
            Poll::Ready(Some(CompletionEvent::Failed(err))) => {
                self.done = true;
                Poll::Ready(Some(Err(err)))
            }
            Poll::Ready(None) => {
                self.done = true;
                Poll::Ready(Some(Err(TurnError::Llm(agent_llm::LLMError::Stream(
                    "completion task ended without a result".to_string(),
                )))))
            }
            Poll::Pending => Poll::Pending,
        }
    }
}

/// Tools as offered to the model: schemas only, never executable.
pub fn offered_tools(tools: &ToolSet) -> ToolSet {
    tools.without_execute()
}

/// Starts one completion turn over `messages` with the tools of the server
/// at `server_config` available for selection.
///
/// Fails before any text is produced if the history is malformed, the tool
/// server cannot be reached, or the provider rejects the request.
pub async fn stream_completion(
    llm: Arc<dyn LLMProvider>,
    messages: &[Message],
    server_config: &McpServerConfig,
) -> Result<CompletionStream> {
    validate_history(messages)?;

    let directory = ToolDirectory::open(server_config).await?;
    let schemas = offered_tools(directory.tools()).schemas();
    log::info!(
        "Starting completion over {} messages with {} tools",
        messages.len(),
        schemas.len()
    );

    let llm_stream = match llm.chat_stream(messages, &schemas, None, None).await {
        Ok(stream) => stream,
        Err(e) => {
            close_directory(directory).await;
            return Err(e.into());
        }
    };

    let (tx, rx) = mpsc::channel(EVENT_BUFFER);
    tokio::spawn(async move {
        let outcome = consume_completion(llm_stream, &tx).await;
        close_directory(directory).await;

        let event = match outcome {
            Ok(message) => CompletionEvent::Finished(vec![message]),
            Err(e) => {
                log::error!("Completion failed: {}", e);
                CompletionEvent::Failed(e)
            }
        };
        if tx.send(event).await.is_err() {
            log::debug!("Completion finished after its consumer went away");
        }
    });

    Ok(CompletionStream {
        events: rx,
        messages: None,
        done: false,
    })
}

async fn consume_completion(
    mut stream: LLMStream,
    tx: &mpsc::Sender<CompletionEvent>,
) -> Result<Message> {
    let mut content = String::new();
    let mut tool_calls = StreamToolAccumulator::new();
    let mut delivering = true;

    while let Some(chunk_result) = stream.next().await {
        match chunk_result? {
            LLMChunk::Token(token) => {
                if token.is_empty() {
                    continue;
                }
                content.push_str(&token);
                if delivering && tx.send(CompletionEvent::Text(token)).await.is_err() {
                    log::debug!("Completion consumer dropped; draining the provider stream");
                    delivering = false;
                }
            }
            LLMChunk::ToolCalls(partial_calls) => {
                log::debug!("Received {} tool call parts", partial_calls.len());
                tool_calls.process_chunk(&partial_calls);
            }
            LLMChunk::Done => break,
        }
    }

    let tool_calls = tool_calls.into_tool_calls()?;
    if !tool_calls.is_empty() {
        log::info!(
            "Model proposed {} tool calls: {}",
            tool_calls.len(),
            tool_calls
                .iter()
                .map(|call| call.tool_name.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        );
    }

    Ok(Message::assistant(content, tool_calls))
}

async fn close_directory(directory: ToolDirectory) {
    if let Err(e) = directory.close().await {
        log::warn!("Failed to close tool directory: {}", e);
    }
}
