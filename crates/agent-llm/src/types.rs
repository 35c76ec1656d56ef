use crate::models::StreamToolCall;

/// One decoded event from a streaming chat completion.
#[derive(Debug, Clone, PartialEq)]
pub enum LLMChunk {
    /// Text delta; may be empty for keep-alive or role-only deltas.
    Token(String),
    /// Tool-call fragments keyed by their index within the response.
    ToolCalls(Vec<StreamToolCall>),
    Done,
}
