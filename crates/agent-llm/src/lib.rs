//! Streaming chat-completion providers.

pub mod models;
pub mod provider;
pub mod providers;
pub mod types;

pub use models::{StreamFunctionCall, StreamToolCall};
pub use provider::{LLMError, LLMProvider, LLMStream, Result};
pub use providers::{OpenAIProvider, StreamToolAccumulator};
pub use types::LLMChunk;
