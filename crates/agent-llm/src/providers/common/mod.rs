//! Shared helpers for provider implementations.

pub mod openai_compat;
pub mod sse;
pub mod stream_tool_accumulator;
