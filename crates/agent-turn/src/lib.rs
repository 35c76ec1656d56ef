//! One chat turn against an LLM provider and a remote MCP tool server.
//!
//! A turn either streams a completion that may propose tool calls, or
//! resolves a set of proposals against the user's approvals.

pub mod approval;
pub mod completion;
pub mod error;

pub use approval::{proposed_tool_calls, rejection_marker, resolve_tool_calls, resolve_with_tools};
pub use completion::{stream_completion, CompletionStream};
pub use error::{Result, TurnError};
