//! MCP (Model Context Protocol) client library for the chat server
//!
//! This crate connects to streamable HTTP MCP servers, lists their tools and
//! executes them on behalf of a chat turn.

pub mod config;
pub mod directory;
pub mod error;
pub mod executor;
pub mod protocol;
pub mod transports;

pub use config::McpServerConfig;
pub use directory::{fetch_tool_catalog, ToolDirectory};
pub use error::{McpError, Result};
pub use executor::McpToolExecutor;
pub use protocol::{McpProtocolClient, McpTransport};
pub use transports::StreamableHttpTransport;
