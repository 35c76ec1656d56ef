pub mod approvals;
pub mod chat;
pub mod doc;
pub mod mcp;
