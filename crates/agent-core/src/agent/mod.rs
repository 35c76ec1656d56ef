pub mod error;
pub mod types;

pub use error::MessageError;
pub use types::{validate_history, ContentPart, Message, MessageContent, Role};
