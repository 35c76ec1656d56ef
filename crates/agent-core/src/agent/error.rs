use thiserror::Error;

use crate::agent::types::Role;

#[derive(Error, Debug, Clone)]
pub enum MessageError {
    #[error("{part} part is not allowed on a {role} message")]
    PartNotAllowed { role: Role, part: &'static str },

    #[error("message {index}: {source}")]
    AtIndex {
        index: usize,
        #[source]
        source: Box<MessageError>,
    },
}
