use thiserror::Error;

use crate::types::{Destination, EndUserId, ThreadId};

#[derive(Error, Debug)]
pub enum RelayError {
    /// Correlation integrity violation: one side is already bound to a different counterpart.
    #[error("Correlation conflict: end user {end_user} / thread {thread} (bound to {existing})")]
    Conflict {
        end_user: EndUserId,
        thread: ThreadId,
        existing: String,
    },

    #[error("Thread creation failed: {0}")]
    ThreadCreation(String),

    #[error("Unresolvable identity: {0}")]
    UnresolvableIdentity(String),

    #[error("Empty reply for end user {end_user}")]
    EmptyReply { end_user: EndUserId },

    #[error("Send to {destination} failed ({summary}): {reason}")]
    Send {
        destination: Destination,
        summary: String,
        reason: String,
    },

    #[error("API error: {0}")]
    Api(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl RelayError {
    /// Routing misses that end in a logged no-op rather than a failure.
    pub fn is_silent(&self) -> bool {
        matches!(
            self,
            RelayError::UnresolvableIdentity(_) | RelayError::EmptyReply { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, RelayError>;
