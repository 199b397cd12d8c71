//! Messaging API contract used by the thread resolver, the forwarder and the welcome greeter.
//!
//! [`MessagingApi`] is transport-agnostic; relay-telegram implements it via teloxide and tests
//! substitute a recording mock.

use crate::error::Result;
use crate::types::{Destination, ThreadId};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// The bot's own identity, used to sign the welcome message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelfInfo {
    pub username: Option<String>,
    pub first_name: String,
}

impl SelfInfo {
    /// Username when set, else first name.
    pub fn display_name(&self) -> &str {
        self.username
            .as_deref()
            .filter(|u| !u.is_empty())
            .unwrap_or(&self.first_name)
    }
}

/// Outbound operations against the messaging provider. Each call is a single request; nothing is retried.
#[async_trait]
pub trait MessagingApi: Send + Sync {
    /// Creates a thread named `name` in `group_id` and returns its id.
    async fn create_thread(&self, group_id: i64, name: &str) -> Result<ThreadId>;
    /// Sends a text message.
    async fn send_text(&self, destination: &Destination, text: &str) -> Result<()>;
    /// Sends an already-uploaded photo by its provider reference.
    async fn send_photo(
        &self,
        destination: &Destination,
        photo_ref: &str,
        caption: Option<&str>,
    ) -> Result<()>;
    /// Returns the bot's own identity.
    async fn get_self_info(&self) -> Result<SelfInfo>;
}
