//! One-time welcome for new end users, signed with the bot's own name.

use relay_core::{Destination, EndUser, EndUserId, MessagingApi, SelfInfo};
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::{Mutex, OnceCell};
use tracing::{debug, info, warn};

/// Welcome text; `{name}` is replaced with the bot's display name.
pub const DEFAULT_WELCOME_TEMPLATE: &str =
    "Hi there! I'm {name} 🤖\nI'm here to help you, what do you need?";

/// Name used when the bot's identity cannot be fetched.
pub const FALLBACK_BOT_NAME: &str = "your assistant";

pub struct WelcomeGreeter {
    api: Arc<dyn MessagingApi>,
    template: String,
    greeted: Mutex<HashSet<EndUserId>>,
    self_info: OnceCell<SelfInfo>,
}

impl WelcomeGreeter {
    pub fn new(api: Arc<dyn MessagingApi>, template: Option<String>) -> Self {
        Self {
            api,
            template: template.unwrap_or_else(|| DEFAULT_WELCOME_TEMPLATE.to_string()),
            greeted: Mutex::new(HashSet::new()),
            self_info: OnceCell::new(),
        }
    }

    /// Sends the welcome if `user` has never been greeted. Returns true when it was delivered.
    ///
    /// The user is claimed before sending, so a failed send is not repeated.
    pub async fn greet_once(&self, user: &EndUser) -> bool {
        if !self.greeted.lock().await.insert(user.id) {
            debug!(end_user = %user.id, "Already welcomed");
            return false;
        }

        let text = self.template.replace("{name}", &self.bot_name().await);
        match self.api.send_text(&Destination::private(user.id), &text).await {
            Ok(()) => {
                info!(end_user = %user.id, "Welcome sent");
                true
            }
            Err(e) => {
                warn!(end_user = %user.id, error = %e, "Welcome send failed");
                false
            }
        }
    }

    /// Bot display name, fetched once. Failures are not cached.
    async fn bot_name(&self) -> String {
        match self
            .self_info
            .get_or_try_init(|| self.api.get_self_info())
            .await
        {
            Ok(info) => info.display_name().to_string(),
            Err(e) => {
                warn!(error = %e, "Self info lookup failed, using fallback name");
                FALLBACK_BOT_NAME.to_string()
            }
        }
    }
}
