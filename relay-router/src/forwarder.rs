//! Message forwarder: one outbound call per send, failures reported with destination and payload summary.

use relay_core::{Destination, MessagingApi, RelayError, Result};
use std::sync::Arc;
use tracing::{error, info};

const PREVIEW_CHARS: usize = 48;

#[derive(Clone)]
pub struct MessageForwarder {
    api: Arc<dyn MessagingApi>,
}

impl MessageForwarder {
    pub fn new(api: Arc<dyn MessagingApi>) -> Self {
        Self { api }
    }

    pub async fn send_text(&self, destination: &Destination, body: &str) -> Result<()> {
        let summary = summarize("text", body);
        match self.api.send_text(destination, body).await {
            Ok(()) => {
                info!(destination = %destination, payload = %summary, "Forwarded");
                Ok(())
            }
            Err(e) => Err(failure(destination, summary, e)),
        }
    }

    pub async fn send_photo(
        &self,
        destination: &Destination,
        photo_ref: &str,
        caption: Option<&str>,
    ) -> Result<()> {
        let summary = format!(
            "photo {} / {}",
            photo_ref,
            summarize("caption", caption.unwrap_or_default())
        );
        match self.api.send_photo(destination, photo_ref, caption).await {
            Ok(()) => {
                info!(destination = %destination, payload = %summary, "Forwarded");
                Ok(())
            }
            Err(e) => Err(failure(destination, summary, e)),
        }
    }
}

fn failure(destination: &Destination, summary: String, cause: RelayError) -> RelayError {
    error!(
        destination = %destination,
        payload = %summary,
        error = %cause,
        "Forward failed"
    );
    RelayError::Send {
        destination: *destination,
        summary,
        reason: cause.to_string(),
    }
}

/// `kind(len): preview`, preview cut at a char boundary.
fn summarize(kind: &str, body: &str) -> String {
    let len = body.chars().count();
    let preview: String = body.chars().take(PREVIEW_CHARS).collect();
    if len > PREVIEW_CHARS {
        format!("{}({}): {}…", kind, len, preview)
    } else {
        format!("{}({}): {}", kind, len, preview)
    }
}
