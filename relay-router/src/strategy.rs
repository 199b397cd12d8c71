//! Reply-target resolution strategies.
//!
//! Exactly one strategy is active per deployment, chosen once from [`RoutingMode`]:
//! - [`ThreadBased`]: every end user owns a thread; operator messages in that thread go back to
//!   the owner through an O(1) store lookup.
//! - [`PatternBased`]: no threads; forwards carry a header with the user id, which is parsed back
//!   out of the message an operator replies to. Best effort.

use async_trait::async_trait;
use correlation_store::CorrelationStore;
use relay_core::{
    Destination, EndUser, EndUserId, InboundEvent, MessagingApi, RelayError, Result,
};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use tracing::debug;

use crate::extractor::IdentityExtractor;
use crate::format::ForwardLabels;
use crate::resolver::ThreadResolver;

/// Where a private message from an end user is forwarded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placement {
    pub destination: Destination,
    /// Identification block prepended to the text and used as photo caption.
    pub header: Option<String>,
}

/// End user an operator message is routed back to, with the body to deliver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplyTarget {
    pub end_user: EndUserId,
    /// Text to send, or the photo caption when the message carries a photo.
    pub body: Option<String>,
}

/// Correlates end users with operator-group messages, in both directions.
#[async_trait]
pub trait ReplyTargetResolver: Send + Sync {
    fn mode(&self) -> RoutingMode;

    /// Where to forward a private message from `user`.
    async fn placement(&self, user: &EndUser) -> Result<Placement>;

    /// End user an operator message is meant for. `Ok(None)` means no correlation exists.
    async fn resolve_reply_target(&self, event: &InboundEvent) -> Result<Option<ReplyTarget>>;
}

/// Routing strategy selected at configuration time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RoutingMode {
    #[default]
    Threads,
    Pattern,
}

impl fmt::Display for RoutingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RoutingMode::Threads => write!(f, "threads"),
            RoutingMode::Pattern => write!(f, "pattern"),
        }
    }
}

impl FromStr for RoutingMode {
    type Err = RelayError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "threads" | "thread" | "topics" => Ok(RoutingMode::Threads),
            "pattern" | "fallback" => Ok(RoutingMode::Pattern),
            other => Err(RelayError::Config(format!(
                "unknown routing mode {:?} (expected \"threads\" or \"pattern\")",
                other
            ))),
        }
    }
}

pub struct ThreadBased {
    resolver: ThreadResolver,
    store: Arc<dyn CorrelationStore>,
    group_id: i64,
}

impl ThreadBased {
    pub fn new(store: Arc<dyn CorrelationStore>, api: Arc<dyn MessagingApi>, group_id: i64) -> Self {
        Self {
            resolver: ThreadResolver::new(store.clone(), api, group_id),
            store,
            group_id,
        }
    }
}

#[async_trait]
impl ReplyTargetResolver for ThreadBased {
    fn mode(&self) -> RoutingMode {
        RoutingMode::Threads
    }

    async fn placement(&self, user: &EndUser) -> Result<Placement> {
        let thread = self.resolver.resolve(user).await?;
        Ok(Placement {
            destination: Destination::group(self.group_id, Some(thread)),
            header: None,
        })
    }

    async fn resolve_reply_target(&self, event: &InboundEvent) -> Result<Option<ReplyTarget>> {
        let Some(thread) = event.thread_id else {
            debug!(message_id = event.message_id, "Operator message outside any thread");
            return Ok(None);
        };
        let Some(end_user) = self.store.lookup_end_user(thread).await else {
            debug!(thread = %thread, "Thread has no end user");
            return Ok(None);
        };
        let body = if event.has_photo() {
            event.caption.clone()
        } else {
            event.text_body().map(str::to_string)
        };
        Ok(Some(ReplyTarget { end_user, body }))
    }
}

pub struct PatternBased {
    extractor: IdentityExtractor,
    labels: ForwardLabels,
    group_id: i64,
}

impl PatternBased {
    pub fn new(extractor: IdentityExtractor, labels: ForwardLabels, group_id: i64) -> Self {
        Self {
            extractor,
            labels,
            group_id,
        }
    }
}

#[async_trait]
impl ReplyTargetResolver for PatternBased {
    fn mode(&self) -> RoutingMode {
        RoutingMode::Pattern
    }

    async fn placement(&self, user: &EndUser) -> Result<Placement> {
        Ok(Placement {
            destination: Destination::group(self.group_id, None),
            header: Some(self.labels.header_block(user)),
        })
    }

    async fn resolve_reply_target(&self, event: &InboundEvent) -> Result<Option<ReplyTarget>> {
        match self.extractor.extract(event) {
            Ok((end_user, body)) => Ok(Some(ReplyTarget {
                end_user,
                body: Some(body),
            })),
            // A photo still goes out with an empty caption.
            Err(RelayError::EmptyReply { end_user }) if event.has_photo() => {
                Ok(Some(ReplyTarget {
                    end_user,
                    body: None,
                }))
            }
            Err(e) => Err(e),
        }
    }
}
