//! Correlation store trait.

use async_trait::async_trait;
use relay_core::{EndUserId, Result, ThreadId};

/// Bijection between end users and threads. Both directions are O(1) lookups.
///
/// Implementations never overwrite: binding either side to a different counterpart fails with
/// [`relay_core::RelayError::Conflict`].
#[async_trait]
pub trait CorrelationStore: Send + Sync {
    /// Thread bound to `end_user`, if any.
    async fn lookup_thread(&self, end_user: EndUserId) -> Option<ThreadId>;

    /// End user bound to `thread`, if any.
    async fn lookup_end_user(&self, thread: ThreadId) -> Option<EndUserId>;

    /// Binds `end_user` to `thread`. Re-inserting an identical pair is a no-op.
    async fn insert(&self, end_user: EndUserId, thread: ThreadId) -> Result<()>;

    /// Number of correlations held.
    async fn len(&self) -> usize;

    async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}
