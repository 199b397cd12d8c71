//! In-memory correlation store.
//!
//! Both directions live under one `RwLock` so an insert updates them atomically; lookups take the
//! read lock and run concurrently.

use async_trait::async_trait;
use relay_core::{EndUserId, RelayError, Result, ThreadId};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::store::CorrelationStore;

#[derive(Debug, Default)]
struct Correlations {
    thread_by_user: HashMap<EndUserId, ThreadId>,
    user_by_thread: HashMap<ThreadId, EndUserId>,
}

/// In-memory correlation store. Cloning shares the underlying mapping.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCorrelationStore {
    inner: Arc<RwLock<Correlations>>,
}

impl InMemoryCorrelationStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all correlations, ordered by end user.
    pub async fn entries(&self) -> Vec<(EndUserId, ThreadId)> {
        let guard = self.inner.read().await;
        let mut entries: Vec<_> = guard
            .thread_by_user
            .iter()
            .map(|(user, thread)| (*user, *thread))
            .collect();
        entries.sort();
        entries
    }
}

#[async_trait]
impl CorrelationStore for InMemoryCorrelationStore {
    async fn lookup_thread(&self, end_user: EndUserId) -> Option<ThreadId> {
        self.inner.read().await.thread_by_user.get(&end_user).copied()
    }

    async fn lookup_end_user(&self, thread: ThreadId) -> Option<EndUserId> {
        self.inner.read().await.user_by_thread.get(&thread).copied()
    }

    async fn insert(&self, end_user: EndUserId, thread: ThreadId) -> Result<()> {
        let mut guard = self.inner.write().await;

        let bound_thread = guard.thread_by_user.get(&end_user).copied();
        let bound_user = guard.user_by_thread.get(&thread).copied();

        match (bound_thread, bound_user) {
            (Some(t), Some(u)) if t == thread && u == end_user => {
                debug!(end_user = %end_user, thread = %thread, "Correlation already present");
                Ok(())
            }
            (None, None) => {
                guard.thread_by_user.insert(end_user, thread);
                guard.user_by_thread.insert(thread, end_user);
                info!(end_user = %end_user, thread = %thread, "Correlation stored");
                Ok(())
            }
            (t, u) => {
                let existing = [
                    t.map(|t| format!("thread {}", t)),
                    u.map(|u| format!("end user {}", u)),
                ]
                .into_iter()
                .flatten()
                .collect::<Vec<_>>()
                .join(" / ");
                warn!(
                    end_user = %end_user,
                    thread = %thread,
                    existing = %existing,
                    "Correlation conflict, refusing to overwrite"
                );
                Err(RelayError::Conflict {
                    end_user,
                    thread,
                    existing,
                })
            }
        }
    }

    async fn len(&self) -> usize {
        self.inner.read().await.thread_by_user.len()
    }
}
