//! Thread resolver: returns the end user's thread, creating it on first contact.
//!
//! Creation is single-flight per end user. Concurrent callers for the same user share one
//! `OnceCell`; the first one creates the thread and the rest await its outcome, including a
//! failure. Nothing is retried. Different users never wait on each other.

use correlation_store::CorrelationStore;
use relay_core::{EndUser, EndUserId, MessagingApi, RelayError, Result, ThreadId};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OnceCell};
use tracing::{debug, error, info, instrument};

use crate::format::thread_name;

/// Settled attempts keep the failure reason as text so every waiter can receive it.
type Attempt = std::result::Result<ThreadId, String>;
type InFlight = Mutex<HashMap<EndUserId, Arc<OnceCell<Attempt>>>>;

pub struct ThreadResolver {
    store: Arc<dyn CorrelationStore>,
    api: Arc<dyn MessagingApi>,
    group_id: i64,
    in_flight: InFlight,
}

impl ThreadResolver {
    pub fn new(store: Arc<dyn CorrelationStore>, api: Arc<dyn MessagingApi>, group_id: i64) -> Self {
        Self {
            store,
            api,
            group_id,
            in_flight: Mutex::new(HashMap::new()),
        }
    }

    /// Thread of `user`; creates and stores one when none exists yet.
    ///
    /// Every caller that joins an in-flight attempt receives that attempt's outcome, success or
    /// failure. The attempt is unregistered once settled, so a later event starts a fresh one.
    #[instrument(skip(self, user), fields(end_user = %user.id))]
    pub async fn resolve(&self, user: &EndUser) -> Result<ThreadId> {
        if let Some(thread) = self.store.lookup_thread(user.id).await {
            debug!(thread = %thread, "Thread found");
            return Ok(thread);
        }

        let cell = {
            let mut in_flight = self.in_flight.lock().await;
            in_flight
                .entry(user.id)
                .or_insert_with(|| Arc::new(OnceCell::new()))
                .clone()
        };

        // Set only in the caller that ran the attempt, which reports the original error.
        let mut own_error: Option<RelayError> = None;
        let own_error_slot = &mut own_error;
        let outcome = cell
            .get_or_init(|| async move {
                self.create_and_store(user).await.map_err(|e| {
                    let reason = match &e {
                        RelayError::ThreadCreation(reason) => reason.clone(),
                        other => other.to_string(),
                    };
                    *own_error_slot = Some(e);
                    reason
                })
            })
            .await
            .clone();

        {
            let mut in_flight = self.in_flight.lock().await;
            if in_flight
                .get(&user.id)
                .is_some_and(|current| Arc::ptr_eq(current, &cell))
            {
                in_flight.remove(&user.id);
            }
        }

        outcome.map_err(|reason| own_error.unwrap_or(RelayError::ThreadCreation(reason)))
    }

    async fn create_and_store(&self, user: &EndUser) -> Result<ThreadId> {
        // Another caller may have finished and left the registry between our lookup and the lock.
        if let Some(thread) = self.store.lookup_thread(user.id).await {
            return Ok(thread);
        }

        let name = thread_name(user);
        info!(name = %name, group_id = self.group_id, "Creating thread");

        let thread = self
            .api
            .create_thread(self.group_id, &name)
            .await
            .map_err(|e| {
                error!(error = %e, name = %name, "Thread creation failed");
                match e {
                    RelayError::ThreadCreation(_) => e,
                    other => RelayError::ThreadCreation(other.to_string()),
                }
            })?;

        self.store.insert(user.id, thread).await?;
        info!(thread = %thread, "Thread created");
        Ok(thread)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use correlation_store::InMemoryCorrelationStore;
    use relay_core::{Destination, SelfInfo};

    /// Answers every createThread with `thread`, or fails when `thread` is None.
    struct FixedApi {
        thread: Option<ThreadId>,
    }

    #[async_trait]
    impl MessagingApi for FixedApi {
        async fn create_thread(&self, _group_id: i64, _name: &str) -> Result<ThreadId> {
            self.thread
                .ok_or_else(|| RelayError::Api("Bad Request: not enough rights".into()))
        }

        async fn send_text(&self, _destination: &Destination, _text: &str) -> Result<()> {
            Ok(())
        }

        async fn send_photo(
            &self,
            _destination: &Destination,
            _photo_ref: &str,
            _caption: Option<&str>,
        ) -> Result<()> {
            Ok(())
        }

        async fn get_self_info(&self) -> Result<SelfInfo> {
            Ok(SelfInfo {
                username: None,
                first_name: "Relay".to_string(),
            })
        }
    }

    fn user(id: i64) -> EndUser {
        EndUser {
            id: EndUserId(id),
            username: None,
            first_name: None,
        }
    }

    fn resolver(thread: Option<ThreadId>) -> ThreadResolver {
        ThreadResolver::new(
            Arc::new(InMemoryCorrelationStore::new()),
            Arc::new(FixedApi { thread }),
            -100,
        )
    }

    #[tokio::test]
    async fn test_failed_attempt_is_unregistered() {
        let resolver = resolver(None);

        let err = resolver.resolve(&user(1)).await.unwrap_err();

        assert_eq!(
            err.to_string(),
            "Thread creation failed: API error: Bad Request: not enough rights"
        );
        assert!(resolver.in_flight.lock().await.is_empty());
    }

    #[tokio::test]
    async fn test_successful_attempt_is_unregistered() {
        let resolver = resolver(Some(ThreadId(5)));

        assert_eq!(resolver.resolve(&user(1)).await.unwrap(), ThreadId(5));
        assert!(resolver.in_flight.lock().await.is_empty());
    }
}
