//! # Correlation store
//!
//! Owns the bidirectional mapping between end users and their threads in the operator group.
//!
//! ## InMemoryCorrelationStore
//!
//! Volatile, process-lifetime storage; the mapping is lost on restart.
//!
//! ## Example
//!
//! ```rust
//! use correlation_store::{CorrelationStore, InMemoryCorrelationStore};
//! use relay_core::{EndUserId, ThreadId};
//!
//! #[tokio::main]
//! async fn main() -> relay_core::Result<()> {
//!     let store = InMemoryCorrelationStore::new();
//!     store.insert(EndUserId(42), ThreadId(7)).await?;
//!
//!     assert_eq!(store.lookup_thread(EndUserId(42)).await, Some(ThreadId(7)));
//!     assert_eq!(store.lookup_end_user(ThreadId(7)).await, Some(EndUserId(42)));
//!     Ok(())
//! }
//! ```

mod inmemory;
mod store;

pub use inmemory::InMemoryCorrelationStore;
pub use store::CorrelationStore;
