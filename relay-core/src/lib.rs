//! # relay-core
//!
//! Core types for the topic relay: [`EndUser`], [`InboundEvent`], [`Destination`], the
//! [`MessagingApi`] contract, the [`RelayError`] taxonomy, and tracing initialization.
//! Transport-agnostic; used by correlation-store, relay-router and relay-telegram.

pub mod api;
pub mod error;
pub mod logger;
pub mod types;

pub use api::{MessagingApi, SelfInfo};
pub use error::{RelayError, Result};
pub use logger::init_tracing;
pub use types::{
    ChatKind, Destination, EndUser, EndUserId, InboundEvent, PhotoVariant, ReplyContext,
    RouteClass, Sender, ThreadId, ToInboundEvent,
};
