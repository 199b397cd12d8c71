//! # relay-router
//!
//! Decides, for every inbound event, where it must be delivered.
//!
//! Private messages from end users go to the user's thread in the operator group (created on
//! first contact by [`ThreadResolver`]); operator messages in a thread go back to the user that
//! owns it. Deployments without threads use [`PatternBased`] routing instead, which embeds the
//! user id in a header and recovers it from the replied-to message.

pub mod extractor;
pub mod format;
pub mod forwarder;
pub mod resolver;
pub mod router;
pub mod strategy;
pub mod welcome;

pub use extractor::IdentityExtractor;
pub use format::{tagged_body, thread_name, ForwardLabels, CUSTOMER_PLACEHOLDER};
pub use forwarder::MessageForwarder;
pub use resolver::ThreadResolver;
pub use router::{
    normalize_body, IgnoreReason, InboundRouter, MediaPlaceholder, RouteOutcome, RouterSettings,
};
pub use strategy::{
    PatternBased, Placement, ReplyTarget, ReplyTargetResolver, RoutingMode, ThreadBased,
};
pub use welcome::{WelcomeGreeter, DEFAULT_WELCOME_TEMPLATE, FALLBACK_BOT_NAME};
