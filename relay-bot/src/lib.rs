//! # relay-bot
//!
//! CLI foundation for the `topic-relay` binary: argument parsing.

pub mod cli;

pub use cli::{Cli, Commands};
pub use relay_telegram::RelayConfig;
