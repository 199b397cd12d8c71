//! # relay-telegram
//!
//! Telegram transport for the relay: adapters from teloxide messages to [`relay_core::InboundEvent`],
//! a [`relay_core::MessagingApi`] implementation over teloxide, config from env, and the
//! webhook / long-polling runner. Routing decisions live in relay-router.

mod adapters;
mod bot_adapter;
mod config;
mod runner;

pub use adapters::TelegramMessageWrapper;
pub use bot_adapter::TelegramApiAdapter;
pub use config::RelayConfig;
pub use runner::{build_teloxide_bot, run_relay};
