//! CLI parser.

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "topic-relay")]
#[command(about = "Relay private Telegram chats into an operator group", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the relay (config from env; token can override BOT_TOKEN).
    Run {
        #[arg(short, long)]
        token: Option<String>,
        /// Use long polling even when WEBHOOK_URL is set.
        #[arg(long)]
        polling: bool,
    },
}
