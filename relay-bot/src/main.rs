//! topic-relay: forwards private chats into per-user operator threads and routes replies back.

use anyhow::Result;
use clap::Parser;
use relay_bot::{Cli, Commands, RelayConfig};
use relay_telegram::run_relay;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run { token, polling } => {
            let config = RelayConfig::load(token)?;
            run_relay(config, polling).await
        }
    }
}
