//! Runner: builds the router and feeds it every Telegram message, via webhook or long polling.
//!
//! Each update is acknowledged as soon as it is converted; routing runs in a spawned task so a slow
//! or failing event never delays the acknowledgement or any other event.

use anyhow::{Context, Result};
use correlation_store::{CorrelationStore, InMemoryCorrelationStore};
use relay_core::{init_tracing, MessagingApi, ToInboundEvent};
use relay_router::{InboundRouter, RouteOutcome};
use std::sync::Arc;
use teloxide::prelude::*;
use teloxide::update_listeners::webhooks;
use tracing::{error, info, instrument};

use crate::adapters::TelegramMessageWrapper;
use crate::bot_adapter::TelegramApiAdapter;
use crate::config::RelayConfig;

/// teloxide Bot for `config`, honoring a custom API URL.
pub fn build_teloxide_bot(config: &RelayConfig) -> Result<teloxide::Bot> {
    let bot = teloxide::Bot::new(config.bot_token.clone());
    match config.telegram_api_url.as_deref() {
        Some(url) => {
            let url = reqwest::Url::parse(url)
                .with_context(|| format!("invalid TELEGRAM_API_URL: {}", url))?;
            Ok(bot.set_api_url(url))
        }
        None => Ok(bot),
    }
}

/// Main entry: validate config, init logging, build the router, then serve updates until shutdown.
/// `force_polling` ignores WEBHOOK_URL.
#[instrument(skip(config))]
pub async fn run_relay(config: RelayConfig, force_polling: bool) -> Result<()> {
    config.validate()?;
    init_tracing(Some(config.log_file.as_str()))?;

    info!(
        group_chat_id = config.group_chat_id,
        mode = %config.mode,
        webhook = config.webhook_url.is_some() && !force_polling,
        "Initializing relay"
    );

    let bot = build_teloxide_bot(&config)?;
    let api: Arc<dyn MessagingApi> = Arc::new(TelegramApiAdapter::new(bot.clone()));
    let store: Arc<dyn CorrelationStore> = Arc::new(InMemoryCorrelationStore::new());
    let router = Arc::new(InboundRouter::from_settings(
        &config.router_settings(),
        api,
        store,
    )?);

    match config.webhook_url.as_deref() {
        Some(url) if !force_polling => run_webhook(bot, router, &config, url).await,
        _ => run_polling(bot, router).await,
    }
}

async fn run_webhook(
    bot: teloxide::Bot,
    router: Arc<InboundRouter>,
    config: &RelayConfig,
    url: &str,
) -> Result<()> {
    let url = reqwest::Url::parse(url).with_context(|| format!("invalid WEBHOOK_URL: {}", url))?;
    let address = config.listen_socket();
    // Registers the webhook with Telegram and serves it.
    let listener = webhooks::axum(bot.clone(), webhooks::Options::new(address, url.clone()))
        .await
        .context("Failed to set up webhook")?;

    info!(address = %address, url = %url, "Relay started (webhook)");
    teloxide::repl_with_listener(
        bot,
        move |msg: Message| on_message(router.clone(), msg),
        listener,
    )
    .await;
    Ok(())
}

async fn run_polling(bot: teloxide::Bot, router: Arc<InboundRouter>) -> Result<()> {
    // Long polling only works without a registered webhook.
    bot.delete_webhook()
        .await
        .context("Failed to delete webhook")?;

    info!("Relay started (long polling)");
    teloxide::repl(bot, move |msg: Message| on_message(router.clone(), msg)).await;
    Ok(())
}

async fn on_message(router: Arc<InboundRouter>, msg: Message) -> ResponseResult<()> {
    let event = TelegramMessageWrapper(&msg).to_inbound();
    info!(
        chat_id = event.chat_id,
        message_id = event.message_id,
        sender = ?event.sender.as_ref().map(|s| s.id),
        thread = ?event.thread_id,
        has_text = event.text.is_some(),
        has_photo = event.has_photo(),
        "Received message"
    );

    tokio::spawn(async move {
        match router.route(&event).await {
            Ok(RouteOutcome::Delivered { sends }) => {
                info!(chat_id = event.chat_id, message_id = event.message_id, sends, "Event routed");
            }
            Ok(RouteOutcome::Ignored(reason)) => {
                info!(chat_id = event.chat_id, message_id = event.message_id, reason = ?reason, "Event ignored");
            }
            Err(e) => {
                error!(
                    error = %e,
                    chat_id = event.chat_id,
                    message_id = event.message_id,
                    "Event routing failed"
                );
            }
        }
    });

    respond(())
}
