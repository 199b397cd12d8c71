//! Relay configuration: Telegram connection, operator group, webhook, routing mode, logging.
//! Loaded once from env: BOT_TOKEN, GROUP_CHAT_ID, WEBHOOK_URL, PORT, LISTEN_ADDR,
//! TELEGRAM_API_URL (or TELOXIDE_API_URL), LOG_FILE, RELAY_MODE, RELAY_WELCOME_TEMPLATE,
//! RELAY_FALLBACK_LABELS.

use anyhow::{Context, Result};
use relay_router::{RouterSettings, RoutingMode};
use std::env;
use std::net::{IpAddr, SocketAddr};

const DEFAULT_PORT: u16 = 3000;
const DEFAULT_LOG_FILE: &str = "logs/topic-relay.log";

#[derive(Debug, Clone)]
pub struct RelayConfig {
    /// BOT_TOKEN
    pub bot_token: String,
    /// TELEGRAM_API_URL or TELOXIDE_API_URL
    pub telegram_api_url: Option<String>,
    /// GROUP_CHAT_ID: the operator group
    pub group_chat_id: i64,
    /// WEBHOOK_URL: public callback; unset means long polling
    pub webhook_url: Option<String>,
    pub listen_addr: IpAddr,
    pub port: u16,
    pub log_file: String,
    pub mode: RoutingMode,
    pub welcome_template: Option<String>,
    /// RELAY_FALLBACK_LABELS, `|`-separated
    pub fallback_labels: Option<Vec<String>>,
}

impl RelayConfig {
    /// Load from environment variables. `token` overrides BOT_TOKEN if provided.
    pub fn load(token: Option<String>) -> Result<Self> {
        let bot_token = match token {
            Some(t) => t,
            None => env::var("BOT_TOKEN").context("BOT_TOKEN not set")?,
        };
        let group_chat_id = env::var("GROUP_CHAT_ID")
            .context("GROUP_CHAT_ID not set")?
            .trim()
            .parse::<i64>()
            .context("GROUP_CHAT_ID must be a numeric chat id")?;
        let telegram_api_url = env::var("TELEGRAM_API_URL")
            .or_else(|_| env::var("TELOXIDE_API_URL"))
            .ok();
        let webhook_url = non_empty_var("WEBHOOK_URL");
        let listen_addr = match non_empty_var("LISTEN_ADDR") {
            Some(addr) => addr
                .parse()
                .with_context(|| format!("LISTEN_ADDR is not an IP address: {}", addr))?,
            None => IpAddr::from([0, 0, 0, 0]),
        };
        let port = match non_empty_var("PORT") {
            Some(p) => p
                .parse()
                .with_context(|| format!("PORT is not a valid port: {}", p))?,
            None => DEFAULT_PORT,
        };
        let log_file = env::var("LOG_FILE").unwrap_or_else(|_| DEFAULT_LOG_FILE.to_string());
        let mode = match non_empty_var("RELAY_MODE") {
            Some(m) => m.parse::<RoutingMode>()?,
            None => RoutingMode::default(),
        };
        let welcome_template = non_empty_var("RELAY_WELCOME_TEMPLATE");
        let fallback_labels = non_empty_var("RELAY_FALLBACK_LABELS").map(|raw| {
            raw.split('|')
                .map(|l| l.trim().to_string())
                .filter(|l| !l.is_empty())
                .collect()
        });

        Ok(Self {
            bot_token,
            telegram_api_url,
            group_chat_id,
            webhook_url,
            listen_addr,
            port,
            log_file,
            mode,
            welcome_template,
            fallback_labels,
        })
    }

    /// Validate config: URLs must parse, the webhook must be https.
    pub fn validate(&self) -> Result<()> {
        if self.bot_token.trim().is_empty() {
            anyhow::bail!("BOT_TOKEN is empty");
        }
        if let Some(ref url_str) = self.telegram_api_url {
            if reqwest::Url::parse(url_str).is_err() {
                anyhow::bail!(
                    "TELEGRAM_API_URL (or TELOXIDE_API_URL) is set but not a valid URL: {}",
                    url_str
                );
            }
        }
        if let Some(ref url_str) = self.webhook_url {
            let url = reqwest::Url::parse(url_str)
                .with_context(|| format!("WEBHOOK_URL is not a valid URL: {}", url_str))?;
            if url.scheme() != "https" {
                anyhow::bail!("WEBHOOK_URL must use https: {}", url_str);
            }
        }
        Ok(())
    }

    /// Address the webhook server binds to.
    pub fn listen_socket(&self) -> SocketAddr {
        SocketAddr::new(self.listen_addr, self.port)
    }

    pub fn router_settings(&self) -> RouterSettings {
        RouterSettings {
            operator_group_id: self.group_chat_id,
            mode: self.mode,
            welcome_template: self.welcome_template.clone(),
            fallback_labels: self.fallback_labels.clone(),
        }
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    const VARS: &[&str] = &[
        "BOT_TOKEN",
        "GROUP_CHAT_ID",
        "WEBHOOK_URL",
        "PORT",
        "LISTEN_ADDR",
        "TELEGRAM_API_URL",
        "TELOXIDE_API_URL",
        "LOG_FILE",
        "RELAY_MODE",
        "RELAY_WELCOME_TEMPLATE",
        "RELAY_FALLBACK_LABELS",
    ];

    fn clear_env() {
        for var in VARS {
            env::remove_var(var);
        }
    }

    #[test]
    #[serial]
    fn test_load_config_with_defaults() {
        clear_env();
        env::set_var("BOT_TOKEN", "test_token");
        env::set_var("GROUP_CHAT_ID", "-1001234567890");

        let config = RelayConfig::load(None).unwrap();

        assert_eq!(config.bot_token, "test_token");
        assert_eq!(config.group_chat_id, -1001234567890);
        assert!(config.webhook_url.is_none());
        assert!(config.telegram_api_url.is_none());
        assert_eq!(config.port, 3000);
        assert_eq!(config.listen_socket().to_string(), "0.0.0.0:3000");
        assert_eq!(config.log_file, "logs/topic-relay.log");
        assert_eq!(config.mode, RoutingMode::Threads);
        assert!(config.fallback_labels.is_none());
        assert!(config.validate().is_ok());
        clear_env();
    }

    #[test]
    #[serial]
    fn test_load_config_with_custom_values() {
        clear_env();
        env::set_var("BOT_TOKEN", "custom_token");
        env::set_var("GROUP_CHAT_ID", "-42");
        env::set_var("WEBHOOK_URL", "https://relay.example.com/webhook");
        env::set_var("PORT", "8443");
        env::set_var("LISTEN_ADDR", "127.0.0.1");
        env::set_var("RELAY_MODE", "pattern");
        env::set_var("RELAY_WELCOME_TEMPLATE", "Hola, soy {name}");
        env::set_var("RELAY_FALLBACK_LABELS", "Usuario:| Nombre: ||ID:");

        let config = RelayConfig::load(None).unwrap();

        assert_eq!(config.webhook_url.as_deref(), Some("https://relay.example.com/webhook"));
        assert_eq!(config.listen_socket().to_string(), "127.0.0.1:8443");
        assert_eq!(config.mode, RoutingMode::Pattern);
        assert_eq!(
            config.fallback_labels,
            Some(vec![
                "Usuario:".to_string(),
                "Nombre:".to_string(),
                "ID:".to_string()
            ])
        );
        let settings = config.router_settings();
        assert_eq!(settings.operator_group_id, -42);
        assert_eq!(settings.welcome_template.as_deref(), Some("Hola, soy {name}"));
        assert!(config.validate().is_ok());
        clear_env();
    }

    #[test]
    #[serial]
    fn test_load_config_with_override_token() {
        clear_env();
        env::set_var("BOT_TOKEN", "env_token");
        env::set_var("GROUP_CHAT_ID", "-1");

        let config = RelayConfig::load(Some("override_token".to_string())).unwrap();
        assert_eq!(config.bot_token, "override_token");
        clear_env();
    }

    #[test]
    #[serial]
    fn test_missing_or_invalid_group_fails() {
        clear_env();
        env::set_var("BOT_TOKEN", "t");
        assert!(RelayConfig::load(None).is_err());

        env::set_var("GROUP_CHAT_ID", "ops-team");
        assert!(RelayConfig::load(None).is_err());
        clear_env();
    }

    #[test]
    #[serial]
    fn test_unknown_mode_fails() {
        clear_env();
        env::set_var("BOT_TOKEN", "t");
        env::set_var("GROUP_CHAT_ID", "-1");
        env::set_var("RELAY_MODE", "carrier-pigeon");
        assert!(RelayConfig::load(None).is_err());
        clear_env();
    }

    #[test]
    #[serial]
    fn test_validate_rejects_bad_urls() {
        clear_env();
        env::set_var("BOT_TOKEN", "t");
        env::set_var("GROUP_CHAT_ID", "-1");

        env::set_var("TELEGRAM_API_URL", "not-a-valid-url");
        assert!(RelayConfig::load(None).unwrap().validate().is_err());
        env::remove_var("TELEGRAM_API_URL");

        env::set_var("WEBHOOK_URL", "http://relay.example.com/webhook");
        assert!(RelayConfig::load(None).unwrap().validate().is_err());
        clear_env();
    }
}
