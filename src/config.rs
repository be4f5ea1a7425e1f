use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::env;
use url::Url;

pub const DEFAULT_LISTING_URL: &str = "https://www.vermietungen.stadt-zuerich.ch/publication/apartment/";
pub const DEFAULT_BASE_URL: &str = "https://www.vermietungen.stadt-zuerich.ch";
pub const DEFAULT_TELEGRAM_API: &str = "https://api.telegram.org";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub source: SourceConfig,
    pub database: DatabaseConfig,
    pub telegram: TelegramConfig,
    pub retry: RetryConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    pub listing_url: String,
    /// Origin that relative application links are joined onto.
    pub base_url: String,
    pub user_agent: String,
    pub request_timeout: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelegramConfig {
    pub bot_token: Option<String>,
    pub chat_id: Option<String>,
    pub api_base_url: String,
    pub connect_timeout: u64,
    pub request_timeout: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    pub max_attempts: usize,
    pub delay_ms: u64,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let s = Config::builder()
            .set_default("source.listing_url", DEFAULT_LISTING_URL)?
            .set_default("source.base_url", DEFAULT_BASE_URL)?
            .set_default("source.user_agent", concat!("stadtwohnung-watcher/", env!("CARGO_PKG_VERSION")))?
            .set_default("source.request_timeout", 30)?
            .set_default("database.path", "apartments.db")?
            .set_default("telegram.api_base_url", DEFAULT_TELEGRAM_API)?
            .set_default("telegram.connect_timeout", 30)?
            .set_default("telegram.request_timeout", 30)?
            .set_default("retry.max_attempts", 3)?
            .set_default("retry.delay_ms", 5000)?
            .add_source(File::with_name("config/default").required(false))
            // Add local config (ignored by git)
            .add_source(File::with_name("config/local").required(false))
            // Add environment variables with prefix "WATCHER__"
            .add_source(Environment::with_prefix("WATCHER").prefix_separator("__").separator("__"))
            .build()?;

        let mut config: AppConfig = s.try_deserialize()?;
        config.apply_env_fallback(|key| env::var(key).ok());

        config.validate()?;
        Ok(config)
    }

    /// Fills the Telegram credentials from `TELEGRAM_BOT_TOKEN` and
    /// `TELEGRAM_CHAT_ID` when no `WATCHER__TELEGRAM__*` value was given.
    pub fn apply_env_fallback(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if self.telegram.bot_token.is_none() {
            self.telegram.bot_token = lookup("TELEGRAM_BOT_TOKEN");
        }
        if self.telegram.chat_id.is_none() {
            self.telegram.chat_id = lookup("TELEGRAM_CHAT_ID");
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if Url::parse(&self.source.listing_url).is_err() {
            return Err(ConfigError::Message("Invalid listing URL format".into()));
        }

        if Url::parse(&self.source.base_url).is_err() {
            return Err(ConfigError::Message("Invalid base URL format".into()));
        }

        if self.source.request_timeout == 0 {
            return Err(ConfigError::Message("Source request_timeout must be greater than 0".into()));
        }

        if self.database.path.trim().is_empty() {
            return Err(ConfigError::Message("Database path must not be empty".into()));
        }

        if is_blank(&self.telegram.bot_token) {
            return Err(ConfigError::Message("TELEGRAM_BOT_TOKEN is not set".into()));
        }

        if is_blank(&self.telegram.chat_id) {
            return Err(ConfigError::Message("TELEGRAM_CHAT_ID is not set".into()));
        }

        if Url::parse(&self.telegram.api_base_url).is_err() {
            return Err(ConfigError::Message("Invalid Telegram API URL format".into()));
        }

        if self.retry.max_attempts == 0 {
            return Err(ConfigError::Message("Retry max_attempts must be greater than 0".into()));
        }

        Ok(())
    }
}

fn is_blank(value: &Option<String>) -> bool {
    value.as_deref().map(str::trim).map_or(true, str::is_empty)
}
