use crate::config::TelegramConfig as TelegramSettings;
use crate::plugins::traits::{DeliveryError, NotificationResult, NotifierPlugin};
use crate::utils::error::{AppError, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct TelegramConfig {
    pub api_base_url: String,
    pub bot_token: String,
    pub chat_id: String,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
}

impl TelegramConfig {
    pub fn from_settings(settings: &TelegramSettings) -> Result<Self> {
        let bot_token = settings.bot_token.clone().ok_or_else(|| AppError::Parse {
            message: "Missing Telegram bot token".to_string(),
        })?;
        let chat_id = settings.chat_id.clone().ok_or_else(|| AppError::Parse {
            message: "Missing Telegram chat id".to_string(),
        })?;

        Ok(TelegramConfig {
            api_base_url: settings.api_base_url.trim_end_matches('/').to_string(),
            bot_token,
            chat_id,
            connect_timeout: Duration::from_secs(settings.connect_timeout),
            request_timeout: Duration::from_secs(settings.request_timeout),
        })
    }
}

/// Bot API response envelope.
#[derive(Debug, Deserialize)]
struct ApiResponse {
    ok: bool,
    description: Option<String>,
    result: Option<SentMessage>,
}

#[derive(Debug, Deserialize)]
struct SentMessage {
    message_id: i64,
}

pub struct TelegramNotifier {
    client: Client,
    config: TelegramConfig,
}

impl TelegramNotifier {
    pub fn new(config: TelegramConfig) -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(config.connect_timeout)
            .timeout(config.request_timeout)
            .build()?;

        Ok(TelegramNotifier { client, config })
    }

    fn send_message_url(&self) -> String {
        format!("{}/bot{}/sendMessage", self.config.api_base_url, self.config.bot_token)
    }

    fn create_payload(&self, text: &str) -> serde_json::Value {
        json!({
            "chat_id": self.config.chat_id,
            "text": text,
        })
    }
}

#[async_trait]
impl NotifierPlugin for TelegramNotifier {
    fn name(&self) -> &'static str {
        "Telegram"
    }

    async fn send(&self, text: &str) -> std::result::Result<NotificationResult, DeliveryError> {
        let response = self
            .client
            .post(self.send_message_url())
            .json(&self.create_payload(text))
            .send()
            .await?;

        let status = response.status();
        let body: ApiResponse = match response.json().await {
            Ok(body) => body,
            Err(e) if status.is_success() => return Err(e.into()),
            Err(_) => {
                return Err(DeliveryError::Rejected {
                    status: status.as_u16(),
                    description: status.to_string(),
                });
            }
        };

        if !status.is_success() || !body.ok {
            return Err(DeliveryError::Rejected {
                status: status.as_u16(),
                description: body.description.unwrap_or_else(|| status.to_string()),
            });
        }

        Ok(NotificationResult {
            message_id: body.result.map(|m| m.message_id.to_string()),
        })
    }
}
