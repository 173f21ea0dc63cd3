//! Raw HTTP calls to the Telegram Bot API.
//!
//! Wraps reqwest for `getMe`, `getUpdates` and `sendMessage`. Responses
//! with `ok: false` become [`RelayError::TelegramError`].

pub mod types;

use crate::config::TelegramConfig;
use crate::domain::model::SendOptions;
use crate::domain::ports::Messenger;
use crate::utils::error::{RelayError, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use std::time::Duration;

use self::types::{ApiResponse, SentMessage, Update, User};

/// Extra time on top of the long-poll timeout before reqwest gives up.
const POLL_GRACE: Duration = Duration::from_secs(10);

pub struct TelegramApi {
    client: Client,
    base_url: String,
}

impl TelegramApi {
    pub fn from_config(config: &TelegramConfig) -> Result<Self> {
        Self::with_base_url(&config.bot_token, &config.api_url)
    }

    pub fn with_base_url(bot_token: &str, base_url: &str) -> Result<Self> {
        Ok(Self {
            client: Client::builder().build()?,
            base_url: format!("{}/bot{}", base_url.trim_end_matches('/'), bot_token),
        })
    }

    async fn call<T: DeserializeOwned>(
        &self,
        method: &str,
        body: &Value,
        timeout: Option<Duration>,
    ) -> Result<T> {
        let mut request = self
            .client
            .post(format!("{}/{}", self.base_url, method))
            .json(body);
        if let Some(timeout) = timeout {
            request = request.timeout(timeout);
        }

        let api_resp: ApiResponse<T> = request.send().await?.json().await?;
        if !api_resp.ok {
            let description = api_resp.description.unwrap_or_default();
            tracing::warn!("{} failed: {}", method, description);
            return Err(RelayError::TelegramError { description });
        }

        api_resp.result.ok_or_else(|| RelayError::TelegramError {
            description: format!("{} returned no result", method),
        })
    }

    /// Identity of the bot; doubles as a token check at startup.
    pub async fn get_me(&self) -> Result<User> {
        self.call("getMe", &json!({}), None).await
    }

    /// Long-poll for new updates.
    ///
    /// `offset` should be `last_update_id + 1` to acknowledge what was
    /// already received.
    pub async fn get_updates(&self, offset: Option<i64>, timeout_secs: u64) -> Result<Vec<Update>> {
        let mut body = json!({
            "timeout": timeout_secs,
            "allowed_updates": ["message"],
        });
        if let Some(off) = offset {
            body["offset"] = json!(off);
        }

        self.call(
            "getUpdates",
            &body,
            Some(Duration::from_secs(timeout_secs) + POLL_GRACE),
        )
        .await
    }

    /// Returns the sent message's ID.
    pub async fn send(&self, chat_id: i64, text: &str, options: SendOptions) -> Result<i64> {
        let mut body = json!({
            "chat_id": chat_id,
            "text": text,
        });
        if let Some(mode) = options.parse_mode {
            body["parse_mode"] = json!(mode.as_str());
        }
        if options.disable_web_page_preview {
            body["disable_web_page_preview"] = json!(true);
        }

        tracing::debug!("sendMessage to chat_id={} ({} chars)", chat_id, text.chars().count());
        let sent: SentMessage = self.call("sendMessage", &body, None).await?;
        Ok(sent.message_id)
    }
}

#[async_trait]
impl Messenger for TelegramApi {
    async fn send_message(&self, chat_id: i64, text: &str, options: SendOptions) -> Result<()> {
        self.send(chat_id, text, options).await.map(|_| ())
    }
}
