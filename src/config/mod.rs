pub mod cli;

use crate::core::auth::AllowList;
use crate::utils::error::{RelayError, Result};
use crate::utils::validation::{
    validate_non_empty_string, validate_range, validate_repository, validate_secret, validate_url,
    Validate,
};
use std::time::Duration;

pub const DEFAULT_EVENT_TYPE: &str = "slack-trigger";
pub const DEFAULT_COMPLETION_URL: &str = "https://api.z.ai/api/anthropic/v1/messages";
pub const DEFAULT_COMPLETION_MODEL: &str = "claude-opus-4-5-20251101";
pub const DEFAULT_GITHUB_API_URL: &str = "https://api.github.com";
pub const DEFAULT_TELEGRAM_API_URL: &str = "https://api.telegram.org";
pub const DEFAULT_POLL_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_MAX_TOKENS: u32 = 4096;
pub const COMPLETION_TIMEOUT: Duration = Duration::from_secs(120);

#[derive(Debug, Clone)]
pub struct TelegramConfig {
    pub bot_token: String,
    pub api_url: String,
    pub poll_timeout_secs: u64,
}

#[derive(Debug, Clone)]
pub struct GitHubConfig {
    pub token: String,
    /// `owner/name` of the repository hosting the automation workflow.
    pub repository: String,
    pub event_type: String,
    pub api_url: String,
}

#[derive(Debug, Clone)]
pub struct CompletionConfig {
    pub api_url: String,
    /// `None` leaves `/enhance` and `/ask` answering with a configuration error.
    pub api_key: Option<String>,
    pub model: String,
    pub max_tokens: u32,
    pub timeout: Duration,
}

/// Immutable process configuration, read once at startup.
#[derive(Debug, Clone)]
pub struct RelayConfig {
    pub telegram: TelegramConfig,
    pub allowed_chat_ids: AllowList,
    pub github: GitHubConfig,
    pub completion: CompletionConfig,
}

impl RelayConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from any variable source. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        let require = |name: &str| {
            get(name).ok_or_else(|| RelayError::MissingConfigError {
                field: name.to_string(),
            })
        };

        let poll_timeout_secs = match get("POLL_TIMEOUT_SECS") {
            Some(raw) => raw
                .trim()
                .parse()
                .map_err(|_| RelayError::InvalidConfigValueError {
                    field: "POLL_TIMEOUT_SECS".to_string(),
                    value: raw.clone(),
                    reason: "Expected a whole number of seconds".to_string(),
                })?,
            None => DEFAULT_POLL_TIMEOUT_SECS,
        };

        Ok(Self {
            telegram: TelegramConfig {
                bot_token: require("TELEGRAM_BOT_TOKEN")?,
                api_url: get("TELEGRAM_API_URL")
                    .unwrap_or_else(|| DEFAULT_TELEGRAM_API_URL.to_string()),
                poll_timeout_secs,
            },
            allowed_chat_ids: get("ALLOWED_CHAT_IDS")
                .map(|raw| AllowList::parse(&raw))
                .unwrap_or_default(),
            github: GitHubConfig {
                token: require("GH_TOKEN")?,
                repository: require("GITHUB_REPO")?,
                event_type: get("EVENT_TYPE").unwrap_or_else(|| DEFAULT_EVENT_TYPE.to_string()),
                api_url: get("GITHUB_API_URL")
                    .unwrap_or_else(|| DEFAULT_GITHUB_API_URL.to_string()),
            },
            completion: CompletionConfig {
                api_url: get("ZAI_API_URL").unwrap_or_else(|| DEFAULT_COMPLETION_URL.to_string()),
                api_key: get("ZAI_API_KEY"),
                model: get("ZAI_MODEL").unwrap_or_else(|| DEFAULT_COMPLETION_MODEL.to_string()),
                max_tokens: DEFAULT_MAX_TOKENS,
                timeout: COMPLETION_TIMEOUT,
            },
        })
    }

    pub fn completion_enabled(&self) -> bool {
        self.completion.api_key.is_some()
    }
}

impl Validate for RelayConfig {
    fn validate(&self) -> Result<()> {
        validate_secret("TELEGRAM_BOT_TOKEN", &self.telegram.bot_token)?;
        validate_url("TELEGRAM_API_URL", &self.telegram.api_url)?;
        validate_range("POLL_TIMEOUT_SECS", self.telegram.poll_timeout_secs, 1, 60)?;

        validate_secret("GH_TOKEN", &self.github.token)?;
        validate_repository("GITHUB_REPO", &self.github.repository)?;
        validate_non_empty_string("EVENT_TYPE", &self.github.event_type)?;
        validate_url("GITHUB_API_URL", &self.github.api_url)?;

        validate_url("ZAI_API_URL", &self.completion.api_url)?;
        validate_non_empty_string("ZAI_MODEL", &self.completion.model)?;
        if let Some(key) = &self.completion.api_key {
            validate_secret("ZAI_API_KEY", key)?;
        }

        tracing::debug!("Configuration validation passed");
        Ok(())
    }
}
