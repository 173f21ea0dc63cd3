#![allow(dead_code)]

use async_trait::async_trait;
use chat_relay::domain::model::SendOptions;
use chat_relay::domain::ports::Messenger;
use chat_relay::{RelayConfig, Result};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sent {
    pub chat_id: i64,
    pub text: String,
    pub options: SendOptions,
}

/// Messenger that keeps every outgoing message in order.
#[derive(Clone, Default)]
pub struct RecordingMessenger {
    sent: Arc<Mutex<Vec<Sent>>>,
}

impl RecordingMessenger {
    pub async fn sent(&self) -> Vec<Sent> {
        self.sent.lock().await.clone()
    }

    pub async fn texts(&self) -> Vec<String> {
        self.sent().await.into_iter().map(|s| s.text).collect()
    }
}

#[async_trait]
impl Messenger for RecordingMessenger {
    async fn send_message(&self, chat_id: i64, text: &str, options: SendOptions) -> Result<()> {
        self.sent.lock().await.push(Sent {
            chat_id,
            text: text.to_string(),
            options,
        });
        Ok(())
    }
}

/// Config pointing every service at `base_url`.
pub fn config_for(base_url: &str, extra: &[(&str, &str)]) -> RelayConfig {
    let mut vars: HashMap<String, String> = [
        ("TELEGRAM_BOT_TOKEN", "123:test"),
        ("GH_TOKEN", "ghp_test"),
        ("GITHUB_REPO", "octo/automation"),
        ("ZAI_API_KEY", "sk-test"),
    ]
    .iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect();
    vars.insert("GITHUB_API_URL".to_string(), base_url.to_string());
    vars.insert("TELEGRAM_API_URL".to_string(), base_url.to_string());
    vars.insert("ZAI_API_URL".to_string(), format!("{}/v1/messages", base_url));
    for (k, v) in extra {
        vars.insert(k.to_string(), v.to_string());
    }

    RelayConfig::from_lookup(|name| vars.get(name).cloned()).expect("test config")
}
