use crate::domain::model::{
    CompletionRequest, DispatchOutcome, DispatchRequest, SendOptions, WorkflowRun,
};
use crate::utils::error::Result;
use async_trait::async_trait;
use std::sync::Arc;

/// Source-control automation: dispatch events, list runs, locate run logs.
#[async_trait]
pub trait SourceControl: Send + Sync {
    async fn dispatch(&self, request: &DispatchRequest) -> Result<DispatchOutcome>;
    async fn recent_runs(&self, count: u32) -> Result<Vec<WorkflowRun>>;
    async fn run_logs_url(&self, run_id: u64) -> Result<String>;
}

/// AI chat completion. Returns the concatenated text blocks.
#[async_trait]
pub trait Completion: Send + Sync {
    async fn complete(&self, request: CompletionRequest) -> Result<String>;
}

/// Outbound side of the chat platform.
#[async_trait]
pub trait Messenger: Send + Sync {
    async fn send_message(&self, chat_id: i64, text: &str, options: SendOptions) -> Result<()>;
}

#[async_trait]
impl<T: Messenger + ?Sized> Messenger for Arc<T> {
    async fn send_message(&self, chat_id: i64, text: &str, options: SendOptions) -> Result<()> {
        (**self).send_message(chat_id, text, options).await
    }
}
