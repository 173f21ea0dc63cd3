//! Long-polling loop for Telegram `getUpdates`.
//!
//! Every recognized command is handed to the router on its own task, so a
//! slow completion never holds up `/status` from another chat.

use crate::adapters::telegram::types::Update;
use crate::adapters::telegram::TelegramApi;
use crate::core::command::Command;
use crate::core::router::Router;
use crate::domain::ports::{Completion, Messenger, SourceControl};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinSet;

const MAX_BACKOFF_SECS: u64 = 60;
const DEFAULT_DRAIN_TIMEOUT: Duration = Duration::from_secs(10);

pub struct RelayBot<G, C, M>
where
    G: SourceControl + 'static,
    C: Completion + 'static,
    M: Messenger + 'static,
{
    api: Arc<TelegramApi>,
    router: Arc<Router<G, C, M>>,
    poll_timeout_secs: u64,
    drain_timeout: Duration,
}

impl<G, C, M> RelayBot<G, C, M>
where
    G: SourceControl + 'static,
    C: Completion + 'static,
    M: Messenger + 'static,
{
    pub fn new(api: Arc<TelegramApi>, router: Arc<Router<G, C, M>>, poll_timeout_secs: u64) -> Self {
        Self {
            api,
            router,
            poll_timeout_secs,
            drain_timeout: DEFAULT_DRAIN_TIMEOUT,
        }
    }

    /// How long `run` waits for in-flight commands after shutdown.
    pub fn with_drain_timeout(mut self, timeout: Duration) -> Self {
        self.drain_timeout = timeout;
        self
    }

    /// Poll until `shutdown` flips to `true`, then give in-flight commands
    /// up to the drain timeout to finish.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) {
        let mut offset: Option<i64> = None;
        let mut backoff_secs = 1u64;
        let mut tasks = JoinSet::new();

        tracing::info!("🤖 Telegram poller started");

        loop {
            if *shutdown.borrow() {
                break;
            }

            let updates = tokio::select! {
                result = self.api.get_updates(offset, self.poll_timeout_secs) => result,
                _ = shutdown.changed() => break,
            };

            while let Some(finished) = tasks.try_join_next() {
                log_task_result(finished);
            }

            match updates {
                Ok(updates) => {
                    backoff_secs = 1;
                    for update in updates {
                        offset = Some(update.update_id + 1);
                        self.dispatch(update, &mut tasks);
                    }
                }
                Err(e) => {
                    tracing::warn!(backoff_secs, "getUpdates failed, backing off: {}", e);
                    tokio::select! {
                        _ = tokio::time::sleep(Duration::from_secs(backoff_secs)) => {}
                        _ = shutdown.changed() => break,
                    }
                    backoff_secs = (backoff_secs * 2).min(MAX_BACKOFF_SECS);
                }
            }
        }

        self.drain(&mut tasks).await;
        tracing::info!("Telegram poller stopped");
    }

    /// Spawn a handler task onto `tasks` if `update` carries a command.
    /// Returns whether a task was spawned.
    pub fn dispatch(&self, update: Update, tasks: &mut JoinSet<()>) -> bool {
        let Some((chat_id, text)) = update
            .message
            .and_then(|m| m.text.map(|text| (m.chat.id, text)))
        else {
            return false;
        };

        let Some(command) = Command::parse(&text) else {
            tracing::debug!(chat_id, "Ignoring non-command message");
            return false;
        };

        let router = Arc::clone(&self.router);
        tasks.spawn(async move {
            router.handle(chat_id, command).await;
        });
        true
    }

    async fn drain(&self, tasks: &mut JoinSet<()>) {
        if tasks.is_empty() {
            return;
        }

        tracing::info!(pending = tasks.len(), "Waiting for in-flight commands");
        let finished = tokio::time::timeout(self.drain_timeout, async {
            while let Some(result) = tasks.join_next().await {
                log_task_result(result);
            }
        })
        .await;

        if finished.is_err() {
            tracing::warn!(pending = tasks.len(), "Abandoning unfinished commands");
            tasks.abort_all();
        }
    }
}

fn log_task_result(result: Result<(), tokio::task::JoinError>) {
    if let Err(e) = result {
        tracing::error!("Command task failed: {}", e);
    }
}
