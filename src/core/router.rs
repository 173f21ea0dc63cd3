use crate::config::RelayConfig;
use crate::core::auth::AllowList;
use crate::core::chunk::{split_message, MAX_MESSAGE_UNITS};
use crate::core::command::Command;
use crate::core::{prompts, replies};
use crate::domain::model::{DispatchOutcome, DispatchRequest, SendOptions};
use crate::domain::ports::{Completion, Messenger, SourceControl};
use crate::utils::error::Result;

pub const STATUS_RUN_COUNT: u32 = 5;

/// Dispatches parsed commands to their handlers.
///
/// Holds no mutable state, so one `Arc<Router>` is shared by every command
/// task. Each call to [`Router::handle`] is its own error boundary.
pub struct Router<G: SourceControl, C: Completion, M: Messenger> {
    allow_list: AllowList,
    source_control: G,
    completion: C,
    messenger: M,
}

impl<G: SourceControl, C: Completion, M: Messenger> Router<G, C, M> {
    pub fn new(config: &RelayConfig, source_control: G, completion: C, messenger: M) -> Self {
        Self::with_allow_list(
            config.allowed_chat_ids.clone(),
            source_control,
            completion,
            messenger,
        )
    }

    pub fn with_allow_list(
        allow_list: AllowList,
        source_control: G,
        completion: C,
        messenger: M,
    ) -> Self {
        Self {
            allow_list,
            source_control,
            completion,
            messenger,
        }
    }

    /// Parse and run `text`. Returns `false` when the text is not a command.
    pub async fn handle_text(&self, chat_id: i64, text: &str) -> bool {
        match Command::parse(text) {
            Some(command) => {
                self.handle(chat_id, command).await;
                true
            }
            None => false,
        }
    }

    /// Run one command. Failures end up as a single error reply in the chat.
    pub async fn handle(&self, chat_id: i64, command: Command) {
        let name = command.name();

        if !self.allow_list.is_authorized(chat_id) {
            tracing::warn!(chat_id, command = name, "Rejected command from unauthorized chat");
            self.notify(chat_id, replies::UNAUTHORIZED, SendOptions::plain())
                .await;
            return;
        }

        tracing::info!(chat_id, command = name, "Handling command");

        if let Err(e) = self.execute(chat_id, command).await {
            tracing::error!(
                chat_id,
                command = name,
                category = ?e.category(),
                "❌ Command failed: {}",
                e
            );
            self.notify(chat_id, &replies::error(&e), SendOptions::plain())
                .await;
        }
    }

    async fn execute(&self, chat_id: i64, command: Command) -> Result<()> {
        match command {
            Command::Contribute {
                org,
                repo,
                issue,
                show_logs,
            } => {
                self.contribute(
                    chat_id,
                    DispatchRequest {
                        org,
                        repo,
                        issue,
                        show_logs,
                    },
                )
                .await
            }
            Command::Enhance { prompt } => self.enhance(chat_id, &prompt).await,
            Command::Ask { question } => self.ask(chat_id, &question).await,
            Command::Status => self.status(chat_id).await,
            Command::Logs { run_id } => self.logs(chat_id, run_id).await,
            Command::Help => {
                self.messenger
                    .send_message(chat_id, replies::HELP, SendOptions::markdown())
                    .await
            }
        }
    }

    async fn contribute(&self, chat_id: i64, request: DispatchRequest) -> Result<()> {
        let notice =
            replies::contribute_started(&request.org, &request.repo, &request.issue, request.show_logs);
        self.notify(chat_id, &notice, SendOptions::markdown()).await;

        let reply = match self.source_control.dispatch(&request).await? {
            DispatchOutcome::Accepted => {
                tracing::info!(
                    chat_id,
                    org = %request.org,
                    repo = %request.repo,
                    show_logs = request.show_logs,
                    "✅ Workflow dispatched"
                );
                replies::dispatch_accepted(request.show_logs).to_string()
            }
            DispatchOutcome::Rejected { status, body } => {
                tracing::warn!(chat_id, status, "Workflow dispatch rejected");
                replies::dispatch_rejected(status, &body)
            }
        };

        self.messenger
            .send_message(chat_id, &reply, SendOptions::plain())
            .await
    }

    async fn enhance(&self, chat_id: i64, prompt: &str) -> Result<()> {
        self.notify(chat_id, replies::ENHANCING, SendOptions::plain())
            .await;
        let enhanced = self
            .completion
            .complete(prompts::enhance_request(prompt))
            .await?;
        self.send_long(chat_id, &replies::enhanced(&enhanced), SendOptions::plain())
            .await
    }

    async fn ask(&self, chat_id: i64, question: &str) -> Result<()> {
        self.notify(chat_id, replies::THINKING, SendOptions::plain())
            .await;
        let answer = self
            .completion
            .complete(prompts::ask_request(question))
            .await?;
        self.send_long(chat_id, replies::non_empty(&answer), SendOptions::plain())
            .await
    }

    async fn status(&self, chat_id: i64) -> Result<()> {
        let runs = self.source_control.recent_runs(STATUS_RUN_COUNT).await?;
        if runs.is_empty() {
            return self
                .messenger
                .send_message(chat_id, replies::NO_RUNS, SendOptions::plain())
                .await;
        }

        self.messenger
            .send_message(
                chat_id,
                &replies::run_summary(&runs),
                SendOptions::markdown().without_preview(),
            )
            .await
    }

    async fn logs(&self, chat_id: i64, run_id: Option<u64>) -> Result<()> {
        let run_id = match run_id {
            Some(id) => id,
            None => match self.source_control.recent_runs(1).await?.first() {
                Some(run) => run.id,
                None => {
                    return self
                        .messenger
                        .send_message(chat_id, replies::NO_RUNS, SendOptions::plain())
                        .await;
                }
            },
        };

        self.notify(chat_id, &replies::fetching_logs(run_id), SendOptions::plain())
            .await;
        let url = self.source_control.run_logs_url(run_id).await?;
        self.messenger
            .send_message(chat_id, &replies::logs_link(&url), SendOptions::markdown())
            .await
    }

    /// Send `text` in order, one chunk at a time.
    async fn send_long(&self, chat_id: i64, text: &str, options: SendOptions) -> Result<()> {
        let chunks = split_message(text, MAX_MESSAGE_UNITS);
        if chunks.len() > 1 {
            tracing::debug!(chat_id, chunks = chunks.len(), "Splitting long reply");
        }
        for chunk in chunks {
            self.messenger.send_message(chat_id, chunk, options).await?;
        }
        Ok(())
    }

    /// Best-effort send: a failure is logged and the command carries on.
    async fn notify(&self, chat_id: i64, text: &str, options: SendOptions) {
        if let Err(e) = self.messenger.send_message(chat_id, text, options).await {
            tracing::warn!(chat_id, "Failed to deliver message: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{CompletionRequest, WorkflowRun};
    use crate::utils::error::RelayError;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use tokio::sync::Mutex;

    #[derive(Clone, Default)]
    struct RecordingMessenger {
        sent: Arc<Mutex<Vec<String>>>,
        fail_markdown: bool,
    }

    impl RecordingMessenger {
        async fn texts(&self) -> Vec<String> {
            self.sent.lock().await.clone()
        }
    }

    #[async_trait]
    impl Messenger for RecordingMessenger {
        async fn send_message(&self, _chat_id: i64, text: &str, options: SendOptions) -> Result<()> {
            if self.fail_markdown && options.parse_mode.is_some() {
                return Err(RelayError::TelegramError {
                    description: "Bad Request: can't parse entities".to_string(),
                });
            }
            self.sent.lock().await.push(text.to_string());
            Ok(())
        }
    }

    #[derive(Default)]
    struct StubSourceControl {
        runs: Vec<WorkflowRun>,
        dispatches: AtomicUsize,
    }

    #[async_trait]
    impl SourceControl for StubSourceControl {
        async fn dispatch(&self, _request: &DispatchRequest) -> Result<DispatchOutcome> {
            self.dispatches.fetch_add(1, Ordering::SeqCst);
            Ok(DispatchOutcome::Accepted)
        }

        async fn recent_runs(&self, count: u32) -> Result<Vec<WorkflowRun>> {
            Ok(self.runs.iter().take(count as usize).cloned().collect())
        }

        async fn run_logs_url(&self, run_id: u64) -> Result<String> {
            Ok(format!("https://logs.example.com/{}", run_id))
        }
    }

    struct FixedCompletion(std::result::Result<String, &'static str>);

    #[async_trait]
    impl Completion for FixedCompletion {
        async fn complete(&self, _request: CompletionRequest) -> Result<String> {
            match &self.0 {
                Ok(text) => Ok(text.clone()),
                Err(setting) => Err(RelayError::NotConfigured { setting: *setting }),
            }
        }
    }

    fn router(
        allow: AllowList,
        source: StubSourceControl,
        answer: std::result::Result<String, &'static str>,
        messenger: RecordingMessenger,
    ) -> Router<StubSourceControl, FixedCompletion, RecordingMessenger> {
        Router::with_allow_list(allow, source, FixedCompletion(answer), messenger)
    }

    #[tokio::test]
    async fn unauthorized_chat_gets_one_denial_and_no_calls() {
        let messenger = RecordingMessenger::default();
        let router = router(
            AllowList::new([111, 222]),
            StubSourceControl::default(),
            Ok("unused".into()),
            messenger.clone(),
        );

        assert!(router.handle_text(333, "/contribute octo widgets fix it").await);

        assert_eq!(messenger.texts().await, vec![replies::UNAUTHORIZED.to_string()]);
        assert_eq!(router.source_control.dispatches.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn help_is_gated_too() {
        let messenger = RecordingMessenger::default();
        let router = router(
            AllowList::new([111]),
            StubSourceControl::default(),
            Ok(String::new()),
            messenger.clone(),
        );

        router.handle(5, Command::Help).await;
        router.handle(111, Command::Help).await;

        assert_eq!(
            messenger.texts().await,
            vec![replies::UNAUTHORIZED.to_string(), replies::HELP.to_string()]
        );
    }

    #[tokio::test]
    async fn unrecognized_text_is_ignored() {
        let messenger = RecordingMessenger::default();
        let router = router(
            AllowList::default(),
            StubSourceControl::default(),
            Ok(String::new()),
            messenger.clone(),
        );

        assert!(!router.handle_text(1, "good morning").await);
        assert!(!router.handle_text(1, "/deploy prod").await);
        assert!(messenger.texts().await.is_empty());
    }

    #[tokio::test]
    async fn long_answers_are_chunked_in_order() {
        let answer: String = ["a", "b", "c"]
            .iter()
            .zip([4000, 4000, 1000])
            .map(|(c, n)| c.repeat(n))
            .collect();
        let messenger = RecordingMessenger::default();
        let router = router(
            AllowList::default(),
            StubSourceControl::default(),
            Ok(answer),
            messenger.clone(),
        );

        router
            .handle(1, Command::Ask { question: "long?".into() })
            .await;

        let sent = messenger.texts().await;
        assert_eq!(sent[0], replies::THINKING);
        assert_eq!(sent[1..].len(), 3);
        assert_eq!(sent[1], "a".repeat(4000));
        assert_eq!(sent[2], "b".repeat(4000));
        assert_eq!(sent[3], "c".repeat(1000));
    }

    #[tokio::test]
    async fn answer_at_limit_is_one_message() {
        let messenger = RecordingMessenger::default();
        let router = router(
            AllowList::default(),
            StubSourceControl::default(),
            Ok("z".repeat(MAX_MESSAGE_UNITS)),
            messenger.clone(),
        );

        router
            .handle(1, Command::Ask { question: "q".into() })
            .await;

        let sent = messenger.texts().await;
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[1].len(), MAX_MESSAGE_UNITS);
    }

    #[tokio::test]
    async fn missing_ai_key_is_reported_once() {
        let messenger = RecordingMessenger::default();
        let router = router(
            AllowList::default(),
            StubSourceControl::default(),
            Err("ZAI_API_KEY"),
            messenger.clone(),
        );

        router
            .handle(1, Command::Enhance { prompt: "dark mode".into() })
            .await;

        let sent = messenger.texts().await;
        assert_eq!(
            sent,
            vec![
                replies::ENHANCING.to_string(),
                "❌ Error: ZAI_API_KEY is not configured".to_string()
            ]
        );
    }

    #[tokio::test]
    async fn failed_notice_does_not_stop_dispatch() {
        let messenger = RecordingMessenger {
            fail_markdown: true,
            ..Default::default()
        };
        let router = router(
            AllowList::default(),
            StubSourceControl::default(),
            Ok(String::new()),
            messenger.clone(),
        );

        router
            .handle_text(1, "/contribute octo widgets fix *unbalanced markdown")
            .await;

        assert_eq!(router.source_control.dispatches.load(Ordering::SeqCst), 1);
        assert_eq!(
            messenger.texts().await,
            vec![replies::dispatch_accepted(false).to_string()]
        );
    }

    #[tokio::test]
    async fn logs_without_runs_reports_none() {
        let messenger = RecordingMessenger::default();
        let router = router(
            AllowList::default(),
            StubSourceControl::default(),
            Ok(String::new()),
            messenger.clone(),
        );

        router.handle(1, Command::Logs { run_id: None }).await;

        assert_eq!(messenger.texts().await, vec![replies::NO_RUNS.to_string()]);
    }
}
