use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Payload of a `repository_dispatch` event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DispatchRequest {
    pub org: String,
    pub repo: String,
    pub issue: String,
    pub show_logs: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    Accepted,
    Rejected { status: u16, body: String },
}

/// One workflow run summary from the Actions API.
#[derive(Debug, Clone, Deserialize)]
pub struct WorkflowRun {
    pub id: u64,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub conclusion: Option<String>,
    pub created_at: DateTime<Utc>,
    pub html_url: String,
}

impl WorkflowRun {
    /// Conclusion once finished, otherwise the live status.
    pub fn state(&self) -> &str {
        self.conclusion
            .as_deref()
            .or(self.status.as_deref())
            .unwrap_or("unknown")
    }

    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("workflow")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatTurn {
    pub role: Role,
    pub content: String,
}

impl ChatTurn {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompletionRequest {
    pub messages: Vec<ChatTurn>,
    pub system: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseMode {
    Markdown,
}

impl ParseMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ParseMode::Markdown => "Markdown",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SendOptions {
    pub parse_mode: Option<ParseMode>,
    pub disable_web_page_preview: bool,
}

impl SendOptions {
    pub fn plain() -> Self {
        Self::default()
    }

    pub fn markdown() -> Self {
        Self {
            parse_mode: Some(ParseMode::Markdown),
            disable_web_page_preview: false,
        }
    }

    pub fn without_preview(mut self) -> Self {
        self.disable_web_page_preview = true;
        self
    }
}
