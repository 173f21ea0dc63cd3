//! Reply texts sent back to the chat.

use crate::domain::model::WorkflowRun;
use crate::utils::error::RelayError;

pub const UNAUTHORIZED: &str = "⛔ Unauthorized.";
pub const NO_RUNS: &str = "📭 No runs found.";
pub const THINKING: &str = "🤔 Thinking...";
pub const ENHANCING: &str = "🔄 Enhancing your prompt...";
pub const EMPTY_ANSWER: &str = "(empty response)";

pub const HELP: &str = "🤖 *Workflow Relay Bot*

*Workflow Commands:*
`/contribute <org> <repo> <issue>`
Trigger a contribution workflow

`/contribute_logs <org> <repo> <issue>`
Same, with agent logs enabled

`/status`
Show the last 5 workflow runs

`/logs [run_id]`
Get a logs download link

*AI Commands:*
`/enhance <short prompt>`
Turn a short prompt into a detailed, descriptive one

`/ask <question>`
Ask any question

*Examples:*
`/contribute facebook react Fix useEffect cleanup bug`
`/enhance add dark mode`
`/ask How do I set up a Kubernetes ingress controller?`";

/// Escape the characters legacy Telegram Markdown treats as entity markers.
pub fn escape_markdown(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        if matches!(ch, '_' | '*' | '`' | '[') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

pub fn contribute_started(org: &str, repo: &str, issue: &str, show_logs: bool) -> String {
    let target = escape_markdown(&format!("{}/{}", org, repo));
    if show_logs {
        format!("🚀 Triggering contribution (with logs) to *{}*...", target)
    } else {
        format!(
            "🚀 Triggering contribution to *{}*...\n📋 Issue: {}",
            target,
            escape_markdown(issue)
        )
    }
}

pub fn dispatch_accepted(show_logs: bool) -> &'static str {
    if show_logs {
        "✅ Workflow triggered with logs enabled!"
    } else {
        "✅ Workflow triggered successfully!"
    }
}

pub fn dispatch_rejected(status: u16, body: &str) -> String {
    format!("❌ GitHub API error ({}): {}", status, body)
}

pub fn enhanced(text: &str) -> String {
    format!("✨ Enhanced Prompt:\n\n{}", non_empty(text))
}

pub fn non_empty(text: &str) -> &str {
    if text.trim().is_empty() {
        EMPTY_ANSWER
    } else {
        text
    }
}

pub fn error(err: &RelayError) -> String {
    format!("❌ Error: {}", err.user_friendly_message())
}

pub fn fetching_logs(run_id: u64) -> String {
    format!("📥 Fetching logs for run #{}...", run_id)
}

pub fn logs_link(url: &str) -> String {
    format!("📄 [Download Logs]({})", url)
}

fn state_emoji(state: &str) -> &'static str {
    match state {
        "success" | "completed" => "✅",
        "in_progress" => "🔄",
        "queued" | "waiting" | "pending" => "⏳",
        "failure" | "timed_out" | "startup_failure" => "❌",
        "cancelled" => "🚫",
        "skipped" => "⏭️",
        _ => "❓",
    }
}

/// Markdown summary of recent runs. Callers handle the empty case.
pub fn run_summary(runs: &[WorkflowRun]) -> String {
    let lines: Vec<String> = runs
        .iter()
        .map(|run| {
            let emoji = run
                .conclusion
                .as_deref()
                .map(state_emoji)
                .filter(|e| *e != "❓")
                .or_else(|| run.status.as_deref().map(state_emoji))
                .unwrap_or("❓");
            format!(
                "{} *{}* · {}\n   📅 {}\n   🔗 [View Run]({})",
                emoji,
                escape_markdown(run.display_name()),
                run.state(),
                run.created_at.format("%Y-%m-%d %H:%M UTC"),
                run.html_url
            )
        })
        .collect();

    format!("📊 *Recent Workflow Runs:*\n\n{}", lines.join("\n\n"))
}
