//! Chat command parsing.
//!
//! The first whitespace-delimited token selects the command. Names are
//! case-sensitive and may carry a Telegram `@botname` suffix. The last
//! argument of a command keeps its inner spaces and newlines.

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `/contribute` and `/contribute_logs`.
    Contribute {
        org: String,
        repo: String,
        issue: String,
        show_logs: bool,
    },
    Enhance {
        prompt: String,
    },
    Ask {
        question: String,
    },
    Status,
    /// `None` means the most recent run.
    Logs {
        run_id: Option<u64>,
    },
    /// `/help` or `/start`.
    Help,
}

impl Command {
    /// Returns `None` for anything that is not a well-formed command.
    pub fn parse(text: &str) -> Option<Self> {
        let text = text.trim_start();
        let (head, rest) = split_token(text)?;
        let name = head.strip_prefix('/')?;
        let name = name.split('@').next().unwrap_or(name);

        match name {
            "contribute" => Self::parse_contribute(rest, false),
            "contribute_logs" => Self::parse_contribute(rest, true),
            "enhance" => tail(rest).map(|prompt| Command::Enhance { prompt }),
            "ask" => tail(rest).map(|question| Command::Ask { question }),
            "status" => Some(Command::Status),
            "logs" => {
                let run_id = split_token(rest).and_then(|(arg, _)| arg.parse().ok());
                Some(Command::Logs { run_id })
            }
            "help" | "start" => Some(Command::Help),
            _ => None,
        }
    }

    fn parse_contribute(rest: &str, show_logs: bool) -> Option<Self> {
        let (org, rest) = split_token(rest)?;
        let (repo, rest) = split_token(rest)?;
        let issue = tail(rest)?;
        Some(Command::Contribute {
            org: org.to_string(),
            repo: repo.to_string(),
            issue,
            show_logs,
        })
    }

    pub fn name(&self) -> &'static str {
        match self {
            Command::Contribute {
                show_logs: false, ..
            } => "contribute",
            Command::Contribute { show_logs: true, .. } => "contribute_logs",
            Command::Enhance { .. } => "enhance",
            Command::Ask { .. } => "ask",
            Command::Status => "status",
            Command::Logs { .. } => "logs",
            Command::Help => "help",
        }
    }
}

/// Next whitespace-delimited token and whatever follows it.
fn split_token(text: &str) -> Option<(&str, &str)> {
    let text = text.trim_start();
    if text.is_empty() {
        return None;
    }
    Some(match text.find(char::is_whitespace) {
        Some(end) => text.split_at(end),
        None => (text, ""),
    })
}

fn tail(rest: &str) -> Option<String> {
    let rest = rest.trim();
    (!rest.is_empty()).then(|| rest.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_contribute() {
        assert_eq!(
            Command::parse("/contribute facebook react fix bug"),
            Some(Command::Contribute {
                org: "facebook".into(),
                repo: "react".into(),
                issue: "fix bug".into(),
                show_logs: false,
            })
        );
    }

    #[test]
    fn contribute_logs_is_its_own_command() {
        let cmd = Command::parse("/contribute_logs octo widgets Crash on start").unwrap();
        assert_eq!(cmd.name(), "contribute_logs");
        assert!(matches!(cmd, Command::Contribute { show_logs: true, .. }));
    }

    #[test]
    fn issue_keeps_newlines_and_inner_spaces() {
        let cmd = Command::parse("/contribute octo widgets\nLine one\n\n  Line  two \n").unwrap();
        match cmd {
            Command::Contribute { issue, .. } => assert_eq!(issue, "Line one\n\n  Line  two"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn contribute_needs_all_three_arguments() {
        assert_eq!(Command::parse("/contribute"), None);
        assert_eq!(Command::parse("/contribute octo"), None);
        assert_eq!(Command::parse("/contribute octo widgets"), None);
        assert_eq!(Command::parse("/contribute octo widgets    "), None);
    }

    #[test]
    fn parses_text_commands() {
        assert_eq!(
            Command::parse("/enhance  add dark mode "),
            Some(Command::Enhance {
                prompt: "add dark mode".into()
            })
        );
        assert_eq!(
            Command::parse("/ask How do I\nset up ingress?"),
            Some(Command::Ask {
                question: "How do I\nset up ingress?".into()
            })
        );
        assert_eq!(Command::parse("/ask"), None);
        assert_eq!(Command::parse("/enhance   "), None);
    }

    #[test]
    fn parses_logs_with_optional_run_id() {
        assert_eq!(
            Command::parse("/logs 123456"),
            Some(Command::Logs {
                run_id: Some(123456)
            })
        );
        assert_eq!(Command::parse("/logs"), Some(Command::Logs { run_id: None }));
        assert_eq!(
            Command::parse("/logs latest"),
            Some(Command::Logs { run_id: None })
        );
    }

    #[test]
    fn parses_simple_commands() {
        assert_eq!(Command::parse("/status"), Some(Command::Status));
        assert_eq!(Command::parse("  /status please"), Some(Command::Status));
        assert_eq!(Command::parse("/help"), Some(Command::Help));
        assert_eq!(Command::parse("/start"), Some(Command::Help));
    }

    #[test]
    fn strips_bot_mention() {
        assert_eq!(Command::parse("/status@relay_bot"), Some(Command::Status));
        assert_eq!(
            Command::parse("/ask@relay_bot why?"),
            Some(Command::Ask {
                question: "why?".into()
            })
        );
    }

    #[test]
    fn ignores_unknown_and_case_mismatched_text() {
        assert_eq!(Command::parse("hello there"), None);
        assert_eq!(Command::parse(""), None);
        assert_eq!(Command::parse("/Status"), None);
        assert_eq!(Command::parse("/deploy now"), None);
        assert_eq!(Command::parse("/statusx"), None);
    }
}
