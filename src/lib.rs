pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

pub use adapters::{CompletionClient, GitHubClient, TelegramApi};
pub use app::RelayBot;
pub use config::{cli::CliArgs, RelayConfig};
pub use crate::core::{auth::AllowList, command::Command, router::Router};
pub use utils::error::{RelayError, Result};
