use clap::Parser;
use std::path::PathBuf;

/// Process flags. Service settings come from the environment, see `RelayConfig`.
#[derive(Debug, Clone, Parser)]
#[command(name = "chat-relay")]
#[command(about = "Relay chat commands to workflow dispatch and an AI assistant")]
pub struct CliArgs {
    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long)]
    pub json_logs: bool,

    /// Load environment variables from this dotenv file before reading config
    #[arg(long, value_name = "PATH")]
    pub env_file: Option<PathBuf>,
}
