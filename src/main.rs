use anyhow::Context;
use chat_relay::utils::{logger, validation::Validate};
use chat_relay::{
    CliArgs, CompletionClient, GitHubClient, RelayBot, RelayConfig, Router, TelegramApi,
};
use clap::Parser;
use std::sync::Arc;
use tokio::sync::watch;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = CliArgs::parse();

    // Load the dotenv file first so RUST_LOG from it reaches the logger
    let env_file_result = match &args.env_file {
        Some(path) => Some(dotenvy::from_path(path).map(|_| path.display().to_string())),
        None => dotenvy::dotenv().ok().map(|path| Ok(path.display().to_string())),
    };

    if args.json_logs {
        logger::init_json_logger(args.verbose);
    } else {
        logger::init_cli_logger(args.verbose);
    }

    match env_file_result {
        Some(Ok(path)) => tracing::info!("Loaded environment from {}", path),
        Some(Err(e)) => {
            tracing::error!("❌ Failed to load env file: {}", e);
            eprintln!("❌ Failed to load env file: {}", e);
            std::process::exit(1);
        }
        None => {}
    }

    let config = match RelayConfig::from_env().and_then(|c| c.validate().map(|_| c)) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(category = ?e.category(), "❌ Configuration error: {}", e);
            eprintln!("❌ {}", e.user_friendly_message());
            std::process::exit(1);
        }
    };

    if !config.completion_enabled() {
        tracing::warn!("⚠️  ZAI_API_KEY not set, /enhance and /ask will not work");
    }
    if config.allowed_chat_ids.is_empty() {
        tracing::warn!("ALLOWED_CHAT_IDS is empty, every chat may issue commands");
    } else {
        tracing::info!("Allow-list holds {} chat ids", config.allowed_chat_ids.len());
    }

    let telegram = Arc::new(TelegramApi::from_config(&config.telegram)?);
    let me = telegram
        .get_me()
        .await
        .context("Telegram rejected the bot token")?;
    tracing::info!(
        "Connected as @{} (repository {}, event '{}')",
        me.username.as_deref().unwrap_or(&me.first_name),
        config.github.repository,
        config.github.event_type
    );

    let router = Router::new(
        &config,
        GitHubClient::from_config(&config.github)?,
        CompletionClient::from_config(&config.completion)?,
        Arc::clone(&telegram),
    );
    let bot = RelayBot::new(telegram, Arc::new(router), config.telegram.poll_timeout_secs);

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Shutdown requested");
            let _ = shutdown_tx.send(true);
        }
    });

    bot.run(shutdown_rx).await;
    Ok(())
}
