//! Serve command: scheduled checks plus the command API

use crate::chat::{ChatPlatform, DiscordClient, InMemoryPlatform};
use crate::commands::CommandHandlers;
use crate::config::discord_token;
use crate::health::HealthProber;
use crate::lifecycle::MessageLifecycleManager;
use crate::readiness::Readiness;
use crate::render::Renderer;
use crate::scheduler::Scheduler;
use crate::store::StatusStore;
use crate::{api, AppState};
use clap::Args;
use downdetector_common::config::MonitorConfig;
use downdetector_common::error::{BotError, BotResult, CommonError};
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};

/// Arguments for the serve subcommand
#[derive(Args, Debug, Default)]
pub struct ServeArgs {
    /// Keep messages in memory and log them instead of talking to Discord
    #[arg(long)]
    pub dry_run: bool,
}

/// Run the bot until Ctrl+C.
pub async fn execute(args: &ServeArgs, config_path: Option<&Path>) -> BotResult<()> {
    let config = Arc::new(MonitorConfig::load(config_path)?);
    info!(
        version = env!("CARGO_PKG_VERSION"),
        target_url = %config.target_url,
        channel_id = ?config.channel_id,
        dry_run = args.dry_run,
        "Downdetector Bot starting"
    );

    let readiness = Readiness::new();
    let store = StatusStore::new();
    let prober = HealthProber::new()?;

    let (platform, discord): (Arc<dyn ChatPlatform>, Option<DiscordClient>) = if args.dry_run {
        let memory = match config.channel_id {
            Some(channel_id) => InMemoryPlatform::with_channel(channel_id),
            None => InMemoryPlatform::new(),
        };
        (Arc::new(memory), None)
    } else {
        let token = discord_token().ok_or_else(|| {
            CommonError::Config("DOWNDETECTOR_DISCORD_TOKEN is not set".to_string())
        })?;
        let client = DiscordClient::new(config.discord_api_base.clone(), token)?;
        (Arc::new(client.clone()), Some(client))
    };

    let lifecycle = MessageLifecycleManager::new(platform.clone());

    // スケジューラーは起動完了シグナルを待つので先に起動しておく
    let scheduler = Scheduler::new(
        &config,
        prober.clone(),
        store.clone(),
        lifecycle.clone(),
        platform,
        readiness.clone(),
    )
    .start();

    if let Some(client) = &discord {
        client.login().await?;
    }
    readiness.mark_ready();

    let commands = CommandHandlers::new(
        prober,
        store.clone(),
        lifecycle,
        Renderer::from_config(&config),
        config.target_url.clone(),
        config.probe_timeout(),
    );
    let state = AppState {
        config: config.clone(),
        store,
        commands,
    };

    let bind_addr = config.api_bind_addr();
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .map_err(|e| BotError::Internal(format!("Failed to bind {}: {}", bind_addr, e)))?;
    info!(addr = %bind_addr, "Command API listening");

    let served = axum::serve(listener, api::create_router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await;

    scheduler.abort();
    info!("Shutdown complete");

    served.map_err(|e| BotError::Internal(format!("Command API error: {}", e)))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for Ctrl+C; shutting down");
        return;
    }
    info!("Shutdown signal received");
}
