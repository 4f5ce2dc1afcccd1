//! CLI module for downdetector-bot
//!
//! Provides command-line interface for running the bot and one-shot checks.

pub mod check;
pub mod serve;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Downdetector Bot - keeps one live reachability report in a chat channel
#[derive(Parser, Debug)]
#[command(name = "downdetector-bot")]
#[command(version, about, long_about = None)]
#[command(after_help = r#"ENVIRONMENT VARIABLES:
    DOWNDETECTOR_DISCORD_TOKEN      Discord bot token (required unless --dry-run)
    DOWNDETECTOR_TARGET_URL         URL to monitor (default: https://aur.archlinux.org)
    DOWNDETECTOR_CHANNEL_ID         Channel that receives scheduled reports
    DOWNDETECTOR_POLL_INTERVAL_SECS Seconds between scheduled checks (default: 600)
    DOWNDETECTOR_PROBE_TIMEOUT_SECS Probe timeout in seconds (default: 10)
    DOWNDETECTOR_COMMAND_PREFIX     Command prefix (default: !aur:)
    DOWNDETECTOR_LOG_LEVEL          Log level (default: info)
    DOWNDETECTOR_LOG_DIR            Also write daily-rotated log files here
"#)]
pub struct Cli {
    /// Configuration file (TOML, YAML or JSON)
    #[arg(long, short, global = true, env = "DOWNDETECTOR_CONFIG")]
    pub config: Option<PathBuf>,

    /// Subcommand to execute (defaults to `serve`)
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the bot: scheduled checks plus the command API
    Serve(serve::ServeArgs),
    /// Probe the target once and print the result as JSON
    Check(check::CheckArgs),
}
