//! CLI command definitions and argument parsing.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// hnrelay - Mirror the Hacker News front page into a Telegram channel.
#[derive(Debug, Parser)]
#[command(name = "hnrelay")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Telegram bot token
    #[arg(long, env = "BOT_KEY", global = true, hide_env_values = true)]
    pub bot_key: Option<String>,

    /// Target chat or channel (e.g. @my_channel)
    #[arg(long, env = "CHAT_ID", global = true)]
    pub chat_id: Option<String>,

    /// Snapshot file; a `.json` extension selects the JSON format, anything else SQLite
    #[arg(long, env = "DB_PATH", global = true)]
    pub db_path: Option<PathBuf>,

    /// Configuration file path (TOML)
    #[arg(short, long, env = "HNRELAY_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Hacker News API base URL
    #[arg(long, global = true)]
    pub hn_endpoint: Option<String>,

    /// Telegram Bot API base URL
    #[arg(long, global = true)]
    pub telegram_api: Option<String>,

    /// Output format
    #[arg(short, long, value_enum, global = true)]
    pub format: Option<CliFormat>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Output format options.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum CliFormat {
    /// Table format (default)
    Table,
    /// JSON format
    Json,
}

/// CLI commands.
#[derive(Debug, Clone, Copy, Subcommand)]
pub enum Command {
    /// Poll and clean up on a schedule until interrupted (default)
    Run,

    /// Run a single poll cycle and exit
    Poll,

    /// Run a single cleanup cycle and exit
    Cleanup,

    /// List tracked stories
    Status,
}

impl From<CliFormat> for crate::output::OutputFormat {
    fn from(format: CliFormat) -> Self {
        match format {
            CliFormat::Table => crate::output::OutputFormat::Table,
            CliFormat::Json => crate::output::OutputFormat::Json,
        }
    }
}
