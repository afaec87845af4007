//! Configuration management for the CLI.
//!
//! Every setting is resolved as flag > environment > config file > default.
//! clap merges the first two; the file and defaults are layered here.

use crate::cli::Cli;
use hnrelay_clients::{hacker_news, telegram};
use hnrelay_sync::{SyncConfig, SyncError};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Channel posted to when none is configured
pub const DEFAULT_CHAT_ID: &str = "@hacker_news_wooo";

/// Snapshot file used when none is configured
pub const DEFAULT_DB_PATH: &str = "stories.db";

/// Errors raised while assembling the configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Config file could not be read
    #[error("Failed to read config file {}: {source}", .path.display())]
    Read {
        /// File that was requested
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// Config file is not valid TOML for this schema
    #[error("Failed to parse config file {}: {source}", .path.display())]
    Parse {
        /// File that was requested
        path: PathBuf,
        /// Underlying error
        #[source]
        source: toml::de::Error,
    },

    /// No bot token anywhere
    #[error("Missing bot token: pass --bot-key or set BOT_KEY")]
    MissingBotKey,

    /// Sync settings rejected
    #[error(transparent)]
    Sync(#[from] SyncError),
}

/// Contents of the optional TOML config file.
///
/// ```toml
/// chat_id = "@my_channel"
/// db_path = "/var/lib/hnrelay/stories.db"
///
/// [sync]
/// poll_interval_secs = 120
/// retention_hours = 48
/// ```
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    /// Telegram bot token
    pub bot_key: Option<String>,
    /// Target chat
    pub chat_id: Option<String>,
    /// Snapshot file
    pub db_path: Option<PathBuf>,
    /// Hacker News API base URL
    pub hn_endpoint: Option<String>,
    /// Telegram Bot API base URL
    pub telegram_api: Option<String>,
    /// Engine settings
    pub sync: SyncConfig,
}

impl FileConfig {
    /// Read and parse a config file.
    pub fn read(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(path, &contents)
    }

    fn parse(path: &Path, contents: &str) -> Result<Self, ConfigError> {
        toml::from_str(contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Fully resolved application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Telegram bot token; only the sink needs it
    pub bot_key: Option<String>,
    /// Target chat
    pub chat_id: String,
    /// Snapshot file
    pub db_path: PathBuf,
    /// Hacker News API base URL
    pub hn_endpoint: String,
    /// Telegram Bot API base URL
    pub telegram_api: String,
    /// Engine settings
    pub sync: SyncConfig,
}

impl AppConfig {
    /// Load configuration from the command line, environment and config file.
    pub fn load(cli: &Cli) -> Result<Self, ConfigError> {
        let file = match &cli.config {
            Some(path) => FileConfig::read(path)?,
            None => FileConfig::default(),
        };
        Self::resolve(cli, file)
    }

    /// Layer command-line values over a parsed config file.
    pub fn resolve(cli: &Cli, file: FileConfig) -> Result<Self, ConfigError> {
        file.sync.validate()?;

        Ok(Self {
            bot_key: cli
                .bot_key
                .clone()
                .or(file.bot_key)
                .filter(|key| !key.trim().is_empty()),
            chat_id: cli
                .chat_id
                .clone()
                .or(file.chat_id)
                .unwrap_or_else(|| DEFAULT_CHAT_ID.to_string()),
            db_path: cli
                .db_path
                .clone()
                .or(file.db_path)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_DB_PATH)),
            hn_endpoint: cli
                .hn_endpoint
                .clone()
                .or(file.hn_endpoint)
                .unwrap_or_else(|| hacker_news::DEFAULT_ENDPOINT.to_string()),
            telegram_api: cli
                .telegram_api
                .clone()
                .or(file.telegram_api)
                .unwrap_or_else(|| telegram::DEFAULT_API_BASE.to_string()),
            sync: file.sync,
        })
    }

    /// The bot token, or an error if none was configured.
    pub fn require_bot_key(&self) -> Result<&str, ConfigError> {
        self.bot_key.as_deref().ok_or(ConfigError::MissingBotKey)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn bare_cli() -> Cli {
        Cli {
            bot_key: None,
            chat_id: None,
            db_path: None,
            config: None,
            hn_endpoint: None,
            telegram_api: None,
            format: None,
            no_color: false,
            command: None,
        }
    }

    fn parse(contents: &str) -> FileConfig {
        FileConfig::parse(Path::new("test.toml"), contents).unwrap()
    }

    #[test]
    fn test_defaults() {
        let config = AppConfig::resolve(&bare_cli(), FileConfig::default()).unwrap();
        assert_eq!(config.chat_id, DEFAULT_CHAT_ID);
        assert_eq!(config.db_path, PathBuf::from(DEFAULT_DB_PATH));
        assert_eq!(config.hn_endpoint, hacker_news::DEFAULT_ENDPOINT);
        assert_eq!(config.sync, SyncConfig::default());
        assert!(config.bot_key.is_none());
        assert!(matches!(config.require_bot_key(), Err(ConfigError::MissingBotKey)));
    }

    #[test]
    fn test_file_overrides_defaults() {
        let file = parse(
            r#"
            chat_id = "@from_file"
            bot_key = "file-token"

            [sync]
            poll_interval_secs = 120
            "#,
        );
        let config = AppConfig::resolve(&bare_cli(), file).unwrap();

        assert_eq!(config.chat_id, "@from_file");
        assert_eq!(config.require_bot_key().unwrap(), "file-token");
        assert_eq!(config.sync.poll_interval_secs, 120);
        assert_eq!(config.sync.retention_hours, 24);
    }

    #[test]
    fn test_flags_override_file() {
        let file = parse(
            r#"
            chat_id = "@from_file"
            db_path = "file.db"
            "#,
        );
        let cli = Cli {
            chat_id: Some("@from_flag".to_string()),
            db_path: Some(PathBuf::from("flag.json")),
            ..bare_cli()
        };
        let config = AppConfig::resolve(&cli, file).unwrap();

        assert_eq!(config.chat_id, "@from_flag");
        assert_eq!(config.db_path, PathBuf::from("flag.json"));
    }

    #[test]
    fn test_blank_bot_key_is_missing() {
        let cli = Cli {
            bot_key: Some("   ".to_string()),
            ..bare_cli()
        };
        let config = AppConfig::resolve(&cli, FileConfig::default()).unwrap();
        assert!(config.require_bot_key().is_err());
    }

    #[test]
    fn test_invalid_sync_settings_rejected() {
        let file = parse("[sync]\npoll_concurrency = 0\n");
        let result = AppConfig::resolve(&bare_cli(), file);
        assert!(matches!(result, Err(ConfigError::Sync(SyncError::Config(_)))));
    }

    #[test]
    fn test_unknown_key_rejected() {
        let result = FileConfig::parse(Path::new("test.toml"), "bot_token = \"x\"\n");
        assert!(matches!(result, Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "chat_id = \"@loaded\"").unwrap();

        let cli = Cli {
            config: Some(file.path().to_path_buf()),
            ..bare_cli()
        };
        let config = AppConfig::load(&cli).unwrap();
        assert_eq!(config.chat_id, "@loaded");
    }

    #[test]
    fn test_missing_file() {
        let cli = Cli {
            config: Some(PathBuf::from("/nonexistent/hnrelay.toml")),
            ..bare_cli()
        };
        assert!(matches!(AppConfig::load(&cli), Err(ConfigError::Read { .. })));
    }
}
