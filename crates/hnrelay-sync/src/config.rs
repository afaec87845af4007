//! Configuration for sync operations
//!
//! Defines cycle intervals, batch size, concurrency degrees and the
//! retention window.

use crate::SyncError;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Longest accepted poll or cleanup interval (one year)
pub const MAX_INTERVAL_SECS: u64 = 365 * 86_400;

/// Longest accepted retention window (ten years)
pub const MAX_RETENTION_HOURS: u64 = 10 * 365 * 24;

/// Configuration for the sync engine
///
/// Every field has a default, so a TOML `[sync]` table may set any subset.
///
/// # Examples
///
/// ```
/// use hnrelay_sync::SyncConfig;
///
/// let config = SyncConfig::default();
/// assert_eq!(config.poll_interval_secs, 300);
/// assert!(config.poll_concurrency < config.cleanup_concurrency);
///
/// // No inter-request delay, for one-shot runs and tests
/// let config = SyncConfig::immediate();
/// assert_eq!(config.request_delay_ms, 0);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// How often to run a poll cycle (in seconds)
    /// Default: 300 (5 minutes)
    pub poll_interval_secs: u64,

    /// How often to run a cleanup cycle (in seconds)
    /// Default: 86400 (24 hours)
    pub cleanup_interval_secs: u64,

    /// Age after which a tracked message is deleted (in hours)
    /// Default: 24
    pub retention_hours: u64,

    /// Number of top ids requested per poll cycle
    /// Default: 30
    pub batch_size: usize,

    /// Parallel per-item workers during a poll cycle
    /// Kept below `cleanup_concurrency` to respect the sink's rate limits.
    /// Default: 5
    pub poll_concurrency: usize,

    /// Parallel deletes during a cleanup cycle
    /// Default: 10
    pub cleanup_concurrency: usize,

    /// Pause after each send or edit (in milliseconds)
    /// Default: 1000
    pub request_delay_ms: u64,

    /// Timeout for every HTTP request (in seconds)
    /// Default: 540 (9 minutes)
    pub http_timeout_secs: u64,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: 300,
            cleanup_interval_secs: 86_400,
            retention_hours: 24,
            batch_size: 30,
            poll_concurrency: 5,
            cleanup_concurrency: 10,
            request_delay_ms: 1000,
            http_timeout_secs: 540,
        }
    }
}

impl SyncConfig {
    /// Default configuration without the inter-request delay
    pub fn immediate() -> Self {
        Self {
            request_delay_ms: 0,
            ..Self::default()
        }
    }

    /// Reject values the scheduler cannot work with
    pub fn validate(&self) -> Result<(), SyncError> {
        let checks = [
            (self.poll_interval_secs == 0, "poll_interval_secs must be positive"),
            (self.cleanup_interval_secs == 0, "cleanup_interval_secs must be positive"),
            (self.retention_hours == 0, "retention_hours must be positive"),
            (self.batch_size == 0, "batch_size must be positive"),
            (self.poll_concurrency == 0, "poll_concurrency must be positive"),
            (self.cleanup_concurrency == 0, "cleanup_concurrency must be positive"),
            (self.http_timeout_secs == 0, "http_timeout_secs must be positive"),
            (
                self.poll_interval_secs > MAX_INTERVAL_SECS,
                "poll_interval_secs must not exceed one year",
            ),
            (
                self.cleanup_interval_secs > MAX_INTERVAL_SECS,
                "cleanup_interval_secs must not exceed one year",
            ),
            (
                self.retention_hours > MAX_RETENTION_HOURS,
                "retention_hours must not exceed ten years",
            ),
        ];

        match checks.iter().find(|(failed, _)| *failed) {
            Some((_, message)) => Err(SyncError::Config(message.to_string())),
            None => Ok(()),
        }
    }

    /// Get poll interval as Duration
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    /// Get cleanup interval as Duration
    pub fn cleanup_interval(&self) -> Duration {
        Duration::from_secs(self.cleanup_interval_secs)
    }

    /// Get retention window as a chrono duration
    ///
    /// Capped at [`MAX_RETENTION_HOURS`] so an unvalidated config can never
    /// move the cutoff into the future.
    pub fn retention(&self) -> chrono::Duration {
        // Lossless: the cap fits comfortably in i64
        chrono::Duration::hours(self.retention_hours.min(MAX_RETENTION_HOURS) as i64)
    }

    /// Get inter-request delay as Duration
    pub fn request_delay(&self) -> Duration {
        Duration::from_millis(self.request_delay_ms)
    }

    /// Get HTTP timeout as Duration
    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SyncConfig::default();
        assert_eq!(config.poll_interval_secs, 300);
        assert_eq!(config.cleanup_interval_secs, 86_400);
        assert_eq!(config.retention_hours, 24);
        assert_eq!(config.batch_size, 30);
        assert_eq!(config.poll_concurrency, 5);
        assert_eq!(config.cleanup_concurrency, 10);
        assert_eq!(config.request_delay_ms, 1000);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_duration_conversions() {
        let config = SyncConfig::default();

        assert_eq!(config.poll_interval(), Duration::from_secs(5 * 60));
        assert_eq!(config.cleanup_interval(), Duration::from_secs(24 * 3600));
        assert_eq!(config.retention(), chrono::Duration::hours(24));
        assert_eq!(config.request_delay(), Duration::from_secs(1));
        assert_eq!(config.http_timeout(), Duration::from_secs(9 * 60));
    }

    #[test]
    fn test_validate_rejects_zero() {
        let config = SyncConfig {
            poll_concurrency: 0,
            ..Default::default()
        };
        match config.validate() {
            Err(SyncError::Config(message)) => assert!(message.contains("poll_concurrency")),
            other => panic!("Expected config error, got {:?}", other),
        }

        let config = SyncConfig {
            poll_interval_secs: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_oversized_values() {
        let config = SyncConfig {
            retention_hours: u64::MAX,
            ..Default::default()
        };
        match config.validate() {
            Err(SyncError::Config(message)) => assert!(message.contains("retention_hours")),
            other => panic!("Expected config error, got {:?}", other),
        }

        let config = SyncConfig {
            retention_hours: 3_000_000_000_000,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = SyncConfig {
            cleanup_interval_secs: u64::MAX,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = SyncConfig {
            poll_interval_secs: MAX_INTERVAL_SECS + 1,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = SyncConfig {
            poll_interval_secs: MAX_INTERVAL_SECS,
            cleanup_interval_secs: MAX_INTERVAL_SECS,
            retention_hours: MAX_RETENTION_HOURS,
            ..Default::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_retention_never_negative() {
        for hours in [u64::MAX, 3_000_000_000_000, MAX_RETENTION_HOURS + 1] {
            let config = SyncConfig {
                retention_hours: hours,
                ..Default::default()
            };
            let retention = config.retention();
            assert!(retention > chrono::Duration::zero());
            assert_eq!(retention, chrono::Duration::hours(MAX_RETENTION_HOURS as i64));
        }
    }

    #[test]
    fn test_partial_toml() {
        let config: SyncConfig = toml::from_str(
            r#"
            poll_interval_secs = 60
            request_delay_ms = 250
            "#,
        )
        .unwrap();

        assert_eq!(config.poll_interval_secs, 60);
        assert_eq!(config.request_delay_ms, 250);
        assert_eq!(config.cleanup_interval_secs, 86_400);
        assert_eq!(config.batch_size, 30);
    }

    #[test]
    fn test_serde_roundtrip() {
        let config = SyncConfig::immediate();
        let serialized = serde_json::to_string(&config).unwrap();
        let deserialized: SyncConfig = serde_json::from_str(&serialized).unwrap();
        assert_eq!(config, deserialized);
    }
}
