//! hnrelay Collaborator Clients
//!
//! Implementations of the `ContentSource` and `MessagingSink` traits from
//! `hnrelay-domain`.
//!
//! # Clients
//!
//! - `HackerNewsClient`: Hacker News Firebase API (content source)
//! - `TelegramSink`: Telegram Bot API (messaging sink)
//! - `mock::MockSource` / `mock::MockSink`: deterministic in-memory doubles
//!   for testing
//!
//! # Examples
//!
//! ```no_run
//! use hnrelay_clients::{HackerNewsClient, TelegramSink};
//! use hnrelay_domain::ContentSource;
//!
//! # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! let source = HackerNewsClient::default_endpoint()?;
//! let sink = TelegramSink::new("123456:ABC-token", "@my_channel")?;
//!
//! let ids = source.top_ids(30).await?;
//! println!("{} candidates", ids.len());
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

pub mod hacker_news;
pub mod mock;
pub mod telegram;

use std::time::Duration;
use thiserror::Error;

pub use hacker_news::HackerNewsClient;
pub use telegram::TelegramSink;

/// Default timeout for every HTTP request (9 minutes, to tolerate a slow sink)
pub const DEFAULT_TIMEOUT_SECS: u64 = 540;

/// Errors that can occur while constructing a client
#[derive(Error, Debug)]
pub enum ClientError {
    /// The underlying HTTP client could not be built
    #[error("Failed to build HTTP client: {0}")]
    Build(#[from] reqwest::Error),

    /// A required setting is missing or empty
    #[error("Missing required setting: {0}")]
    MissingSetting(String),
}

pub(crate) fn http_client(timeout: Duration) -> Result<reqwest::Client, ClientError> {
    Ok(reqwest::Client::builder().timeout(timeout).build()?)
}

/// Cut long response bodies down for error messages
pub(crate) fn truncate(body: &str) -> String {
    const LIMIT: usize = 512;
    if body.len() <= LIMIT {
        return body.to_string();
    }
    let mut end = LIMIT;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &body[..end])
}
