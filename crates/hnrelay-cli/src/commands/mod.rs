//! Command implementations.

pub mod cleanup;
pub mod poll;
pub mod run;
pub mod status;

pub use self::cleanup::execute_cleanup;
pub use self::poll::execute_poll;
pub use self::run::execute_run;
pub use self::status::execute_status;

use crate::config::AppConfig;
use crate::error::Result;
use hnrelay_clients::{HackerNewsClient, TelegramSink};
use hnrelay_store::TrackedStore;
use std::sync::Arc;

/// Collaborators shared by the commands that talk to the outside world.
pub(crate) struct Services {
    pub source: Arc<HackerNewsClient>,
    pub sink: Arc<TelegramSink>,
    pub store: Arc<TrackedStore>,
}

impl Services {
    /// Build clients and open the store.
    ///
    /// The credential is checked first so a missing token fails before the
    /// snapshot is touched.
    pub fn connect(config: &AppConfig) -> Result<Self> {
        let timeout = config.sync.http_timeout();
        let sink = TelegramSink::with_api_base(
            &config.telegram_api,
            config.require_bot_key()?,
            &config.chat_id,
            timeout,
        )?;
        let source = HackerNewsClient::with_timeout(&config.hn_endpoint, timeout)?;
        let store = open_store(config)?;

        Ok(Self {
            source: Arc::new(source),
            sink: Arc::new(sink),
            store,
        })
    }
}

pub(crate) fn open_store(config: &AppConfig) -> Result<Arc<TrackedStore>> {
    let store = TrackedStore::open(&config.db_path)?;
    tracing::info!(
        path = %config.db_path.display(),
        tracked = store.len()?,
        "Loaded snapshot"
    );
    Ok(Arc::new(store))
}
