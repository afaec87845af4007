//! Status command implementation.

use super::open_store;
use crate::config::AppConfig;
use crate::error::Result;
use crate::output::Formatter;
use chrono::Utc;

/// Execute the status command: list what the snapshot tracks.
///
/// Works offline and without a bot token.
pub fn execute_status(config: &AppConfig, formatter: &Formatter) -> Result<()> {
    let store = open_store(config)?;
    let items = store.list()?;

    println!(
        "{}",
        formatter.format_tracked(&items, Utc::now(), config.sync.retention())?
    );
    Ok(())
}
