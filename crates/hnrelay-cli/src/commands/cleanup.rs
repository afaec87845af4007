//! Cleanup command implementation.

use super::Services;
use crate::config::AppConfig;
use crate::error::Result;
use crate::output::Formatter;
use hnrelay_sync::Janitor;

/// Execute the cleanup command: one cleanup cycle, then exit.
pub async fn execute_cleanup(config: &AppConfig, formatter: &Formatter) -> Result<()> {
    let services = Services::connect(config)?;

    let janitor = Janitor::new(services.sink, services.store, config.sync.clone());
    let report = janitor.sweep().await?;

    println!("{}", formatter.format_sweep(&report)?);
    Ok(())
}
