//! Poll command implementation.

use super::Services;
use crate::config::AppConfig;
use crate::error::Result;
use crate::output::Formatter;
use hnrelay_sync::Reconciler;

/// Execute the poll command: one poll cycle, then exit.
pub async fn execute_poll(config: &AppConfig, formatter: &Formatter) -> Result<()> {
    let services = Services::connect(config)?;

    let reconciler = Reconciler::new(
        services.source,
        services.sink,
        services.store,
        config.sync.clone(),
    );
    let report = reconciler.poll().await?;

    println!("{}", formatter.format_poll(&report)?);
    Ok(())
}
