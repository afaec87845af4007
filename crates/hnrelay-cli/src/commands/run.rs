//! Run command implementation.

use super::Services;
use crate::config::AppConfig;
use crate::error::Result;
use crate::output::Formatter;
use hnrelay_sync::Scheduler;
use tokio::signal;
use tokio_util::sync::CancellationToken;

/// Execute the run command: schedule cycles until SIGINT or SIGTERM.
pub async fn execute_run(config: &AppConfig, formatter: &Formatter) -> Result<()> {
    let services = Services::connect(config)?;
    tracing::info!(chat_id = %services.sink.chat_id(), "Relaying top stories");

    let scheduler = Scheduler::new(
        services.source,
        services.sink,
        services.store,
        config.sync.clone(),
    )?;

    let shutdown = CancellationToken::new();
    let trigger = shutdown.clone();
    let watcher = tokio::spawn(async move {
        shutdown_signal().await;
        trigger.cancel();
    });

    let metrics = scheduler.run(shutdown).await;
    watcher.abort();
    let metrics = metrics?;

    println!(
        "{}",
        formatter.success(&format!(
            "Stopped after {} poll and {} cleanup cycles",
            metrics.poll_cycles, metrics.cleanup_cycles
        ))
    );
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received Ctrl+C, shutting down gracefully");
        },
        () = terminate => {
            tracing::info!("Received SIGTERM, shutting down gracefully");
        },
    }
}
