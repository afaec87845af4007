//! hnrelay - Mirror the Hacker News front page into a Telegram channel.

use clap::Parser;
use hnrelay_cli::commands;
use hnrelay_cli::{AppConfig, Cli, Command, Formatter};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Log to stderr so command output stays clean on stdout
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .init();

    if let Err(e) = run(cli).await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> hnrelay_cli::Result<()> {
    let config = AppConfig::load(&cli)?;

    // Determine output format
    let format = cli.format.map(Into::into).unwrap_or_default();
    let formatter = Formatter::new(format, !cli.no_color);

    match cli.command.unwrap_or(Command::Run) {
        Command::Run => commands::execute_run(&config, &formatter).await,
        Command::Poll => commands::execute_poll(&config, &formatter).await,
        Command::Cleanup => commands::execute_cleanup(&config, &formatter).await,
        Command::Status => commands::execute_status(&config, &formatter),
    }
}
