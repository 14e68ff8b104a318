pub mod api;
pub mod cli;
pub mod commands;
pub mod config;
pub mod errors;
pub mod geometry;
pub mod preview;

use clap::Parser;

use crate::cli::Cli;

/// Entry point for the `mattaview` binary.
pub fn run() {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    // Load .env file if present (ignore error if not found)
    let _ = dotenvy::dotenv();

    let mut config = config::load_config_or_default();
    config::apply_cli_overrides(&mut config, cli.base_url.as_deref());

    let runtime = match tokio::runtime::Builder::new_multi_thread().enable_all().build() {
        Ok(rt) => rt,
        Err(e) => {
            tracing::error!(error = %e, "failed to start async runtime");
            std::process::exit(1);
        }
    };

    if let Err(e) = runtime.block_on(commands::execute(&cli.command, &config)) {
        tracing::error!(error = %e, "command failed");
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
