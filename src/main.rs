// scadex - OpenSCAD batch module exporter
// Copyright (c) 2025 scadex Contributors
// Licensed under the MIT License

use clap::Parser;
use scadex::cli::commands::export::{exit_code_for, EXIT_FATAL};
use scadex::cli::Cli;
use scadex::config::load_or_default;
use scadex::logging::init_logging;
use std::process;
use tokio::sync::watch;

#[tokio::main]
async fn main() {
    // Load environment variables from .env file if present
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    let config = match load_or_default(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {e}");
            process::exit(exit_code_for(&e));
        }
    };

    let log_level = cli
        .log_level
        .as_deref()
        .unwrap_or(config.application.log_level.as_str());
    let logging_guard = match init_logging(log_level, &config.logging) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to initialize logging: {e}");
            process::exit(exit_code_for(&e));
        }
    };

    tracing::debug!(version = env!("CARGO_PKG_VERSION"), "scadex starting");

    let shutdown_rx = match install_shutdown_handler() {
        Ok(rx) => rx,
        Err(e) => {
            tracing::warn!(error = %e, "Failed to install signal handlers");
            watch::channel(false).1
        }
    };

    let exit_code = match cli.export.execute(&config, shutdown_rx).await {
        Ok(code) => code,
        Err(e) => {
            tracing::error!(error = %e, "Command execution failed");
            eprintln!("Error: {e}");
            EXIT_FATAL
        }
    };

    // flush file logs before exiting
    drop(logging_guard);
    process::exit(exit_code);
}

/// Replaces the default SIGINT/SIGTERM action with a shutdown flag
///
/// Nothing is killed: the run keeps awaiting its renderers, which receive
/// the terminal's SIGINT themselves, so each unit is still removed when its
/// process exits.
fn install_shutdown_handler() -> std::io::Result<watch::Receiver<bool>> {
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        // registered here, before any unit exists
        let mut sigint = signal(SignalKind::interrupt())?;
        let mut sigterm = signal(SignalKind::terminate())?;

        tokio::spawn(async move {
            loop {
                let name = tokio::select! {
                    Some(()) = sigint.recv() => "SIGINT",
                    Some(()) = sigterm.recv() => "SIGTERM",
                    else => break,
                };
                tracing::warn!(signal = name, "Shutdown signal received, waiting for running renderers");
                let _ = shutdown_tx.send(true);
            }
        });
    }

    #[cfg(not(unix))]
    tokio::spawn(async move {
        loop {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "Failed to listen for Ctrl+C");
                break;
            }
            tracing::warn!("Received Ctrl+C, waiting for running renderers");
            let _ = shutdown_tx.send(true);
        }
    });

    Ok(shutdown_rx)
}
