//! lumos-debugd - Standalone debug session server for the Lumos REPL

use anyhow::{Context, Result};
use clap::Parser;
use lumos_repl_core::config::{resolve_config, ConfigOverrides};
use lumos_repl_core::{ScratchEngine, Session};
use lumos_repl_debug::{DebugServer, ShutdownCoordinator};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

/// Debug session server for the Lumos REPL
#[derive(Parser, Debug)]
#[command(name = "lumos-debugd")]
#[command(about = "Debug session server for the Lumos REPL")]
#[command(version)]
struct Args {
    /// Path to configuration file
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Debug port (overrides the config file)
    #[arg(short, long, value_name = "PORT")]
    port: Option<u16>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let log_level = if args.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };

    tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_target(false)
        .init();

    info!("lumos-debugd starting...");

    let overrides = ConfigOverrides {
        config_path: args.config.clone(),
        port: args.port,
    };
    let config = resolve_config(&overrides).context("Failed to resolve configuration")?;

    if let Some(config_path) = args.config {
        info!("Loaded config from: {}", config_path.display());
    }

    // Standalone mode runs the scratch engine; an embedding host supplies
    // its own engine through the library API instead.
    let session = Session::new(Box::new(ScratchEngine::new()));
    let coordinator = Arc::new(ShutdownCoordinator::new());

    // Set up signal handlers: first signal drains, a second forces.
    let coordinator_for_signals = coordinator.clone();
    tokio::spawn(async move {
        loop {
            #[cfg(unix)]
            {
                let mut sigterm =
                    tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
                        .expect("Failed to create SIGTERM handler");

                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {
                        info!("Received SIGINT (Ctrl+C)");
                    }
                    _ = sigterm.recv() => {
                        info!("Received SIGTERM");
                    }
                }
            }

            #[cfg(not(unix))]
            {
                tokio::signal::ctrl_c()
                    .await
                    .expect("Failed to listen for Ctrl+C");
                info!("Received Ctrl+C");
            }

            if !coordinator_for_signals.request_shutdown() {
                info!("Interrupt suppressed by input-capturing context");
            }
        }
    });

    let server = DebugServer::bind(&config.debug, session, coordinator)
        .await
        .context("Failed to start debug server")?;

    server.run().await.context("Debug server failed")?;

    info!("lumos-debugd shutdown complete");
    Ok(())
}
