//! # Player Respawner - Console Host
//!
//! Runs the respawner plugin against an in-memory set of worlds and players,
//! driven from an admin console on stdin.
//!
//! ## Quick Start
//!
//! ```bash
//! # Run with default configuration
//! respawner
//!
//! # Specify custom configuration and policy file
//! respawner --config server.toml --policy data/respawn.toml
//!
//! # JSON logging
//! respawner --json-logs --log-level debug
//! ```
//!
//! ## Configuration
//!
//! The host loads configuration from a TOML file (default: `respawner.toml`).
//! If the file doesn't exist, a default configuration will be created.
//!
//! ## Console
//!
//! ```text
//! world create limbo
//! player_respawn add limbo
//! player_respawn dest world
//! login Steve limbo
//! ```
//!
//! The host shuts down on `quit`, end of input, SIGINT or SIGTERM.

use tracing::error;

mod app;
mod cli;
mod config;
mod console;
mod logging;
mod signals;
mod world;

use app::Application;
use cli::CliArgs;

/// Entry point for the console host.
///
/// Parses arguments, loads configuration, sets up logging and runs the
/// application until shutdown.
///
/// # Exit Codes
///
/// * **0**: Successful execution and shutdown
/// * **1**: Error during startup, configuration, or runtime
pub async fn init() -> Result<(), Box<dyn std::error::Error>> {
    let args = CliArgs::parse();

    // Logging needs the configured level before the application is built.
    let mut logging_settings = AppConfig::load_from_file(&args.config_path)
        .await
        .unwrap_or_default()
        .logging;
    if let Some(level) = &args.log_level {
        logging_settings.level = level.clone();
    }

    if let Err(e) = logging::setup_logging(&logging_settings, args.json_logs) {
        eprintln!("❌ Failed to setup logging: {e}");
        std::process::exit(1);
    }

    match Application::new(args).await {
        Ok(app) => {
            if let Err(e) = app.run().await {
                error!("❌ Application error: {:?}", e);
                std::process::exit(1);
            }
        }
        Err(e) => {
            error!("❌ Failed to start application: {e:?}");
            std::process::exit(1);
        }
    }

    Ok(())
}

pub use config::{AppConfig, LoggingSettings, PluginSettings, WorldSettings};
pub use console::{ConsoleInput, ConsoleSender};
pub use world::{ConsoleContext, PlayerRecord, PlayerRegistry, WorldRegistry};
