//! Installer bridge service.
//!
//! # Architecture Overview
//!
//! ```text
//!                       ┌──────────────────────────────────────────────────┐
//!                       │                 INSTALLER BRIDGE                 │
//!                       │                                                  │
//!   GET/POST /config    │  ┌─────────┐    ┌──────────┐    ┌────────────┐   │
//!   ────────────────────┼─▶│  http   │───▶│  bridge  │───▶│  document  │◀──┼──── installer
//!                       │  │ server  │    │ (coerce, │    │   store    │   │     YAML file
//!                       │  └────┬────┘    │  update) │    └────────────┘   │
//!                       │       │         └──────────┘                     │
//!   POST /install       │       │         ┌──────────┐                     │
//!   ◀ streamed frames ──┼───────┴────────▶│ process  │─────────────────────┼──── install /
//!                       │                 │ streamer │◀── stdout/stderr ───┼──── uninstall
//!                       │                 └──────────┘                     │     scripts
//!                       │                                                  │
//!                       │  config · lifecycle · observability              │
//!                       └──────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;

use installer_bridge::config::{load_config, ConfigError, ServiceConfig};
use installer_bridge::config::validation::validate_config;
use installer_bridge::lifecycle::startup;
use installer_bridge::observability::init_tracing;

#[derive(Parser)]
#[command(name = "installer-bridge")]
#[command(about = "HTTP bridge for the installer document and scripts", long_about = None)]
struct Args {
    /// Service settings file (TOML). Defaults apply when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the listener bind address.
    #[arg(short, long)]
    bind: Option<String>,

    /// Override the installer document path.
    #[arg(short, long)]
    document: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => load_config(path)?,
        None => ServiceConfig::default(),
    };
    if let Some(bind) = args.bind {
        config.listener.bind_address = bind;
    }
    if let Some(document) = args.document {
        config.document.path = document.display().to_string();
    }
    validate_config(&config).map_err(ConfigError::Validation)?;

    init_tracing(&config.observability);
    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        bind_address = %config.listener.bind_address,
        document = %config.document.path,
        install_script = %config.actions.install_script,
        uninstall_script = %config.actions.uninstall_script,
        "installer-bridge starting"
    );

    startup::run(config).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
