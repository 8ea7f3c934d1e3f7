//! # glyphgate-host
//!
//! Boot-check binary for the glyphgate capability layer.
//!
//! Loads the host configuration, assembles a script host with the standard
//! capability set, runs the bootstrap sequence and reports every global
//! binding. Embedding applications link `glyphgate-host` as a library; this
//! binary exists to verify a deployment's configuration and platform
//! support from the command line.
//!
//! ## Running
//!
//! ```bash
//! # Boot with the default configuration
//! cargo run --bin glyphgate-host
//!
//! # With debug logging
//! RUST_LOG=debug cargo run --bin glyphgate-host
//! ```

use anyhow::Result;
use glyphgate_host::config::HostConfig;
use glyphgate_host::host::ScriptHostBuilder;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration from config.toml
    let config = match HostConfig::load_default() {
        Ok(cfg) => Some(cfg),
        Err(_) => None,
    };

    // Initialize logging; RUST_LOG overrides the configured level
    let level = config
        .as_ref()
        .map(|cfg| cfg.host.log_level.clone())
        .unwrap_or_else(|| "info".to_string());
    FmtSubscriber::builder()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)))
        .with_target(true)
        .init();

    info!("Starting glyphgate-host v{}", env!("CARGO_PKG_VERSION"));

    let config = match config {
        Some(cfg) => {
            info!("Loaded configuration from default path");
            cfg
        }
        None => {
            info!("Failed to load config, using defaults");
            HostConfig::default()
        }
    };

    // Assemble the host and run bootstrap
    let host = ScriptHostBuilder::with_config(config).build()?;
    info!("Host instance: {}", host.id());

    match host.bootstrap() {
        Ok(()) => info!("Bootstrap complete"),
        Err(e) => {
            info!("Bootstrap stopped early: {}", e);
            info!("Capabilities bound before the failure remain usable");
        }
    }

    // Report every global binding
    for name in host.global_names() {
        if let Some(module) = host.global(&name) {
            info!(
                "Global '{}': capability '{}' ({} operations)",
                name,
                module.name(),
                module.operations().len()
            );
        }
    }

    // Probe the sandbox root through the fs capability
    if let Some(module) = host.global("fs") {
        if let Some(fs) = glyphgate_runtime::downcast::<cap_fs::FsCapability>(&module) {
            match fs.list_dir(".").await {
                Ok(entries) => info!(
                    "Sandbox root {} readable ({} entries)",
                    fs.root().display(),
                    entries.len()
                ),
                Err(e) => info!("Sandbox root not readable: {}", e),
            }
        }
    }

    info!("Boot check finished");
    Ok(())
}
