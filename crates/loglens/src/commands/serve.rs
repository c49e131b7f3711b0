//! Serve command implementation

use anyhow::Result;
use loglens_logs::build_host_sinks;
use loglens_web::AppState;
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};

use crate::cli::ServeArgs;

pub async fn execute(config_path: Option<&Path>, args: ServeArgs, verbose: u8) -> Result<()> {
    let (config, path) = super::load_config(config_path)?;
    let registry = Arc::new(super::build_registry(&config));

    let sinks = build_host_sinks(&registry, &config.logging);
    let installed = sinks.installed;
    let skipped = sinks.skipped;
    crate::init_tracing(verbose, "info", sinks.layers);

    info!("Loaded configuration from {}", path.display());
    for name in &installed {
        info!("Writing records to handler {}", name);
    }
    for (name, reason) in &skipped {
        warn!("No log sink for handler {}: {}", name, reason);
    }
    if config.users.iter().all(|u| !u.superuser) && config.server.api_key.is_none() {
        warn!("No superuser or API key configured; every admin request will be denied");
    }

    let bind = args.bind.unwrap_or_else(|| config.server.bind.clone());
    let state = AppState::new(registry, &config);
    loglens_web::start_server(&bind, state, shutdown_signal()).await?;

    info!("LogLens shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received SIGINT, shutting down..."),
        _ = terminate => info!("Received SIGTERM, shutting down..."),
    }
}
