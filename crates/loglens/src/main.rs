//! LogLens CLI - browse, tail and clear configured log files

use anyhow::Result;
use clap::Parser;
use loglens_logs::BoxedLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

mod cli;
mod commands;
mod output;

use cli::{Cli, Commands};
use commands::*;

/// Install the global subscriber: console output plus any host file sinks
///
/// `RUST_LOG` only governs the console; the file sinks carry their own
/// filters from the `loggers` configuration.
pub fn init_tracing(verbose: u8, base_level: &str, file_layers: Vec<BoxedLayer>) {
    let log_level = match verbose {
        0 => base_level,
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    let console = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            format!(
                "loglens={0},loglens_core={0},loglens_logs={0},loglens_web={0},tower_http={0}",
                log_level
            )
            .into()
        }));

    tracing_subscriber::registry()
        .with(file_layers)
        .with(console)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    // serve installs its own subscriber once the file sinks are known
    if !matches!(cli.command, Commands::Serve(_)) {
        init_tracing(cli.verbose, "warn", Vec::new());
    }

    let config = cli.config.as_deref();
    let result = match cli.command {
        Commands::Serve(args) => serve::execute(config, args, cli.verbose).await,
        Commands::Handlers { json } => handlers::execute(config, json),
        Commands::Show(args) => show::execute(config, args),
        Commands::HashPassword { password } => hash_password::execute(&password),
    };

    if let Err(e) = result {
        output::print_error(&format!("{:#}", e));
        std::process::exit(1);
    }

    Ok(())
}
