//! CLI argument definitions

use clap::{Args, Parser, Subcommand};
use loglens_core::Level;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "loglens")]
#[command(version, about = "Browse, tail and clear configured log files over HTTP")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file (toml, yaml or json)
    #[arg(short, long, env = "LOGLENS_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the web server
    Serve(ServeArgs),

    /// List file-backed handlers
    Handlers {
        /// Output in JSON format instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Print a handler's log file
    Show(ShowArgs),

    /// Print the SHA-256 hash of a password for the users section
    HashPassword {
        password: String,
    },
}

#[derive(Args)]
pub struct ServeArgs {
    /// Address to listen on, overriding server.bind
    #[arg(short, long)]
    pub bind: Option<String>,
}

#[derive(Args)]
pub struct ShowArgs {
    /// Handler name
    pub handler: String,

    /// Only show records at or above this level
    #[arg(short = 'l', long, default_value = "DEBUG")]
    pub min_level: Level,

    /// Only show the last N lines
    #[arg(short = 'n', long)]
    pub lines: Option<usize>,
}
