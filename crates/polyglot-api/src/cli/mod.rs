//! CLI command definitions for the `polyglot` binary.
//!
//! Uses clap derive macros for argument parsing.

pub mod config;
pub mod replay;
pub mod results;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Translation relay for multilingual support conversations.
#[derive(Parser)]
#[command(name = "polyglot", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to the TOML configuration file.
    #[arg(long, global = true, default_value = "polyglot.toml", env = "POLYGLOT_CONFIG")]
    pub config: PathBuf,

    /// Output machine-readable JSON instead of styled text.
    #[arg(long, global = true)]
    pub json: bool,

    /// Emit logs as JSON lines.
    #[arg(long, global = true)]
    pub json_logs: bool,

    /// Export spans through OpenTelemetry (stdout exporter).
    #[arg(long, global = true)]
    pub otel: bool,

    /// Detailed output (-v for debug, -vv for trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the webhook server.
    Serve {
        /// Port to listen on (overrides the config file).
        #[arg(short, long)]
        port: Option<u16>,

        /// Host to bind to (overrides the config file).
        #[arg(long)]
        host: Option<String>,
    },

    /// Feed recorded webhook payloads through the relay.
    ///
    /// The file holds one payload, or a JSON array of payloads processed in order.
    Replay {
        /// Path to the payload file.
        file: PathBuf,
    },

    /// Print the effective configuration as TOML.
    Config,

    /// Show recent processing results from the SQLite sink.
    Results {
        /// Number of rows to show.
        #[arg(short, long, default_value = "20")]
        limit: i64,

        /// Show recorded exceptions instead of results.
        #[arg(long)]
        exceptions: bool,
    },
}
