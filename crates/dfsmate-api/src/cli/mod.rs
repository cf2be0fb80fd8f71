//! CLI command definitions and dispatch for the `dfsmate` binary.
//!
//! Uses clap derive macros for argument parsing.

pub mod audit;
pub mod chat;
pub mod tool;

use clap::{Parser, Subcommand};

/// HDFS administration tools behind MCP, with an optional chat agent.
#[derive(Parser)]
#[command(name = "dfsmate", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output machine-readable JSON instead of styled text.
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress all output except errors.
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Detailed output (-v for verbose, -vv for debug/trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Export spans via OpenTelemetry (stdout exporter, for development).
    #[arg(long, global = true)]
    pub otel: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Serve the HDFS tools over MCP on stdio.
    Serve,

    /// Interactive chat with the HDFS administration agent.
    Chat,

    /// Invoke a single tool directly and print its result envelope.
    Tool {
        /// Tool name, e.g. `list` or `snapshot_create`.
        name: String,
        /// Tool arguments as a JSON object, e.g. '{"path":"/data"}'.
        #[arg(long)]
        args: Option<String>,
        /// Confirm the operation up front (sets confirm=true).
        #[arg(long)]
        yes: bool,
    },

    /// Show the newest audit records.
    Audit {
        /// How many records to show.
        #[arg(short = 'n', long = "tail", default_value_t = 20)]
        tail: usize,
    },
}
