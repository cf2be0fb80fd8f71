//! dfsmate CLI and MCP server entry point.
//!
//! Binary name: `dfsmate`
//!
//! Parses CLI arguments, loads configuration, then dispatches to the MCP
//! stdio server, the chat REPL, direct tool invocation, or the audit viewer.

mod cli;
mod mcp;
mod state;

use clap::Parser;

use cli::{Cli, Commands};
use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Set up tracing based on verbosity. Logs go to stderr; stdout belongs
    // to the MCP wire protocol when serving.
    let filter = match cli.verbose {
        0 if cli.quiet => "error",
        0 => "warn",
        1 => "info,dfsmate=debug",
        _ => "trace",
    };
    if let Err(err) = dfsmate_observe::tracing_setup::init_tracing(filter, cli.otel) {
        eprintln!("Warning: failed to initialize tracing: {err}");
    }

    let state = AppState::init();

    let result = match cli.command {
        Commands::Serve => mcp::serve(&state).await,
        Commands::Chat => cli::chat::run_chat(&state).await,
        Commands::Tool { name, args, yes } => {
            cli::tool::run_tool(&state, &name, args.as_deref(), yes, cli.json).await
        }
        Commands::Audit { tail } => cli::audit::show_audit(&state, tail, cli.json).await,
    };

    dfsmate_observe::tracing_setup::shutdown_tracing();
    result
}
