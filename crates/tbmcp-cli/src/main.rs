//! ThingsBoard MCP server - command-line entry point.
//!
//! Exposes the ThingsBoard REST API as MCP tools. Configuration comes from
//! environment variables (see `tbmcp-core`); the transport and bind address
//! can be overridden on the command line. Logs always go to stderr because
//! stdout belongs to the stdio transport.

use std::net::SocketAddr;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use tbmcp_client::Session;
use tbmcp_core::{Config, TransportMode};
use tbmcp_server::{transport, Dispatcher, ToolContext, ToolRegistry};

#[derive(Parser)]
#[command(name = "thingsboard-mcp")]
#[command(version, about = "MCP server exposing the ThingsBoard REST API as tools", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the MCP server (default when no subcommand is given)
    Serve {
        /// Transport to expose: stdio, sse, or streamable-http.
        /// Overrides MCP_SERVER_TRANSPORT.
        #[arg(long)]
        transport: Option<TransportMode>,

        /// Bind address for the HTTP transports. Overrides MCP_HTTP_BIND.
        #[arg(long)]
        bind: Option<SocketAddr>,
    },

    /// List the registered tools and exit
    Tools,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Some(Commands::Tools) => {
            let registry = ToolRegistry::new();
            for definition in registry.definitions() {
                println!(
                    "{:40} {}",
                    definition["name"].as_str().unwrap_or_default(),
                    definition["description"].as_str().unwrap_or_default()
                );
            }
            Ok(())
        }
        Some(Commands::Serve { transport, bind }) => serve(transport, bind).await,
        None => serve(None, None).await,
    }
}

async fn serve(
    transport: Option<TransportMode>,
    bind: Option<SocketAddr>,
) -> anyhow::Result<()> {
    let mut config = Config::from_env()?;
    if let Some(transport) = transport {
        config.transport = transport;
    }
    if let Some(bind) = bind {
        config.http_bind = bind;
    }

    let session = Arc::new(Session::new(&config)?);
    // Fail fast on bad credentials before any client connects.
    session.ensure_authenticated().await?;

    let registry = Arc::new(ToolRegistry::new());
    tracing::info!(
        tools = registry.len(),
        transport = %config.transport,
        api_base = %config.api_base,
        "starting thingsboard-mcp"
    );

    let dispatcher = Arc::new(Dispatcher::new(
        registry,
        ToolContext {
            session,
            confirm_writes: config.confirm_writes,
        },
    ));

    transport::serve(&config, dispatcher).await?;
    Ok(())
}
