// surq - connection manager and query console for SurrealDB's HTTP endpoint
// Main entry point

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;

use surq::cli::Repl;
use surq::client::{Connection, ConnectionState};
use surq::config::ConfigResolver;

#[derive(Parser, Debug)]
#[command(name = "surq")]
#[command(about = "Connection manager and query console for SurrealDB", version)]
struct Args {
    /// Path to the settings file (default: ~/.surq/config.toml)
    #[arg(long = "config", global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Parser, Debug)]
enum Command {
    /// Probe the configured endpoint and report the connection state
    Probe,
    /// Execute a single query
    Query {
        /// Query text
        query: String,
    },
    /// Run the interactive query console
    Console,
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let args = Args::parse();

    let resolver = match args.config {
        Some(path) => ConfigResolver::with_path(path),
        None => ConfigResolver::new(),
    };
    let connection = Connection::new(resolver)?;

    match args.command {
        Some(Command::Probe) => run_probe(connection).await,
        Some(Command::Query { query }) => run_query(connection, &query).await,
        Some(Command::Console) | None => Repl::new(connection)?.run().await,
    }
}

/// Probe once and report the outcome. Exits non-zero when not connected.
async fn run_probe(connection: Connection) -> Result<()> {
    connection.probe().await;

    match connection.state() {
        ConnectionState::Connected => {
            println!("Connected");
            Ok(())
        }
        state => {
            let cause = connection
                .last_error()
                .map(|error| error.to_string())
                .unwrap_or_else(|| "unknown".to_string());
            anyhow::bail!("{}: {}", state, cause)
        }
    }
}

/// Execute one query and print the result. Exits non-zero on any error.
async fn run_query(connection: Connection, query: &str) -> Result<()> {
    let result = connection.execute(query).await;

    if let Some(error) = result.error {
        anyhow::bail!("{}", error);
    }

    if let Some(execution_time_ms) = result.execution_time_ms {
        eprintln!("{:.2}ms", execution_time_ms);
    }

    if let Some(payload) = result.payload {
        println!("{}", serde_json::to_string_pretty(&payload)?);
    }

    Ok(())
}

/// Log to stderr, INFO by default, overridable with RUST_LOG.
fn init_tracing() {
    use tracing_subscriber::prelude::*;

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
