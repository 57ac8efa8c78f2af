use anyhow::Context;
use clap::{Parser, Subcommand};
use configuration::Settings;
use core_types::{Cliente, Customer, Document};
use database::{Collection, Connector, DocumentStore, InMemoryDocumentStore, PgConnector, PgDocumentStore};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

/// The main entry point for the gettyio customer service.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file, if there is one.
    dotenvy::dotenv().ok();

    // Parse command-line arguments
    let cli = Cli::parse();

    let mut settings = configuration::load_config(cli.config.as_deref())
        .context("Failed to load configuration")?;
    let _log_guard = init_tracing(&settings);

    // Execute the appropriate command
    match cli.command {
        Commands::Serve(args) => handle_serve(args, &mut settings).await,
        Commands::Reset(args) => handle_reset(args, &settings).await,
    }
}

// ==============================================================================
// CLI Structure
// ==============================================================================

/// A small CRUD service for customer documents.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the TOML configuration file. Defaults to `config.toml` if present.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server.
    Serve(ServeArgs),
    /// Empty every collection.
    Reset(ResetArgs),
}

#[derive(Parser)]
struct ServeArgs {
    /// Address to listen on, overriding `server.addr`.
    #[arg(long)]
    addr: Option<SocketAddr>,

    /// Keep documents in process memory instead of PostgreSQL.
    #[arg(long)]
    in_memory: bool,
}

#[derive(Parser)]
struct ResetArgs {
    /// Insert one blank record into each collection after emptying it.
    #[arg(long)]
    seed: bool,
}

// ==============================================================================
// Logging
// ==============================================================================

/// Installs the global subscriber. `RUST_LOG` wins over `log.level`.
fn init_tracing(settings: &Settings) -> WorkerGuard {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&settings.log.level));
    let (writer, guard) = tracing_appender::non_blocking(std::io::stdout());

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .init();

    guard
}

// ==============================================================================
// Command Logic
// ==============================================================================

async fn handle_serve(args: ServeArgs, settings: &mut Settings) -> anyhow::Result<()> {
    if let Some(addr) = args.addr {
        settings.server.addr = addr;
    }

    let connector: Arc<dyn Connector> = if args.in_memory {
        tracing::warn!("Serving from process memory; documents are lost on exit.");
        Arc::new(InMemoryDocumentStore::new())
    } else {
        tracing::info!(
            host = %settings.database.host,
            port = settings.database.port,
            database = %settings.database.name,
            "Using PostgreSQL document store."
        );
        Arc::new(PgConnector::new(&settings.database))
    };

    web_server::run_server(settings, connector).await
}

/// Empties the customer and cliente collections, optionally seeding each with
/// one zero-valued record.
async fn handle_reset(args: ResetArgs, settings: &Settings) -> anyhow::Result<()> {
    let pool = database::connect(&settings.database)
        .await
        .context("Failed to connect to the database")?;
    database::run_migrations(&pool)
        .await
        .context("Failed to run database migrations")?;
    let store: Arc<dyn DocumentStore> = Arc::new(PgDocumentStore::new(pool));

    let customers = Collection::<Customer>::new(store.clone(), settings.collections.customer.as_str());
    let clientes = Collection::<Cliente>::new(store, settings.collections.cliente.as_str());

    reset_collection(&customers, args.seed).await?;
    reset_collection(&clientes, args.seed).await?;
    Ok(())
}

async fn reset_collection<T: Document + Default>(
    collection: &Collection<T>,
    seed: bool,
) -> anyhow::Result<()> {
    let removed = collection
        .reset(seed)
        .await
        .with_context(|| format!("Failed to reset collection {}", collection.name()))?;
    tracing::info!(collection = collection.name(), removed, seeded = seed, "Collection reset.");
    Ok(())
}
