//! Taxigraph CLI - Operator tooling for the airport graph store

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod commands;
mod config;
mod output;

use commands::{completions, edge, io, node, query, serve, store};
use config::{Backend, Config};
use output::OutputFormat;
use taxigraph_core::limits;
use taxigraph_storage::StorageBackend;

#[derive(Parser)]
#[command(name = "taxigraph")]
#[command(author, version, about = "Airport ground-movement graph store")]
pub struct Cli {
    /// Data directory
    #[arg(short, long, global = true, env = "TAXIGRAPH_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Storage backend
    #[arg(short, long, global = true, value_enum, env = "TAXIGRAPH_BACKEND")]
    pub backend: Option<Backend>,

    /// Output format
    #[arg(short, long, global = true, value_enum, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Verify the store can be opened and queried
    Check,
    /// Initialize the store schema (safe to repeat)
    Init,
    /// Delete one airport's graph, or everything
    Clear(store::ClearArgs),
    /// Node and connection counts
    Stats(store::StatsArgs),
    /// List airports present in the store
    Airports,
    /// Manage nodes
    Node(node::NodeArgs),
    /// Manage connections
    Edge(edge::EdgeArgs),
    /// Find a taxi route between two nodes
    Path(query::PathArgs),
    /// Run structural checks on an airport graph
    Validate(query::ValidateArgs),
    /// Export airport graphs
    Export(io::ExportArgs),
    /// Import airport graphs from a JSON export
    Import(io::ImportArgs),
    /// Start MCP server
    Serve(serve::ServeArgs),
    /// Generate shell completions
    Completions(completions::CompletionsArgs),
    /// Manage configuration
    Config(commands::config::ConfigArgs),
}

/// Effective settings after flag > env > config file > default
#[derive(Debug, Clone)]
pub struct Settings {
    pub data_dir: PathBuf,
    pub backend: Backend,
    pub default_airport: Option<String>,
}

impl Settings {
    pub fn resolve(cli: &Cli, config: &Config) -> Self {
        Self {
            data_dir: cli
                .data_dir
                .clone()
                .or_else(|| config.data_dir.clone())
                .unwrap_or_else(crate::config::default_data_dir),
            backend: cli.backend.or(config.backend).unwrap_or_default(),
            default_airport: config.default_airport.clone(),
        }
    }

    pub fn db_path(&self) -> PathBuf {
        self.data_dir.join(self.backend.file_name())
    }
}

fn open_storage(settings: &Settings) -> anyhow::Result<Arc<dyn StorageBackend>> {
    let path = settings.db_path();
    tracing::debug!("Using {} database at: {:?}", settings.backend.as_str(), path);

    let storage: Arc<dyn StorageBackend> = match settings.backend {
        #[cfg(feature = "redb")]
        Backend::Redb => Arc::new(taxigraph_storage::RedbStorage::open(&path)?),
        #[cfg(feature = "sqlite")]
        Backend::Sqlite => Arc::new(taxigraph_storage::SqliteStorage::open(&path)?),
        #[allow(unreachable_patterns)]
        other => anyhow::bail!(
            "Backend '{}' is not compiled in; rebuild with --features {}",
            other.as_str(),
            other.as_str()
        ),
    };
    Ok(storage)
}

/// Application context with storage backend
pub struct AppContext {
    pub storage: Arc<dyn StorageBackend>,
    pub settings: Settings,
}

impl AppContext {
    pub async fn open(settings: Settings) -> anyhow::Result<Self> {
        std::fs::create_dir_all(&settings.data_dir).with_context(|| {
            format!("Failed to create data directory {}", settings.data_dir.display())
        })?;

        let storage = open_storage(&settings)
            .with_context(|| format!("Failed to open store at {}", settings.db_path().display()))?;

        Ok(Self { storage, settings })
    }

    /// Normalized airport code from a flag, falling back to `default_airport`
    pub fn airport(&self, explicit: Option<&str>) -> anyhow::Result<String> {
        let code = explicit
            .or(self.settings.default_airport.as_deref())
            .context("No airport given; pass --airport or set default_airport in the config")?;
        Ok(limits::normalize_airport(code)?)
    }
}

/// Normalize an optional airport filter
pub fn airport_filter(airport: Option<&str>) -> anyhow::Result<Option<String>> {
    Ok(airport.map(limits::normalize_airport).transpose()?)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Set up logging based on verbosity
    let filter = match cli.verbose {
        0 if cli.quiet => "error",
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    // stdout carries command output and the stdio MCP stream
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()))
        .init();

    tracing::debug!("Starting taxigraph CLI");

    // These never touch the store
    match &cli.command {
        Commands::Completions(args) => return completions::run(args),
        Commands::Config(args) => return commands::config::run(args),
        _ => {}
    }

    let config = Config::load()?;
    let settings = Settings::resolve(&cli, &config);
    let ctx = AppContext::open(settings).await?;

    let result = match &cli.command {
        Commands::Check => store::run_check(&ctx).await,
        Commands::Init => store::run_init(&ctx).await,
        Commands::Clear(args) => store::run_clear(args, &ctx).await,
        Commands::Stats(args) => store::run_stats(args, &cli, &ctx).await,
        Commands::Airports => store::run_airports(&cli, &ctx).await,
        Commands::Node(args) => node::run(args, &cli, &ctx).await,
        Commands::Edge(args) => edge::run(args, &cli, &ctx).await,
        Commands::Path(args) => query::run_path(args, &cli, &ctx).await,
        Commands::Validate(args) => query::run_validate(args, &cli, &ctx).await,
        Commands::Export(args) => io::run_export(args, &ctx).await,
        Commands::Import(args) => io::run_import(args, &ctx).await,
        Commands::Serve(args) => serve::run(args, &ctx).await,
        Commands::Completions(_) | Commands::Config(_) => Ok(()),
    };

    if let Err(e) = ctx.storage.close().await {
        tracing::warn!("Failed to close store: {}", e);
    }

    result
}
