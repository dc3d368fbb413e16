//! Store-level commands: check, init, clear, stats, airports

use std::io::{BufRead, Write};

use clap::Args;
use taxigraph_storage::CURRENT_VERSION;

use crate::output::{print_json, OutputFormat};
use crate::{airport_filter, AppContext, Cli};

#[derive(Args)]
pub struct ClearArgs {
    /// Only clear data for this airport
    #[arg(short, long)]
    pub airport: Option<String>,

    /// Skip confirmation prompt
    #[arg(short, long)]
    pub yes: bool,
}

#[derive(Args)]
pub struct StatsArgs {
    /// Filter by ICAO airport code
    #[arg(short, long)]
    pub airport: Option<String>,
}

pub async fn run_check(ctx: &AppContext) -> anyhow::Result<()> {
    println!(
        "Checking {} store at {}...",
        ctx.settings.backend.as_str(),
        ctx.settings.db_path().display()
    );

    match ctx.storage.health_check().await {
        Ok(true) => {
            println!("✓ Store is reachable");
            Ok(())
        }
        Ok(false) => anyhow::bail!("Store health check failed"),
        Err(e) => Err(anyhow::Error::new(e).context("Store is unreachable")),
    }
}

pub async fn run_init(ctx: &AppContext) -> anyhow::Result<()> {
    println!("Initializing schema...");
    ctx.storage.initialize().await?;
    tracing::info!("Schema at version {}", CURRENT_VERSION);
    println!("✓ Schema initialized (version {})", CURRENT_VERSION);
    Ok(())
}

fn confirm(prompt: &str) -> anyhow::Result<bool> {
    print!("{} [y/N] ", prompt);
    std::io::stdout().flush()?;

    let mut answer = String::new();
    std::io::stdin().lock().read_line(&mut answer)?;
    Ok(matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes"))
}

pub async fn run_clear(args: &ClearArgs, ctx: &AppContext) -> anyhow::Result<()> {
    let airport = airport_filter(args.airport.as_deref())?;

    if !args.yes {
        let prompt = match &airport {
            Some(code) => format!("This will delete all data for {}. Are you sure?", code),
            None => "This will delete ALL data. Are you sure?".to_string(),
        };
        if !confirm(&prompt)? {
            println!("Aborted.");
            return Ok(());
        }
    }

    let summary = ctx.storage.clear(airport.as_deref()).await?;
    tracing::info!(
        "Cleared {} node(s), {} edge(s)",
        summary.nodes,
        summary.edges
    );

    match &airport {
        Some(code) => println!(
            "✓ Data for {} cleared ({} nodes, {} connections)",
            code, summary.nodes, summary.edges
        ),
        None => println!(
            "✓ Store cleared ({} nodes, {} connections)",
            summary.nodes, summary.edges
        ),
    }
    Ok(())
}

pub async fn run_stats(args: &StatsArgs, cli: &Cli, ctx: &AppContext) -> anyhow::Result<()> {
    let airport = airport_filter(args.airport.as_deref())?;
    let stats = ctx.storage.stats(airport.as_deref()).await?;

    if cli.format == OutputFormat::Json {
        return print_json(&stats);
    }

    match &airport {
        Some(code) => println!("Statistics for {}:", code),
        None => println!("Statistics for all airports:"),
    }
    println!("  Total nodes: {}", stats.total_nodes);
    println!("  Total connections: {}", stats.total_edges);

    if !stats.nodes_by_type.is_empty() {
        println!();
        println!("  Nodes by type:");
        for (node_type, count) in &stats.nodes_by_type {
            println!("    {}: {}", node_type, count);
        }
    }
    Ok(())
}

pub async fn run_airports(cli: &Cli, ctx: &AppContext) -> anyhow::Result<()> {
    let airports = ctx.storage.list_airports().await?;

    if cli.format == OutputFormat::Json {
        return print_json(&airports);
    }

    if airports.is_empty() {
        println!("No airports in store.");
    } else {
        println!("Airports in store:");
        for airport in &airports {
            println!("  {}", airport);
        }
    }
    Ok(())
}
