//! Path and validation commands

use clap::Args;
use taxigraph_core::PathQuery;
use taxigraph_mcp::render;

use crate::output::{print_json, OutputFormat};
use crate::{AppContext, Cli};

#[derive(Args)]
pub struct PathArgs {
    /// Starting node id
    pub from: String,
    /// Destination node id
    pub to: String,
    /// Airport to search (default: the starting node's airport)
    #[arg(short, long)]
    pub airport: Option<String>,
    /// Minimize total distance instead of the number of connections
    #[arg(long)]
    pub by_distance: bool,
}

#[derive(Args)]
pub struct ValidateArgs {
    /// ICAO airport code
    #[arg(short, long)]
    pub airport: Option<String>,
}

/// Explicit flag, then the start node's own airport, then the configured default
async fn path_airport(args: &PathArgs, ctx: &AppContext) -> anyhow::Result<String> {
    if args.airport.is_none() {
        if let Some(node) = ctx.storage.get_node(&args.from).await? {
            return Ok(node.airport);
        }
    }
    ctx.airport(args.airport.as_deref())
}

pub async fn run_path(args: &PathArgs, cli: &Cli, ctx: &AppContext) -> anyhow::Result<()> {
    let airport = path_airport(args, ctx).await?;

    let mut query = PathQuery::new(&args.from, &args.to);
    if args.by_distance {
        query = query.by_distance();
    }
    tracing::debug!("Path query in {}: {:?}", airport, query);

    let outcome = ctx.storage.find_route(&airport, &query).await?;

    if cli.format == OutputFormat::Json {
        return print_json(&outcome);
    }
    println!("{}", render::path_outcome(&args.from, &args.to, &outcome));
    Ok(())
}

pub async fn run_validate(args: &ValidateArgs, cli: &Cli, ctx: &AppContext) -> anyhow::Result<()> {
    let airport = ctx.airport(args.airport.as_deref())?;
    let report = ctx.storage.validate(&airport).await?;

    if cli.format == OutputFormat::Json {
        print_json(&report)?;
    } else {
        println!("{}", render::validation_report(&report));
    }

    if !report.is_valid() {
        anyhow::bail!("{} has {} blocking issue(s)", airport, report.issues.len());
    }
    Ok(())
}
