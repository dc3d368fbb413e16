//! Connection commands

use clap::{Args, Subcommand};
use taxigraph_core::{ConnectionRequest, Direction, Edge};

use crate::output::{print_json, table, OutputFormat};
use crate::{airport_filter, AppContext, Cli};

#[derive(Args)]
pub struct EdgeArgs {
    #[command(subcommand)]
    pub command: EdgeCommands,
}

#[derive(Subcommand)]
pub enum EdgeCommands {
    /// Connect two nodes (both directions unless --one-way)
    Add {
        /// Source node id
        from: String,
        /// Destination node id
        to: String,
        /// Surface: taxiway name, runway or ramp
        #[arg(long)]
        via: String,
        /// Relative distance (1-10)
        #[arg(long)]
        distance: i64,
        /// Direction of travel from source to destination (N, NE, E, ...)
        #[arg(long)]
        direction: String,
        /// Connection crosses a runway
        #[arg(long)]
        hold: bool,
        /// Do not create the reverse connection
        #[arg(long)]
        one_way: bool,
    },
    /// List connections
    List {
        /// Filter by airport of the source node
        #[arg(short, long)]
        airport: Option<String>,
    },
}

fn print_edges(edges: &[Edge]) {
    let rows: Vec<Vec<String>> = edges
        .iter()
        .map(|e| {
            vec![
                e.from_id.clone(),
                e.to_id.clone(),
                e.via.clone(),
                e.distance.to_string(),
                e.direction.to_string(),
                if e.requires_hold { "yes" } else { "" }.to_string(),
            ]
        })
        .collect();
    println!(
        "{}",
        table(&["FROM", "TO", "VIA", "DIST", "DIR", "HOLD"], &rows)
    );
}

pub async fn run(args: &EdgeArgs, cli: &Cli, ctx: &AppContext) -> anyhow::Result<()> {
    match &args.command {
        EdgeCommands::Add {
            from,
            to,
            via,
            distance,
            direction,
            hold,
            one_way,
        } => {
            let direction: Direction = direction.parse()?;
            let mut request = ConnectionRequest::new(from, to, via, *distance, direction);
            if *hold {
                request = request.with_hold();
            }
            if *one_way {
                request = request.one_way();
            }

            let edges = ctx.storage.create_connection(&request).await?;
            tracing::info!("Created {} edge(s) {} -> {}", edges.len(), from, to);

            if cli.format == OutputFormat::Json {
                return print_json(&edges);
            }
            let suffix = if edges.len() > 1 { " (bidirectional)" } else { "" };
            println!("Created connection: {} -> {} via {}{}", from, to, via, suffix);
        }
        EdgeCommands::List { airport } => {
            let airport = airport_filter(airport.as_deref())?;
            let edges = ctx.storage.list_edges(airport.as_deref()).await?;

            if cli.format == OutputFormat::Json {
                return print_json(&edges);
            }
            if edges.is_empty() {
                println!("No connections found.");
            } else {
                print_edges(&edges);
            }
        }
    }

    Ok(())
}
