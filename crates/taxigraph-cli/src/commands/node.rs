//! Node commands

use clap::{Args, Subcommand};
use taxigraph_core::{Node, NodeKind, NodeRequest, NodeType};

use crate::output::{print_json, table, OutputFormat};
use crate::{airport_filter, AppContext, Cli};

#[derive(Args)]
pub struct NodeArgs {
    #[command(subcommand)]
    pub command: NodeCommands,
}

#[derive(Subcommand)]
pub enum NodeCommands {
    /// Add a node
    Add {
        /// Node id, unique across all airports (e.g. KDPA_rwy_27L)
        id: String,
        /// Display name
        name: String,
        /// Node type: runway_end, taxiway_intersection, hold_short, fbo, terminal, ramp
        #[arg(short = 't', long = "type")]
        node_type: String,
        /// ICAO airport code
        #[arg(short, long)]
        airport: Option<String>,
        /// Diagram X position (0-100)
        #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
        x: f64,
        /// Diagram Y position (0-100)
        #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
        y: f64,
        /// Magnetic heading (runway_end)
        #[arg(long)]
        heading: Option<i64>,
        /// Runway pairing key (runway_end)
        #[arg(long)]
        runway_id: Option<String>,
        /// Taxiways at this point, comma separated (taxiway_intersection)
        #[arg(long, value_delimiter = ',')]
        taxiways: Option<Vec<String>>,
        /// Runway held short of (hold_short)
        #[arg(long)]
        runway: Option<String>,
        /// Taxiway the hold line is on (hold_short)
        #[arg(long)]
        taxiway: Option<String>,
    },
    /// List nodes
    List {
        /// Filter by airport
        #[arg(short, long)]
        airport: Option<String>,
        /// Filter by type
        #[arg(short = 't', long = "type")]
        node_type: Option<String>,
    },
    /// Show one node
    Get {
        /// Node id
        id: String,
    },
}

fn details(node: &Node) -> String {
    match &node.kind {
        NodeKind::RunwayEnd { heading, runway_id } => {
            format!("heading {:03}, runway {}", heading, runway_id)
        }
        NodeKind::TaxiwayIntersection { taxiways } => format!("taxiways {}", taxiways.join("/")),
        NodeKind::HoldShort { runway, taxiway } => format!("{} short of {}", taxiway, runway),
        NodeKind::Fbo | NodeKind::Terminal | NodeKind::Ramp => String::new(),
    }
}

fn print_nodes(nodes: &[Node]) {
    let rows: Vec<Vec<String>> = nodes
        .iter()
        .map(|n| {
            vec![
                n.id.clone(),
                n.airport.clone(),
                n.node_type().label().to_string(),
                n.name.clone(),
                format!("{:.0},{:.0}", n.x, n.y),
                details(n),
            ]
        })
        .collect();
    println!(
        "{}",
        table(&["ID", "AIRPORT", "TYPE", "NAME", "POS", "DETAILS"], &rows)
    );
}

pub async fn run(args: &NodeArgs, cli: &Cli, ctx: &AppContext) -> anyhow::Result<()> {
    match &args.command {
        NodeCommands::Add {
            id,
            name,
            node_type,
            airport,
            x,
            y,
            heading,
            runway_id,
            taxiways,
            runway,
            taxiway,
        } => {
            let request = NodeRequest {
                node_type: node_type.clone(),
                airport: ctx.airport(airport.as_deref())?,
                id: id.clone(),
                name: name.clone(),
                x: *x,
                y: *y,
                heading: *heading,
                runway_id: runway_id.clone(),
                taxiways: taxiways.clone(),
                runway: runway.clone(),
                taxiway: taxiway.clone(),
            };

            let node = ctx.storage.create_node(request.into_node()?).await?;
            tracing::info!("Created node {} in {}", node.id, node.airport);

            if cli.format == OutputFormat::Json {
                return print_json(&node);
            }
            println!(
                "Created {} node: {} (id: {})",
                node.node_type().tool_name(),
                node.name,
                node.id
            );
        }
        NodeCommands::List { airport, node_type } => {
            let airport = airport_filter(airport.as_deref())?;
            let node_type: Option<NodeType> = node_type.as_deref().map(str::parse).transpose()?;

            let nodes: Vec<Node> = ctx
                .storage
                .list_nodes(airport.as_deref())
                .await?
                .into_iter()
                .filter(|n| node_type.map_or(true, |t| n.node_type() == t))
                .collect();

            if cli.format == OutputFormat::Json {
                return print_json(&nodes);
            }
            if nodes.is_empty() {
                println!("No nodes found.");
            } else {
                print_nodes(&nodes);
            }
        }
        NodeCommands::Get { id } => match ctx.storage.get_node(id).await? {
            Some(node) if cli.format == OutputFormat::Json => print_json(&node)?,
            Some(node) => print_nodes(std::slice::from_ref(&node)),
            None => anyhow::bail!("Node '{}' not found", id),
        },
    }

    Ok(())
}
