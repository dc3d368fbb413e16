//! Import/Export commands

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Args, ValueEnum};
use serde::{Deserialize, Serialize};
use taxigraph_core::{
    limits, AirportGraph, ConnectionRequest, NewEdge, Node, NodeKind, NodeRequest,
};

use crate::{airport_filter, AppContext};

/// Current export format version
pub const EXPORT_VERSION: &str = "1";

/// Export format
#[derive(Clone, Copy, Default, ValueEnum)]
pub enum ExportFormat {
    #[default]
    Json,
    Csv,
    #[value(name = "graphml")]
    GraphML,
}

#[derive(Args)]
pub struct ImportArgs {
    /// Input file (JSON export)
    pub file: PathBuf,
}

#[derive(Args)]
pub struct ExportArgs {
    /// Only export this airport (default: all airports)
    #[arg(short, long)]
    pub airport: Option<String>,

    /// Output file (stdout if omitted)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Export format
    #[arg(long = "as", value_enum, default_value = "json")]
    pub export_format: ExportFormat,
}

#[derive(Debug, Serialize)]
pub struct ExportData {
    pub version: String,
    pub airports: Vec<AirportGraph>,
}

/// Import side of [`ExportData`]; edges read back as one-way connections
#[derive(Debug, Deserialize)]
pub struct ImportData {
    pub version: String,
    pub airports: Vec<ImportAirport>,
}

#[derive(Debug, Deserialize)]
pub struct ImportAirport {
    pub airport: String,
    #[serde(default)]
    pub nodes: Vec<Node>,
    #[serde(default)]
    pub edges: Vec<NewEdge>,
}

pub async fn run_import(args: &ImportArgs, ctx: &AppContext) -> anyhow::Result<()> {
    tracing::info!("Importing from {:?}", args.file);

    let content = std::fs::read_to_string(&args.file)
        .with_context(|| format!("Failed to read {}", args.file.display()))?;
    let data: ImportData = serde_json::from_str(&content)
        .with_context(|| format!("{} is not a taxigraph JSON export", args.file.display()))?;

    tracing::debug!("Import format version: {}", data.version);
    if data.version != EXPORT_VERSION {
        tracing::warn!(
            "Export version {} differs from {}; importing anyway",
            data.version,
            EXPORT_VERSION
        );
    }

    for airport_data in &data.airports {
        limits::validate_batch(airport_data.nodes.len())?;
        limits::validate_batch(airport_data.edges.len())?;
    }

    // Every node first: connections may point into another airport
    let mut total_nodes = 0;
    let mut edges = Vec::new();
    for airport_data in data.airports {
        // Same checks as producer writes: required fields, ranges, uniqueness
        for node in airport_data.nodes {
            let id = node.id.clone();
            let node = NodeRequest::from(node)
                .into_node()
                .with_context(|| format!("Invalid node {}", id))?;
            ctx.storage
                .create_node(node)
                .await
                .with_context(|| format!("Failed to import node {}", id))?;
            total_nodes += 1;
        }
        tracing::debug!("Imported nodes for {}", airport_data.airport);
        edges.extend(airport_data.edges);
    }

    let mut total_edges = 0;
    for edge in edges {
        let label = format!("{} -> {}", edge.from_id, edge.to_id);
        let created = ctx
            .storage
            .create_connection(&ConnectionRequest::from(edge))
            .await
            .with_context(|| format!("Failed to import connection {}", label))?;
        total_edges += created.len();
    }

    println!(
        "Imported {} nodes and {} connections from {:?}",
        total_nodes, total_edges, args.file
    );

    Ok(())
}

pub async fn run_export(args: &ExportArgs, ctx: &AppContext) -> anyhow::Result<()> {
    tracing::info!("Exporting data");

    let airports = match airport_filter(args.airport.as_deref())? {
        Some(code) => vec![code],
        None => ctx.storage.list_airports().await?,
    };

    let mut graphs = Vec::new();
    for airport in &airports {
        let graph = ctx.storage.load_airport(airport).await?;
        tracing::debug!(
            "Exporting {}: {} nodes, {} connections",
            airport,
            graph.nodes.len(),
            graph.edges.len()
        );
        graphs.push(graph);
    }

    let export_data = ExportData {
        version: EXPORT_VERSION.to_string(),
        airports: graphs,
    };

    let content = match args.export_format {
        ExportFormat::Json => serde_json::to_string_pretty(&export_data)?,
        ExportFormat::Csv => export_to_csv(&export_data),
        ExportFormat::GraphML => export_to_graphml(&export_data),
    };

    match &args.output {
        Some(path) => {
            write_private(path, &content)?;
            println!("Exported to {:?}", path);
        }
        None => println!("{}", content),
    }

    Ok(())
}

/// Write with owner-only permissions where supported
fn write_private(path: &Path, content: &str) -> anyhow::Result<()> {
    #[cfg(unix)]
    {
        use std::io::Write;
        use std::os::unix::fs::OpenOptionsExt;

        let mut file = std::fs::OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .mode(0o600)
            .open(path)?;
        file.write_all(content.as_bytes())?;
    }
    #[cfg(not(unix))]
    {
        std::fs::write(path, content)?;
    }
    Ok(())
}

fn kind_columns(node: &Node) -> [String; 5] {
    match &node.kind {
        NodeKind::RunwayEnd { heading, runway_id } => [
            heading.to_string(),
            runway_id.clone(),
            String::new(),
            String::new(),
            String::new(),
        ],
        NodeKind::TaxiwayIntersection { taxiways } => [
            String::new(),
            String::new(),
            taxiways.join("; "),
            String::new(),
            String::new(),
        ],
        NodeKind::HoldShort { runway, taxiway } => [
            String::new(),
            String::new(),
            String::new(),
            runway.clone(),
            taxiway.clone(),
        ],
        NodeKind::Fbo | NodeKind::Terminal | NodeKind::Ramp => Default::default(),
    }
}

fn export_to_csv(data: &ExportData) -> String {
    let mut output = String::new();

    output.push_str("# Nodes\n");
    output.push_str("airport,id,type,name,x,y,heading,runway_id,taxiways,runway,taxiway\n");

    for graph in &data.airports {
        for node in &graph.nodes {
            let mut cells = vec![
                csv_escape(&node.airport),
                csv_escape(&node.id),
                node.node_type().label().to_string(),
                csv_escape(&node.name),
                node.x.to_string(),
                node.y.to_string(),
            ];
            cells.extend(kind_columns(node).iter().map(|c| csv_escape(c)));
            output.push_str(&cells.join(","));
            output.push('\n');
        }
    }

    output.push_str("\n# Connections\n");
    output.push_str("airport,from,to,via,distance,direction,requires_hold\n");

    for graph in &data.airports {
        for edge in &graph.edges {
            output.push_str(&format!(
                "{},{},{},{},{},{},{}\n",
                csv_escape(&edge.airport),
                csv_escape(&edge.from_id),
                csv_escape(&edge.to_id),
                csv_escape(&edge.via),
                edge.distance,
                edge.direction,
                edge.requires_hold
            ));
        }
    }

    output
}

/// Escape a string for CSV output with formula injection protection
fn csv_escape(s: &str) -> String {
    // Prefix spreadsheet formula triggers with '
    let needs_formula_protection = s
        .chars()
        .next()
        .map(|c| matches!(c, '=' | '+' | '-' | '@' | '\t' | '\r'))
        .unwrap_or(false);

    let escaped = if needs_formula_protection {
        format!("'{}", s)
    } else {
        s.to_string()
    };

    if escaped.contains(',') || escaped.contains('"') || escaped.contains('\n') {
        format!("\"{}\"", escaped.replace('"', "\"\""))
    } else {
        escaped
    }
}

fn xml_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

fn export_to_graphml(data: &ExportData) -> String {
    let mut xml = String::new();

    xml.push_str(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<graphml xmlns="http://graphml.graphdrawing.org/xmlns"
         xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance"
         xsi:schemaLocation="http://graphml.graphdrawing.org/xmlns
         http://graphml.graphdrawing.org/xmlns/1.0/graphml.xsd">
  <key id="d0" for="node" attr.name="type" attr.type="string"/>
  <key id="d1" for="node" attr.name="name" attr.type="string"/>
  <key id="d2" for="node" attr.name="x" attr.type="double"/>
  <key id="d3" for="node" attr.name="y" attr.type="double"/>
  <key id="d4" for="edge" attr.name="via" attr.type="string"/>
  <key id="d5" for="edge" attr.name="distance" attr.type="int"/>
  <key id="d6" for="edge" attr.name="direction" attr.type="string"/>
  <key id="d7" for="edge" attr.name="requires_hold" attr.type="boolean"/>
"#,
    );

    for graph in &data.airports {
        xml.push_str(&format!(
            "  <graph id=\"{}\" edgedefault=\"directed\">\n",
            xml_escape(&graph.airport)
        ));

        for node in &graph.nodes {
            xml.push_str(&format!("    <node id=\"{}\">\n", xml_escape(&node.id)));
            xml.push_str(&format!(
                "      <data key=\"d0\">{}</data>\n",
                node.node_type().label()
            ));
            xml.push_str(&format!(
                "      <data key=\"d1\">{}</data>\n",
                xml_escape(&node.name)
            ));
            xml.push_str(&format!("      <data key=\"d2\">{}</data>\n", node.x));
            xml.push_str(&format!("      <data key=\"d3\">{}</data>\n", node.y));
            xml.push_str("    </node>\n");
        }

        for edge in &graph.edges {
            xml.push_str(&format!(
                "    <edge id=\"{}\" source=\"{}\" target=\"{}\">\n",
                edge.id,
                xml_escape(&edge.from_id),
                xml_escape(&edge.to_id)
            ));
            xml.push_str(&format!(
                "      <data key=\"d4\">{}</data>\n",
                xml_escape(&edge.via)
            ));
            xml.push_str(&format!("      <data key=\"d5\">{}</data>\n", edge.distance));
            xml.push_str(&format!("      <data key=\"d6\">{}</data>\n", edge.direction));
            xml.push_str(&format!(
                "      <data key=\"d7\">{}</data>\n",
                edge.requires_hold
            ));
            xml.push_str("    </edge>\n");
        }

        xml.push_str("  </graph>\n");
    }

    xml.push_str("</graphml>\n");
    xml
}

#[cfg(test)]
mod tests {
    use super::*;
    use taxigraph_core::{Direction, Edge};

    fn sample() -> ExportData {
        let nodes = vec![
            Node::new("KTST_rwy_09", "KTST", "09", NodeKind::runway_end(90, "09_27")).at(10.0, 50.0),
            Node::new("KTST_fbo", "KTST", "Smith & Sons, Inc", NodeKind::Fbo),
        ];
        let edges = vec![Edge::new(
            "KTST",
            NewEdge::new("KTST_rwy_09", "KTST_fbo", "ramp", 3, Direction::N),
        )];
        ExportData {
            version: EXPORT_VERSION.to_string(),
            airports: vec![AirportGraph::new("KTST").with_nodes(nodes).with_edges(edges)],
        }
    }

    #[test]
    fn test_csv_escape() {
        assert_eq!(csv_escape("plain"), "plain");
        assert_eq!(csv_escape("a,b"), "\"a,b\"");
        assert_eq!(csv_escape("=SUM(A1)"), "'=SUM(A1)");
        assert_eq!(csv_escape("say \"hi\""), "\"say \"\"hi\"\"\"");
    }

    #[test]
    fn test_csv_sections() {
        let csv = export_to_csv(&sample());
        assert!(csv.contains("KTST,KTST_rwy_09,RunwayEnd,09,10,50,90,09_27,,,\n"));
        assert!(csv.contains("\"Smith & Sons, Inc\""));
        assert!(csv.contains("KTST,KTST_rwy_09,KTST_fbo,ramp,3,N,false\n"));
    }

    #[test]
    fn test_graphml_escapes_names() {
        let xml = export_to_graphml(&sample());
        assert!(xml.contains("<graph id=\"KTST\" edgedefault=\"directed\">"));
        assert!(xml.contains("Smith &amp; Sons, Inc"));
        assert!(xml.contains("source=\"KTST_rwy_09\" target=\"KTST_fbo\""));
        assert!(xml.trim_end().ends_with("</graphml>"));
    }

    #[test]
    fn test_json_export_reads_back() {
        let json = serde_json::to_string(&sample()).unwrap();
        let data: ImportData = serde_json::from_str(&json).unwrap();
        assert_eq!(data.airports[0].nodes.len(), 2);
        assert_eq!(data.airports[0].edges[0].via, "ramp");
        assert_eq!(data.airports[0].edges[0].direction, Direction::N);
    }
}
