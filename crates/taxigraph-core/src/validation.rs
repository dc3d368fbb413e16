//! Structural checks over one airport's graph
//!
//! Findings are data. Issues mark a graph that cannot be used as is,
//! warnings mark something that looks incomplete.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::graph::AirportGraph;
use crate::node::NodeType;

/// Graphs smaller than this are probably not finished
pub const MIN_EXPECTED_NODES: usize = 5;
pub const MIN_EXPECTED_EDGES: usize = 5;

/// Intersections are expected to branch
pub const MIN_INTERSECTION_EDGES: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Issue,
    Warning,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Finding {
    OrphanNode { id: String, node_type: NodeType },
    UnreachableDestination { id: String, node_type: NodeType },
    DanglingReference { from: String, to: String, missing: String },
    OddRunwayEndCount { count: usize },
    UnpairedRunway { runway_id: String, ends: usize },
    HoldShortNotAtRunway { id: String },
    UnderConnectedIntersection { id: String, edges: usize },
    FewNodes { count: usize },
    FewEdges { count: usize },
}

impl Finding {
    pub fn severity(&self) -> Severity {
        match self {
            Self::OrphanNode { .. }
            | Self::UnreachableDestination { .. }
            | Self::DanglingReference { .. } => Severity::Issue,
            _ => Severity::Warning,
        }
    }
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OrphanNode { id, node_type } => {
                write!(f, "Orphan node with no connections: {} ({})", id, node_type)
            }
            Self::UnreachableDestination { id, node_type } => {
                write!(f, "{} {} has no connections and cannot be reached", node_type, id)
            }
            Self::DanglingReference { from, to, missing } => {
                write!(f, "Connection {} -> {} references missing node {}", from, to, missing)
            }
            Self::OddRunwayEndCount { count } => write!(
                f,
                "Odd number of runway ends ({}); each runway should have two",
                count
            ),
            Self::UnpairedRunway { runway_id, ends } => {
                write!(f, "Runway {} has {} end(s), expected 2", runway_id, ends)
            }
            Self::HoldShortNotAtRunway { id } => {
                write!(f, "Hold short {} is not connected to a runway end", id)
            }
            Self::UnderConnectedIntersection { id, edges } => write!(
                f,
                "Taxiway intersection {} has only {} connection(s)",
                id, edges
            ),
            Self::FewNodes { count } => {
                write!(f, "Only {} nodes; graph may be incomplete", count)
            }
            Self::FewEdges { count } => {
                write!(f, "Only {} connections; graph may be incomplete", count)
            }
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub airport: String,
    pub node_count: usize,
    pub edge_count: usize,
    pub issues: Vec<Finding>,
    pub warnings: Vec<Finding>,
}

impl ValidationReport {
    /// No blocking findings
    pub fn is_valid(&self) -> bool {
        self.issues.is_empty()
    }

    fn push(&mut self, finding: Finding) {
        match finding.severity() {
            Severity::Issue => self.issues.push(finding),
            Severity::Warning => self.warnings.push(finding),
        }
    }
}

/// Run every check against an airport snapshot
pub fn validate(graph: &AirportGraph) -> ValidationReport {
    let mut report = ValidationReport {
        airport: graph.airport.clone(),
        node_count: graph.nodes.len(),
        edge_count: graph.edges.len(),
        ..Default::default()
    };

    let degrees = graph.degrees();
    let nodes = graph.node_index();

    for node in &graph.nodes {
        if degrees.get(node.id.as_str()).copied().unwrap_or(0) == 0 {
            report.push(Finding::OrphanNode {
                id: node.id.clone(),
                node_type: node.node_type(),
            });
        }
    }

    let runway_ends: Vec<_> = graph.nodes_of_type(NodeType::RunwayEnd).collect();
    if runway_ends.len() % 2 != 0 {
        report.push(Finding::OddRunwayEndCount {
            count: runway_ends.len(),
        });
    }

    let mut runways: BTreeMap<&str, usize> = BTreeMap::new();
    for end in &runway_ends {
        if let Some(runway_id) = end.runway_id() {
            *runways.entry(runway_id).or_insert(0) += 1;
        }
    }
    for (runway_id, ends) in runways {
        if ends != 2 {
            report.push(Finding::UnpairedRunway {
                runway_id: runway_id.to_string(),
                ends,
            });
        }
    }

    for hold in graph.nodes_of_type(NodeType::HoldShort) {
        let at_runway = graph.incident_edges(&hold.id).any(|edge| {
            edge.other_end(&hold.id)
                .and_then(|id| nodes.get(id))
                .is_some_and(|n| n.node_type() == NodeType::RunwayEnd)
        });
        if !at_runway {
            report.push(Finding::HoldShortNotAtRunway {
                id: hold.id.clone(),
            });
        }
    }

    for intersection in graph.nodes_of_type(NodeType::TaxiwayIntersection) {
        let edges = degrees.get(intersection.id.as_str()).copied().unwrap_or(0);
        if edges < MIN_INTERSECTION_EDGES {
            report.push(Finding::UnderConnectedIntersection {
                id: intersection.id.clone(),
                edges,
            });
        }
    }

    for node in graph.nodes.iter().filter(|n| n.node_type().is_destination()) {
        if degrees.get(node.id.as_str()).copied().unwrap_or(0) == 0 {
            report.push(Finding::UnreachableDestination {
                id: node.id.clone(),
                node_type: node.node_type(),
            });
        }
    }

    for edge in &graph.edges {
        for endpoint in [&edge.from_id, &edge.to_id] {
            if !nodes.contains_key(endpoint.as_str()) {
                report.push(Finding::DanglingReference {
                    from: edge.from_id.clone(),
                    to: edge.to_id.clone(),
                    missing: endpoint.clone(),
                });
            }
        }
    }

    if report.node_count < MIN_EXPECTED_NODES {
        report.push(Finding::FewNodes {
            count: report.node_count,
        });
    }
    if report.edge_count < MIN_EXPECTED_EDGES {
        report.push(Finding::FewEdges {
            count: report.edge_count,
        });
    }

    tracing::debug!(
        "Validated {}: {} issue(s), {} warning(s)",
        report.airport,
        report.issues.len(),
        report.warnings.len()
    );

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::edge::{Direction, Edge, NewEdge};
    use crate::node::{Node, NodeKind};

    fn connect(graph: &mut AirportGraph, from: &str, to: &str) {
        let edge = NewEdge::new(from, to, "A", 1, Direction::E);
        let back = edge.reversed();
        graph.edges.push(Edge::new(&graph.airport, edge));
        graph.edges.push(Edge::new(&graph.airport, back));
    }

    /// Two runway ends, two intersections, a hold short and a ramp, all connected
    fn well_formed() -> AirportGraph {
        let mut graph = AirportGraph::new("KTST").with_nodes(vec![
            Node::new("rwy_09", "KTST", "09", NodeKind::runway_end(90, "09_27")),
            Node::new("rwy_27", "KTST", "27", NodeKind::runway_end(270, "09_27")),
            Node::new("twy_A", "KTST", "A", NodeKind::taxiway_intersection(["A"])),
            Node::new("twy_B", "KTST", "B", NodeKind::taxiway_intersection(["A", "B"])),
            Node::new("hold_A_27", "KTST", "A/27", NodeKind::hold_short("27", "A")),
            Node::new("ramp", "KTST", "Main Ramp", NodeKind::Ramp),
        ]);
        connect(&mut graph, "rwy_09", "twy_A");
        connect(&mut graph, "twy_A", "twy_B");
        connect(&mut graph, "twy_B", "ramp");
        connect(&mut graph, "twy_B", "hold_A_27");
        connect(&mut graph, "hold_A_27", "rwy_27");
        graph
    }

    #[test]
    fn test_well_formed_graph_is_clean() {
        let report = validate(&well_formed());
        assert!(report.is_valid(), "{:?}", report.issues);
        assert!(report.warnings.is_empty(), "{:?}", report.warnings);
        assert_eq!(report.node_count, 6);
        assert_eq!(report.edge_count, 10);
    }

    #[test]
    fn test_orphan_fbo_is_issue() {
        let mut graph = well_formed();
        graph
            .nodes
            .push(Node::new("fbo", "KTST", "Atlantic", NodeKind::Fbo));

        let report = validate(&graph);
        assert!(report.issues.contains(&Finding::OrphanNode {
            id: "fbo".into(),
            node_type: NodeType::Fbo
        }));
        assert!(report.issues.contains(&Finding::UnreachableDestination {
            id: "fbo".into(),
            node_type: NodeType::Fbo
        }));
    }

    #[test]
    fn test_orphan_terminal_is_only_orphan() {
        let mut graph = well_formed();
        graph
            .nodes
            .push(Node::new("term", "KTST", "Main", NodeKind::Terminal));

        let report = validate(&graph);
        assert_eq!(report.issues.len(), 1);
        assert!(matches!(report.issues[0], Finding::OrphanNode { .. }));
    }

    #[test]
    fn test_single_edge_intersection_warns() {
        let mut graph = well_formed();
        graph.nodes.push(Node::new(
            "twy_C",
            "KTST",
            "C",
            NodeKind::taxiway_intersection(["C"]),
        ));
        graph
            .edges
            .push(Edge::new("KTST", NewEdge::new("twy_B", "twy_C", "C", 1, Direction::N)));

        let report = validate(&graph);
        assert!(report.warnings.contains(&Finding::UnderConnectedIntersection {
            id: "twy_C".into(),
            edges: 1
        }));
        assert!(report.is_valid());
    }

    #[test]
    fn test_odd_runway_ends_warn() {
        let mut graph = well_formed();
        graph.nodes.push(Node::new(
            "rwy_18",
            "KTST",
            "18",
            NodeKind::runway_end(180, "18_36"),
        ));
        connect(&mut graph, "rwy_18", "twy_A");

        let report = validate(&graph);
        assert!(report
            .warnings
            .contains(&Finding::OddRunwayEndCount { count: 3 }));
        assert!(report.warnings.contains(&Finding::UnpairedRunway {
            runway_id: "18_36".into(),
            ends: 1
        }));
    }

    #[test]
    fn test_hold_short_away_from_runway_warns() {
        let mut graph = well_formed();
        graph.nodes.push(Node::new(
            "hold_B",
            "KTST",
            "B/09",
            NodeKind::hold_short("09", "B"),
        ));
        connect(&mut graph, "hold_B", "twy_B");

        let report = validate(&graph);
        assert!(report.warnings.contains(&Finding::HoldShortNotAtRunway {
            id: "hold_B".into()
        }));
    }

    #[test]
    fn test_dangling_reference_is_issue() {
        let mut graph = well_formed();
        graph.nodes.retain(|n| n.id != "ramp");

        let report = validate(&graph);
        assert!(report.issues.iter().any(|f| matches!(
            f,
            Finding::DanglingReference { missing, .. } if missing == "ramp"
        )));
    }

    #[test]
    fn test_small_graph_warns() {
        let report = validate(&AirportGraph::new("KTST"));
        assert!(report.is_valid());
        assert!(report.warnings.contains(&Finding::FewNodes { count: 0 }));
        assert!(report.warnings.contains(&Finding::FewEdges { count: 0 }));
    }

    #[test]
    fn test_finding_serialization() {
        let value = serde_json::to_value(Finding::FewEdges { count: 3 }).unwrap();
        assert_eq!(value["kind"], "few_edges");
        assert_eq!(value["count"], 3);
        assert_eq!(
            Finding::FewEdges { count: 3 }.to_string(),
            "Only 3 connections; graph may be incomplete"
        );
    }
}
