//! Per-airport graph snapshot

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::edge::Edge;
use crate::node::{Node, NodeType};

/// Nodes and edges of one airport, as read from the store
///
/// Edges are those whose source node belongs to the airport. Their other
/// endpoint may be missing from `nodes` (cross-airport or deleted).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AirportGraph {
    pub airport: String,
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
}

impl AirportGraph {
    pub fn new(airport: impl Into<String>) -> Self {
        Self {
            airport: airport.into(),
            ..Default::default()
        }
    }

    pub fn with_nodes(mut self, nodes: Vec<Node>) -> Self {
        self.nodes = nodes;
        self
    }

    pub fn with_edges(mut self, edges: Vec<Edge>) -> Self {
        self.edges = edges;
        self
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.edges.is_empty()
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id == id)
    }

    /// Index of nodes by id
    pub fn node_index(&self) -> HashMap<&str, &Node> {
        self.nodes.iter().map(|n| (n.id.as_str(), n)).collect()
    }

    pub fn node_ids(&self) -> HashSet<&str> {
        self.nodes.iter().map(|n| n.id.as_str()).collect()
    }

    pub fn nodes_of_type(&self, node_type: NodeType) -> impl Iterator<Item = &Node> {
        self.nodes.iter().filter(move |n| n.node_type() == node_type)
    }

    /// Edges touching `id` in either direction
    pub fn incident_edges<'a>(&'a self, id: &'a str) -> impl Iterator<Item = &'a Edge> + 'a {
        self.edges.iter().filter(move |e| e.touches(id))
    }

    /// Incident edge count for every node, zero included
    pub fn degrees(&self) -> HashMap<&str, usize> {
        let mut degrees: HashMap<&str, usize> =
            self.nodes.iter().map(|n| (n.id.as_str(), 0)).collect();

        for edge in &self.edges {
            if let Some(d) = degrees.get_mut(edge.from_id.as_str()) {
                *d += 1;
            }
            if edge.to_id != edge.from_id {
                if let Some(d) = degrees.get_mut(edge.to_id.as_str()) {
                    *d += 1;
                }
            }
        }

        degrees
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::edge::{Direction, NewEdge};
    use crate::node::NodeKind;

    #[test]
    fn test_degrees_count_both_directions() {
        let graph = AirportGraph::new("KTST")
            .with_nodes(vec![
                Node::new("a", "KTST", "A", NodeKind::taxiway_intersection(["A"])),
                Node::new("b", "KTST", "B", NodeKind::Ramp),
                Node::new("c", "KTST", "C", NodeKind::Terminal),
            ])
            .with_edges(vec![
                Edge::new("KTST", NewEdge::new("a", "b", "A", 1, Direction::E)),
                Edge::new("KTST", NewEdge::new("b", "a", "A", 1, Direction::W)),
            ]);

        let degrees = graph.degrees();
        assert_eq!(degrees["a"], 2);
        assert_eq!(degrees["b"], 2);
        assert_eq!(degrees["c"], 0);
        assert_eq!(graph.incident_edges("a").count(), 2);
        assert_eq!(graph.nodes_of_type(NodeType::Ramp).count(), 1);
    }
}
