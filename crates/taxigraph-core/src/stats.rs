//! Aggregate counts over a graph

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::node::{Node, NodeType};

/// Node and edge counts for one airport or the whole store
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphStats {
    pub total_nodes: usize,
    pub total_edges: usize,
    /// Only types with at least one node appear here
    pub nodes_by_type: BTreeMap<NodeType, usize>,
}

impl GraphStats {
    pub fn from_nodes(nodes: &[Node], total_edges: usize) -> Self {
        let mut nodes_by_type = BTreeMap::new();
        for node in nodes {
            *nodes_by_type.entry(node.node_type()).or_insert(0) += 1;
        }

        Self {
            total_nodes: nodes.len(),
            total_edges,
            nodes_by_type,
        }
    }

    pub fn count(&self, node_type: NodeType) -> usize {
        self.nodes_by_type.get(&node_type).copied().unwrap_or(0)
    }
}
