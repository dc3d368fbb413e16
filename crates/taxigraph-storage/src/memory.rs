//! In-memory storage backend for testing

use crate::error::{StorageError, StorageResult};
use crate::traits::{ClearSummary, StorageBackend};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::RwLock;
use taxigraph_core::{Edge, NewEdge, Node};

#[derive(Default)]
struct State {
    nodes: HashMap<String, Node>,
    edges: Vec<Edge>,
}

/// In-memory storage backend
///
/// Useful for testing and temporary storage. One lock covers nodes and
/// edges so every check-and-insert happens under a single write guard.
#[derive(Default)]
pub struct MemoryStorage {
    state: RwLock<State>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl StorageBackend for MemoryStorage {
    async fn initialize(&self) -> StorageResult<()> {
        Ok(())
    }

    async fn close(&self) -> StorageResult<()> {
        Ok(())
    }

    async fn health_check(&self) -> StorageResult<bool> {
        Ok(self.state.read().is_ok())
    }

    async fn create_node(&self, node: Node) -> StorageResult<Node> {
        let mut state = self.state.write().map_err(StorageError::lock)?;

        if state.nodes.contains_key(&node.id) {
            return Err(StorageError::DuplicateId(node.id));
        }

        tracing::debug!("Created {} {} in {}", node.node_type(), node.id, node.airport);
        state.nodes.insert(node.id.clone(), node.clone());
        Ok(node)
    }

    async fn get_node(&self, id: &str) -> StorageResult<Option<Node>> {
        let state = self.state.read().map_err(StorageError::lock)?;
        Ok(state.nodes.get(id).cloned())
    }

    async fn list_nodes(&self, airport: Option<&str>) -> StorageResult<Vec<Node>> {
        let state = self.state.read().map_err(StorageError::lock)?;

        let mut nodes: Vec<Node> = state
            .nodes
            .values()
            .filter(|n| airport.map_or(true, |a| n.airport == a))
            .cloned()
            .collect();
        nodes.sort_by(|a, b| a.sort_key().cmp(&b.sort_key()));

        Ok(nodes)
    }

    async fn create_edge(&self, edge: NewEdge) -> StorageResult<Edge> {
        let mut state = self.state.write().map_err(StorageError::lock)?;

        let airport = match state.nodes.get(&edge.from_id) {
            Some(from) => from.airport.clone(),
            None => {
                return Err(StorageError::DanglingReference {
                    missing: edge.from_id.clone(),
                    from: edge.from_id,
                    to: edge.to_id,
                })
            }
        };
        if !state.nodes.contains_key(&edge.to_id) {
            return Err(StorageError::DanglingReference {
                missing: edge.to_id.clone(),
                from: edge.from_id,
                to: edge.to_id,
            });
        }

        let edge = Edge::new(airport, edge);
        tracing::debug!("Created edge {} -> {} via {}", edge.from_id, edge.to_id, edge.via);
        state.edges.push(edge.clone());
        Ok(edge)
    }

    async fn list_edges(&self, airport: Option<&str>) -> StorageResult<Vec<Edge>> {
        let state = self.state.read().map_err(StorageError::lock)?;
        Ok(state
            .edges
            .iter()
            .filter(|e| airport.map_or(true, |a| e.airport == a))
            .cloned()
            .collect())
    }

    async fn clear(&self, airport: Option<&str>) -> StorageResult<ClearSummary> {
        let mut state = self.state.write().map_err(StorageError::lock)?;

        let Some(airport) = airport else {
            let summary = ClearSummary {
                nodes: state.nodes.len(),
                edges: state.edges.len(),
            };
            *state = State::default();
            return Ok(summary);
        };

        let removed: HashSet<String> = state
            .nodes
            .values()
            .filter(|n| n.airport == airport)
            .map(|n| n.id.clone())
            .collect();

        let edges_before = state.edges.len();
        state.nodes.retain(|id, _| !removed.contains(id));
        state.edges.retain(|e| {
            e.airport != airport && !removed.contains(&e.from_id) && !removed.contains(&e.to_id)
        });

        tracing::debug!("Cleared {} node(s) from {}", removed.len(), airport);
        Ok(ClearSummary {
            nodes: removed.len(),
            edges: edges_before - state.edges.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conformance;

    #[tokio::test]
    async fn test_node_round_trip() {
        conformance::node_round_trip(&MemoryStorage::new()).await;
    }

    #[tokio::test]
    async fn test_duplicate_id() {
        conformance::duplicate_id_leaves_original(&MemoryStorage::new()).await;
    }

    #[tokio::test]
    async fn test_dangling_edge() {
        conformance::dangling_edge_rejected(&MemoryStorage::new()).await;
    }

    #[tokio::test]
    async fn test_bidirectional_connection() {
        conformance::bidirectional_connection(&MemoryStorage::new()).await;
    }

    #[tokio::test]
    async fn test_listing_order_and_filters() {
        conformance::listing_order_and_filters(&MemoryStorage::new()).await;
    }

    #[tokio::test]
    async fn test_clear() {
        conformance::clear_one_then_all(&MemoryStorage::new()).await;
    }

    #[tokio::test]
    async fn test_cross_airport_edge() {
        conformance::cross_airport_edge_stays_with_source(&MemoryStorage::new()).await;
    }

    #[tokio::test]
    async fn test_ktst_scenario() {
        conformance::ktst_scenario(&MemoryStorage::new()).await;
    }
}
