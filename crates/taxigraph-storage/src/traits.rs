//! Storage backend trait definitions

use crate::error::StorageResult;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use taxigraph_core::{
    validation, AirportGraph, ConnectionRequest, Edge, GraphStats, NewEdge, Node, PathFinder,
    PathOutcome, PathQuery, ValidationReport,
};

/// What a `clear` removed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClearSummary {
    pub nodes: usize,
    pub edges: usize,
}

/// Trait for storage backend implementations
///
/// Every write (`create_node`, `create_edge`, `clear`) is atomic on its own.
/// Airport filters are compared verbatim, so callers pass normalized codes.
#[async_trait]
pub trait StorageBackend: Send + Sync {
    /// Initialize the storage (create tables, etc.). Safe to repeat.
    async fn initialize(&self) -> StorageResult<()>;

    /// Close the storage connection
    async fn close(&self) -> StorageResult<()>;

    /// Health check
    async fn health_check(&self) -> StorageResult<bool>;

    // ─────────────────────────────────────────────────────────────────────────
    // Node Operations
    // ─────────────────────────────────────────────────────────────────────────

    /// Persist a node. Fails with `DuplicateId` if the id is taken by any
    /// node of any airport; the existing node is left untouched.
    async fn create_node(&self, node: Node) -> StorageResult<Node>;

    /// Get a node by id
    async fn get_node(&self, id: &str) -> StorageResult<Option<Node>>;

    /// Nodes ordered by airport, type label, name
    async fn list_nodes(&self, airport: Option<&str>) -> StorageResult<Vec<Node>>;

    // ─────────────────────────────────────────────────────────────────────────
    // Edge Operations
    // ─────────────────────────────────────────────────────────────────────────

    /// Persist one directed edge. Both endpoints must exist; the edge takes
    /// the airport of its source node. Parallel edges are allowed.
    async fn create_edge(&self, edge: NewEdge) -> StorageResult<Edge>;

    /// Edges in creation order, filtered by source-node airport
    async fn list_edges(&self, airport: Option<&str>) -> StorageResult<Vec<Edge>>;

    // ─────────────────────────────────────────────────────────────────────────
    // Bulk Operations
    // ─────────────────────────────────────────────────────────────────────────

    /// Delete one airport's nodes plus every edge touching them, or
    /// everything when `airport` is `None`
    async fn clear(&self, airport: Option<&str>) -> StorageResult<ClearSummary>;

    /// Distinct airport codes, sorted
    async fn list_airports(&self) -> StorageResult<Vec<String>> {
        let mut airports: Vec<String> = self
            .list_nodes(None)
            .await?
            .into_iter()
            .map(|n| n.airport)
            .collect();
        airports.sort();
        airports.dedup();
        Ok(airports)
    }

    /// Create the edges of a connection: forward, then reverse when
    /// bidirectional
    async fn create_connection(&self, request: &ConnectionRequest) -> StorageResult<Vec<Edge>> {
        let mut created = Vec::new();
        for edge in request.edges()? {
            created.push(self.create_edge(edge).await?);
        }
        Ok(created)
    }

    /// Node and edge counts
    async fn stats(&self, airport: Option<&str>) -> StorageResult<GraphStats> {
        let nodes = self.list_nodes(airport).await?;
        let edges = self.list_edges(airport).await?;
        Ok(GraphStats::from_nodes(&nodes, edges.len()))
    }

    /// Snapshot of one airport for path finding and validation
    async fn load_airport(&self, airport: &str) -> StorageResult<AirportGraph> {
        let nodes = self.list_nodes(Some(airport)).await?;
        let edges = self.list_edges(Some(airport)).await?;
        Ok(AirportGraph::new(airport)
            .with_nodes(nodes)
            .with_edges(edges))
    }

    /// Shortest route by hop count within one airport
    async fn find_path(&self, airport: &str, start: &str, end: &str) -> StorageResult<PathOutcome> {
        self.find_route(airport, &PathQuery::new(start, end)).await
    }

    /// Shortest route within one airport under the query's metric
    async fn find_route(&self, airport: &str, query: &PathQuery) -> StorageResult<PathOutcome> {
        let graph = self.load_airport(airport).await?;
        Ok(PathFinder::execute(query, &graph))
    }

    /// Structural checks for one airport
    async fn validate(&self, airport: &str) -> StorageResult<ValidationReport> {
        let graph = self.load_airport(airport).await?;
        Ok(validation::validate(&graph))
    }
}
