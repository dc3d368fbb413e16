//! ReDB storage backend

use crate::error::{StorageError, StorageResult};
use crate::migration::Migratable;
use crate::traits::{ClearSummary, StorageBackend};
use async_trait::async_trait;
use redb::{Database, ReadableTable, ReadableTableMetadata, TableDefinition};
use std::path::Path;
use taxigraph_core::{Edge, NewEdge, Node};

// Table definitions
const NODES: TableDefinition<&str, &[u8]> = TableDefinition::new("nodes");
/// Keyed by a sequence number so iteration yields creation order
const EDGES: TableDefinition<u64, &[u8]> = TableDefinition::new("edges");
const META: TableDefinition<&str, u64> = TableDefinition::new("meta");

const SCHEMA_VERSION_KEY: &str = "schema_version";

/// ReDB storage backend
///
/// redb serializes write transactions and gives readers an MVCC snapshot,
/// so the database handle is shared without an extra lock.
pub struct RedbStorage {
    db: Database,
}

impl RedbStorage {
    /// Open or create a ReDB database at the given path
    pub fn open(path: impl AsRef<Path>) -> StorageResult<Self> {
        let db = Database::create(path).map_err(|e| StorageError::Connection(e.to_string()))?;

        let storage = Self { db };
        storage.create_tables()?;
        storage.migrate_to_latest()?;

        Ok(storage)
    }

    fn create_tables(&self) -> StorageResult<()> {
        let write_txn = self.db.begin_write()?;
        {
            write_txn.open_table(NODES)?;
            write_txn.open_table(EDGES)?;
            write_txn.open_table(META)?;
        }
        write_txn.commit()?;
        Ok(())
    }

    /// Number of stored edges across every airport
    pub fn edge_count(&self) -> StorageResult<u64> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(EDGES)?;
        Ok(table.len()?)
    }
}

impl Migratable for RedbStorage {
    fn get_schema_version(&self) -> StorageResult<u32> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(META)?;
        let version = table.get(SCHEMA_VERSION_KEY)?.map_or(0, |v| v.value());
        u32::try_from(version)
            .map_err(|_| StorageError::Migration(format!("Bad schema version {}", version)))
    }

    fn set_schema_version(&self, version: u32) -> StorageResult<()> {
        let write_txn = self.db.begin_write()?;
        {
            let mut table = write_txn.open_table(META)?;
            table.insert(SCHEMA_VERSION_KEY, u64::from(version))?;
        }
        write_txn.commit()?;
        Ok(())
    }

    fn run_migration(&self, version: u32) -> StorageResult<()> {
        match version {
            // Tables are created on open
            1 => Ok(()),
            v => Err(StorageError::Migration(format!("Unknown schema version {}", v))),
        }
    }
}

#[async_trait]
impl StorageBackend for RedbStorage {
    async fn initialize(&self) -> StorageResult<()> {
        self.create_tables()?;
        self.migrate_to_latest()
    }

    async fn close(&self) -> StorageResult<()> {
        Ok(())
    }

    async fn health_check(&self) -> StorageResult<bool> {
        let read_txn = self
            .db
            .begin_read()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        read_txn.open_table(NODES)?;
        Ok(true)
    }

    async fn create_node(&self, node: Node) -> StorageResult<Node> {
        let value = serde_json::to_vec(&node)?;

        let write_txn = self.db.begin_write()?;
        {
            let mut table = write_txn.open_table(NODES)?;
            if table.get(node.id.as_str())?.is_some() {
                return Err(StorageError::DuplicateId(node.id));
            }
            table.insert(node.id.as_str(), value.as_slice())?;
        }
        write_txn.commit()?;

        tracing::debug!("Created {} {} in {}", node.node_type(), node.id, node.airport);
        Ok(node)
    }

    async fn get_node(&self, id: &str) -> StorageResult<Option<Node>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(NODES)?;

        if let Some(value) = table.get(id)? {
            let node: Node = serde_json::from_slice(value.value())?;
            Ok(Some(node))
        } else {
            Ok(None)
        }
    }

    async fn list_nodes(&self, airport: Option<&str>) -> StorageResult<Vec<Node>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(NODES)?;

        let mut nodes = Vec::new();
        for entry in table.iter()? {
            let (_, value) = entry?;
            let node: Node = serde_json::from_slice(value.value())?;
            if airport.map_or(true, |a| node.airport == a) {
                nodes.push(node);
            }
        }
        nodes.sort_by(|a, b| a.sort_key().cmp(&b.sort_key()));

        Ok(nodes)
    }

    async fn create_edge(&self, edge: NewEdge) -> StorageResult<Edge> {
        let write_txn = self.db.begin_write()?;
        let edge = {
            let nodes = write_txn.open_table(NODES)?;
            let from: Option<Node> = match nodes.get(edge.from_id.as_str())? {
                Some(value) => Some(serde_json::from_slice(value.value())?),
                None => None,
            };
            let Some(from) = from else {
                return Err(StorageError::DanglingReference {
                    missing: edge.from_id.clone(),
                    from: edge.from_id,
                    to: edge.to_id,
                });
            };
            if nodes.get(edge.to_id.as_str())?.is_none() {
                return Err(StorageError::DanglingReference {
                    missing: edge.to_id.clone(),
                    from: edge.from_id,
                    to: edge.to_id,
                });
            }

            let edge = Edge::new(from.airport, edge);
            let value = serde_json::to_vec(&edge)?;

            let mut edges = write_txn.open_table(EDGES)?;
            let seq = match edges.last()? {
                Some((key, _)) => key.value() + 1,
                None => 0,
            };
            edges.insert(seq, value.as_slice())?;
            edge
        };
        write_txn.commit()?;

        tracing::debug!("Created edge {} -> {} via {}", edge.from_id, edge.to_id, edge.via);
        Ok(edge)
    }

    async fn list_edges(&self, airport: Option<&str>) -> StorageResult<Vec<Edge>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(EDGES)?;

        let mut edges = Vec::new();
        for entry in table.iter()? {
            let (_, value) = entry?;
            let edge: Edge = serde_json::from_slice(value.value())?;
            if airport.map_or(true, |a| edge.airport == a) {
                edges.push(edge);
            }
        }
        Ok(edges)
    }

    async fn clear(&self, airport: Option<&str>) -> StorageResult<ClearSummary> {
        let write_txn = self.db.begin_write()?;
        let summary = {
            let mut nodes = write_txn.open_table(NODES)?;
            let mut edges = write_txn.open_table(EDGES)?;

            let mut node_keys = Vec::new();
            for entry in nodes.iter()? {
                let (key, value) = entry?;
                let node: Node = serde_json::from_slice(value.value())?;
                if airport.map_or(true, |a| node.airport == a) {
                    node_keys.push(key.value().to_string());
                }
            }

            let mut edge_keys = Vec::new();
            for entry in edges.iter()? {
                let (key, value) = entry?;
                let edge: Edge = serde_json::from_slice(value.value())?;
                let doomed = match airport {
                    None => true,
                    Some(a) => {
                        edge.airport == a
                            || node_keys.contains(&edge.from_id)
                            || node_keys.contains(&edge.to_id)
                    }
                };
                if doomed {
                    edge_keys.push(key.value());
                }
            }

            for key in &node_keys {
                nodes.remove(key.as_str())?;
            }
            for key in &edge_keys {
                edges.remove(key)?;
            }

            ClearSummary {
                nodes: node_keys.len(),
                edges: edge_keys.len(),
            }
        };
        write_txn.commit()?;

        tracing::debug!(
            "Cleared {} node(s) and {} edge(s) from {}",
            summary.nodes,
            summary.edges,
            airport.unwrap_or("all airports")
        );
        Ok(summary)
    }
}
