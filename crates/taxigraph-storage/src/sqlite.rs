//! SQLite storage backend

use crate::error::{StorageError, StorageResult};
use crate::migration::Migratable;
use crate::traits::{ClearSummary, StorageBackend};
use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::Mutex;
use taxigraph_core::{Edge, NewEdge, Node, CONNECTS};

const SCHEMA_V1: &str = r#"
    CREATE TABLE IF NOT EXISTS nodes (
        id TEXT PRIMARY KEY,
        airport TEXT NOT NULL,
        label TEXT NOT NULL,
        name TEXT NOT NULL,
        data TEXT NOT NULL
    );

    CREATE TABLE IF NOT EXISTS edges (
        seq INTEGER PRIMARY KEY AUTOINCREMENT,
        id TEXT NOT NULL UNIQUE,
        airport TEXT NOT NULL,
        from_id TEXT NOT NULL,
        to_id TEXT NOT NULL,
        rel_type TEXT NOT NULL,
        data TEXT NOT NULL
    );

    CREATE UNIQUE INDEX IF NOT EXISTS idx_nodes_label_id ON nodes(label, id);
    CREATE INDEX IF NOT EXISTS idx_nodes_airport ON nodes(airport, label, name);
    CREATE INDEX IF NOT EXISTS idx_edges_airport ON edges(airport);
    CREATE INDEX IF NOT EXISTS idx_edges_from ON edges(from_id);
    CREATE INDEX IF NOT EXISTS idx_edges_to ON edges(to_id);
"#;

/// SQLite storage backend
pub struct SqliteStorage {
    conn: Mutex<Connection>,
}

impl SqliteStorage {
    /// Open or create a SQLite database at the given path
    pub fn open(path: impl AsRef<Path>) -> StorageResult<Self> {
        let conn = Connection::open(path).map_err(|e| StorageError::Connection(e.to_string()))?;

        let storage = Self {
            conn: Mutex::new(conn),
        };
        storage.migrate_to_latest()?;

        Ok(storage)
    }

    /// Create an in-memory SQLite database (for testing)
    pub fn in_memory() -> StorageResult<Self> {
        let conn =
            Connection::open_in_memory().map_err(|e| StorageError::Connection(e.to_string()))?;

        let storage = Self {
            conn: Mutex::new(conn),
        };
        storage.migrate_to_latest()?;

        Ok(storage)
    }

    fn query_nodes(conn: &Connection, airport: Option<&str>) -> StorageResult<Vec<Node>> {
        let mut stmt = conn.prepare(
            "SELECT data FROM nodes WHERE (?1 IS NULL OR airport = ?1)
             ORDER BY airport, label, name, id",
        )?;

        let rows = stmt.query_map(params![airport], |row| row.get::<_, String>(0))?;

        let mut nodes = Vec::new();
        for row in rows {
            nodes.push(serde_json::from_str(&row?)?);
        }
        Ok(nodes)
    }
}

impl Migratable for SqliteStorage {
    fn get_schema_version(&self) -> StorageResult<u32> {
        let conn = self.conn.lock().map_err(StorageError::lock)?;
        let version: u32 = conn.query_row("PRAGMA user_version", [], |row| row.get(0))?;
        Ok(version)
    }

    fn set_schema_version(&self, version: u32) -> StorageResult<()> {
        let conn = self.conn.lock().map_err(StorageError::lock)?;
        conn.pragma_update(None, "user_version", version)?;
        Ok(())
    }

    fn run_migration(&self, version: u32) -> StorageResult<()> {
        let conn = self.conn.lock().map_err(StorageError::lock)?;
        match version {
            1 => conn.execute_batch(SCHEMA_V1)?,
            v => return Err(StorageError::Migration(format!("Unknown schema version {}", v))),
        }
        Ok(())
    }
}

#[async_trait]
impl StorageBackend for SqliteStorage {
    async fn initialize(&self) -> StorageResult<()> {
        self.migrate_to_latest()?;
        let conn = self.conn.lock().map_err(StorageError::lock)?;
        conn.execute_batch(SCHEMA_V1)?;
        Ok(())
    }

    async fn close(&self) -> StorageResult<()> {
        Ok(())
    }

    async fn health_check(&self) -> StorageResult<bool> {
        let conn = self.conn.lock().map_err(StorageError::lock)?;
        let one: i64 = conn
            .query_row("SELECT 1", [], |row| row.get(0))
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(one == 1)
    }

    async fn create_node(&self, node: Node) -> StorageResult<Node> {
        let mut conn = self.conn.lock().map_err(StorageError::lock)?;
        let data = serde_json::to_string(&node)?;

        let tx = conn.transaction()?;
        let exists = tx
            .query_row("SELECT 1 FROM nodes WHERE id = ?1", params![node.id], |_| Ok(()))
            .optional()?
            .is_some();
        if exists {
            return Err(StorageError::DuplicateId(node.id));
        }

        tx.execute(
            "INSERT INTO nodes (id, airport, label, name, data) VALUES (?1, ?2, ?3, ?4, ?5)",
            params![node.id, node.airport, node.node_type().label(), node.name, data],
        )?;
        tx.commit()?;

        tracing::debug!("Created {} {} in {}", node.node_type(), node.id, node.airport);
        Ok(node)
    }

    async fn get_node(&self, id: &str) -> StorageResult<Option<Node>> {
        let conn = self.conn.lock().map_err(StorageError::lock)?;

        let data: Option<String> = conn
            .query_row("SELECT data FROM nodes WHERE id = ?1", params![id], |row| {
                row.get(0)
            })
            .optional()?;

        match data {
            Some(data) => Ok(Some(serde_json::from_str(&data)?)),
            None => Ok(None),
        }
    }

    async fn list_nodes(&self, airport: Option<&str>) -> StorageResult<Vec<Node>> {
        let conn = self.conn.lock().map_err(StorageError::lock)?;
        Self::query_nodes(&conn, airport)
    }

    async fn create_edge(&self, edge: NewEdge) -> StorageResult<Edge> {
        let mut conn = self.conn.lock().map_err(StorageError::lock)?;
        let tx = conn.transaction()?;

        let airport: Option<String> = tx
            .query_row(
                "SELECT airport FROM nodes WHERE id = ?1",
                params![edge.from_id],
                |row| row.get(0),
            )
            .optional()?;
        let Some(airport) = airport else {
            return Err(StorageError::DanglingReference {
                missing: edge.from_id.clone(),
                from: edge.from_id,
                to: edge.to_id,
            });
        };

        let to_exists = tx
            .query_row("SELECT 1 FROM nodes WHERE id = ?1", params![edge.to_id], |_| Ok(()))
            .optional()?
            .is_some();
        if !to_exists {
            return Err(StorageError::DanglingReference {
                missing: edge.to_id.clone(),
                from: edge.from_id,
                to: edge.to_id,
            });
        }

        let edge = Edge::new(airport, edge);
        let data = serde_json::to_string(&edge)?;
        tx.execute(
            "INSERT INTO edges (id, airport, from_id, to_id, rel_type, data)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                edge.id.to_string(),
                edge.airport,
                edge.from_id,
                edge.to_id,
                CONNECTS,
                data
            ],
        )?;
        tx.commit()?;

        tracing::debug!("Created edge {} -> {} via {}", edge.from_id, edge.to_id, edge.via);
        Ok(edge)
    }

    async fn list_edges(&self, airport: Option<&str>) -> StorageResult<Vec<Edge>> {
        let conn = self.conn.lock().map_err(StorageError::lock)?;

        let mut stmt = conn.prepare(
            "SELECT data FROM edges WHERE (?1 IS NULL OR airport = ?1) ORDER BY seq",
        )?;
        let rows = stmt.query_map(params![airport], |row| row.get::<_, String>(0))?;

        let mut edges = Vec::new();
        for row in rows {
            edges.push(serde_json::from_str(&row?)?);
        }
        Ok(edges)
    }

    async fn list_airports(&self) -> StorageResult<Vec<String>> {
        let conn = self.conn.lock().map_err(StorageError::lock)?;

        let mut stmt = conn.prepare("SELECT DISTINCT airport FROM nodes ORDER BY airport")?;
        let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;

        let mut airports = Vec::new();
        for row in rows {
            airports.push(row?);
        }
        Ok(airports)
    }

    async fn clear(&self, airport: Option<&str>) -> StorageResult<ClearSummary> {
        let mut conn = self.conn.lock().map_err(StorageError::lock)?;
        let tx = conn.transaction()?;

        let summary = match airport {
            Some(airport) => {
                let edges = tx.execute(
                    "DELETE FROM edges WHERE airport = ?1
                        OR from_id IN (SELECT id FROM nodes WHERE airport = ?1)
                        OR to_id IN (SELECT id FROM nodes WHERE airport = ?1)",
                    params![airport],
                )?;
                let nodes = tx.execute("DELETE FROM nodes WHERE airport = ?1", params![airport])?;
                ClearSummary { nodes, edges }
            }
            None => {
                let edges = tx.execute("DELETE FROM edges", [])?;
                let nodes = tx.execute("DELETE FROM nodes", [])?;
                ClearSummary { nodes, edges }
            }
        };
        tx.commit()?;

        tracing::debug!(
            "Cleared {} node(s) and {} edge(s) from {}",
            summary.nodes,
            summary.edges,
            airport.unwrap_or("all airports")
        );
        Ok(summary)
    }
}
