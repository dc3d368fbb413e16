//! Taxigraph Core - Airport ground-movement graph model
//!
//! This crate provides the node and edge types, producer-facing
//! construction, path finding and structural validation for the Taxigraph
//! graph store. Persistence lives in `taxigraph-storage`.

pub mod edge;
pub mod error;
pub mod graph;
pub mod limits;
pub mod node;
pub mod pathfinding;
pub mod request;
pub mod stats;
pub mod validation;

pub use edge::{Direction, Edge, EdgeId, NewEdge, CONNECTS};
pub use error::{Error, Result};
pub use graph::AirportGraph;
pub use node::{Node, NodeKind, NodeType};
pub use pathfinding::{find_path, NoPathReason, PathFinder, PathMetric, PathOutcome, PathQuery, TaxiPath};
pub use request::{ConnectionRequest, NodeRequest};
pub use stats::GraphStats;
pub use validation::{validate, Finding, Severity, ValidationReport};
