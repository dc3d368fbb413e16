//! Taxigraph MCP - Model Context Protocol server
//!
//! Exposes the airport graph store as MCP tools so a diagram-reading agent
//! can record nodes and connections and check its work as it goes.

pub mod handlers;
pub mod render;
pub mod server;
pub mod tools;
pub mod transport;

#[cfg(feature = "sse")]
pub mod sse;

pub use handlers::{ToolCallRequest, ToolCallResponse, ToolHandler};
pub use server::McpServer;

#[cfg(feature = "sse")]
pub use sse::run_sse_server;
