//! MCP request handlers

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use taxigraph_core::{limits, ConnectionRequest, Error, NodeRequest, PathMetric, PathQuery};
use taxigraph_storage::StorageBackend;

use crate::render::{self, AnalysisProgress};

/// MCP tool call request
#[derive(Debug, Deserialize)]
pub struct ToolCallRequest {
    pub name: String,
    #[serde(default)]
    pub arguments: serde_json::Value,
}

/// MCP tool call response
#[derive(Debug, Serialize)]
pub struct ToolCallResponse {
    pub content: Vec<ContentBlock>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[serde(rename = "isError")]
    pub is_error: Option<bool>,
}

/// Content block for responses
#[derive(Debug, Serialize)]
#[serde(tag = "type")]
pub enum ContentBlock {
    #[serde(rename = "text")]
    Text { text: String },
}

impl ToolCallResponse {
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: vec![ContentBlock::Text {
                text: content.into(),
            }],
            is_error: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            content: vec![ContentBlock::Text {
                text: message.into(),
            }],
            is_error: Some(true),
        }
    }

    pub fn is_error(&self) -> bool {
        self.is_error.unwrap_or(false)
    }

    /// All text blocks joined
    pub fn text_content(&self) -> String {
        self.content
            .iter()
            .map(|ContentBlock::Text { text }| text.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

fn parse_args<T: serde::de::DeserializeOwned>(args: serde_json::Value) -> Result<T, ToolCallResponse> {
    serde_json::from_value(args)
        .map_err(|e| ToolCallResponse::error(format!("Invalid arguments: {}", e)))
}

fn airport_code(code: &str) -> Result<String, ToolCallResponse> {
    limits::normalize_airport(code).map_err(|e| ToolCallResponse::error(format!("Error: {}", e)))
}

/// Tool error text, with the failure kind spelled out for the producer
fn failure(action: &str, err: impl Into<Error>) -> ToolCallResponse {
    let err = err.into();
    let message = match &err {
        Error::StoreUnavailable(_) => format!("Error {}: {} (retry later)", action, err),
        _ => format!("Error {}: {}", action, err),
    };
    tracing::warn!("{}", message);
    ToolCallResponse::error(message)
}

/// Tool handler that processes tool calls
pub struct ToolHandler<S: StorageBackend + ?Sized> {
    storage: Arc<S>,
}

impl<S: StorageBackend + ?Sized + 'static> ToolHandler<S> {
    pub fn new(storage: Arc<S>) -> Self {
        Self { storage }
    }

    pub fn storage(&self) -> &Arc<S> {
        &self.storage
    }

    pub async fn handle(&self, request: ToolCallRequest) -> ToolCallResponse {
        tracing::debug!("Handling tool call: {}", request.name);

        let result = match request.name.as_str() {
            "create_node" => self.create_node(request.arguments).await,
            "create_connection" => self.create_connection(request.arguments).await,
            "get_current_graph" => self.get_current_graph(request.arguments).await,
            "validate_graph_structure" => self.validate_graph_structure(request.arguments).await,
            "check_path_exists" => self.check_path_exists(request.arguments).await,
            "list_airports" => self.list_airports().await,
            "graph_stats" => self.graph_stats(request.arguments).await,
            "report_analysis_progress" => self.report_analysis_progress(request.arguments).await,
            _ => Err(ToolCallResponse::error(format!(
                "Unknown tool: {}",
                request.name
            ))),
        };

        result.unwrap_or_else(|response| response)
    }

    async fn create_node(&self, args: serde_json::Value) -> Result<ToolCallResponse, ToolCallResponse> {
        let request: NodeRequest = parse_args(args)?;
        let node = request.into_node().map_err(|e| failure("creating node", e))?;

        let node = self
            .storage
            .create_node(node)
            .await
            .map_err(|e| failure("creating node", e))?;

        Ok(ToolCallResponse::text(format!(
            "Created {} node: {} (id: {})",
            node.node_type().tool_name(),
            node.name,
            node.id
        )))
    }

    async fn create_connection(
        &self,
        args: serde_json::Value,
    ) -> Result<ToolCallResponse, ToolCallResponse> {
        let request: ConnectionRequest = parse_args(args)?;

        let edges = self
            .storage
            .create_connection(&request)
            .await
            .map_err(|e| failure("creating connection", e))?;

        let suffix = if edges.len() > 1 { " (bidirectional)" } else { "" };
        Ok(ToolCallResponse::text(format!(
            "Created connection: {} -> {} via {}{}",
            request.from_id, request.to_id, request.via, suffix
        )))
    }

    async fn get_current_graph(
        &self,
        args: serde_json::Value,
    ) -> Result<ToolCallResponse, ToolCallResponse> {
        #[derive(Deserialize)]
        struct Args {
            airport: String,
        }

        let args: Args = parse_args(args)?;
        let airport = airport_code(&args.airport)?;

        let graph = self
            .storage
            .load_airport(&airport)
            .await
            .map_err(|e| failure("getting graph", e))?;

        Ok(ToolCallResponse::text(render::graph_summary(&graph)))
    }

    async fn validate_graph_structure(
        &self,
        args: serde_json::Value,
    ) -> Result<ToolCallResponse, ToolCallResponse> {
        #[derive(Deserialize)]
        struct Args {
            airport: String,
        }

        let args: Args = parse_args(args)?;
        let airport = airport_code(&args.airport)?;

        let report = self
            .storage
            .validate(&airport)
            .await
            .map_err(|e| failure("during validation", e))?;

        Ok(ToolCallResponse::text(render::validation_report(&report)))
    }

    async fn check_path_exists(
        &self,
        args: serde_json::Value,
    ) -> Result<ToolCallResponse, ToolCallResponse> {
        #[derive(Deserialize)]
        struct Args {
            airport: String,
            from_id: String,
            to_id: String,
            #[serde(default)]
            metric: PathMetric,
        }

        let args: Args = parse_args(args)?;
        let airport = airport_code(&args.airport)?;

        let query = PathQuery {
            start: args.from_id,
            end: args.to_id,
            metric: args.metric,
        };
        let outcome = self
            .storage
            .find_route(&airport, &query)
            .await
            .map_err(|e| failure("checking path", e))?;

        Ok(ToolCallResponse::text(render::path_outcome(
            &query.start,
            &query.end,
            &outcome,
        )))
    }

    async fn list_airports(&self) -> Result<ToolCallResponse, ToolCallResponse> {
        let airports = self
            .storage
            .list_airports()
            .await
            .map_err(|e| failure("listing airports", e))?;

        if airports.is_empty() {
            return Ok(ToolCallResponse::text("No airports in the store"));
        }
        Ok(ToolCallResponse::text(format!(
            "Airports ({}): {}",
            airports.len(),
            airports.join(", ")
        )))
    }

    async fn graph_stats(&self, args: serde_json::Value) -> Result<ToolCallResponse, ToolCallResponse> {
        #[derive(Deserialize, Default)]
        struct Args {
            airport: Option<String>,
        }

        let args: Args = if args.is_null() {
            Args::default()
        } else {
            parse_args(args)?
        };
        let airport = args.airport.as_deref().map(airport_code).transpose()?;

        let stats = self
            .storage
            .stats(airport.as_deref())
            .await
            .map_err(|e| failure("getting stats", e))?;

        let scope = airport.as_deref().unwrap_or("all airports");
        Ok(ToolCallResponse::text(render::stats(scope, &stats)))
    }

    async fn report_analysis_progress(
        &self,
        args: serde_json::Value,
    ) -> Result<ToolCallResponse, ToolCallResponse> {
        let mut progress: AnalysisProgress = parse_args(args)?;
        progress.airport = airport_code(&progress.airport)?;

        let stats = self
            .storage
            .stats(Some(&progress.airport))
            .await
            .map_err(|e| failure("reporting progress", e))?;

        Ok(ToolCallResponse::text(render::progress(&progress, &stats)))
    }
}
