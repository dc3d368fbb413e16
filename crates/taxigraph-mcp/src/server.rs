//! MCP server implementation

use std::sync::Arc;

use serde_json::Value;
use taxigraph_storage::StorageBackend;

use crate::handlers::{ToolCallRequest, ToolHandler};
use crate::tools::get_tools;
use crate::transport::{
    Incoming, JsonRpcRequest, JsonRpcResponse, StdioTransport, INTERNAL_ERROR, INVALID_PARAMS,
    METHOD_NOT_FOUND, PARSE_ERROR,
};

const SERVER_NAME: &str = "taxigraph";
const SERVER_VERSION: &str = env!("CARGO_PKG_VERSION");
const PROTOCOL_VERSION: &str = "2024-11-05";

/// MCP Server for Taxigraph
pub struct McpServer<S: StorageBackend + ?Sized> {
    handler: ToolHandler<S>,
}

impl<S: StorageBackend + ?Sized + 'static> McpServer<S> {
    pub fn new(storage: Arc<S>) -> Self {
        Self {
            handler: ToolHandler::new(storage),
        }
    }

    pub fn storage(&self) -> &Arc<S> {
        self.handler.storage()
    }

    /// Start the MCP server on stdio
    pub async fn run_stdio(&self) -> anyhow::Result<()> {
        tracing::info!("Starting MCP server on stdio");
        let mut transport = StdioTransport::new();

        loop {
            let response = match transport.read_message().await {
                Ok(Some(Incoming::Request(request))) => {
                    tracing::debug!("Received request: {}", request.method);
                    self.handle_message(request).await
                }
                Ok(Some(Incoming::Malformed(e))) => {
                    tracing::warn!("Unparseable message: {}", e);
                    Some(JsonRpcResponse::error(
                        Value::Null,
                        PARSE_ERROR,
                        format!("Parse error: {}", e),
                    ))
                }
                Ok(None) => {
                    tracing::info!("EOF on stdin, shutting down");
                    break;
                }
                Err(e) => {
                    tracing::error!("Failed to read request: {}", e);
                    break;
                }
            };

            if let Some(response) = response {
                if let Err(e) = transport.write_response(&response).await {
                    tracing::error!("Failed to write response: {}", e);
                }
            }
        }

        Ok(())
    }

    /// Handle one JSON-RPC message. Notifications yield no response.
    pub async fn handle_message(&self, request: JsonRpcRequest) -> Option<JsonRpcResponse> {
        if request.jsonrpc != "2.0" {
            tracing::warn!("Unexpected jsonrpc version: {}", request.jsonrpc);
        }
        if request.is_notification() {
            tracing::debug!("Notification: {}", request.method);
            return None;
        }

        let id = request.id.unwrap_or(Value::Null);
        let response = match request.method.as_str() {
            "initialize" => self.handle_initialize(id),
            "initialized" | "notifications/initialized" | "ping" => {
                JsonRpcResponse::success(id, serde_json::json!({}))
            }
            "tools/list" => self.handle_tools_list(id),
            "tools/call" => self.handle_tools_call(id, request.params).await,
            _ => JsonRpcResponse::error(
                id,
                METHOD_NOT_FOUND,
                format!("Method not found: {}", request.method),
            ),
        };
        Some(response)
    }

    fn handle_initialize(&self, id: Value) -> JsonRpcResponse {
        let result = serde_json::json!({
            "protocolVersion": PROTOCOL_VERSION,
            "capabilities": {
                "tools": {}
            },
            "serverInfo": {
                "name": SERVER_NAME,
                "version": SERVER_VERSION
            }
        });
        JsonRpcResponse::success(id, result)
    }

    fn handle_tools_list(&self, id: Value) -> JsonRpcResponse {
        let tools = get_tools();
        JsonRpcResponse::success(id, serde_json::json!({ "tools": tools }))
    }

    async fn handle_tools_call(&self, id: Value, params: Value) -> JsonRpcResponse {
        let call: ToolCallRequest = match serde_json::from_value(params) {
            Ok(call) => call,
            Err(e) => {
                return JsonRpcResponse::error(id, INVALID_PARAMS, format!("Invalid params: {}", e))
            }
        };

        let response = self.handler.handle(call).await;

        match serde_json::to_value(response) {
            Ok(val) => JsonRpcResponse::success(id, val),
            Err(e) => JsonRpcResponse::error(id, INTERNAL_ERROR, format!("Serialization error: {}", e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use taxigraph_storage::MemoryStorage;

    fn request(value: Value) -> JsonRpcRequest {
        serde_json::from_value(value).unwrap()
    }

    async fn roundtrip(server: &McpServer<MemoryStorage>, value: Value) -> Value {
        let response = server.handle_message(request(value)).await.unwrap();
        serde_json::to_value(response).unwrap()
    }

    #[tokio::test]
    async fn test_initialize_and_list() {
        let server = McpServer::new(Arc::new(MemoryStorage::new()));

        let value = roundtrip(&server, json!({"jsonrpc": "2.0", "id": 1, "method": "initialize"})).await;
        assert_eq!(value["result"]["serverInfo"]["name"], "taxigraph");
        assert_eq!(value["result"]["protocolVersion"], PROTOCOL_VERSION);

        let value = roundtrip(&server, json!({"jsonrpc": "2.0", "id": 2, "method": "tools/list"})).await;
        assert_eq!(value["result"]["tools"].as_array().unwrap().len(), 8);

        let none = server
            .handle_message(request(json!({"jsonrpc": "2.0", "method": "notifications/initialized"})))
            .await;
        assert!(none.is_none());
    }

    #[tokio::test]
    async fn test_tools_call_and_errors() {
        let server = McpServer::new(Arc::new(MemoryStorage::new()));

        let value = roundtrip(
            &server,
            json!({"jsonrpc": "2.0", "id": "a", "method": "tools/call", "params": {
                "name": "create_node",
                "arguments": {"node_type": "fbo", "airport": "KTST", "id": "KTST_fbo",
                              "name": "Signature", "x": 20, "y": 80}
            }}),
        )
        .await;
        assert_eq!(value["id"], "a");
        assert_eq!(
            value["result"]["content"][0]["text"],
            "Created fbo node: Signature (id: KTST_fbo)"
        );
        assert!(value["result"].get("isError").is_none());

        let value = roundtrip(
            &server,
            json!({"jsonrpc": "2.0", "id": 3, "method": "tools/call", "params": {"arguments": {}}}),
        )
        .await;
        assert_eq!(value["error"]["code"], INVALID_PARAMS);

        let value = roundtrip(&server, json!({"jsonrpc": "2.0", "id": 4, "method": "resources/list"})).await;
        assert_eq!(value["error"]["code"], METHOD_NOT_FOUND);
    }
}
