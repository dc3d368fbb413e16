//! MCP tool definitions

use serde::Serialize;

/// MCP tool definition
#[derive(Debug, Serialize)]
pub struct Tool {
    pub name: &'static str,
    pub description: &'static str,
    #[serde(rename = "inputSchema")]
    pub input_schema: serde_json::Value,
}

/// Get all available tools
pub fn get_tools() -> Vec<Tool> {
    vec![
        Tool {
            name: "create_node",
            description: "Create a node in the airport graph: a runway end, taxiway intersection, hold short position, FBO, terminal or ramp.",
            input_schema: serde_json::json!({
                "type": "object",
                "required": ["node_type", "airport", "id", "name", "x", "y"],
                "properties": {
                    "node_type": {
                        "type": "string",
                        "enum": ["runway_end", "taxiway_intersection", "hold_short", "fbo", "terminal", "ramp"],
                        "description": "The type of node to create"
                    },
                    "airport": {"type": "string", "description": "ICAO airport code (e.g., KDPA)"},
                    "id": {"type": "string", "description": "Unique node id (e.g., KDPA_rwy_27L)"},
                    "name": {"type": "string", "description": "Display name (e.g., 27L, Atlantic Aviation)"},
                    "x": {"type": "number", "description": "Relative X position on the diagram (0-100)"},
                    "y": {"type": "number", "description": "Relative Y position on the diagram (0-100)"},
                    "heading": {"type": "integer", "minimum": 0, "maximum": 359, "description": "Magnetic heading (required for runway_end, e.g., 270 for runway 27)"},
                    "runway_id": {"type": "string", "description": "Key shared by both ends of a runway (required for runway_end, e.g., 9_27)"},
                    "taxiways": {"type": "array", "items": {"type": "string"}, "description": "Taxiway names at this intersection (required for taxiway_intersection)"},
                    "runway": {"type": "string", "description": "Runway to hold short of (required for hold_short)"},
                    "taxiway": {"type": "string", "description": "Taxiway the hold short is on (required for hold_short)"}
                }
            }),
        },
        Tool {
            name: "create_connection",
            description: "Connect two existing nodes. Bidirectional by default, which stores a reverse connection with the opposite direction.",
            input_schema: serde_json::json!({
                "type": "object",
                "required": ["from_id", "to_id", "via", "distance", "direction"],
                "properties": {
                    "from_id": {"type": "string", "description": "Id of the source node"},
                    "to_id": {"type": "string", "description": "Id of the destination node"},
                    "via": {"type": "string", "description": "Surface connecting them (taxiway name like 'A', or 'runway', 'ramp')"},
                    "distance": {"type": "integer", "minimum": 1, "maximum": 10, "description": "Relative distance (1-10)"},
                    "direction": {
                        "type": "string",
                        "enum": ["N", "NE", "E", "SE", "S", "SW", "W", "NW"],
                        "description": "Direction of travel from source to destination"
                    },
                    "requires_hold": {"type": "boolean", "default": false, "description": "True if this connection crosses a runway"},
                    "bidirectional": {"type": "boolean", "default": true, "description": "Also create the reverse connection"}
                }
            }),
        },
        Tool {
            name: "get_current_graph",
            description: "Show the nodes and connections stored for an airport.",
            input_schema: serde_json::json!({
                "type": "object",
                "required": ["airport"],
                "properties": {
                    "airport": {"type": "string", "description": "ICAO airport code"}
                }
            }),
        },
        Tool {
            name: "validate_graph_structure",
            description: "Check an airport graph for orphan nodes, unreachable FBOs and ramps, unpaired runway ends, hold shorts away from runways, under-connected intersections and missing node references.",
            input_schema: serde_json::json!({
                "type": "object",
                "required": ["airport"],
                "properties": {
                    "airport": {"type": "string", "description": "ICAO airport code"}
                }
            }),
        },
        Tool {
            name: "check_path_exists",
            description: "Find the shortest taxi route between two nodes of an airport, listing the surfaces used and hold short crossings.",
            input_schema: serde_json::json!({
                "type": "object",
                "required": ["airport", "from_id", "to_id"],
                "properties": {
                    "airport": {"type": "string", "description": "ICAO airport code"},
                    "from_id": {"type": "string", "description": "Starting node id"},
                    "to_id": {"type": "string", "description": "Destination node id"},
                    "metric": {"type": "string", "enum": ["hops", "distance"], "default": "hops", "description": "Minimize number of connections or total distance"}
                }
            }),
        },
        Tool {
            name: "list_airports",
            description: "List airport codes that have nodes in the store.",
            input_schema: serde_json::json!({
                "type": "object",
                "properties": {}
            }),
        },
        Tool {
            name: "graph_stats",
            description: "Count nodes by type and connections, for one airport or all of them.",
            input_schema: serde_json::json!({
                "type": "object",
                "properties": {
                    "airport": {"type": "string", "description": "ICAO airport code (omit for all airports)"}
                }
            }),
        },
        Tool {
            name: "report_analysis_progress",
            description: "Record which runways, taxiways and FBOs have been identified so far and get the suggested next step.",
            input_schema: serde_json::json!({
                "type": "object",
                "required": ["airport", "runways_found", "taxiways_found"],
                "properties": {
                    "airport": {"type": "string", "description": "ICAO airport code"},
                    "runways_found": {"type": "array", "items": {"type": "string"}, "description": "Runways identified (e.g., ['27L/09R', '36/18'])"},
                    "taxiways_found": {"type": "array", "items": {"type": "string"}, "description": "Taxiway names identified (e.g., ['A', 'B'])"},
                    "fbos_found": {"type": "array", "items": {"type": "string"}, "description": "FBO names identified"},
                    "remaining_work": {"type": "string", "description": "What still needs to be done"}
                }
            }),
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tool_names_unique() {
        let tools = get_tools();
        let mut names: Vec<_> = tools.iter().map(|t| t.name).collect();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), tools.len());
    }

    #[test]
    fn test_schema_serializes_camel_case() {
        let value = serde_json::to_value(&get_tools()[0]).unwrap();
        assert_eq!(value["name"], "create_node");
        assert!(value["inputSchema"]["properties"]["heading"].is_object());
    }
}
