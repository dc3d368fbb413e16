//! Producer-facing construction of nodes and connections
//!
//! Producers send flat records where every type-specific field is optional.
//! These types turn such records into typed [`Node`]s and [`NewEdge`]s,
//! rejecting missing required fields instead of defaulting them.

use serde::{Deserialize, Serialize};

use crate::edge::{Direction, NewEdge};
use crate::error::{Error, Result};
use crate::limits;
use crate::node::{Node, NodeKind, NodeType};

/// A node as described by a producer
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NodeRequest {
    /// `runway_end`, `taxiway_intersection`, `hold_short`, `fbo`, `terminal`
    /// or `ramp` (labels such as `RunwayEnd` are accepted too)
    pub node_type: String,
    pub airport: String,
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub x: f64,
    #[serde(default)]
    pub y: f64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub heading: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub runway_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub taxiways: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub runway: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub taxiway: Option<String>,
}

fn required<T>(value: Option<T>, node_type: NodeType, field: &'static str) -> Result<T> {
    value.ok_or(Error::MissingField {
        node_type: node_type.tool_name(),
        field,
    })
}

impl NodeRequest {
    pub fn new(
        node_type: NodeType,
        airport: impl Into<String>,
        id: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            node_type: node_type.tool_name().to_string(),
            airport: airport.into(),
            id: id.into(),
            name: name.into(),
            ..Default::default()
        }
    }

    /// Build the typed node, checking required fields and ranges
    pub fn into_node(self) -> Result<Node> {
        let node_type: NodeType = self.node_type.parse()?;
        let airport = limits::normalize_airport(&self.airport)?;
        limits::validate_node_id(&self.id)?;
        limits::validate_name(&self.name)?;
        limits::validate_position(self.x, self.y)?;

        let kind = match node_type {
            NodeType::RunwayEnd => {
                let heading = required(self.heading, node_type, "heading")?;
                let runway_id = required(self.runway_id, node_type, "runway_id")?;
                limits::validate_name(&runway_id)?;
                NodeKind::RunwayEnd {
                    heading: limits::validate_heading(heading)?,
                    runway_id,
                }
            }
            NodeType::TaxiwayIntersection => {
                let taxiways = required(self.taxiways, node_type, "taxiways")?;
                limits::validate_taxiways(&taxiways)?;
                NodeKind::TaxiwayIntersection { taxiways }
            }
            NodeType::HoldShort => {
                let runway = required(self.runway, node_type, "runway")?;
                let taxiway = required(self.taxiway, node_type, "taxiway")?;
                limits::validate_name(&runway)?;
                limits::validate_name(&taxiway)?;
                NodeKind::HoldShort { runway, taxiway }
            }
            NodeType::Fbo => NodeKind::Fbo,
            NodeType::Terminal => NodeKind::Terminal,
            NodeType::Ramp => NodeKind::Ramp,
        };

        Ok(Node::new(self.id, airport, self.name, kind).at(self.x, self.y))
    }
}

/// Re-describe a stored node so it can go back through `into_node`
impl From<Node> for NodeRequest {
    fn from(node: Node) -> Self {
        let mut request = NodeRequest::new(node.node_type(), node.airport, node.id, node.name);
        request.x = node.x;
        request.y = node.y;
        match node.kind {
            NodeKind::RunwayEnd { heading, runway_id } => {
                request.heading = Some(i64::from(heading));
                request.runway_id = Some(runway_id);
            }
            NodeKind::TaxiwayIntersection { taxiways } => request.taxiways = Some(taxiways),
            NodeKind::HoldShort { runway, taxiway } => {
                request.runway = Some(runway);
                request.taxiway = Some(taxiway);
            }
            NodeKind::Fbo | NodeKind::Terminal | NodeKind::Ramp => {}
        }
        request
    }
}

fn default_bidirectional() -> bool {
    true
}

/// A connection as described by a producer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectionRequest {
    pub from_id: String,
    pub to_id: String,
    pub via: String,
    pub distance: i64,
    pub direction: Direction,
    #[serde(default)]
    pub requires_hold: bool,
    /// Also create the reverse edge with the opposite direction
    #[serde(default = "default_bidirectional")]
    pub bidirectional: bool,
}

/// A single directed edge as a one-way connection
impl From<NewEdge> for ConnectionRequest {
    fn from(edge: NewEdge) -> Self {
        Self {
            from_id: edge.from_id,
            to_id: edge.to_id,
            via: edge.via,
            distance: i64::from(edge.distance),
            direction: edge.direction,
            requires_hold: edge.requires_hold,
            bidirectional: false,
        }
    }
}

impl ConnectionRequest {
    pub fn new(
        from_id: impl Into<String>,
        to_id: impl Into<String>,
        via: impl Into<String>,
        distance: i64,
        direction: Direction,
    ) -> Self {
        Self {
            from_id: from_id.into(),
            to_id: to_id.into(),
            via: via.into(),
            distance,
            direction,
            requires_hold: false,
            bidirectional: true,
        }
    }

    pub fn with_hold(mut self) -> Self {
        self.requires_hold = true;
        self
    }

    pub fn one_way(mut self) -> Self {
        self.bidirectional = false;
        self
    }

    /// The directed edges this request materializes: forward first, then
    /// the reverse edge when bidirectional
    pub fn edges(&self) -> Result<Vec<NewEdge>> {
        let distance = limits::validate_distance(self.distance)?;
        limits::validate_node_id(&self.from_id)?;
        limits::validate_node_id(&self.to_id)?;
        limits::validate_name(&self.via)?;

        let mut forward = NewEdge::new(
            self.from_id.as_str(),
            self.to_id.as_str(),
            self.via.as_str(),
            distance,
            self.direction,
        );
        forward.requires_hold = self.requires_hold;

        if self.bidirectional {
            let reverse = forward.reversed();
            Ok(vec![forward, reverse])
        } else {
            Ok(vec![forward])
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_runway_end_requires_heading() {
        let mut req = NodeRequest::new(NodeType::RunwayEnd, "KTST", "KTST_rwy_09", "09");
        req.runway_id = Some("09_27".into());

        match req.into_node() {
            Err(Error::MissingField { node_type, field }) => {
                assert_eq!(node_type, "runway_end");
                assert_eq!(field, "heading");
            }
            other => panic!("expected missing heading, got {other:?}"),
        }
    }

    #[test]
    fn test_runway_end_requires_runway_id() {
        let mut req = NodeRequest::new(NodeType::RunwayEnd, "KTST", "KTST_rwy_09", "09");
        req.heading = Some(90);

        assert!(matches!(
            req.into_node(),
            Err(Error::MissingField { field: "runway_id", .. })
        ));
    }

    #[test]
    fn test_intersection_and_hold_short_required_fields() {
        let req = NodeRequest::new(NodeType::TaxiwayIntersection, "KTST", "KTST_twy_A", "A");
        assert!(matches!(
            req.into_node(),
            Err(Error::MissingField { field: "taxiways", .. })
        ));

        let mut req = NodeRequest::new(NodeType::HoldShort, "KTST", "KTST_hold_A_27", "A/27");
        req.runway = Some("27".into());
        assert!(matches!(
            req.into_node(),
            Err(Error::MissingField { field: "taxiway", .. })
        ));
    }

    #[test]
    fn test_builds_typed_node() {
        let mut req = NodeRequest::new(NodeType::RunwayEnd, "ktst", "KTST_rwy_27", "27");
        req.heading = Some(270);
        req.runway_id = Some("09_27".into());
        req.x = 90.0;
        req.y = 50.0;

        let node = req.into_node().unwrap();
        assert_eq!(node.airport, "KTST");
        assert_eq!(node.kind, NodeKind::runway_end(270, "09_27"));
        assert_eq!((node.x, node.y), (90.0, 50.0));
    }

    #[test]
    fn test_invalid_ranges_rejected() {
        let mut req = NodeRequest::new(NodeType::RunwayEnd, "KTST", "KTST_rwy_09", "09");
        req.heading = Some(400);
        req.runway_id = Some("09_27".into());
        assert!(matches!(
            req.into_node(),
            Err(Error::InvalidField { field: "heading", .. })
        ));

        let req = ConnectionRequest::new("A", "B", "A", 11, Direction::N);
        assert!(matches!(
            req.edges(),
            Err(Error::InvalidField { field: "distance", .. })
        ));
    }

    #[test]
    fn test_non_finite_position_rejected() {
        let mut req = NodeRequest::new(NodeType::Ramp, "KTST", "KTST_ramp_main", "Main Ramp");
        req.x = f64::NAN;
        assert!(matches!(
            req.into_node(),
            Err(Error::InvalidField { field: "x", .. })
        ));

        let mut req = NodeRequest::new(NodeType::Fbo, "KTST", "KTST_fbo", "FBO");
        req.y = f64::INFINITY;
        assert!(matches!(
            req.into_node(),
            Err(Error::InvalidField { field: "y", .. })
        ));
    }

    #[test]
    fn test_hold_short_labels_must_be_non_empty() {
        let mut req = NodeRequest::new(NodeType::HoldShort, "KTST", "KTST_hold_A_27", "A/27");
        req.runway = Some("".into());
        req.taxiway = Some("A".into());
        assert!(matches!(
            req.into_node(),
            Err(Error::InvalidField { field: "name", .. })
        ));

        let mut req = NodeRequest::new(NodeType::HoldShort, "KTST", "KTST_hold_A_27", "A/27");
        req.runway = Some("27".into());
        req.taxiway = Some("  ".into());
        assert!(req.into_node().is_err());
    }

    #[test]
    fn test_unknown_type() {
        let mut req = NodeRequest::new(NodeType::Ramp, "KTST", "KTST_x", "x");
        req.node_type = "hangar".into();
        assert!(matches!(req.into_node(), Err(Error::UnknownNodeType(_))));
    }

    #[test]
    fn test_bidirectional_edges() {
        let req = ConnectionRequest::new("A", "B", "A", 2, Direction::N).with_hold();
        let edges = req.edges().unwrap();

        assert_eq!(edges.len(), 2);
        assert_eq!((edges[0].from_id.as_str(), edges[0].direction), ("A", Direction::N));
        assert_eq!((edges[1].from_id.as_str(), edges[1].direction), ("B", Direction::S));
        assert!(edges.iter().all(|e| e.requires_hold && e.distance == 2 && e.via == "A"));

        let one_way = ConnectionRequest::new("A", "B", "A", 2, Direction::N).one_way();
        assert_eq!(one_way.edges().unwrap().len(), 1);
    }

    #[test]
    fn test_deserialize_defaults() {
        let req: ConnectionRequest = serde_json::from_value(serde_json::json!({
            "from_id": "A", "to_id": "B", "via": "A", "distance": 1, "direction": "E"
        }))
        .unwrap();
        assert!(req.bidirectional);
        assert!(!req.requires_hold);
    }

    #[test]
    fn test_stored_records_round_trip_through_requests() {
        let node = Node::new("KTST_hold_A_27", "KTST", "A/27", NodeKind::hold_short("27", "A"))
            .at(40.0, 55.0);
        let rebuilt = NodeRequest::from(node.clone()).into_node().unwrap();
        assert_eq!(rebuilt.kind, node.kind);
        assert_eq!((rebuilt.x, rebuilt.y), (40.0, 55.0));

        let edge = NewEdge::new("A", "B", "A", 7, Direction::SW).with_hold();
        let edges = ConnectionRequest::from(edge.clone()).edges().unwrap();
        assert_eq!(edges, vec![edge]);
    }
}
