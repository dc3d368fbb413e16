//! Node types: runway ends, taxiway intersections, hold shorts and destinations

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// The closed set of node labels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum NodeType {
    RunwayEnd,
    TaxiwayIntersection,
    HoldShort,
    #[serde(rename = "FBO")]
    Fbo,
    Terminal,
    Ramp,
}

impl NodeType {
    pub const ALL: [NodeType; 6] = [
        NodeType::RunwayEnd,
        NodeType::TaxiwayIntersection,
        NodeType::HoldShort,
        NodeType::Fbo,
        NodeType::Terminal,
        NodeType::Ramp,
    ];

    /// Persisted label, e.g. `RunwayEnd`
    pub fn label(&self) -> &'static str {
        match self {
            Self::RunwayEnd => "RunwayEnd",
            Self::TaxiwayIntersection => "TaxiwayIntersection",
            Self::HoldShort => "HoldShort",
            Self::Fbo => "FBO",
            Self::Terminal => "Terminal",
            Self::Ramp => "Ramp",
        }
    }

    /// Snake-case name used by producers, e.g. `runway_end`
    pub fn tool_name(&self) -> &'static str {
        match self {
            Self::RunwayEnd => "runway_end",
            Self::TaxiwayIntersection => "taxiway_intersection",
            Self::HoldShort => "hold_short",
            Self::Fbo => "fbo",
            Self::Terminal => "terminal",
            Self::Ramp => "ramp",
        }
    }

    /// FBOs and ramps must always be reachable from the movement area
    pub fn is_destination(&self) -> bool {
        matches!(self, Self::Fbo | Self::Ramp)
    }
}

impl fmt::Display for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for NodeType {
    type Err = Error;

    /// Accepts either the label (`RunwayEnd`) or the producer name (`runway_end`)
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.label().eq_ignore_ascii_case(s) || t.tool_name() == s)
            .ok_or_else(|| Error::UnknownNodeType(s.to_string()))
    }
}

/// Variant-specific payload of a node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum NodeKind {
    RunwayEnd {
        /// Magnetic heading, roughly the runway designator times ten
        heading: u16,
        /// Shared by both ends of one physical runway, e.g. `9_27`
        runway_id: String,
    },
    TaxiwayIntersection {
        /// Taxiway names present at this point
        taxiways: Vec<String>,
    },
    HoldShort {
        /// Runway being guarded
        runway: String,
        /// Taxiway the hold line sits on
        taxiway: String,
    },
    #[serde(rename = "FBO")]
    Fbo,
    Terminal,
    Ramp,
}

impl NodeKind {
    pub fn runway_end(heading: u16, runway_id: impl Into<String>) -> Self {
        Self::RunwayEnd {
            heading,
            runway_id: runway_id.into(),
        }
    }

    pub fn taxiway_intersection<I, S>(taxiways: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::TaxiwayIntersection {
            taxiways: taxiways.into_iter().map(Into::into).collect(),
        }
    }

    pub fn hold_short(runway: impl Into<String>, taxiway: impl Into<String>) -> Self {
        Self::HoldShort {
            runway: runway.into(),
            taxiway: taxiway.into(),
        }
    }

    pub fn node_type(&self) -> NodeType {
        match self {
            Self::RunwayEnd { .. } => NodeType::RunwayEnd,
            Self::TaxiwayIntersection { .. } => NodeType::TaxiwayIntersection,
            Self::HoldShort { .. } => NodeType::HoldShort,
            Self::Fbo => NodeType::Fbo,
            Self::Terminal => NodeType::Terminal,
            Self::Ramp => NodeType::Ramp,
        }
    }
}

/// A point in an airport's ground-movement graph
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    /// Unique across every airport in the store, e.g. `KDPA_rwy_27L`
    pub id: String,

    /// ICAO airport code
    pub airport: String,

    /// Display name, e.g. `27L` or `A/B Intersection`
    pub name: String,

    /// Diagram-relative position (0-100), for human checking only
    pub x: f64,
    pub y: f64,

    #[serde(flatten)]
    pub kind: NodeKind,

    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
}

impl Node {
    pub fn new(
        id: impl Into<String>,
        airport: impl Into<String>,
        name: impl Into<String>,
        kind: NodeKind,
    ) -> Self {
        Self {
            id: id.into(),
            airport: airport.into(),
            name: name.into(),
            x: 0.0,
            y: 0.0,
            kind,
            created_at: Utc::now(),
        }
    }

    /// Set the diagram position
    pub fn at(mut self, x: f64, y: f64) -> Self {
        self.x = x;
        self.y = y;
        self
    }

    pub fn node_type(&self) -> NodeType {
        self.kind.node_type()
    }

    /// Runway pairing key, if this is a runway end
    pub fn runway_id(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::RunwayEnd { runway_id, .. } => Some(runway_id),
            _ => None,
        }
    }

    /// Listing order: airport, type label, name, then id
    pub fn sort_key(&self) -> (&str, &'static str, &str, &str) {
        (&self.airport, self.node_type().label(), &self.name, &self.id)
    }
}
