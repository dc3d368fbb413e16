//! Edge (connection) types and compass directions

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ulid::Ulid;

use crate::error::Error;

/// Relationship type carried by every stored edge
pub const CONNECTS: &str = "CONNECTS";

/// Unique identifier for an edge
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EdgeId(pub Ulid);

impl EdgeId {
    pub fn new() -> Self {
        Self(Ulid::new())
    }

    pub fn from_string(s: &str) -> Result<Self, ulid::DecodeError> {
        Ok(Self(Ulid::from_string(s)?))
    }
}

impl Default for EdgeId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for EdgeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Compass direction of travel from source to destination
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    N,
    NE,
    E,
    SE,
    S,
    SW,
    W,
    NW,
}

impl Direction {
    /// Clockwise from north; `opposite` relies on this order
    pub const ALL: [Direction; 8] = [
        Direction::N,
        Direction::NE,
        Direction::E,
        Direction::SE,
        Direction::S,
        Direction::SW,
        Direction::W,
        Direction::NW,
    ];

    const OPPOSITE: [Direction; 8] = [
        Direction::S,
        Direction::SW,
        Direction::W,
        Direction::NW,
        Direction::N,
        Direction::NE,
        Direction::E,
        Direction::SE,
    ];

    pub fn opposite(self) -> Self {
        Self::OPPOSITE[self as usize]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::N => "N",
            Self::NE => "NE",
            Self::E => "E",
            Self::SE => "SE",
            Self::S => "S",
            Self::SW => "SW",
            Self::W => "W",
            Self::NW => "NW",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Direction {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|d| d.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| Error::UnknownDirection(s.to_string()))
    }
}

/// Data for creating one directed edge
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewEdge {
    pub from_id: String,
    pub to_id: String,
    /// Taxiway name, `runway` or `ramp`
    pub via: String,
    /// Relative distance, 1-10
    pub distance: u8,
    pub direction: Direction,
    #[serde(default)]
    pub requires_hold: bool,
}

impl NewEdge {
    pub fn new(
        from_id: impl Into<String>,
        to_id: impl Into<String>,
        via: impl Into<String>,
        distance: u8,
        direction: Direction,
    ) -> Self {
        Self {
            from_id: from_id.into(),
            to_id: to_id.into(),
            via: via.into(),
            distance,
            direction,
            requires_hold: false,
        }
    }

    /// Mark the edge as crossing an active runway
    pub fn with_hold(mut self) -> Self {
        self.requires_hold = true;
        self
    }

    /// The same connection travelled the other way
    pub fn reversed(&self) -> Self {
        Self {
            from_id: self.to_id.clone(),
            to_id: self.from_id.clone(),
            via: self.via.clone(),
            distance: self.distance,
            direction: self.direction.opposite(),
            requires_hold: self.requires_hold,
        }
    }
}

/// A stored directed `CONNECTS` edge
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    pub id: EdgeId,

    /// Airport of the source node, assigned by the store
    pub airport: String,

    pub from_id: String,
    pub to_id: String,
    pub via: String,
    pub distance: u8,
    pub direction: Direction,
    pub requires_hold: bool,

    pub created_at: DateTime<Utc>,
}

impl Edge {
    /// Materialize a new edge for the given airport
    pub fn new(airport: impl Into<String>, edge: NewEdge) -> Self {
        Self {
            id: EdgeId::new(),
            airport: airport.into(),
            from_id: edge.from_id,
            to_id: edge.to_id,
            via: edge.via,
            distance: edge.distance,
            direction: edge.direction,
            requires_hold: edge.requires_hold,
            created_at: Utc::now(),
        }
    }

    pub fn touches(&self, node_id: &str) -> bool {
        self.from_id == node_id || self.to_id == node_id
    }

    /// The endpoint on the other side of `node_id`
    pub fn other_end(&self, node_id: &str) -> Option<&str> {
        if self.from_id == node_id {
            Some(&self.to_id)
        } else if self.to_id == node_id {
            Some(&self.from_id)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_opposites_are_total_and_symmetric() {
        for d in Direction::ALL {
            assert_ne!(d, d.opposite());
            assert_eq!(d.opposite().opposite(), d);
        }
        assert_eq!(Direction::N.opposite(), Direction::S);
        assert_eq!(Direction::NE.opposite(), Direction::SW);
        assert_eq!(Direction::E.opposite(), Direction::W);
        assert_eq!(Direction::SE.opposite(), Direction::NW);
    }

    #[test]
    fn test_direction_parse() {
        assert_eq!("ne".parse::<Direction>().unwrap(), Direction::NE);
        assert!("up".parse::<Direction>().is_err());
    }

    #[test]
    fn test_reversed_edge() {
        let edge = NewEdge::new("A", "B", "A", 3, Direction::N).with_hold();
        let back = edge.reversed();

        assert_eq!(back.from_id, "B");
        assert_eq!(back.to_id, "A");
        assert_eq!(back.direction, Direction::S);
        assert_eq!(back.via, edge.via);
        assert_eq!(back.distance, edge.distance);
        assert!(back.requires_hold);
    }

    #[test]
    fn test_other_end() {
        let edge = Edge::new("KTST", NewEdge::new("A", "B", "A", 1, Direction::E));
        assert_eq!(edge.other_end("A"), Some("B"));
        assert_eq!(edge.other_end("B"), Some("A"));
        assert_eq!(edge.other_end("C"), None);
    }
}
