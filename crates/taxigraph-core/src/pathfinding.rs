//! Shortest taxi routes over one airport's graph

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap, HashSet, VecDeque};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::edge::Edge;
use crate::graph::AirportGraph;
use crate::node::Node;

/// What "shortest" means for a path query
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PathMetric {
    /// Fewest edges
    #[default]
    Hops,
    /// Smallest sum of edge `distance`
    Distance,
}

/// Path query builder
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathQuery {
    pub start: String,
    pub end: String,
    #[serde(default)]
    pub metric: PathMetric,
}

impl PathQuery {
    pub fn new(start: impl Into<String>, end: impl Into<String>) -> Self {
        Self {
            start: start.into(),
            end: end.into(),
            metric: PathMetric::Hops,
        }
    }

    pub fn by_distance(mut self) -> Self {
        self.metric = PathMetric::Distance;
        self
    }
}

/// A route between two nodes; `node_ids.len() == via.len() + 1`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxiPath {
    pub node_ids: Vec<String>,
    pub node_names: Vec<String>,
    /// Surface used for each hop
    pub via: Vec<String>,
    /// Hold-short requirement for each hop
    pub holds: Vec<bool>,
    pub total_distance: u32,
}

impl TaxiPath {
    pub fn hops(&self) -> usize {
        self.via.len()
    }

    pub fn hold_count(&self) -> usize {
        self.holds.iter().filter(|h| **h).count()
    }

    /// `Main Ramp -> A -> 27`
    pub fn route(&self) -> String {
        self.node_names.join(" -> ")
    }
}

/// Why no route was returned
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum NoPathReason {
    UnknownStart { id: String },
    UnknownEnd { id: String },
    Disconnected,
}

impl fmt::Display for NoPathReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownStart { id } => write!(f, "start node {} not in this airport", id),
            Self::UnknownEnd { id } => write!(f, "end node {} not in this airport", id),
            Self::Disconnected => write!(f, "nodes are not connected"),
        }
    }
}

/// Result of a path query. Absence of a route is a normal outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PathOutcome {
    Found(TaxiPath),
    NoPath(NoPathReason),
}

impl PathOutcome {
    pub fn path(&self) -> Option<&TaxiPath> {
        match self {
            Self::Found(path) => Some(path),
            Self::NoPath(_) => None,
        }
    }

    pub fn is_found(&self) -> bool {
        matches!(self, Self::Found(_))
    }
}

/// Shortest path by hop count between two nodes of `graph`
pub fn find_path(graph: &AirportGraph, start: &str, end: &str) -> PathOutcome {
    PathFinder::execute(&PathQuery::new(start, end), graph)
}

/// State for Dijkstra priority queue
#[derive(Clone, PartialEq, Eq)]
struct DijkstraState {
    cost: u32,
    node: String,
}

impl Ord for DijkstraState {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse order for min-heap
        other
            .cost
            .cmp(&self.cost)
            .then_with(|| self.node.cmp(&other.node))
    }
}

impl PartialOrd for DijkstraState {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Undirected adjacency: every stored edge is usable both ways
type Adjacency<'a> = HashMap<&'a str, Vec<(&'a str, &'a Edge)>>;

/// Path search engine
pub struct PathFinder;

impl PathFinder {
    /// Execute a path query against an airport snapshot
    pub fn execute(query: &PathQuery, graph: &AirportGraph) -> PathOutcome {
        tracing::debug!(
            "Finding path in {}: {} -> {} by {:?}",
            graph.airport,
            query.start,
            query.end,
            query.metric
        );

        let nodes = graph.node_index();
        if !nodes.contains_key(query.start.as_str()) {
            return PathOutcome::NoPath(NoPathReason::UnknownStart {
                id: query.start.clone(),
            });
        }
        if !nodes.contains_key(query.end.as_str()) {
            return PathOutcome::NoPath(NoPathReason::UnknownEnd {
                id: query.end.clone(),
            });
        }

        let adjacency = Self::adjacency(graph, &nodes);
        let parent = match query.metric {
            PathMetric::Hops => Self::bfs(&query.start, &query.end, &adjacency),
            PathMetric::Distance => Self::dijkstra(&query.start, &query.end, &adjacency),
        };

        match parent {
            Some(parent) => PathOutcome::Found(Self::reconstruct_path(
                &query.start,
                &query.end,
                &parent,
                &nodes,
            )),
            None => {
                tracing::debug!("No path between {} and {}", query.start, query.end);
                PathOutcome::NoPath(NoPathReason::Disconnected)
            }
        }
    }

    fn adjacency<'a>(graph: &'a AirportGraph, nodes: &HashMap<&'a str, &'a Node>) -> Adjacency<'a> {
        let mut adjacency: Adjacency<'a> = HashMap::new();

        for edge in &graph.edges {
            let from = edge.from_id.as_str();
            let to = edge.to_id.as_str();
            // Endpoints outside this airport are not traversable
            if !nodes.contains_key(from) || !nodes.contains_key(to) {
                continue;
            }
            adjacency.entry(from).or_default().push((to, edge));
            adjacency.entry(to).or_default().push((from, edge));
        }

        adjacency
    }

    /// BFS for fewest hops
    fn bfs<'a>(
        start: &'a str,
        end: &str,
        adjacency: &Adjacency<'a>,
    ) -> Option<HashMap<&'a str, (&'a str, &'a Edge)>> {
        let mut visited: HashSet<&str> = HashSet::new();
        let mut parent = HashMap::new();
        let mut queue = VecDeque::new();

        visited.insert(start);
        queue.push_back(start);

        while let Some(current) = queue.pop_front() {
            if current == end {
                return Some(parent);
            }

            for &(next, edge) in adjacency.get(current).into_iter().flatten() {
                if visited.insert(next) {
                    parent.insert(next, (current, edge));
                    queue.push_back(next);
                }
            }
        }

        None
    }

    /// Dijkstra over edge `distance`
    fn dijkstra<'a>(
        start: &'a str,
        end: &str,
        adjacency: &Adjacency<'a>,
    ) -> Option<HashMap<&'a str, (&'a str, &'a Edge)>> {
        let mut dist: HashMap<&str, u32> = HashMap::new();
        let mut parent = HashMap::new();
        let mut heap = BinaryHeap::new();

        dist.insert(start, 0);
        heap.push(DijkstraState {
            cost: 0,
            node: start.to_string(),
        });

        while let Some(DijkstraState { cost, node }) = heap.pop() {
            if node == end {
                return Some(parent);
            }

            // Skip if we already found a better path
            if cost > dist.get(node.as_str()).copied().unwrap_or(u32::MAX) {
                continue;
            }

            let Some((&current, neighbors)) = adjacency.get_key_value(node.as_str()) else {
                continue;
            };

            for &(next, edge) in neighbors {
                let new_cost = cost + u32::from(edge.distance);
                if new_cost < dist.get(next).copied().unwrap_or(u32::MAX) {
                    dist.insert(next, new_cost);
                    parent.insert(next, (current, edge));
                    heap.push(DijkstraState {
                        cost: new_cost,
                        node: next.to_string(),
                    });
                }
            }
        }

        None
    }

    /// Reconstruct path from parent map
    fn reconstruct_path(
        start: &str,
        end: &str,
        parent: &HashMap<&str, (&str, &Edge)>,
        nodes: &HashMap<&str, &Node>,
    ) -> TaxiPath {
        let mut ids = vec![end];
        let mut edges = Vec::new();
        let mut current = end;

        while current != start {
            match parent.get(current) {
                Some(&(prev, edge)) => {
                    edges.push(edge);
                    ids.push(prev);
                    current = prev;
                }
                None => break,
            }
        }

        ids.reverse();
        edges.reverse();

        TaxiPath {
            node_names: ids
                .iter()
                .map(|id| nodes.get(id).map_or_else(|| id.to_string(), |n| n.name.clone()))
                .collect(),
            node_ids: ids.iter().map(|id| id.to_string()).collect(),
            via: edges.iter().map(|e| e.via.clone()).collect(),
            holds: edges.iter().map(|e| e.requires_hold).collect(),
            total_distance: edges.iter().map(|e| u32::from(e.distance)).sum(),
        }
    }
}
