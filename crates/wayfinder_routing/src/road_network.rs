use fxhash::FxHashMap;

use crate::geopoint::GeoPoint;

pub type NodeId = i64;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Edge {
    pub from: NodeId,
    pub to: NodeId,
    /// Great-circle length in meters
    pub weight: f64,
}

/// Directed road graph for one bounding box. Immutable once built.
///
/// Every edge endpoint is present in the coordinate table, and only nodes
/// with at least one outgoing edge have an adjacency entry.
#[derive(Debug, Default)]
pub struct RoadNetwork {
    coordinates: FxHashMap<NodeId, GeoPoint>,
    adjacency: FxHashMap<NodeId, Vec<Edge>>,

    // Nodes with outgoing edges, in the order their first edge was added
    routable_nodes: Vec<NodeId>,
}

impl RoadNetwork {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_node(&mut self, id: NodeId, coordinates: GeoPoint) {
        self.coordinates.insert(id, coordinates);
    }

    /// Adds a directed edge weighted by the great-circle distance between its
    /// endpoints. Returns `false` and stores nothing when an endpoint is unknown.
    pub fn add_edge(&mut self, from: NodeId, to: NodeId) -> bool {
        let (Some(from_point), Some(to_point)) =
            (self.coordinates.get(&from), self.coordinates.get(&to))
        else {
            return false;
        };

        let weight = from_point.haversine_distance(to_point);
        let edges = self.adjacency.entry(from).or_insert_with(|| {
            self.routable_nodes.push(from);
            Vec::new()
        });

        edges.push(Edge { from, to, weight });
        true
    }

    pub fn node_coordinates(&self, id: NodeId) -> Option<&GeoPoint> {
        self.coordinates.get(&id)
    }

    /// Outgoing edges of `id`, empty for unknown or dead-end nodes.
    pub fn edges(&self, id: NodeId) -> &[Edge] {
        self.adjacency.get(&id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn routable_nodes(&self) -> &[NodeId] {
        &self.routable_nodes
    }

    pub fn node_count(&self) -> usize {
        self.coordinates.len()
    }

    pub fn edge_count(&self) -> usize {
        self.adjacency.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.routable_nodes.is_empty()
    }
}
