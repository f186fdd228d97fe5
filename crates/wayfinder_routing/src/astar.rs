use fxhash::FxHashMap;
use tracing::debug;

use crate::{
    astar_heuristic::AStarHeuristic,
    error::RoutingError,
    geopoint::GeoPoint,
    priority_queue::PriorityQueue,
    road_network::{NodeId, RoadNetwork},
    stopwatch::Stopwatch,
};

/// https://en.wikipedia.org/wiki/A*_search_algorithm

struct NodeData {
    /// g_score is the current cheapest weight from start to this node
    g_score: f64,
    parent: Option<NodeId>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AStarPath {
    pub nodes: Vec<NodeId>,
    pub geometry: Vec<GeoPoint>,
    /// Sum of the edge weights in meters
    pub cost: f64,
}

pub struct AStar<'a, H> {
    network: &'a RoadNetwork,
    heuristic: H,

    // Entries are (node, g_score at push time), prioritized by f_score. A node
    // may be queued several times; outdated entries are skipped when popped.
    heap: PriorityQueue<(NodeId, f64)>,
    data: FxHashMap<NodeId, NodeData>,
}

impl<'a, H> AStar<'a, H>
where
    H: AStarHeuristic,
{
    pub fn with_heuristic(network: &'a RoadNetwork, heuristic: H) -> Self {
        AStar {
            network,
            heuristic,
            heap: PriorityQueue::with_capacity(1024),
            data: FxHashMap::default(),
        }
    }

    /// Closest node with at least one outgoing edge, by planar distance.
    /// Ties keep the first node encountered.
    pub fn nearest_node(&self, point: &GeoPoint) -> Option<NodeId> {
        let mut best: Option<(NodeId, f64)> = None;

        for &node in self.network.routable_nodes() {
            let Some(coordinates) = self.network.node_coordinates(node) else {
                continue;
            };

            let distance = coordinates.planar_distance(point);
            if best.is_none_or(|(_, best_distance)| distance < best_distance) {
                best = Some((node, distance));
            }
        }

        best.map(|(node, _)| node)
    }

    /// Resolves both points to their nearest routable node and searches between them.
    pub fn find_path(&mut self, start: &GeoPoint, end: &GeoPoint) -> Result<AStarPath, RoutingError> {
        let start_node = self
            .nearest_node(start)
            .ok_or(RoutingError::UnreachableEndpoint {
                lat: start.lat,
                lng: start.lng,
            })?;
        let end_node = self
            .nearest_node(end)
            .ok_or(RoutingError::UnreachableEndpoint {
                lat: end.lat,
                lng: end.lng,
            })?;

        self.calc_path(start_node, end_node)
    }

    pub fn calc_path(&mut self, start: NodeId, end: NodeId) -> Result<AStarPath, RoutingError> {
        let stopwatch = Stopwatch::start("astar/calc_path");
        let network = self.network;
        let end_coordinates = *network
            .node_coordinates(end)
            .ok_or(RoutingError::NoPath)?;

        self.heap.clear();
        self.data.clear();

        self.data.insert(
            start,
            NodeData {
                g_score: 0.0,
                parent: None,
            },
        );
        self.heap.push((start, 0.0), 0.0);

        let mut iterations = 0;
        let mut found = false;

        while let Some(((node, g_score), _)) = self.heap.pop() {
            if node == end {
                found = true;
                break;
            }

            // A better path to this node was recorded after this entry was queued
            if g_score > self.g_score(node) {
                continue;
            }

            iterations += 1;

            for edge in network.edges(node) {
                let tentative_g_score = g_score + edge.weight;

                if tentative_g_score < self.g_score(edge.to) {
                    self.data.insert(
                        edge.to,
                        NodeData {
                            g_score: tentative_g_score,
                            parent: Some(node),
                        },
                    );

                    let Some(coordinates) = network.node_coordinates(edge.to) else {
                        continue;
                    };
                    let f_score =
                        tentative_g_score + self.heuristic.estimate(coordinates, &end_coordinates);
                    self.heap.push((edge.to, tentative_g_score), f_score);
                }
            }
        }

        debug!("AStar iterations: {}", iterations);
        stopwatch.report();

        if !found {
            return Err(RoutingError::NoPath);
        }

        self.build_path(start, end)
    }

    #[inline(always)]
    fn g_score(&self, node: NodeId) -> f64 {
        self.data
            .get(&node)
            .map_or(f64::INFINITY, |data| data.g_score)
    }

    fn build_path(&self, start: NodeId, end: NodeId) -> Result<AStarPath, RoutingError> {
        let mut nodes = vec![end];
        let mut node = end;

        while node != start {
            match self.data.get(&node).and_then(|data| data.parent) {
                Some(parent) => {
                    nodes.push(parent);
                    node = parent;
                }
                None => return Err(RoutingError::NoPath),
            }
        }

        nodes.reverse();

        let geometry = nodes
            .iter()
            .filter_map(|node| self.network.node_coordinates(*node).copied())
            .collect();

        Ok(AStarPath {
            nodes,
            geometry,
            cost: self.g_score(end),
        })
    }
}
