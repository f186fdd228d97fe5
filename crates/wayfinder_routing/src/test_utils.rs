use std::{
    sync::atomic::{AtomicUsize, Ordering},
    time::Duration,
};

use fxhash::FxHashMap;

use crate::{
    bounding_box::BoundingBox,
    geopoint::GeoPoint,
    graph_builder::GraphBuilder,
    osm::{OsmElement, OsmNode, OsmWay},
    providers::{MapDataProvider, RouteProvider},
    road_network::RoadNetwork,
    route_result::{RemoteRoute, RouteStep},
};

/// `rows` x `cols` grid of two-way residential streets. Node `row * cols + col`
/// sits at `(lat + row * step, lng + col * step)`.
pub fn grid_elements(rows: usize, cols: usize, lat: f64, lng: f64, step: f64) -> Vec<OsmElement> {
    let mut elements = Vec::new();
    let id = |row: usize, col: usize| (row * cols + col) as i64;

    for row in 0..rows {
        for col in 0..cols {
            elements.push(OsmElement::Node(OsmNode {
                id: id(row, col),
                lat: lat + row as f64 * step,
                lon: lng + col as f64 * step,
            }));
        }
    }

    let tags: FxHashMap<String, String> =
        [(String::from("highway"), String::from("residential"))].into_iter().collect();

    let mut way_id = 1_000_000;
    for row in 0..rows {
        way_id += 1;
        elements.push(OsmElement::Way(OsmWay {
            id: way_id,
            nodes: (0..cols).map(|col| id(row, col)).collect(),
            tags: tags.clone(),
        }));
    }
    for col in 0..cols {
        way_id += 1;
        elements.push(OsmElement::Way(OsmWay {
            id: way_id,
            nodes: (0..rows).map(|row| id(row, col)).collect(),
            tags: tags.clone(),
        }));
    }

    elements
}

pub fn grid_network(rows: usize, cols: usize, lat: f64, lng: f64, step: f64) -> RoadNetwork {
    GraphBuilder::build(&grid_elements(rows, cols, lat, lng, step))
}

pub struct FakeMapData {
    pub elements: Vec<OsmElement>,
    pub delay: Option<Duration>,
    pub fail: bool,
    fetches: AtomicUsize,
}

impl FakeMapData {
    pub fn new(elements: Vec<OsmElement>) -> Self {
        Self {
            elements,
            delay: None,
            fail: false,
            fetches: AtomicUsize::new(0),
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::new(vec![])
        }
    }

    pub fn delayed(elements: Vec<OsmElement>, delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Self::new(elements)
        }
    }

    pub fn fetches(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

impl MapDataProvider for FakeMapData {
    async fn fetch_elements(&self, _bbox: &BoundingBox) -> anyhow::Result<Vec<OsmElement>> {
        self.fetches.fetch_add(1, Ordering::SeqCst);

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        if self.fail {
            return Err(anyhow::anyhow!("map data unavailable"));
        }

        Ok(self.elements.clone())
    }
}

pub struct FakeRouteProvider {
    pub route: Option<RemoteRoute>,
    pub fail: bool,
    calls: AtomicUsize,
}

impl FakeRouteProvider {
    pub fn new(route: Option<RemoteRoute>) -> Self {
        Self {
            route,
            fail: false,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::new(None)
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl RouteProvider for FakeRouteProvider {
    async fn fetch_route(
        &self,
        _start: GeoPoint,
        _end: GeoPoint,
    ) -> anyhow::Result<Option<RemoteRoute>> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if self.fail {
            return Err(anyhow::anyhow!("routing service unavailable"));
        }

        Ok(self.route.clone())
    }
}

pub fn remote_route(start: GeoPoint, end: GeoPoint) -> RemoteRoute {
    RemoteRoute {
        geometry: vec![start, GeoPoint::new(start.lat, end.lng), end],
        distance: 61_234.5,
        duration: 2_980.0,
        steps: vec![
            RouteStep {
                maneuver: String::from("depart"),
                modifier: None,
                name: String::from("E40"),
                distance: 61_234.5,
                duration: 2_980.0,
            },
            RouteStep {
                maneuver: String::from("arrive"),
                modifier: Some(String::from("right")),
                name: String::new(),
                distance: 0.0,
                duration: 0.0,
            },
        ],
    }
}
