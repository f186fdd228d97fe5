use serde::{Deserialize, Serialize};

use crate::{
    constants::KMH_TO_MS,
    geopoint::{GeoPoint, geometry_distance},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoutingAlgorithm {
    LocalGraphSearch,
    RemoteService,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteStep {
    /// Maneuver type, e.g. `depart`, `turn`, `arrive`
    pub maneuver: String,
    pub modifier: Option<String>,
    pub name: String,
    /// Meters
    pub distance: f64,
    /// Seconds
    pub duration: f64,
}

/// Route as reported by a remote routing service, geometry already in lat/lng order.
#[derive(Debug, Clone, PartialEq)]
pub struct RemoteRoute {
    pub geometry: Vec<GeoPoint>,
    pub distance: f64,
    pub duration: f64,
    pub steps: Vec<RouteStep>,
}

/// Normalized route handed back to callers, whichever engine produced it.
///
/// The geometry is never empty: "no route" is represented by the absence of
/// a result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteResult {
    pub geometry: Vec<GeoPoint>,
    /// Meters
    pub distance: f64,
    /// Seconds
    pub duration: f64,
    pub steps: Vec<RouteStep>,
    pub algorithm: RoutingAlgorithm,
}

impl RouteResult {
    /// Builds the result of a local search. Distance is summed along the
    /// geometry and duration assumes a constant average speed.
    pub fn from_local_geometry(geometry: Vec<GeoPoint>, average_speed_kmh: f64) -> Option<Self> {
        if geometry.is_empty() {
            return None;
        }

        let distance = geometry_distance(&geometry);
        let duration = if average_speed_kmh > 0.0 {
            distance / (average_speed_kmh * KMH_TO_MS)
        } else {
            0.0
        };

        let step = RouteStep {
            maneuver: String::from("depart"),
            modifier: None,
            name: format!("Follow the road network for {:.1} km", distance / 1000.0),
            distance,
            duration,
        };

        Some(RouteResult {
            geometry,
            distance,
            duration,
            steps: vec![step],
            algorithm: RoutingAlgorithm::LocalGraphSearch,
        })
    }

    /// Passes a remote route through unchanged. Negative figures are clamped to zero.
    pub fn from_remote(route: RemoteRoute) -> Option<Self> {
        if route.geometry.is_empty() {
            return None;
        }

        Some(RouteResult {
            geometry: route.geometry,
            distance: route.distance.max(0.0),
            duration: route.duration.max(0.0),
            steps: route.steps,
            algorithm: RoutingAlgorithm::RemoteService,
        })
    }
}
