use serde::{Deserialize, Serialize};

use crate::geopoint::GeoPoint;

pub trait AStarHeuristic {
    /// Estimated remaining cost in meters from `from` to `to`.
    fn estimate(&self, from: &GeoPoint, to: &GeoPoint) -> f64;
}

/// Fast equirectangular estimate. It is not a proven lower bound of the
/// great-circle edge weights, so paths found with it may be slightly longer
/// than optimal.
pub struct PlanarHeuristic;

impl AStarHeuristic for PlanarHeuristic {
    #[inline(always)]
    fn estimate(&self, from: &GeoPoint, to: &GeoPoint) -> f64 {
        from.planar_distance(to)
    }
}

/// Exact great-circle estimate, admissible for great-circle edge weights.
pub struct HaversineHeuristic;

impl AStarHeuristic for HaversineHeuristic {
    #[inline(always)]
    fn estimate(&self, from: &GeoPoint, to: &GeoPoint) -> f64 {
        from.haversine_distance(to)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HeuristicKind {
    #[default]
    Planar,
    Haversine,
}

impl AStarHeuristic for HeuristicKind {
    fn estimate(&self, from: &GeoPoint, to: &GeoPoint) -> f64 {
        match self {
            HeuristicKind::Planar => PlanarHeuristic.estimate(from, to),
            HeuristicKind::Haversine => HaversineHeuristic.estimate(from, to),
        }
    }
}

impl std::str::FromStr for HeuristicKind {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "planar" => Ok(HeuristicKind::Planar),
            "haversine" | "great_circle" => Ok(HeuristicKind::Haversine),
            other => Err(format!("Unknown heuristic {other}")),
        }
    }
}
