use serde::{Deserialize, Serialize};

use crate::constants::EARTH_RADIUS_METERS;

/// A WGS84 coordinate in decimal degrees. Ranges are not validated.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

impl GeoPoint {
    pub fn new(lat: f64, lng: f64) -> Self {
        GeoPoint { lat, lng }
    }

    /// Great-circle distance in meters. Used for edge weights and reported distances.
    pub fn haversine_distance(&self, other: &GeoPoint) -> f64 {
        haversine_distance(self.lat, self.lng, other.lat, other.lng)
    }

    /// Equirectangular approximation in meters, only meant as a search heuristic.
    pub fn planar_distance(&self, other: &GeoPoint) -> f64 {
        planar_distance(self.lat, self.lng, other.lat, other.lng)
    }
}

pub fn haversine_distance(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let lat1_rad = lat1.to_radians();
    let lon1_rad = lon1.to_radians();
    let lat2_rad = lat2.to_radians();
    let lon2_rad = lon2.to_radians();

    let delta_lat = lat2_rad - lat1_rad;
    let delta_lon = lon2_rad - lon1_rad;

    let a = (delta_lat / 2.0).sin().powi(2)
        + lat1_rad.cos() * lat2_rad.cos() * (delta_lon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_METERS * c
}

/// Projects both points on a plane tangent at their mean latitude, longitude
/// degrees being shortened by the cosine of that latitude.
pub fn planar_distance(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let mean_lat = ((lat1 + lat2) / 2.0).to_radians();
    let x = (lon2 - lon1).to_radians() * mean_lat.cos();
    let y = (lat2 - lat1).to_radians();

    EARTH_RADIUS_METERS * (x * x + y * y).sqrt()
}

/// Sum of the great-circle distances between consecutive points.
pub fn geometry_distance(geometry: &[GeoPoint]) -> f64 {
    geometry
        .windows(2)
        .map(|pair| pair[0].haversine_distance(&pair[1]))
        .sum()
}
