use serde::{Deserialize, Serialize};

use crate::{constants::METERS_PER_DEGREE_LAT, geopoint::GeoPoint};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min_lat: f64,
    pub min_lng: f64,
    pub max_lat: f64,
    pub max_lng: f64,
}

impl BoundingBox {
    pub fn new(min_lat: f64, min_lng: f64, max_lat: f64, max_lng: f64) -> Self {
        Self {
            min_lat,
            min_lng,
            max_lat,
            max_lng,
        }
    }

    /// The smallest box containing both points.
    pub fn around(a: &GeoPoint, b: &GeoPoint) -> Self {
        Self {
            min_lat: a.lat.min(b.lat),
            min_lng: a.lng.min(b.lng),
            max_lat: a.lat.max(b.lat),
            max_lng: a.lng.max(b.lng),
        }
    }

    /// Grows the box by `meters` on every side. Longitude padding is widened
    /// by the cosine of the box's central latitude so the margin stays metric.
    pub fn padded(&self, meters: f64) -> Self {
        let lat_pad = meters / METERS_PER_DEGREE_LAT;
        let center_lat = ((self.min_lat + self.max_lat) / 2.0).to_radians();
        let lng_pad = lat_pad / center_lat.cos().max(0.01);

        Self {
            min_lat: self.min_lat - lat_pad,
            min_lng: self.min_lng - lng_pad,
            max_lat: self.max_lat + lat_pad,
            max_lng: self.max_lng + lng_pad,
        }
    }

    /// Bounds rounded to `precision` decimals, so that nearly identical boxes share a key.
    pub fn cache_key(&self, precision: usize) -> String {
        format!(
            "{:.p$}_{:.p$}_{:.p$}_{:.p$}",
            self.min_lat,
            self.min_lng,
            self.max_lat,
            self.max_lng,
            p = precision
        )
    }
}
