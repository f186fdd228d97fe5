pub(crate) const EARTH_RADIUS_METERS: f64 = 6_371_000.0;

/// Approximate length of one degree of latitude.
pub(crate) const METERS_PER_DEGREE_LAT: f64 = 111_320.0;

pub(crate) const KMH_TO_MS: f64 = 1.0 / 3.6;
