use tokio_util::sync::CancellationToken;

use crate::geopoint::GeoPoint;

#[derive(Debug, Clone)]
pub struct RoutingRequest {
    pub start: GeoPoint,
    pub end: GeoPoint,

    /// Cancelling abandons in-flight fetches; the request then yields no route.
    pub cancellation: Option<CancellationToken>,
}

impl RoutingRequest {
    pub fn new(start: GeoPoint, end: GeoPoint) -> Self {
        Self {
            start,
            end,
            cancellation: None,
        }
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }

    /// Straight-line distance between the raw endpoints, in meters.
    pub fn straight_line_distance(&self) -> f64 {
        self.start.haversine_distance(&self.end)
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancellation
            .as_ref()
            .is_some_and(CancellationToken::is_cancelled)
    }
}
