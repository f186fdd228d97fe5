use std::future::Future;

use crate::{
    bounding_box::BoundingBox, geopoint::GeoPoint, osm::OsmElement, route_result::RemoteRoute,
};

/// Source of raw road elements (points and drivable ways) for a bounding box.
pub trait MapDataProvider: Send + Sync {
    fn fetch_elements(
        &self,
        bbox: &BoundingBox,
    ) -> impl Future<Output = anyhow::Result<Vec<OsmElement>>> + Send;
}

/// Remote routing service. `Ok(None)` means the service answered but found no route.
pub trait RouteProvider: Send + Sync {
    fn fetch_route(
        &self,
        start: GeoPoint,
        end: GeoPoint,
    ) -> impl Future<Output = anyhow::Result<Option<RemoteRoute>>> + Send;
}
