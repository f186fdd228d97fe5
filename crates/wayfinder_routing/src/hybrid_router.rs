use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::{
    astar::AStar,
    bounding_box::BoundingBox,
    config::RouterConfig,
    error::RoutingError,
    geopoint::GeoPoint,
    graph_builder::GraphBuilder,
    network_cache::RoadNetworkCache,
    providers::{MapDataProvider, RouteProvider},
    race::with_deadline,
    road_network::RoadNetwork,
    route_result::RouteResult,
    routing_request::RoutingRequest,
};

/// Picks a routing strategy per request.
///
/// Short trips are searched locally on a road network fetched from the map
/// data provider; long trips, and short trips the local search cannot
/// serve, go to the remote routing service. Failures never escape: the
/// caller gets a route or `None`.
pub struct HybridRouter<M, R> {
    map_data: M,
    remote: R,
    cache: Arc<RoadNetworkCache>,
    config: RouterConfig,
}

impl<M, R> HybridRouter<M, R>
where
    M: MapDataProvider,
    R: RouteProvider,
{
    pub fn new(map_data: M, remote: R, config: RouterConfig) -> Self {
        let cache = Arc::new(RoadNetworkCache::new(config.cache_capacity));
        Self::with_cache(map_data, remote, cache, config)
    }

    /// Shares an existing cache, e.g. between several routers.
    pub fn with_cache(
        map_data: M,
        remote: R,
        cache: Arc<RoadNetworkCache>,
        config: RouterConfig,
    ) -> Self {
        Self {
            map_data,
            remote,
            cache,
            config,
        }
    }

    pub fn cache(&self) -> &Arc<RoadNetworkCache> {
        &self.cache
    }

    pub fn config(&self) -> &RouterConfig {
        &self.config
    }

    pub async fn route(&self, request: RoutingRequest) -> Option<RouteResult> {
        if request.is_cancelled() {
            info!("Routing request cancelled before dispatch");
            return None;
        }

        let distance = request.straight_line_distance();

        if distance <= self.config.local_threshold_meters {
            info!(
                "Routing {:.0} m trip with the local graph search",
                distance
            );

            match self.route_locally(&request).await {
                Ok(result) => return Some(result),
                Err(RoutingError::Cancelled) => {
                    info!("Routing request cancelled");
                    return None;
                }
                Err(error) => warn!("Local routing failed, falling back to remote: {}", error),
            }
        } else {
            info!(
                "Routing {:.0} m trip with the remote service",
                distance
            );
        }

        match self.route_remotely(&request).await {
            Ok(Some(result)) => Some(result),
            Ok(None) => {
                info!("Remote service found no route");
                None
            }
            Err(RoutingError::Cancelled) => {
                info!("Routing request cancelled");
                None
            }
            Err(error) => {
                warn!("Remote routing failed: {}", error);
                None
            }
        }
    }

    pub async fn route_locally(&self, request: &RoutingRequest) -> Result<RouteResult, RoutingError> {
        let network = self
            .road_network(&request.start, &request.end, request.cancellation.as_ref())
            .await?;

        if network.is_empty() {
            return Err(RoutingError::UnreachableEndpoint {
                lat: request.start.lat,
                lng: request.start.lng,
            });
        }

        let path = AStar::with_heuristic(&network, self.config.heuristic)
            .find_path(&request.start, &request.end)?;

        debug!(
            "Local path with {} nodes, {:.0} m",
            path.nodes.len(),
            path.cost
        );

        RouteResult::from_local_geometry(path.geometry, self.config.average_speed_kmh)
            .ok_or(RoutingError::NoPath)
    }

    pub async fn route_remotely(
        &self,
        request: &RoutingRequest,
    ) -> Result<Option<RouteResult>, RoutingError> {
        let route = with_deadline(
            self.config.remote_timeout,
            request.cancellation.as_ref(),
            self.remote.fetch_route(request.start, request.end),
        )
        .await?;

        Ok(route.and_then(RouteResult::from_remote))
    }

    /// Road network covering both points, from the cache when possible.
    pub async fn road_network(
        &self,
        start: &GeoPoint,
        end: &GeoPoint,
        cancellation: Option<&CancellationToken>,
    ) -> Result<Arc<RoadNetwork>, RoutingError> {
        let bbox = BoundingBox::around(start, end).padded(self.config.bbox_padding_meters);
        let key = bbox.cache_key(self.config.cache_key_precision);

        let map_data = &self.map_data;
        let timeout = self.config.map_data_timeout;

        self.cache
            .get_or_build(&key, move || async move {
                let elements =
                    with_deadline(timeout, cancellation, map_data.fetch_elements(&bbox)).await?;

                Ok(GraphBuilder::build(&elements))
            })
            .await
    }
}
