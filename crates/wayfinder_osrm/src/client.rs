use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info};
use wayfinder_routing::{
    error::RoutingError,
    geopoint::GeoPoint,
    providers::RouteProvider,
    race::first_success,
    route_result::{RemoteRoute, RouteStep},
};

#[derive(Debug, Error)]
pub enum OsrmError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    #[error("Deserialization error: {0}")]
    Deserialize(#[from] serde_json::Error),
}

#[derive(Deserialize)]
struct OsrmRouteResponse {
    code: String,
    message: Option<String>,
    #[serde(default)]
    routes: Vec<OsrmRoute>,
}

#[derive(Deserialize)]
struct OsrmRoute {
    geometry: OsrmGeometry,

    /// Meters
    distance: f64,

    /// Seconds
    duration: f64,

    #[serde(default)]
    legs: Vec<OsrmLeg>,
}

/// GeoJSON line string, coordinates in `[lng, lat]` order
#[derive(Deserialize)]
struct OsrmGeometry {
    coordinates: Vec<[f64; 2]>,
}

#[derive(Deserialize)]
struct OsrmLeg {
    #[serde(default)]
    steps: Vec<OsrmStep>,
}

#[derive(Deserialize)]
struct OsrmStep {
    maneuver: OsrmManeuver,
    #[serde(default)]
    name: String,
    distance: f64,
    duration: f64,
}

#[derive(Deserialize)]
struct OsrmManeuver {
    #[serde(rename = "type")]
    kind: String,
    modifier: Option<String>,
}

pub struct OsrmRouteClientParams {
    /// Primary server first, then mirrors. All of them are queried at once.
    pub base_urls: Vec<String>,
    pub timeout: Duration,
}

pub const OSRM_ROUTE_API_PATH: &str = "/route/v1/driving/";
pub const OSRM_DEMO_URL: &str = "https://router.project-osrm.org";

impl Default for OsrmRouteClientParams {
    fn default() -> Self {
        Self {
            base_urls: vec![OSRM_DEMO_URL.to_string()],
            timeout: Duration::from_secs(10),
        }
    }
}

pub struct OsrmRouteClient {
    params: OsrmRouteClientParams,
    client: reqwest::Client,
}

impl OsrmRouteClient {
    pub fn new(params: OsrmRouteClientParams) -> Self {
        Self {
            params,
            client: reqwest::Client::new(),
        }
    }

    /// Races every configured server and keeps the first answer.
    pub async fn fetch_route(
        &self,
        start: GeoPoint,
        end: GeoPoint,
    ) -> Result<Option<RemoteRoute>, RoutingError> {
        let requests = self.params.base_urls.iter().map(|base_url| async move {
            let route = self.fetch_route_from(base_url, start, end).await?;
            Ok::<_, anyhow::Error>(route)
        });

        first_success(requests, self.params.timeout).await
    }

    pub async fn fetch_route_from(
        &self,
        base_url: &str,
        start: GeoPoint,
        end: GeoPoint,
    ) -> Result<Option<RemoteRoute>, OsrmError> {
        let url = route_url(base_url, start, end);
        debug!("OSRM request {}", url);

        let response = self
            .client
            .get(url)
            .query(&[
                ("overview", "full"),
                ("geometries", "geojson"),
                ("steps", "true"),
            ])
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        handle_route_response(status, &body)
    }
}

impl RouteProvider for OsrmRouteClient {
    async fn fetch_route(
        &self,
        start: GeoPoint,
        end: GeoPoint,
    ) -> anyhow::Result<Option<RemoteRoute>> {
        Ok(OsrmRouteClient::fetch_route(self, start, end).await?)
    }
}

pub fn route_url(base_url: &str, start: GeoPoint, end: GeoPoint) -> String {
    let mut url = base_url.trim_end_matches('/').to_string();
    url.push_str(OSRM_ROUTE_API_PATH);
    url.push_str(&format!(
        "{},{};{},{}",
        start.lng, start.lat, end.lng, end.lat
    ));
    url
}

/// OSRM answers 4xx with a JSON `code` for unroutable points, which is a
/// "no route" answer. Any other failure status is an error.
pub fn handle_route_response(
    status: reqwest::StatusCode,
    body: &str,
) -> Result<Option<RemoteRoute>, OsrmError> {
    if status.is_success() {
        return parse_route_response(body);
    }

    match serde_json::from_str::<OsrmRouteResponse>(body) {
        Ok(response) => {
            info!(
                "OSRM status {} reported {}: {}",
                status,
                response.code,
                response.message.unwrap_or_default()
            );
            Ok(None)
        }
        Err(_) => Err(OsrmError::Api {
            status: status.as_u16(),
            message: body.to_string(),
        }),
    }
}

/// `Ok(None)` when the service answered without a usable route.
pub fn parse_route_response(body: &str) -> Result<Option<RemoteRoute>, OsrmError> {
    let response: OsrmRouteResponse = serde_json::from_str(body)?;

    if response.code != "Ok" {
        info!(
            "OSRM reported {}: {}",
            response.code,
            response.message.unwrap_or_default()
        );
        return Ok(None);
    }

    let Some(route) = response.routes.into_iter().next() else {
        return Ok(None);
    };

    let geometry = route
        .geometry
        .coordinates
        .into_iter()
        .map(|[lng, lat]| GeoPoint::new(lat, lng))
        .collect();

    let steps = route
        .legs
        .into_iter()
        .flat_map(|leg| leg.steps)
        .map(|step| RouteStep {
            maneuver: step.maneuver.kind,
            modifier: step.maneuver.modifier,
            name: step.name,
            distance: step.distance,
            duration: step.duration,
        })
        .collect();

    Ok(Some(RemoteRoute {
        geometry,
        distance: route.distance,
        duration: route.duration,
        steps,
    }))
}
