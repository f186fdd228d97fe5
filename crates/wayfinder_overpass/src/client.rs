use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info, warn};
use wayfinder_routing::{
    bounding_box::BoundingBox, graph_builder::HIGHWAY_VALUES, osm::OsmElement,
    providers::MapDataProvider,
};

pub const OVERPASS_DEFAULT_URL: &str = "https://overpass-api.de/api/interpreter";

#[derive(Debug, Error)]
pub enum OverpassError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    #[error("Deserialization error: {0}")]
    Deserialize(#[from] serde_json::Error),
}

#[derive(Deserialize)]
struct OverpassResponse {
    #[serde(default)]
    elements: Vec<OsmElement>,

    /// Set by the server when the query hit a runtime error, e.g. its own timeout
    remark: Option<String>,
}

pub struct OverpassClientParams {
    pub url: String,
    pub user_agent: String,

    /// Server-side query timeout, sent in the query header
    pub query_timeout: Duration,
}

impl Default for OverpassClientParams {
    fn default() -> Self {
        Self {
            url: OVERPASS_DEFAULT_URL.to_string(),
            user_agent: format!("wayfinder/{}", env!("CARGO_PKG_VERSION")),
            query_timeout: Duration::from_secs(25),
        }
    }
}

pub struct OverpassClient {
    params: OverpassClientParams,
    client: reqwest::Client,
}

impl OverpassClient {
    pub fn new(params: OverpassClientParams) -> Result<Self, OverpassError> {
        let client = reqwest::Client::builder()
            .user_agent(params.user_agent.as_str())
            .build()?;

        Ok(Self { params, client })
    }

    /// Drivable ways inside `bbox` together with every node they reference.
    pub async fn fetch(&self, bbox: &BoundingBox) -> Result<Vec<OsmElement>, OverpassError> {
        let query = build_query(bbox, self.params.query_timeout);
        debug!("Overpass query:\n{}", query);

        info!(
            "Fetching road elements for {:.4},{:.4} to {:.4},{:.4}",
            bbox.min_lat, bbox.min_lng, bbox.max_lat, bbox.max_lng
        );

        let response = self
            .client
            .post(&self.params.url)
            .header("Content-Type", "text/plain")
            .body(query)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        let elements = handle_response(status, &body)?;

        info!("Received {} elements", elements.len());

        Ok(elements)
    }
}

impl MapDataProvider for OverpassClient {
    async fn fetch_elements(&self, bbox: &BoundingBox) -> anyhow::Result<Vec<OsmElement>> {
        Ok(self.fetch(bbox).await?)
    }
}

/// Overpass QL selecting drivable ways in the box, recursed down to their nodes.
pub fn build_query(bbox: &BoundingBox, timeout: Duration) -> String {
    format!(
        r#"[out:json][timeout:{}];
(
  way["highway"~"^({})$"]({},{},{},{});
);
(._;>;);
out body;"#,
        timeout.as_secs(),
        HIGHWAY_VALUES.join("|"),
        bbox.min_lat,
        bbox.min_lng,
        bbox.max_lat,
        bbox.max_lng
    )
}

/// Any non-success status is a failure, whatever the body says.
pub fn handle_response(
    status: reqwest::StatusCode,
    body: &str,
) -> Result<Vec<OsmElement>, OverpassError> {
    if !status.is_success() {
        return Err(OverpassError::Api {
            status: status.as_u16(),
            message: body.to_string(),
        });
    }

    parse_response(body)
}

pub fn parse_response(body: &str) -> Result<Vec<OsmElement>, OverpassError> {
    let response: OverpassResponse = serde_json::from_str(body)?;

    if let Some(remark) = response.remark {
        if remark.contains("error") {
            return Err(OverpassError::Api {
                status: 200,
                message: remark,
            });
        }

        warn!("Overpass remark: {}", remark);
    }

    Ok(response.elements)
}
