use std::time::Duration;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum RoutingError {
    #[error("Data acquisition failed: {0}")]
    Acquisition(#[source] anyhow::Error),

    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    #[error("Request was cancelled")]
    Cancelled,

    #[error("No road network node near {lat},{lng}")]
    UnreachableEndpoint { lat: f64, lng: f64 },

    #[error("No path between the resolved nodes")]
    NoPath,

    #[error("All {} requests failed", .0.len())]
    AllFailed(Vec<RoutingError>),
}
