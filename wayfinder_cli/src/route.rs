use clap::Args;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use wayfinder_osrm::client::{OsrmRouteClient, OsrmRouteClientParams};
use wayfinder_overpass::client::{OVERPASS_DEFAULT_URL, OverpassClient, OverpassClientParams};
use wayfinder_routing::{
    astar_heuristic::HeuristicKind, config::RouterConfig, geopoint::GeoPoint,
    hybrid_router::HybridRouter, routing_request::RoutingRequest,
};

use crate::parsers;

const OVERPASS_URL_ENV_VAR: &str = "WAYFINDER_OVERPASS_URL";
const OSRM_URLS_ENV_VAR: &str = "WAYFINDER_OSRM_URLS";

#[derive(Args)]
pub struct RouteArgs {
    /// Start as "lat,lng"
    #[arg(short, long, value_parser = parsers::parse_coordinate, allow_hyphen_values = true)]
    from: GeoPoint,

    /// Destination as "lat,lng"
    #[arg(short, long, value_parser = parsers::parse_coordinate, allow_hyphen_values = true)]
    to: GeoPoint,

    /// A* heuristic: planar or haversine
    #[arg(long)]
    heuristic: Option<HeuristicKind>,
}

pub async fn run(args: RouteArgs) -> anyhow::Result<()> {
    let mut config = RouterConfig::from_env()?;
    if let Some(heuristic) = args.heuristic {
        config.heuristic = heuristic;
    }

    let overpass = OverpassClient::new(OverpassClientParams {
        url: std::env::var(OVERPASS_URL_ENV_VAR).unwrap_or_else(|_| OVERPASS_DEFAULT_URL.to_string()),
        ..Default::default()
    })?;

    let mut osrm_params = OsrmRouteClientParams {
        timeout: config.remote_timeout,
        ..Default::default()
    };
    if let Ok(urls) = std::env::var(OSRM_URLS_ENV_VAR) {
        osrm_params.base_urls = parsers::parse_url_list(&urls);
    }
    let osrm = OsrmRouteClient::new(osrm_params);

    let router = HybridRouter::new(overpass, osrm, config);

    let token = CancellationToken::new();
    let interrupt = token.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, cancelling route request");
            interrupt.cancel();
        }
    });

    let request = RoutingRequest::new(args.from, args.to).with_cancellation(token);

    match router.route(request).await {
        Some(result) => {
            info!(
                "Found route with {:?}: {:.0} m, {:.0} s",
                result.algorithm, result.distance, result.duration
            );
            println!("{}", serde_json::to_string_pretty(&result)?);
            Ok(())
        }
        None => anyhow::bail!("No route found"),
    }
}
