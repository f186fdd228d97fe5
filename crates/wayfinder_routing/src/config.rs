use std::{str::FromStr, time::Duration};

use anyhow::Context;

use crate::{astar_heuristic::HeuristicKind, network_cache::DEFAULT_CACHE_CAPACITY};

const LOCAL_THRESHOLD_ENV_VAR: &str = "WAYFINDER_LOCAL_THRESHOLD_METERS";
const PADDING_ENV_VAR: &str = "WAYFINDER_BBOX_PADDING_METERS";
const CACHE_KEY_PRECISION_ENV_VAR: &str = "WAYFINDER_CACHE_KEY_PRECISION";
const CACHE_CAPACITY_ENV_VAR: &str = "WAYFINDER_CACHE_CAPACITY";
const AVERAGE_SPEED_ENV_VAR: &str = "WAYFINDER_AVERAGE_SPEED_KMH";
const MAP_DATA_TIMEOUT_ENV_VAR: &str = "WAYFINDER_MAP_DATA_TIMEOUT_SECS";
const REMOTE_TIMEOUT_ENV_VAR: &str = "WAYFINDER_REMOTE_TIMEOUT_SECS";
const HEURISTIC_ENV_VAR: &str = "WAYFINDER_HEURISTIC";

#[derive(Debug, Clone)]
pub struct RouterConfig {
    /// Straight-line distance up to which the local search is attempted
    pub local_threshold_meters: f64,

    /// Margin added around the start/end box before fetching map data
    pub bbox_padding_meters: f64,

    /// Decimals kept in the bounding box cache key
    pub cache_key_precision: usize,

    /// `None` keeps every network for the life of the process
    pub cache_capacity: Option<usize>,

    /// Assumed speed for local route durations
    pub average_speed_kmh: f64,

    pub map_data_timeout: Duration,
    pub remote_timeout: Duration,

    pub heuristic: HeuristicKind,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            local_threshold_meters: 12_000.0,
            bbox_padding_meters: 1_500.0,
            cache_key_precision: 3,
            cache_capacity: Some(DEFAULT_CACHE_CAPACITY),
            average_speed_kmh: 40.0,
            map_data_timeout: Duration::from_secs(15),
            remote_timeout: Duration::from_secs(10),
            heuristic: HeuristicKind::Planar,
        }
    }
}

impl RouterConfig {
    /// Defaults overridden by the `WAYFINDER_*` environment variables that are set.
    pub fn from_env() -> anyhow::Result<Self> {
        let defaults = Self::default();

        let cache_capacity = match env_var::<usize>(CACHE_CAPACITY_ENV_VAR)? {
            Some(0) => None,
            Some(capacity) => Some(capacity),
            None => defaults.cache_capacity,
        };

        Ok(Self {
            local_threshold_meters: env_var(LOCAL_THRESHOLD_ENV_VAR)?
                .unwrap_or(defaults.local_threshold_meters),
            bbox_padding_meters: env_var(PADDING_ENV_VAR)?.unwrap_or(defaults.bbox_padding_meters),
            cache_key_precision: env_var(CACHE_KEY_PRECISION_ENV_VAR)?
                .unwrap_or(defaults.cache_key_precision),
            cache_capacity,
            average_speed_kmh: env_var(AVERAGE_SPEED_ENV_VAR)?
                .unwrap_or(defaults.average_speed_kmh),
            map_data_timeout: env_var(MAP_DATA_TIMEOUT_ENV_VAR)?
                .map(Duration::from_secs)
                .unwrap_or(defaults.map_data_timeout),
            remote_timeout: env_var(REMOTE_TIMEOUT_ENV_VAR)?
                .map(Duration::from_secs)
                .unwrap_or(defaults.remote_timeout),
            heuristic: match std::env::var(HEURISTIC_ENV_VAR) {
                Ok(value) => value
                    .trim()
                    .parse()
                    .map_err(|error: String| anyhow::anyhow!("{HEURISTIC_ENV_VAR}: {error}"))?,
                Err(_) => defaults.heuristic,
            },
        })
    }
}

fn env_var<T>(name: &str) -> anyhow::Result<Option<T>>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(name) {
        Ok(value) => value
            .trim()
            .parse::<T>()
            .map(Some)
            .with_context(|| format!("Invalid value for {name}: {value}")),
        Err(_) => Ok(None),
    }
}
