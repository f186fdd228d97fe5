pub mod astar;
pub mod astar_heuristic;
pub mod bounding_box;
pub mod config;
mod constants;
pub mod error;
pub mod geopoint;
pub mod graph_builder;
pub mod hybrid_router;
pub mod network_cache;
pub mod osm;
pub mod priority_queue;
pub mod providers;
pub mod race;
pub mod road_network;
pub mod route_result;
pub mod routing_request;
mod stopwatch;

#[cfg(test)]
pub(crate) mod test_utils;
