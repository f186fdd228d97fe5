use tracing::{debug, info};

use crate::{
    geopoint::GeoPoint,
    osm::{OsmElement, OsmWay},
    road_network::RoadNetwork,
    stopwatch::Stopwatch,
};

pub static HIGHWAY_VALUES: [&str; 15] = [
    "motorway",
    "motorway_link",
    "trunk",
    "trunk_link",
    "primary",
    "primary_link",
    "secondary",
    "secondary_link",
    "tertiary",
    "tertiary_link",
    "unclassified",
    "residential",
    "living_street",
    "service",
    "road",
];

static ONEWAYS: [&str; 3] = ["yes", "true", "1"];

#[derive(Debug, PartialEq, Eq)]
enum WayDirection {
    Both,
    Forward,
    Backward,
}

// https://wiki.openstreetmap.org/wiki/Key:highway
pub fn is_drivable(way: &OsmWay) -> bool {
    match way.get_tag("highway") {
        // https://wiki.openstreetmap.org/wiki/Tag:highway%3Dservice
        Some("service") if way.has_tag("service", "emergency_access") => false,
        Some(value) => HIGHWAY_VALUES.contains(&value),
        None => false,
    }
}

// https://wiki.openstreetmap.org/wiki/Key:oneway
fn way_direction(way: &OsmWay) -> WayDirection {
    if way.has_tag("oneway", "-1") {
        return WayDirection::Backward;
    }

    let oneway = way
        .get_tag("oneway")
        .is_some_and(|value| ONEWAYS.contains(&value));

    // https://wiki.openstreetmap.org/wiki/Key:junction
    let roundabout = way.has_tag("junction", "roundabout") || way.has_tag("junction", "circular");

    if oneway || roundabout {
        WayDirection::Forward
    } else {
        WayDirection::Both
    }
}

/// Turns raw map elements into a [`RoadNetwork`].
///
/// Nodes are collected first so that ways may reference nodes listed after
/// them. A segment touching an unknown node is skipped, the rest of its way
/// is kept.
pub struct GraphBuilder;

impl GraphBuilder {
    pub fn build(elements: &[OsmElement]) -> RoadNetwork {
        let mut stopwatch = Stopwatch::start("graph_builder/build");
        let mut network = RoadNetwork::new();

        for element in elements {
            if let OsmElement::Node(node) = element {
                network.add_node(node.id, GeoPoint::new(node.lat, node.lon));
            }
        }

        stopwatch.lap("nodes");

        let mut way_count = 0;
        let mut skipped_segments = 0;

        for element in elements {
            let OsmElement::Way(way) = element else {
                continue;
            };

            if !is_drivable(way) {
                continue;
            }

            let direction = way_direction(way);
            way_count += 1;

            for pair in way.nodes.windows(2) {
                let (a, b) = (pair[0], pair[1]);

                if network.node_coordinates(a).is_none() || network.node_coordinates(b).is_none()
                {
                    skipped_segments += 1;
                    continue;
                }

                if direction != WayDirection::Backward {
                    network.add_edge(a, b);
                }

                if direction != WayDirection::Forward {
                    network.add_edge(b, a);
                }
            }
        }

        if skipped_segments > 0 {
            debug!("Skipped {} segments with unknown nodes", skipped_segments);
        }

        info!(
            "Built road network with {} nodes and {} edges from {} ways",
            network.node_count(),
            network.edge_count(),
            way_count
        );
        stopwatch.report();

        network
    }
}
