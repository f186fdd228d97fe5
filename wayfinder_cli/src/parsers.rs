use wayfinder_routing::geopoint::GeoPoint;

/// Parses `"lat,lng"` in decimal degrees.
pub fn parse_coordinate(input: &str) -> Result<GeoPoint, String> {
    let (lat, lng) = input
        .split_once(',')
        .ok_or_else(|| String::from("Expected \"lat,lng\""))?;

    let lat: f64 = lat
        .trim()
        .parse()
        .map_err(|_| format!("Invalid latitude {lat}"))?;
    let lng: f64 = lng
        .trim()
        .parse()
        .map_err(|_| format!("Invalid longitude {lng}"))?;

    if !(-90.0..=90.0).contains(&lat) {
        return Err(format!("Latitude out of range: {lat}"));
    }

    if !(-180.0..=180.0).contains(&lng) {
        return Err(format!("Longitude out of range: {lng}"));
    }

    Ok(GeoPoint::new(lat, lng))
}

/// Comma separated list, blanks dropped.
pub fn parse_url_list(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|url| !url.is_empty())
        .map(String::from)
        .collect()
}
