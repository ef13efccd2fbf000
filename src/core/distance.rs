use std::collections::{BTreeMap, HashSet};

use geo::{GeodesicDistance, Point};

use crate::core::error::RankingError;
use crate::models::{DistanceMethod, DistanceUnit, Listing, ReferencePoint};

/// Earth's mean radius in kilometers
const EARTH_RADIUS_KM: f64 = 6371.0;

const KM_PER_MILE: f64 = 1.609_344;

/// Calculate the Haversine distance between two points in kilometers
///
/// # Arguments
/// * `lat1` - Latitude of first point in degrees
/// * `lon1` - Longitude of first point in degrees
/// * `lat2` - Latitude of second point in degrees
/// * `lon2` - Longitude of second point in degrees
///
/// # Returns
/// Distance in kilometers
#[inline]
pub fn haversine_distance(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let lat1_rad = lat1.to_radians();
    let lat2_rad = lat2.to_radians();
    let delta_lat = (lat2 - lat1).to_radians();
    let delta_lon = (lon2 - lon1).to_radians();

    let a = (delta_lat / 2.0).sin().powi(2)
        + lat1_rad.cos() * lat2_rad.cos() * (delta_lon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_KM * c
}

/// Ellipsoidal (WGS84) distance between two points in kilometers
#[inline]
pub fn geodesic_distance(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    // geo points are (x = lon, y = lat)
    let a = Point::new(lon1, lat1);
    let b = Point::new(lon2, lat2);
    a.geodesic_distance(&b) / 1000.0
}

/// Distance between two points in the requested unit
pub fn distance_between(
    lat1: f64,
    lon1: f64,
    lat2: f64,
    lon2: f64,
    unit: DistanceUnit,
    method: DistanceMethod,
) -> f64 {
    let km = match method {
        DistanceMethod::Haversine => haversine_distance(lat1, lon1, lat2, lon2),
        DistanceMethod::Geodesic => geodesic_distance(lat1, lon1, lat2, lon2),
    };

    match unit {
        DistanceUnit::Kilometers => km,
        DistanceUnit::Miles => km / KM_PER_MILE,
    }
}

#[inline]
pub fn is_valid_coordinate(lat: f64, lon: f64) -> bool {
    lat.is_finite()
        && lon.is_finite()
        && (-90.0..=90.0).contains(&lat)
        && (-180.0..=180.0).contains(&lon)
}

/// Return the listing's coordinates if both are present and in range
pub fn listing_coordinates(listing: &Listing) -> Result<(f64, f64), RankingError> {
    match (listing.latitude, listing.longitude) {
        (Some(lat), Some(lon)) if is_valid_coordinate(lat, lon) => Ok((lat, lon)),
        (latitude, longitude) => Err(RankingError::InvalidCoordinates { latitude, longitude }),
    }
}

/// Check a request's reference points before any listing is scored
///
/// Names must be unique so the distance map keeps one entry per point.
pub fn validate_reference_points(points: &[ReferencePoint]) -> Result<(), RankingError> {
    let mut seen = HashSet::with_capacity(points.len());

    for point in points {
        if point.name.trim().is_empty() {
            return Err(RankingError::InvalidReferencePoint(
                "reference point name must not be empty".to_string(),
            ));
        }
        if !is_valid_coordinate(point.latitude, point.longitude) {
            return Err(RankingError::InvalidReferencePoint(format!(
                "{} has out-of-range coordinates ({}, {})",
                point.name, point.latitude, point.longitude
            )));
        }
        if !seen.insert(point.name.as_str()) {
            return Err(RankingError::InvalidReferencePoint(format!(
                "duplicate reference point name: {}",
                point.name
            )));
        }
    }

    Ok(())
}

/// Distance from a listing to every reference point, keyed by point name
pub fn annotate_distances(
    listing: &Listing,
    reference_points: &[ReferencePoint],
    unit: DistanceUnit,
    method: DistanceMethod,
) -> Result<BTreeMap<String, f64>, RankingError> {
    let (lat, lon) = listing_coordinates(listing)?;

    Ok(reference_points
        .iter()
        .map(|point| {
            let distance =
                distance_between(lat, lon, point.latitude, point.longitude, unit, method);
            (point.name.clone(), distance)
        })
        .collect())
}

/// Nearest reference point and its distance, ties broken by name
pub fn nearest(distances: &BTreeMap<String, f64>) -> Option<(&str, f64)> {
    distances
        .iter()
        .min_by(|a, b| a.1.total_cmp(b.1))
        .map(|(name, distance)| (name.as_str(), *distance))
}
