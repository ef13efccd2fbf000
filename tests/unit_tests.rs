// Unit tests for homerank

use homerank::core::{
    distance::{annotate_distances, geodesic_distance, haversine_distance, nearest},
    filters::{matches_location_filter, meets_hard_requirements},
    scoring::{age_score, bedroom_score, calculate_match_score, location_score, price_score, size_score},
    RankingError, ScoringParams, NEUTRAL_SCORE,
};
use homerank::models::{DistanceMethod, DistanceUnit, Listing, PreferenceProfile, ReferencePoint, ScoringWeights};

const YEAR: i32 = 2025;

fn create_listing(id: &str) -> Listing {
    let mut listing = Listing::new(id);
    listing.city = "Austin".to_string();
    listing.state = "TX".to_string();
    listing.price = Some(300_000);
    listing.bedrooms = Some(3);
    listing.bathrooms = Some(2.0);
    listing.sqft = Some(1800);
    listing.year_built = Some(2010);
    listing.latitude = Some(30.2672);
    listing.longitude = Some(-97.7431);
    listing
}

fn create_profile() -> PreferenceProfile {
    PreferenceProfile {
        budget_min: 200_000,
        budget_max: 400_000,
        min_bedrooms: 3,
        min_bathrooms: 2.0,
        target_sqft: None,
        weights: ScoringWeights::default(),
    }
}

#[test]
fn test_haversine_distance_zero() {
    let distance = haversine_distance(30.2672, -97.7431, 30.2672, -97.7431);
    assert!(distance < 0.01);
}

#[test]
fn test_haversine_distance_downtown_to_airport() {
    // Downtown Austin to the airport is roughly 10-12 km
    let distance = haversine_distance(30.2672, -97.7431, 30.1975, -97.6664);
    assert!(distance > 9.0 && distance < 13.0);
}

#[test]
fn test_geodesic_close_to_haversine() {
    let haversine = haversine_distance(30.2672, -97.7431, 29.7604, -95.3698);
    let geodesic = geodesic_distance(30.2672, -97.7431, 29.7604, -95.3698);

    // The spherical approximation is within half a percent at this range
    assert!((haversine - geodesic).abs() / geodesic < 0.005);
}

#[test]
fn test_annotate_distances_in_miles_and_km() {
    let listing = create_listing("a");
    let refs = vec![
        ReferencePoint::new("downtown", 30.2672, -97.7431),
        ReferencePoint::new("airport", 30.1975, -97.6664),
    ];

    let miles = annotate_distances(&listing, &refs, DistanceUnit::Miles, DistanceMethod::Haversine).unwrap();
    let km = annotate_distances(&listing, &refs, DistanceUnit::Kilometers, DistanceMethod::Haversine).unwrap();

    assert_eq!(miles.len(), 2);
    assert!(miles["downtown"] < 0.01);
    assert!((km["airport"] / miles["airport"] - 1.609_344).abs() < 1e-9);
    assert_eq!(nearest(&miles).map(|(name, _)| name), Some("downtown"));
}

#[test]
fn test_annotate_distances_rejects_missing_coordinates() {
    let mut listing = create_listing("a");
    listing.longitude = None;

    let err = annotate_distances(
        &listing,
        &[ReferencePoint::new("downtown", 30.2672, -97.7431)],
        DistanceUnit::Miles,
        DistanceMethod::Haversine,
    )
    .unwrap_err();

    assert_eq!(
        err,
        RankingError::InvalidCoordinates {
            latitude: Some(30.2672),
            longitude: None
        }
    );
}

#[test]
fn test_price_score_bounds() {
    assert_eq!(price_score(Some(150_000), 200_000, 400_000), 1.0);
    assert_eq!(price_score(Some(200_000), 200_000, 400_000), 1.0);
    assert_eq!(price_score(Some(400_000), 200_000, 400_000), 0.0);
    assert_eq!(price_score(Some(450_000), 200_000, 400_000), 0.0);
    assert!((price_score(Some(300_000), 200_000, 400_000) - 0.5).abs() < 1e-9);
    assert_eq!(price_score(None, 200_000, 400_000), 0.0);
}

#[test]
fn test_cheaper_never_scores_lower_on_price() {
    let prices = [0, 100_000, 200_000, 250_000, 333_333, 399_999, 400_000, 1_000_000];
    for pair in prices.windows(2) {
        let cheaper = price_score(Some(pair[0]), 200_000, 400_000);
        let pricier = price_score(Some(pair[1]), 200_000, 400_000);
        assert!(cheaper >= pricier, "{} scored below {}", pair[0], pair[1]);
    }
}

#[test]
fn test_location_score_decay() {
    assert_eq!(location_score(0.0, 10.0), 1.0);
    assert!((location_score(10.0, 10.0) - 0.5).abs() < 1e-9);
    assert!(location_score(2.0, 10.0) > location_score(20.0, 10.0));
}

#[test]
fn test_size_bedroom_age_curves() {
    assert_eq!(size_score(Some(2500), 2000, 0), 1.0);
    assert!((size_score(Some(1000), 2000, 0) - 0.5).abs() < 1e-9);
    assert_eq!(size_score(None, 2000, 0), NEUTRAL_SCORE);

    assert_eq!(bedroom_score(Some(4), 3), 1.0);
    assert!((bedroom_score(Some(2), 4) - 0.5).abs() < 1e-9);
    assert_eq!(bedroom_score(None, 3), NEUTRAL_SCORE);

    assert_eq!(age_score(Some(2020), YEAR, 10, 100), 1.0);
    assert_eq!(age_score(Some(1900), YEAR, 10, 100), 0.0);
    assert_eq!(age_score(Some(2030), YEAR, 10, 100), 1.0);
    assert_eq!(age_score(None, YEAR, 10, 100), NEUTRAL_SCORE);
}

#[test]
fn test_total_score_in_unit_interval() {
    let params = ScoringParams::default();
    let profile = create_profile();

    for price in [0, 200_000, 300_000, 5_000_000] {
        for distance in [None, Some(0.0), Some(500.0)] {
            let mut listing = create_listing("a");
            listing.price = Some(price);

            let (score, _) = calculate_match_score(&listing, &profile, distance, &params, YEAR);
            assert!((0.0..=1.0).contains(&score), "score {} out of range", score);
        }
    }
}

#[test]
fn test_missing_fields_still_finite() {
    let mut listing = Listing::new("bare");
    listing.price = Some(250_000);

    let (score, breakdown) =
        calculate_match_score(&listing, &create_profile(), None, &ScoringParams::default(), YEAR);

    assert!(score.is_finite());
    assert_eq!(breakdown.location, None);
    assert_eq!(breakdown.age, NEUTRAL_SCORE);
    assert_eq!(breakdown.size, NEUTRAL_SCORE);
}

#[test]
fn test_scoring_is_deterministic() {
    let listing = create_listing("a");
    let profile = create_profile();
    let params = ScoringParams::default();

    let first = calculate_match_score(&listing, &profile, Some(3.0), &params, YEAR);
    let second = calculate_match_score(&listing, &profile, Some(3.0), &params, YEAR);
    assert_eq!(first, second);
}

#[test]
fn test_hard_requirements() {
    let profile = create_profile();
    assert!(meets_hard_requirements(&create_listing("a"), &profile));

    let mut over_budget = create_listing("b");
    over_budget.price = Some(450_000);
    assert!(!meets_hard_requirements(&over_budget, &profile));

    let mut few_baths = create_listing("c");
    few_baths.bathrooms = Some(1.0);
    assert!(!meets_hard_requirements(&few_baths, &profile));

    let mut unknown_beds = create_listing("d");
    unknown_beds.bedrooms = None;
    assert!(!meets_hard_requirements(&unknown_beds, &profile));
}

#[test]
fn test_location_filter_is_case_insensitive() {
    let listing = create_listing("a");
    assert!(matches_location_filter(&listing, &[]));
    assert!(matches_location_filter(&listing, &["austin, tx".to_string()]));
    assert!(!matches_location_filter(&listing, &["Dallas, TX".to_string()]));
}
