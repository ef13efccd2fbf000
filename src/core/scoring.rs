use serde::{Deserialize, Serialize};

use crate::models::{DistanceMethod, DistanceUnit, Listing, PreferenceProfile, ScoreBreakdown, ScoringWeights};

/// Sub-score used when a criterion cannot be evaluated
pub const NEUTRAL_SCORE: f64 = 0.5;

/// Tunable constants for the sub-score curves
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoringParams {
    /// Distance (in `distance_unit`) at which the location score halves
    #[serde(default = "default_location_scale")]
    pub location_scale: f64,
    /// Size that earns a full size score unless the profile sets its own
    #[serde(default = "default_size_target_sqft")]
    pub size_target_sqft: u32,
    /// Size at which the size score reaches zero
    #[serde(default)]
    pub size_floor_sqft: u32,
    #[serde(default = "default_new_construction_years")]
    pub new_construction_years: u32,
    #[serde(default = "default_max_age_years")]
    pub max_age_years: u32,
    #[serde(default)]
    pub distance_unit: DistanceUnit,
    #[serde(default)]
    pub distance_method: DistanceMethod,
}

fn default_location_scale() -> f64 { 10.0 }
fn default_size_target_sqft() -> u32 { 2000 }
fn default_new_construction_years() -> u32 { 10 }
fn default_max_age_years() -> u32 { 100 }

impl Default for ScoringParams {
    fn default() -> Self {
        Self {
            location_scale: default_location_scale(),
            size_target_sqft: default_size_target_sqft(),
            size_floor_sqft: 0,
            new_construction_years: default_new_construction_years(),
            max_age_years: default_max_age_years(),
            distance_unit: DistanceUnit::default(),
            distance_method: DistanceMethod::default(),
        }
    }
}

impl ScoringParams {
    /// Reject parameter sets that would make the curves meaningless
    pub fn validate(&self) -> Result<(), String> {
        if !(self.location_scale.is_finite() && self.location_scale > 0.0) {
            return Err(format!("location_scale must be positive, got {}", self.location_scale));
        }
        if self.size_floor_sqft > self.size_target_sqft {
            return Err(format!(
                "size_floor_sqft ({}) exceeds size_target_sqft ({})",
                self.size_floor_sqft, self.size_target_sqft
            ));
        }
        if self.new_construction_years > self.max_age_years {
            return Err(format!(
                "new_construction_years ({}) exceeds max_age_years ({})",
                self.new_construction_years, self.max_age_years
            ));
        }
        Ok(())
    }
}

/// Calculate a match score (0-1) for a listing against a preference profile
///
/// Scoring formula:
/// score = (
///     price_score * w.price +        # Cheaper within budget = higher
///     location_score * w.location +  # Closer to nearest reference = higher
///     size_score * w.size +          # At or above target sqft = 1.0
///     bedroom_score * w.bedrooms +   # Meets minimum bedrooms = 1.0
///     age_score * w.age              # Newer = higher
/// ) / sum(w)
///
/// `nearest_distance` is `None` when the listing has no usable coordinates or
/// no reference points were supplied; the location criterion then counts as
/// neutral.
pub fn calculate_match_score(
    listing: &Listing,
    profile: &PreferenceProfile,
    nearest_distance: Option<f64>,
    params: &ScoringParams,
    current_year: i32,
) -> (f64, ScoreBreakdown) {
    let target_sqft = profile.target_sqft.unwrap_or(params.size_target_sqft);

    let breakdown = ScoreBreakdown {
        price: price_score(listing.price, profile.budget_min, profile.budget_max),
        location: nearest_distance.map(|d| location_score(d, params.location_scale)),
        size: size_score(listing.sqft, target_sqft, params.size_floor_sqft),
        bedrooms: bedroom_score(listing.bedrooms, profile.min_bedrooms),
        age: age_score(
            listing.year_built,
            current_year,
            params.new_construction_years,
            params.max_age_years,
        ),
    };

    (total_score(&breakdown, &profile.weights), breakdown)
}

/// Weighted mean of the sub-scores, clamped to [0, 1]
pub fn total_score(breakdown: &ScoreBreakdown, weights: &ScoringWeights) -> f64 {
    let Some(weights) = weights.normalized() else {
        return 0.0;
    };
    let weight_sum = weights.sum();

    let weighted = breakdown.price * weights.price
        + breakdown.location.unwrap_or(NEUTRAL_SCORE) * weights.location
        + breakdown.size * weights.size
        + breakdown.bedrooms * weights.bedrooms
        + breakdown.age * weights.age;

    (weighted / weight_sum).clamp(0.0, 1.0)
}

/// Price score (0-1)
/// Full marks up to `budget_min`, linear decay to zero at `budget_max`.
/// Unknown price is treated as worst case.
#[inline]
pub fn price_score(price: Option<u64>, budget_min: u64, budget_max: u64) -> f64 {
    let Some(price) = price else {
        return 0.0;
    };

    if price <= budget_min {
        return 1.0;
    }
    if price > budget_max || budget_max <= budget_min {
        return 0.0;
    }

    let span = (budget_max - budget_min) as f64;
    1.0 - (price - budget_min) as f64 / span
}

/// Location score (0-1)
/// Smooth inverse decay: 1 at the reference point, 0.5 at `scale`.
#[inline]
pub fn location_score(distance: f64, scale: f64) -> f64 {
    let scale = scale.max(f64::EPSILON);
    1.0 / (1.0 + distance.max(0.0) / scale)
}

/// Size score (0-1)
/// Full marks at or above target, linear ramp down to zero at the floor.
#[inline]
pub fn size_score(sqft: Option<u32>, target_sqft: u32, floor_sqft: u32) -> f64 {
    let Some(sqft) = sqft else {
        return NEUTRAL_SCORE;
    };

    if sqft >= target_sqft {
        return 1.0;
    }
    if sqft <= floor_sqft {
        return 0.0;
    }

    (sqft - floor_sqft) as f64 / (target_sqft - floor_sqft) as f64
}

/// Bedroom score (0-1)
/// Each missing bedroom below the minimum costs an equal share.
#[inline]
pub fn bedroom_score(bedrooms: Option<u32>, min_bedrooms: u32) -> f64 {
    let Some(bedrooms) = bedrooms else {
        return NEUTRAL_SCORE;
    };

    if bedrooms >= min_bedrooms {
        return 1.0;
    }

    bedrooms as f64 / min_bedrooms as f64
}

/// Age score (0-1)
/// New construction scores 1.0, decaying linearly to zero at `max_age_years`.
#[inline]
pub fn age_score(
    year_built: Option<i32>,
    current_year: i32,
    new_construction_years: u32,
    max_age_years: u32,
) -> f64 {
    let Some(year_built) = year_built else {
        return NEUTRAL_SCORE;
    };

    // Listings dated in the future count as brand new
    let age = (i64::from(current_year) - i64::from(year_built)).max(0) as f64;
    let new_years = new_construction_years as f64;
    let max_years = max_age_years as f64;

    if age <= new_years {
        return 1.0;
    }
    if age >= max_years {
        return 0.0;
    }

    1.0 - (age - new_years) / (max_years - new_years)
}

#[cfg(test)]
mod tests {
    use super::*;

    const YEAR: i32 = 2025;

    fn create_test_listing(price: u64, beds: u32, sqft: u32, year: i32) -> Listing {
        let mut listing = Listing::new("test");
        listing.price = Some(price);
        listing.bedrooms = Some(beds);
        listing.bathrooms = Some(2.0);
        listing.sqft = Some(sqft);
        listing.year_built = Some(year);
        listing.latitude = Some(30.27);
        listing.longitude = Some(-97.74);
        listing
    }

    fn create_test_profile() -> PreferenceProfile {
        PreferenceProfile {
            budget_min: 200_000,
            budget_max: 400_000,
            min_bedrooms: 3,
            min_bathrooms: 2.0,
            target_sqft: Some(1800),
            weights: ScoringWeights::default(),
        }
    }

    #[test]
    fn test_price_score() {
        assert_eq!(price_score(Some(150_000), 200_000, 400_000), 1.0);
        assert_eq!(price_score(Some(200_000), 200_000, 400_000), 1.0);
        assert!((price_score(Some(300_000), 200_000, 400_000) - 0.5).abs() < 1e-9);
        assert_eq!(price_score(Some(400_000), 200_000, 400_000), 0.0);
        assert_eq!(price_score(Some(400_001), 200_000, 400_000), 0.0);
        assert_eq!(price_score(None, 200_000, 400_000), 0.0);
    }

    #[test]
    fn test_price_score_degenerate_budget() {
        assert_eq!(price_score(Some(300_000), 300_000, 300_000), 1.0);
        assert_eq!(price_score(Some(300_001), 300_000, 300_000), 0.0);
    }

    #[test]
    fn test_location_score() {
        assert_eq!(location_score(0.0, 10.0), 1.0);
        assert!((location_score(10.0, 10.0) - 0.5).abs() < 1e-9);

        let far = location_score(1_000.0, 10.0);
        assert!(far > 0.0 && far < 0.01);
    }

    #[test]
    fn test_size_score() {
        assert_eq!(size_score(Some(2500), 2000, 0), 1.0);
        assert_eq!(size_score(Some(2000), 2000, 0), 1.0);
        assert!((size_score(Some(1000), 2000, 0) - 0.5).abs() < 1e-9);
        assert!((size_score(Some(1500), 2000, 1000) - 0.5).abs() < 1e-9);
        assert_eq!(size_score(Some(800), 2000, 1000), 0.0);
        assert_eq!(size_score(None, 2000, 0), NEUTRAL_SCORE);
    }

    #[test]
    fn test_bedroom_score() {
        assert_eq!(bedroom_score(Some(4), 3), 1.0);
        assert_eq!(bedroom_score(Some(3), 3), 1.0);
        assert!((bedroom_score(Some(2), 4) - 0.5).abs() < 1e-9);
        assert_eq!(bedroom_score(Some(0), 3), 0.0);
        assert_eq!(bedroom_score(Some(0), 0), 1.0);
        assert_eq!(bedroom_score(None, 3), NEUTRAL_SCORE);
    }

    #[test]
    fn test_age_score() {
        assert_eq!(age_score(Some(2020), YEAR, 10, 100), 1.0);
        assert_eq!(age_score(Some(2030), YEAR, 10, 100), 1.0);
        assert!((age_score(Some(1970), YEAR, 10, 100) - 0.5).abs() < 1e-9);
        assert_eq!(age_score(Some(1900), YEAR, 10, 100), 0.0);
        assert_eq!(age_score(None, YEAR, 10, 100), NEUTRAL_SCORE);
    }

    #[test]
    fn test_calculate_match_score() {
        let listing = create_test_listing(300_000, 3, 1800, 2015);
        let profile = create_test_profile();

        let (score, breakdown) =
            calculate_match_score(&listing, &profile, Some(2.0), &ScoringParams::default(), YEAR);

        assert!(score >= 0.0 && score <= 1.0);
        assert!((breakdown.price - 0.5).abs() < 1e-9);
        assert_eq!(breakdown.size, 1.0);
        assert_eq!(breakdown.bedrooms, 1.0);
        assert_eq!(breakdown.age, 1.0);
        assert!(breakdown.location.is_some());
    }

    #[test]
    fn test_missing_location_counts_as_neutral() {
        let listing = create_test_listing(300_000, 3, 1800, 2015);
        let profile = create_test_profile();

        let (score, breakdown) =
            calculate_match_score(&listing, &profile, None, &ScoringParams::default(), YEAR);

        assert!(breakdown.location.is_none());
        let mut expected = breakdown;
        expected.location = Some(NEUTRAL_SCORE);
        assert!((score - total_score(&expected, &profile.weights)).abs() < 1e-12);
    }

    #[test]
    fn test_unnormalized_weights() {
        let listing = create_test_listing(300_000, 3, 1800, 2015);
        let mut profile = create_test_profile();
        let params = ScoringParams::default();

        let (normalized, _) = calculate_match_score(&listing, &profile, Some(2.0), &params, YEAR);

        profile.weights = ScoringWeights {
            price: 30.0,
            location: 25.0,
            size: 20.0,
            bedrooms: 15.0,
            age: 10.0,
        };
        let (scaled, _) = calculate_match_score(&listing, &profile, Some(2.0), &params, YEAR);

        assert!((normalized - scaled).abs() < 1e-9);
    }

    #[test]
    fn test_huge_weights_stay_in_range() {
        let listing = create_test_listing(300_000, 3, 1800, 2015);
        let mut profile = create_test_profile();
        let params = ScoringParams::default();

        let (expected, _) = calculate_match_score(&listing, &profile, Some(2.0), &params, YEAR);

        profile.weights = ScoringWeights {
            price: 1e308,
            location: 1e308,
            size: 1e308,
            bedrooms: 1e308,
            age: 1e308,
        };
        let (equal, _) = calculate_match_score(&listing, &profile, Some(2.0), &params, YEAR);
        assert!(equal.is_finite());
        assert!((0.0..=1.0).contains(&equal));

        profile.weights = ScoringWeights {
            price: 3e307,
            location: 2.5e307,
            size: 2e307,
            bedrooms: 1.5e307,
            age: 1e307,
        };
        let (scaled, _) = calculate_match_score(&listing, &profile, Some(2.0), &params, YEAR);
        assert!((expected - scaled).abs() < 1e-9);
    }

    #[test]
    fn test_age_score_extreme_years() {
        assert_eq!(age_score(Some(i32::MIN), YEAR, 10, 100), 0.0);
        assert_eq!(age_score(Some(i32::MAX), YEAR, 10, 100), 1.0);
        assert_eq!(age_score(Some(1900), i32::MAX, 10, 100), 0.0);
    }

    #[test]
    fn test_zero_weight_sum_scores_zero() {
        let breakdown = ScoreBreakdown {
            price: 1.0,
            location: Some(1.0),
            size: 1.0,
            bedrooms: 1.0,
            age: 1.0,
        };
        let weights = ScoringWeights {
            price: 0.0,
            location: 0.0,
            size: 0.0,
            bedrooms: 0.0,
            age: 0.0,
        };
        assert_eq!(total_score(&breakdown, &weights), 0.0);
    }

    #[test]
    fn test_params_validation() {
        assert!(ScoringParams::default().validate().is_ok());

        let bad_scale = ScoringParams { location_scale: 0.0, ..Default::default() };
        assert!(bad_scale.validate().is_err());

        let bad_size = ScoringParams { size_floor_sqft: 5000, ..Default::default() };
        assert!(bad_size.validate().is_err());
    }
}
