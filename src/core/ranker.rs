use std::collections::HashMap;

use chrono::Datelike;

use crate::core::{
    distance::{annotate_distances, nearest, validate_reference_points},
    error::RankingError,
    filters::{matches_location_filter, meets_hard_requirements},
    scoring::{calculate_match_score, ScoringParams},
};
use crate::models::{Listing, PreferenceProfile, ReferencePoint, ScoredListing};

/// Per-call ranking options
#[derive(Debug, Clone, Default)]
pub struct RankOptions {
    /// Maximum number of results; `None` returns every candidate
    pub limit: Option<usize>,
    /// Drop listings that miss the profile's budget ceiling or room minimums
    pub strict: bool,
    /// "City, ST" labels to keep; empty keeps all
    pub locations: Vec<String>,
    /// Year used for the age criterion; defaults to the current UTC year
    pub current_year: Option<i32>,
}

/// Result of the ranking process
#[derive(Debug)]
pub struct RankResult {
    pub listings: Vec<ScoredListing>,
    pub total_candidates: usize,
    pub filtered_out: usize,
    pub missing_location: usize,
}

/// Ranking orchestrator
///
/// # Pipeline Stages
/// 1. Profile and reference point validation
/// 2. De-duplication by listing id (last occurrence wins)
/// 3. Optional location and hard-requirement filtering
/// 4. Distance annotation
/// 5. Scoring, ordering and truncation
#[derive(Debug, Clone)]
pub struct Ranker {
    params: ScoringParams,
}

impl Ranker {
    pub fn new(params: ScoringParams) -> Self {
        Self { params }
    }

    pub fn with_default_params() -> Self {
        Self {
            params: ScoringParams::default(),
        }
    }

    pub fn params(&self) -> &ScoringParams {
        &self.params
    }

    /// Reject profiles that cannot produce meaningful scores
    pub fn validate_profile(profile: &PreferenceProfile) -> Result<(), RankingError> {
        if !profile.weights.all_finite_and_non_negative() {
            return Err(RankingError::InvalidPreferenceProfile(
                "weights must be finite and non-negative".to_string(),
            ));
        }
        if !(profile.weights.sum() > 0.0) {
            return Err(RankingError::InvalidPreferenceProfile(
                "at least one weight must be positive".to_string(),
            ));
        }
        if profile.budget_min > profile.budget_max {
            return Err(RankingError::InvalidPreferenceProfile(format!(
                "budget_min ({}) exceeds budget_max ({})",
                profile.budget_min, profile.budget_max
            )));
        }
        if !(profile.min_bathrooms.is_finite() && profile.min_bathrooms >= 0.0) {
            return Err(RankingError::InvalidPreferenceProfile(format!(
                "min_bathrooms must be a non-negative number, got {}",
                profile.min_bathrooms
            )));
        }
        Ok(())
    }

    /// Rank candidate listings for a preference profile
    ///
    /// # Arguments
    /// * `profile` - The user's preferences for this request
    /// * `reference_points` - Locations used for proximity scoring
    /// * `candidates` - Listings retrieved from search or storage
    /// * `options` - Limit, filters and scoring year
    ///
    /// # Returns
    /// RankResult with listings ordered by score (descending), ties by id
    pub fn rank(
        &self,
        profile: &PreferenceProfile,
        reference_points: &[ReferencePoint],
        candidates: Vec<Listing>,
        options: &RankOptions,
    ) -> Result<RankResult, RankingError> {
        Self::validate_profile(profile)?;
        validate_reference_points(reference_points)?;

        let total_candidates = candidates.len();
        let current_year = options
            .current_year
            .unwrap_or_else(|| chrono::Utc::now().year());

        let mut unique: HashMap<String, Listing> = HashMap::with_capacity(candidates.len());
        for listing in candidates {
            unique.insert(listing.id.clone(), listing);
        }
        if unique.len() < total_candidates {
            tracing::debug!(
                "Collapsed {} duplicate listing ids",
                total_candidates - unique.len()
            );
        }

        let mut filtered_out = 0;
        let mut missing_location = 0;

        let mut scored: Vec<ScoredListing> = unique
            .into_values()
            .filter(|listing| {
                let keep = matches_location_filter(listing, &options.locations)
                    && (!options.strict || meets_hard_requirements(listing, profile));
                if !keep {
                    filtered_out += 1;
                }
                keep
            })
            .map(|listing| {
                let distances = match annotate_distances(
                    &listing,
                    reference_points,
                    self.params.distance_unit,
                    self.params.distance_method,
                ) {
                    Ok(distances) => distances,
                    Err(e) => {
                        tracing::debug!("Listing {} scored without location: {}", listing.id, e);
                        missing_location += 1;
                        Default::default()
                    }
                };

                let nearest_point = nearest(&distances);
                let (score, breakdown) = calculate_match_score(
                    &listing,
                    profile,
                    nearest_point.map(|(_, d)| d),
                    &self.params,
                    current_year,
                );
                let nearest_reference = nearest_point.map(|(name, _)| name.to_string());

                ScoredListing {
                    rank: 0,
                    listing,
                    score,
                    breakdown,
                    distances,
                    nearest_reference,
                }
            })
            .collect();

        // Sort by score (descending) and then by id (ascending)
        scored.sort_by(|a, b| {
            b.score
                .total_cmp(&a.score)
                .then_with(|| a.listing.id.cmp(&b.listing.id))
        });

        if let Some(limit) = options.limit {
            scored.truncate(limit);
        }

        for (position, entry) in scored.iter_mut().enumerate() {
            entry.rank = position + 1;
        }

        Ok(RankResult {
            listings: scored,
            total_candidates,
            filtered_out,
            missing_location,
        })
    }
}

impl Default for Ranker {
    fn default() -> Self {
        Self::with_default_params()
    }
}
