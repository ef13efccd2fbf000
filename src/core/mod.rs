// Core algorithm exports
pub mod distance;
pub mod error;
pub mod filters;
pub mod ranker;
pub mod scoring;

pub use distance::{annotate_distances, haversine_distance, geodesic_distance, validate_reference_points};
pub use error::RankingError;
pub use filters::{matches_location_filter, meets_hard_requirements, parse_location_label};
pub use ranker::{RankOptions, RankResult, Ranker};
pub use scoring::{calculate_match_score, ScoringParams, NEUTRAL_SCORE};
