//! Homerank - listing ingestion and preference-weighted ranking service
//!
//! This library provides the ranking core used by the homerank service:
//! distance annotation against named reference points, a five-criterion
//! weighted scorer and the ranking pipeline that orders candidate listings.

pub mod config;
pub mod core;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use core::{haversine_distance, RankOptions, RankResult, Ranker, RankingError, ScoringParams};
pub use models::{
    Listing, PreferenceProfile, RankListingsRequest, RankListingsResponse, ReferencePoint,
    ScoreBreakdown, ScoredListing, ScoringWeights,
};
