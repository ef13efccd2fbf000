// Model exports
pub mod domain;
pub mod requests;
pub mod responses;

pub use domain::{
    DistanceMethod, DistanceUnit, Listing, PreferenceProfile, PropertyType, ReferencePoint,
    ScoreBreakdown, ScoredListing, ScoringWeights,
};
pub use requests::{IngestLocation, IngestRequest, ListListingsQuery, RankListingsRequest};
pub use responses::{
    CityIngestResult, ErrorResponse, HealthResponse, IngestResponse, RankListingsResponse,
};
