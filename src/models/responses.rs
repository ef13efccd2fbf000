use serde::{Deserialize, Serialize};
use crate::models::domain::{ReferencePoint, ScoredListing};

/// Response for the rank endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankListingsResponse {
    pub results: Vec<ScoredListing>,
    pub total_candidates: usize,
    pub filtered_out: usize,
    pub missing_location: usize,
    pub returned: usize,
}

/// Response for the ingest endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestResponse {
    pub run_id: String,
    pub fetched: usize,
    pub stored: u64,
    pub cities: Vec<CityIngestResult>,
}

/// Outcome of fetching one city during an ingest run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CityIngestResult {
    pub location: String,
    pub fetched: usize,
    /// Set when the fetch failed; the rest of the run carries on
    pub error: Option<String>,
    /// City centre to rank this city's listings against
    pub reference_point: Option<ReferencePoint>,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    /// `None` when the listing store is unreachable
    pub stored_listings: Option<i64>,
    pub cache_enabled: bool,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// Error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}
