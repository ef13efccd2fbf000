use actix_web::{http::StatusCode, web, HttpResponse, Responder};
use std::sync::Arc;
use std::time::Duration;
use validator::Validate;

use crate::config::{IngestSettings, RankingSettings, ScoringSettings};
use crate::core::{parse_location_label, RankOptions, Ranker, RankingError};
use crate::models::{
    CityIngestResult, ErrorResponse, HealthResponse, IngestLocation, IngestRequest, IngestResponse,
    ListListingsQuery, Listing, RankListingsRequest, RankListingsResponse, ReferencePoint,
};
use crate::services::{
    CacheKey, CacheManager, ListingQuery, PostgresClient, PostgresError, RealtorClient,
    RealtorError, SearchQuery,
};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub postgres: Arc<PostgresClient>,
    pub realtor: Arc<RealtorClient>,
    /// `None` when Redis was unavailable at startup
    pub cache: Option<Arc<CacheManager>>,
    pub ranker: Ranker,
    pub ranking: RankingSettings,
    pub scoring: ScoringSettings,
    pub ingest: IngestSettings,
}

/// Configure all listing routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg
        .route("/health", web::get().to(health_check))
        .route("/listings", web::get().to(list_listings))
        .route("/listings/rank", web::post().to(rank_listings))
        .route("/listings/ingest", web::post().to(ingest_listings))
        .route("/listings/{id}", web::get().to(get_listing))
        .route("/listings/{id}", web::delete().to(delete_listing));
}

fn error_response(status: StatusCode, error: &str, message: impl Into<String>) -> HttpResponse {
    HttpResponse::build(status).json(ErrorResponse {
        error: error.to_string(),
        message: message.into(),
        status_code: status.as_u16(),
    })
}

fn ranking_error_response(err: &RankingError) -> HttpResponse {
    let error = match err {
        RankingError::InvalidPreferenceProfile(_) => "invalid_preference_profile",
        RankingError::InvalidReferencePoint(_) => "invalid_reference_point",
        RankingError::InvalidCoordinates { .. } => "invalid_coordinates",
    };
    error_response(StatusCode::BAD_REQUEST, error, err.to_string())
}

fn postgres_error_response(err: &PostgresError) -> HttpResponse {
    match err {
        PostgresError::NotFound(what) => {
            error_response(StatusCode::NOT_FOUND, "not_found", format!("No {}", what))
        }
        PostgresError::InvalidInput(msg) => {
            error_response(StatusCode::BAD_REQUEST, "invalid_input", msg.clone())
        }
        _ => error_response(StatusCode::INTERNAL_SERVER_ERROR, "database_error", err.to_string()),
    }
}

fn upstream_error_code(err: &RealtorError) -> &'static str {
    match err {
        RealtorError::Unauthorized => "upstream_unauthorized",
        RealtorError::RateLimited => "upstream_rate_limited",
        _ => "upstream_error",
    }
}

/// Centres of the requested cities, falling back to the configured points
fn default_reference_points(state: &AppState, locations: &[String]) -> Vec<ReferencePoint> {
    let mut centers: Vec<ReferencePoint> = Vec::new();

    for (city, st) in locations.iter().filter_map(|l| parse_location_label(l)) {
        if let Some(center) = state.ingest.city_center(city, st) {
            if !centers.iter().any(|c| c.name == center.name) {
                centers.push(center);
            }
        }
    }

    if centers.is_empty() {
        state.scoring.reference_points.clone()
    } else {
        centers
    }
}

/// Health check endpoint
async fn health_check(state: web::Data<AppState>) -> impl Responder {
    let pg_healthy = state.postgres.health_check().await.unwrap_or(false);
    let stored_listings = if pg_healthy {
        state.postgres.count_listings().await.ok()
    } else {
        None
    };

    let status = if pg_healthy { "healthy" } else { "degraded" };

    HttpResponse::Ok().json(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        stored_listings,
        cache_enabled: state.cache.is_some(),
        timestamp: chrono::Utc::now(),
    })
}

/// Rank listings endpoint
///
/// POST /api/v1/listings/rank
///
/// Request body (every field optional):
/// ```json
/// {
///   "profile": {
///     "budget_min": 200000,
///     "budget_max": 400000,
///     "min_bedrooms": 3,
///     "min_bathrooms": 2,
///     "weights": { "price": 0.3, "location": 0.25, "size": 0.2, "bedrooms": 0.15, "age": 0.1 }
///   },
///   "reference_points": [{ "name": "downtown", "latitude": 30.2672, "longitude": -97.7431 }],
///   "listings": [],
///   "locations": ["Austin, TX"],
///   "limit": 10,
///   "strict": false
/// }
/// ```
async fn rank_listings(
    state: web::Data<AppState>,
    req: web::Json<RankListingsRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        tracing::info!("Validation failed for rank request: {:?}", errors);
        return error_response(StatusCode::BAD_REQUEST, "validation_failed", errors.to_string());
    }

    let req = req.into_inner();
    let profile = req.profile.unwrap_or_else(|| state.scoring.default_profile());
    let reference_points = match req.reference_points {
        Some(points) => points,
        None => default_reference_points(&state, &req.locations),
    };

    let max_limit = state.ranking.max_limit;
    let limit = req
        .limit
        .or(state.ranking.default_limit)
        .unwrap_or(max_limit)
        .min(max_limit);

    let candidates = match req.listings {
        Some(listings) => listings,
        None => match load_candidates(&state, &req.locations).await {
            Ok(listings) => listings,
            Err(e) => {
                tracing::error!("Failed to load candidate listings: {}", e);
                return postgres_error_response(&e);
            }
        },
    };

    tracing::info!(
        "Ranking {} candidates against {} reference points (limit {})",
        candidates.len(),
        reference_points.len(),
        limit
    );

    let options = RankOptions {
        limit: Some(limit),
        strict: req.strict.unwrap_or(state.ranking.strict_filters),
        locations: req.locations,
        current_year: None,
    };

    let result = match state
        .ranker
        .rank(&profile, &reference_points, candidates, &options)
    {
        Ok(result) => result,
        Err(e) => {
            tracing::info!("Rejected rank request: {}", e);
            return ranking_error_response(&e);
        }
    };

    tracing::debug!(
        "Ranked {} of {} candidates ({} filtered, {} without location)",
        result.listings.len(),
        result.total_candidates,
        result.filtered_out,
        result.missing_location
    );

    HttpResponse::Ok().json(RankListingsResponse {
        returned: result.listings.len(),
        results: result.listings,
        total_candidates: result.total_candidates,
        filtered_out: result.filtered_out,
        missing_location: result.missing_location,
    })
}

/// Load stored candidates, one query per requested "City, ST"
async fn load_candidates(state: &AppState, locations: &[String]) -> Result<Vec<Listing>, PostgresError> {
    let pool = state.ranking.candidate_pool;

    if locations.is_empty() {
        return state
            .postgres
            .query_listings(&ListingQuery { city: None, state: None, limit: pool })
            .await;
    }

    let mut candidates = Vec::new();
    for label in locations {
        let Some((city, st)) = parse_location_label(label) else {
            tracing::warn!("Ignoring malformed location filter: {:?}", label);
            continue;
        };
        let query = ListingQuery {
            city: Some(city.to_string()),
            state: Some(st.to_string()),
            limit: pool,
        };
        candidates.extend(state.postgres.query_listings(&query).await?);
    }

    Ok(candidates)
}

/// Ingest listings endpoint
///
/// POST /api/v1/listings/ingest
///
/// Request body, one of three target modes:
/// ```json
/// { "city": "Austin", "state_code": "TX", "postal_code": "78701", "limit": 20 }
/// { "locations": [{ "city": "Austin", "state_code": "TX" }, { "city": "Dallas", "state_code": "TX" }] }
/// { "nationwide": true, "limit": 10, "price_max": 600000, "beds_min": 2 }
/// ```
///
/// Cities are fetched one after another. A failing city is reported in the
/// response and the run carries on; only a run where every city fails is an
/// error.
async fn ingest_listings(
    state: web::Data<AppState>,
    req: web::Json<IngestRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        return error_response(StatusCode::BAD_REQUEST, "validation_failed", errors.to_string());
    }

    let req = req.into_inner();
    let targets = match req.targets(&state.ingest.nationwide, state.ingest.max_cities) {
        Ok(targets) => targets,
        Err(msg) => return error_response(StatusCode::BAD_REQUEST, "validation_failed", msg),
    };

    let run_id = uuid::Uuid::new_v4().to_string();
    tracing::info!(run_id = %run_id, "Ingesting listings for {} cities", targets.len());

    let (listings, cities, first_error) = fetch_cities(&state, &req, &targets, &run_id).await;

    if cities.iter().all(|c| c.error.is_some()) {
        if let Some(e) = first_error {
            tracing::error!(run_id = %run_id, "Every listing search failed: {}", e);
            return error_response(StatusCode::BAD_GATEWAY, upstream_error_code(&e), e.to_string());
        }
    }

    let stored = if listings.is_empty() {
        0
    } else {
        match state.postgres.upsert_listings(&listings).await {
            Ok(stored) => stored,
            Err(e) => {
                tracing::error!(run_id = %run_id, "Failed to store listings: {}", e);
                return postgres_error_response(&e);
            }
        }
    };

    // Stored listings changed; drop any stale single-listing entries
    if let Some(cache) = &state.cache {
        let keys: Vec<String> = listings.iter().map(|l| CacheKey::listing(&l.id)).collect();
        if let Err(e) = cache.delete(&keys).await {
            tracing::warn!("Failed to invalidate listing cache: {}", e);
        }
    }

    let failed = cities.iter().filter(|c| c.error.is_some()).count();
    tracing::info!(
        run_id = %run_id,
        "Stored {} of {} fetched listings ({}/{} cities succeeded)",
        stored,
        listings.len(),
        cities.len() - failed,
        cities.len()
    );

    HttpResponse::Ok().json(IngestResponse {
        run_id,
        fetched: listings.len(),
        stored,
        cities,
    })
}

/// Fetch every target city in turn, recording failures without stopping
async fn fetch_cities(
    state: &AppState,
    req: &IngestRequest,
    targets: &[IngestLocation],
    run_id: &str,
) -> (Vec<Listing>, Vec<CityIngestResult>, Option<RealtorError>) {
    let delay = Duration::from_millis(state.ingest.request_delay_ms);
    let mut listings = Vec::new();
    let mut cities = Vec::with_capacity(targets.len());
    let mut first_error = None;

    for (i, target) in targets.iter().enumerate() {
        // Spread requests out to stay under the listings API rate limit
        if i > 0 && !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        let query = SearchQuery::for_location(req, target);
        let location = target.label();

        match fetch_city(state, &query).await {
            Ok(fetched) => {
                tracing::info!(
                    run_id = %run_id,
                    "[{}/{}] Got {} listings for {}",
                    i + 1,
                    targets.len(),
                    fetched.len(),
                    location
                );
                cities.push(CityIngestResult {
                    location,
                    fetched: fetched.len(),
                    error: None,
                    reference_point: target.center(),
                });
                listings.extend(fetched);
            }
            Err(e) => {
                tracing::warn!(run_id = %run_id, "[{}/{}] Fetch failed for {}: {}", i + 1, targets.len(), location, e);
                cities.push(CityIngestResult {
                    location,
                    fetched: 0,
                    error: Some(e.to_string()),
                    reference_point: target.center(),
                });
                if first_error.is_none() {
                    first_error = Some(e);
                }
            }
        }
    }

    (listings, cities, first_error)
}

/// One city's first page of results, served from cache when present
async fn fetch_city(state: &AppState, query: &SearchQuery) -> Result<Vec<Listing>, RealtorError> {
    let cache_key = CacheKey::search(query);

    if let Some(cache) = &state.cache {
        match cache.get::<Vec<Listing>>(&cache_key).await {
            Ok(Some(listings)) => {
                tracing::debug!("Using {} cached search results for {}", listings.len(), cache_key);
                return Ok(listings);
            }
            Ok(None) => {}
            Err(e) => tracing::warn!("Cache read failed for {}: {}", cache_key, e),
        }
    }

    let fetched = state.realtor.search_listings(query).await?;

    if let Some(cache) = &state.cache {
        if let Err(e) = cache.set(&cache_key, &fetched).await {
            tracing::warn!("Failed to cache search results: {}", e);
        }
    }

    Ok(fetched)
}

/// Get a stored listing
///
/// GET /api/v1/listings/{id}
async fn get_listing(state: web::Data<AppState>, path: web::Path<String>) -> impl Responder {
    let id = path.into_inner();
    let cache_key = CacheKey::listing(&id);

    if let Some(cache) = &state.cache {
        match cache.get::<Listing>(&cache_key).await {
            Ok(Some(listing)) => return HttpResponse::Ok().json(listing),
            Ok(None) => {}
            Err(e) => tracing::warn!("Cache read failed for {}: {}", cache_key, e),
        }
    }

    match state.postgres.get_listing(&id).await {
        Ok(listing) => {
            if let Some(cache) = &state.cache {
                if let Err(e) = cache.set(&cache_key, &listing).await {
                    tracing::warn!("Failed to cache listing {}: {}", id, e);
                }
            }
            HttpResponse::Ok().json(listing)
        }
        Err(e) => {
            if !matches!(e, PostgresError::NotFound(_)) {
                tracing::error!("Failed to fetch listing {}: {}", id, e);
            }
            postgres_error_response(&e)
        }
    }
}

/// Delete a stored listing
///
/// DELETE /api/v1/listings/{id}
async fn delete_listing(state: web::Data<AppState>, path: web::Path<String>) -> impl Responder {
    let id = path.into_inner();

    match state.postgres.delete_listing(&id).await {
        Ok(true) => {
            if let Some(cache) = &state.cache {
                if let Err(e) = cache.delete(&[CacheKey::listing(&id)]).await {
                    tracing::warn!("Failed to invalidate listing cache: {}", e);
                }
            }
            tracing::info!("Deleted listing {}", id);
            HttpResponse::NoContent().finish()
        }
        Ok(false) => error_response(StatusCode::NOT_FOUND, "not_found", format!("No listing {}", id)),
        Err(e) => {
            tracing::error!("Failed to delete listing {}: {}", id, e);
            postgres_error_response(&e)
        }
    }
}

/// List stored listings
///
/// GET /api/v1/listings?city={city}&state={state}&limit={limit}
async fn list_listings(
    state: web::Data<AppState>,
    query: web::Query<ListListingsQuery>,
) -> impl Responder {
    if let Err(errors) = query.validate() {
        return error_response(StatusCode::BAD_REQUEST, "validation_failed", errors.to_string());
    }

    let query = query.into_inner();
    let filter = ListingQuery {
        city: query.city,
        state: query.state,
        limit: query.limit,
    };

    match state.postgres.query_listings(&filter).await {
        Ok(listings) => HttpResponse::Ok().json(serde_json::json!({
            "listings": listings,
            "count": listings.len(),
        })),
        Err(e) => {
            tracing::error!("Failed to list listings: {}", e);
            postgres_error_response(&e)
        }
    }
}
