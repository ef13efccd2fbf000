use crate::models::{IngestLocation, IngestRequest, Listing, PropertyType};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::time::Duration;
use thiserror::Error;

/// Photos kept per listing
const MAX_PHOTOS: usize = 5;

/// Characters of description text kept per listing
const MAX_DESCRIPTION_CHARS: usize = 1000;

const SEARCH_PATH: &str = "/properties/v3/list";

/// Errors that can occur when talking to the listings API
#[derive(Debug, Error)]
pub enum RealtorError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("API returned error: {0}")]
    ApiError(String),

    #[error("Unauthorized: invalid RapidAPI key")]
    Unauthorized,

    #[error("Rate limited by RapidAPI")]
    RateLimited,

    #[error("Invalid response format: {0}")]
    InvalidResponse(String),
}

/// Search parameters for one page of listings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchQuery {
    pub city: String,
    pub state_code: String,
    pub postal_code: Option<String>,
    pub limit: u32,
    pub offset: u32,
    pub price_min: Option<u64>,
    pub price_max: Option<u64>,
    pub beds_min: Option<u32>,
}

impl SearchQuery {
    /// First page of results for one city of an ingest request
    ///
    /// The request's postal code only applies to single-city runs.
    pub fn for_location(req: &IngestRequest, location: &IngestLocation) -> Self {
        let single_city = req.locations.is_empty() && !req.nationwide;

        Self {
            city: location.city.trim().to_string(),
            state_code: location.state_code.trim().to_uppercase(),
            postal_code: if single_city { req.postal_code.clone() } else { None },
            limit: req.limit,
            offset: 0,
            price_min: req.price_min,
            price_max: req.price_max,
            beds_min: req.beds_min,
        }
    }

    /// JSON body for the search endpoint
    ///
    /// A postal code, when present, replaces the city/state pair.
    pub fn to_payload(&self) -> Value {
        let mut payload = json!({
            "limit": self.limit,
            "offset": self.offset,
            "status": ["for_sale", "ready_to_build"],
            "sort": {
                "direction": "desc",
                "field": "list_date"
            }
        });

        if let Some(obj) = payload.as_object_mut() {
            match &self.postal_code {
                Some(postal_code) => {
                    obj.insert("postal_code".to_string(), json!(postal_code));
                }
                None => {
                    obj.insert("city".to_string(), json!(self.city));
                    obj.insert("state_code".to_string(), json!(self.state_code));
                }
            }
            if let Some(min) = self.price_min {
                obj.insert("price_min".to_string(), json!(min));
            }
            if let Some(max) = self.price_max {
                obj.insert("price_max".to_string(), json!(max));
            }
            if let Some(beds) = self.beds_min {
                obj.insert("beds_min".to_string(), json!(beds));
            }
        }

        payload
    }
}

/// Realty in US (RapidAPI) client
///
/// Fetches for-sale listings and normalizes them into [`Listing`] records.
pub struct RealtorClient {
    base_url: String,
    host: String,
    api_key: String,
    client: Client,
}

impl RealtorClient {
    /// Create a new listings API client
    pub fn new(
        base_url: String,
        host: String,
        api_key: String,
        timeout_secs: u64,
    ) -> Result<Self, RealtorError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;

        Ok(Self {
            base_url,
            host,
            api_key,
            client,
        })
    }

    /// Fetch one page of listings matching the query
    pub async fn search_listings(&self, query: &SearchQuery) -> Result<Vec<Listing>, RealtorError> {
        let url = format!("{}{}", self.base_url.trim_end_matches('/'), SEARCH_PATH);

        tracing::debug!("Fetching listings for {}, {} from {}", query.city, query.state_code, url);

        let response = self
            .client
            .post(&url)
            .header("X-RapidAPI-Key", &self.api_key)
            .header("X-RapidAPI-Host", &self.host)
            .json(&query.to_payload())
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(RealtorError::Unauthorized);
        }
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(RealtorError::RateLimited);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_else(|_| "Unable to read body".to_string());
            tracing::error!("Listing search failed: {} - {}", status, body);
            return Err(RealtorError::ApiError(format!("Failed to search listings: {}", status)));
        }

        let json: Value = response.json().await?;

        let data = json
            .get("data")
            .ok_or_else(|| RealtorError::InvalidResponse("Missing data object".into()))?;

        let results = match data.pointer("/home_search/results").and_then(|r| r.as_array()) {
            Some(results) => results,
            None => {
                tracing::warn!("No home_search results in response for {}, {}", query.city, query.state_code);
                return Ok(Vec::new());
            }
        };

        let listings: Vec<Listing> = results.iter().filter_map(parse_listing).collect();

        if listings.len() < results.len() {
            tracing::debug!("Skipped {} results without a property id", results.len() - listings.len());
        }
        tracing::info!("Fetched {} listings for {}, {}", listings.len(), query.city, query.state_code);

        Ok(listings)
    }
}

/// Normalize one search result into a listing
///
/// Returns `None` when the result has no property id.
pub fn parse_listing(raw: &Value) -> Option<Listing> {
    let id = match raw.get("property_id")? {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        _ => return None,
    };
    if id.is_empty() {
        return None;
    }

    let address = raw.pointer("/location/address").unwrap_or(&Value::Null);
    let coordinate = address.get("coordinate").unwrap_or(&Value::Null);
    let description = raw.get("description").unwrap_or(&Value::Null);

    let photos = raw
        .get("photos")
        .and_then(|p| p.as_array())
        .map(|photos| {
            photos
                .iter()
                .take(MAX_PHOTOS)
                .filter_map(|photo| match photo {
                    Value::Object(_) => photo.get("href").and_then(|h| h.as_str()).map(str::to_string),
                    Value::String(s) => Some(s.clone()),
                    _ => None,
                })
                .collect()
        })
        .unwrap_or_default();

    Some(Listing {
        id,
        address: str_field(address, "line"),
        city: str_field(address, "city"),
        state: str_field(address, "state_code"),
        zip: str_field(address, "postal_code"),
        latitude: coordinate.get("lat").and_then(Value::as_f64),
        longitude: coordinate.get("lon").and_then(Value::as_f64),
        price: raw.get("list_price").and_then(non_negative_int),
        bedrooms: description
            .get("beds")
            .and_then(non_negative_int)
            .and_then(|b| u32::try_from(b).ok()),
        bathrooms: description.get("baths").and_then(non_negative_float),
        sqft: description
            .get("sqft")
            .and_then(non_negative_int)
            .and_then(|s| u32::try_from(s).ok()),
        lot_sqft: description.get("lot_sqft").and_then(non_negative_int),
        year_built: description
            .get("year_built")
            .and_then(Value::as_i64)
            .and_then(|y| i32::try_from(y).ok()),
        property_type: description
            .get("type")
            .and_then(Value::as_str)
            .map(PropertyType::from)
            .unwrap_or_default(),
        description: description
            .get("text")
            .and_then(Value::as_str)
            .map(|text| text.chars().take(MAX_DESCRIPTION_CHARS).collect())
            .unwrap_or_default(),
        photos,
        url: str_field(raw, "href"),
        raw_data: raw.clone(),
    })
}

fn str_field(value: &Value, key: &str) -> String {
    value
        .get(key)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

/// Accepts integers and whole-ish floats; the API is not consistent
fn non_negative_int(value: &Value) -> Option<u64> {
    value
        .as_u64()
        .or_else(|| non_negative_float(value).map(|f| f.round() as u64))
}

fn non_negative_float(value: &Value) -> Option<f64> {
    value.as_f64().filter(|f| f.is_finite() && *f >= 0.0)
}
