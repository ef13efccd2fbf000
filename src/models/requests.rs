use serde::{Deserialize, Serialize};
use validator::Validate;
use crate::models::domain::{Listing, PreferenceProfile, ReferencePoint};

/// Request to rank listings against a preference profile
///
/// Every field is optional: a missing profile falls back to the configured
/// defaults, missing listings are loaded from the listing store, and missing
/// reference points use the configured ones.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct RankListingsRequest {
    #[serde(default)]
    pub profile: Option<PreferenceProfile>,
    #[serde(default, alias = "referencePoints")]
    pub reference_points: Option<Vec<ReferencePoint>>,
    #[serde(default)]
    pub listings: Option<Vec<Listing>>,
    /// "City, ST" labels; empty means no location filter
    #[serde(default)]
    pub locations: Vec<String>,
    #[validate(range(min = 1))]
    pub limit: Option<usize>,
    pub strict: Option<bool>,
}

/// One city to pull listings for
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct IngestLocation {
    #[validate(length(min = 1))]
    pub city: String,
    #[validate(length(equal = 2))]
    #[serde(alias = "stateCode")]
    pub state_code: String,
    /// City centre; becomes the city's "downtown" reference point
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
}

impl IngestLocation {
    pub fn new(city: impl Into<String>, state_code: impl Into<String>, latitude: f64, longitude: f64) -> Self {
        Self {
            city: city.into(),
            state_code: state_code.into(),
            latitude: Some(latitude),
            longitude: Some(longitude),
        }
    }

    /// "City, ST" label
    pub fn label(&self) -> String {
        format!("{}, {}", self.city.trim(), self.state_code.trim().to_uppercase())
    }

    pub fn is_same_city(&self, city: &str, state_code: &str) -> bool {
        self.city.trim().eq_ignore_ascii_case(city.trim())
            && self.state_code.trim().eq_ignore_ascii_case(state_code.trim())
    }

    /// Reference point at the city centre, named by the city label
    pub fn center(&self) -> Option<ReferencePoint> {
        match (self.latitude, self.longitude) {
            (Some(lat), Some(lon)) => Some(ReferencePoint::new(self.label(), lat, lon)),
            _ => None,
        }
    }
}

/// Request to pull listings from the listings API into the store
///
/// Exactly one target mode is allowed: a single `city`/`state_code` (with an
/// optional `postal_code`), a list of `locations`, or `nationwide` for the
/// configured city list. `limit` applies per city.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct IngestRequest {
    #[validate(length(min = 1))]
    pub city: Option<String>,
    #[validate(length(equal = 2))]
    #[serde(default, alias = "stateCode")]
    pub state_code: Option<String>,
    #[serde(default, alias = "postalCode")]
    pub postal_code: Option<String>,
    #[serde(default)]
    pub locations: Vec<IngestLocation>,
    #[serde(default)]
    pub nationwide: bool,
    #[serde(default = "default_ingest_limit")]
    #[validate(range(min = 1, max = 200))]
    pub limit: u32,
    #[serde(default, alias = "priceMin")]
    pub price_min: Option<u64>,
    #[serde(default, alias = "priceMax")]
    pub price_max: Option<u64>,
    #[serde(default, alias = "bedsMin")]
    pub beds_min: Option<u32>,
}

fn default_ingest_limit() -> u32 {
    20
}

impl IngestRequest {
    /// Resolve the cities this request covers
    ///
    /// Locations without coordinates pick them up from `presets` when the
    /// city is listed there. Duplicate cities are fetched once.
    pub fn targets(&self, presets: &[IngestLocation], max_cities: usize) -> Result<Vec<IngestLocation>, String> {
        let single = self.city.is_some() || self.state_code.is_some() || self.postal_code.is_some();
        let multi = !self.locations.is_empty();

        let targets = match (single, multi, self.nationwide) {
            (true, false, false) => match (&self.city, &self.state_code) {
                (Some(city), Some(state_code)) => vec![IngestLocation {
                    city: city.trim().to_string(),
                    state_code: state_code.trim().to_uppercase(),
                    latitude: None,
                    longitude: None,
                }],
                _ => return Err("city and state_code are both required".to_string()),
            },
            (false, true, false) => {
                for location in &self.locations {
                    location
                        .validate()
                        .map_err(|e| format!("{}: {}", location.label(), e))?;
                }
                self.locations.clone()
            }
            (false, false, true) => {
                if presets.is_empty() {
                    return Err("no nationwide cities are configured".to_string());
                }
                presets.to_vec()
            }
            (false, false, false) => {
                return Err("one of city/state_code, locations or nationwide is required".to_string())
            }
            _ => {
                return Err("city/state_code, locations and nationwide are mutually exclusive".to_string())
            }
        };

        let mut unique: Vec<IngestLocation> = Vec::with_capacity(targets.len());
        for mut target in targets {
            if unique.iter().any(|t| t.is_same_city(&target.city, &target.state_code)) {
                continue;
            }
            if target.center().is_none() {
                if let Some(preset) = presets.iter().find(|p| p.is_same_city(&target.city, &target.state_code)) {
                    target.latitude = preset.latitude;
                    target.longitude = preset.longitude;
                }
            }
            unique.push(target);
        }

        if unique.len() > max_cities {
            return Err(format!("{} cities requested, at most {} allowed", unique.len(), max_cities));
        }

        Ok(unique)
    }
}

/// Query parameters for listing stored listings
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ListListingsQuery {
    pub city: Option<String>,
    pub state: Option<String>,
    #[serde(default = "default_list_limit")]
    #[validate(range(min = 1, max = 500))]
    pub limit: u32,
}

fn default_list_limit() -> u32 {
    50
}
