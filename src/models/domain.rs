use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A single property listing as ingested from the listings API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Listing {
    pub id: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub zip: String,
    #[serde(default, alias = "lat")]
    pub latitude: Option<f64>,
    #[serde(default, alias = "lon")]
    pub longitude: Option<f64>,
    #[serde(default)]
    pub price: Option<u64>,
    #[serde(default, alias = "beds")]
    pub bedrooms: Option<u32>,
    #[serde(default, alias = "baths")]
    pub bathrooms: Option<f64>,
    #[serde(default)]
    pub sqft: Option<u32>,
    #[serde(default)]
    pub lot_sqft: Option<u64>,
    #[serde(default)]
    pub year_built: Option<i32>,
    #[serde(default)]
    pub property_type: PropertyType,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub photos: Vec<String>,
    #[serde(default)]
    pub url: String,
    #[serde(default, skip_serializing_if = "serde_json::Value::is_null")]
    pub raw_data: serde_json::Value,
}

impl Listing {
    /// Minimal listing with only an identifier set
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            address: String::new(),
            city: String::new(),
            state: String::new(),
            zip: String::new(),
            latitude: None,
            longitude: None,
            price: None,
            bedrooms: None,
            bathrooms: None,
            sqft: None,
            lot_sqft: None,
            year_built: None,
            property_type: PropertyType::Other,
            description: String::new(),
            photos: Vec::new(),
            url: String::new(),
            raw_data: serde_json::Value::Null,
        }
    }

    /// "City, ST" label used by location filters
    pub fn location_label(&self) -> String {
        format!("{}, {}", self.city, self.state)
    }
}

/// Property type tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", from = "String")]
pub enum PropertyType {
    SingleFamily,
    Condo,
    Townhouse,
    MultiFamily,
    Mobile,
    Land,
    Farm,
    #[default]
    Other,
}

impl PropertyType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PropertyType::SingleFamily => "single_family",
            PropertyType::Condo => "condo",
            PropertyType::Townhouse => "townhouse",
            PropertyType::MultiFamily => "multi_family",
            PropertyType::Mobile => "mobile",
            PropertyType::Land => "land",
            PropertyType::Farm => "farm",
            PropertyType::Other => "other",
        }
    }
}

impl From<&str> for PropertyType {
    /// Accepts both our own tags and the listings API's plural spellings
    fn from(value: &str) -> Self {
        match value.trim().to_lowercase().as_str() {
            "single_family" => PropertyType::SingleFamily,
            "condo" | "condos" | "condo_townhome" | "condo_townhome_rowhome_coop" | "coop" => {
                PropertyType::Condo
            }
            "townhouse" | "townhomes" | "townhome" => PropertyType::Townhouse,
            "multi_family" | "duplex_triplex" | "apartment" => PropertyType::MultiFamily,
            "mobile" | "mobile_home" => PropertyType::Mobile,
            "land" => PropertyType::Land,
            "farm" | "farms_ranches" => PropertyType::Farm,
            _ => PropertyType::Other,
        }
    }
}

impl From<String> for PropertyType {
    fn from(value: String) -> Self {
        PropertyType::from(value.as_str())
    }
}

/// A named location used for proximity scoring
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferencePoint {
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl ReferencePoint {
    pub fn new(name: impl Into<String>, latitude: f64, longitude: f64) -> Self {
        Self {
            name: name.into(),
            latitude,
            longitude,
        }
    }
}

/// Per-criterion weights
///
/// They need not sum to 1.0; the total score divides by their sum.
///
/// Omitted fields take their default weight.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoringWeights {
    #[serde(default = "default_price_weight")]
    pub price: f64,
    #[serde(default = "default_location_weight")]
    pub location: f64,
    #[serde(default = "default_size_weight")]
    pub size: f64,
    #[serde(default = "default_bedrooms_weight")]
    pub bedrooms: f64,
    #[serde(default = "default_age_weight")]
    pub age: f64,
}

fn default_price_weight() -> f64 { 0.30 }
fn default_location_weight() -> f64 { 0.25 }
fn default_size_weight() -> f64 { 0.20 }
fn default_bedrooms_weight() -> f64 { 0.15 }
fn default_age_weight() -> f64 { 0.10 }

impl ScoringWeights {
    pub fn sum(&self) -> f64 {
        self.price + self.location + self.size + self.bedrooms + self.age
    }

    fn as_array(&self) -> [f64; 5] {
        [self.price, self.location, self.size, self.bedrooms, self.age]
    }

    pub fn all_finite_and_non_negative(&self) -> bool {
        self.as_array().iter().all(|w| w.is_finite() && *w >= 0.0)
    }

    /// Weights rescaled so the largest is 1.0
    ///
    /// Keeps the weighted sum finite for any finite input. `None` when no
    /// weight is positive.
    pub fn normalized(&self) -> Option<ScoringWeights> {
        let max = self.as_array().into_iter().fold(0.0_f64, f64::max);
        if !(max > 0.0 && max.is_finite()) {
            return None;
        }

        Some(ScoringWeights {
            price: self.price / max,
            location: self.location / max,
            size: self.size / max,
            bedrooms: self.bedrooms / max,
            age: self.age / max,
        })
    }
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            price: default_price_weight(),
            location: default_location_weight(),
            size: default_size_weight(),
            bedrooms: default_bedrooms_weight(),
            age: default_age_weight(),
        }
    }
}

/// Per-request user preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreferenceProfile {
    #[serde(default)]
    pub budget_min: u64,
    pub budget_max: u64,
    #[serde(default)]
    pub min_bedrooms: u32,
    #[serde(default)]
    pub min_bathrooms: f64,
    #[serde(default)]
    pub target_sqft: Option<u32>,
    #[serde(default)]
    pub weights: ScoringWeights,
}

impl Default for PreferenceProfile {
    fn default() -> Self {
        Self {
            budget_min: 0,
            budget_max: 1_000_000,
            min_bedrooms: 2,
            min_bathrooms: 1.5,
            target_sqft: None,
            weights: ScoringWeights::default(),
        }
    }
}

/// Per-criterion sub-scores, each in [0, 1]
///
/// `location` is `None` when no distance could be computed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub price: f64,
    pub location: Option<f64>,
    pub size: f64,
    pub bedrooms: f64,
    pub age: f64,
}

/// A listing with its computed score
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredListing {
    pub rank: usize,
    pub listing: Listing,
    pub score: f64,
    pub breakdown: ScoreBreakdown,
    pub distances: BTreeMap<String, f64>,
    pub nearest_reference: Option<String>,
}

/// Units for reported distances and the location scale
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DistanceUnit {
    #[default]
    Miles,
    Kilometers,
}

/// How distances are computed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DistanceMethod {
    /// Great-circle distance on a spherical earth
    #[default]
    Haversine,
    /// Ellipsoidal distance on WGS84
    Geodesic,
}
