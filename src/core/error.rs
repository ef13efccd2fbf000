use thiserror::Error;

/// Errors raised by the ranking core
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RankingError {
    /// The listing has no usable geolocation. Recovered per listing.
    #[error("Invalid coordinates: lat={latitude:?}, lon={longitude:?}")]
    InvalidCoordinates {
        latitude: Option<f64>,
        longitude: Option<f64>,
    },

    #[error("Invalid preference profile: {0}")]
    InvalidPreferenceProfile(String),

    #[error("Invalid reference point: {0}")]
    InvalidReferencePoint(String),
}
