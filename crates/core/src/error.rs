//! Error types for parcelsnap

use thiserror::Error;

/// Main error type for parcelsnap operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("GeoJSON error: {0}")]
    Geojson(#[from] geojson::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Expected a FeatureCollection, got a {0}")]
    NotAFeatureCollection(&'static str),

    #[error("Invalid geometry: {0}")]
    InvalidGeometry(String),
}

/// Result type alias for parcelsnap operations
pub type Result<T> = std::result::Result<T, Error>;
