//! Error types for catalog loading and configuration.
//!
//! Layout itself has no error path: running out of photos is `None`, and a
//! selection that cannot improve is returned as a best effort.

use compact_str::CompactString;
use thiserror::Error;

/// A template catalog that violates the catalog contract.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CatalogError {
    #[error("catalog has no templates")]
    Empty,
    #[error("template probabilities sum to {sum}, expected 1.0")]
    ProbabilitySum { sum: f64 },
    #[error("template '{name}' has probability {probability}, expected a value in (0, 1]")]
    Probability { name: CompactString, probability: f64 },
    #[error("template '{name}' spans {units} width units, expected 1..=3")]
    WidthUnits { name: CompactString, units: u32 },
    #[error("template '{name}' contains a split with no children")]
    EmptySplit { name: CompactString },
    #[error("catalog has no single-photo, one-unit fallback template")]
    MissingFallback,
}

#[derive(Error, Debug)]
pub enum MosaicError {
    #[error("invalid template catalog: {0}")]
    Catalog(#[from] CatalogError),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid config value for {key}: {message}")]
    InvalidConfig { key: &'static str, message: String },
}

pub type Result<T> = std::result::Result<T, MosaicError>;
