//! Error types for guesswork.
//!
//! All errors are strongly typed using thiserror. The taxonomy is
//! deliberately small: only catalog construction and file ingestion can
//! fail. Runtime play never errors — unrecognized answer labels are
//! normalized to neutral, degenerate score vectors fall back to a
//! uniform distribution, and protocol misuse is a silent no-op.

use thiserror::Error;

/// Validation errors raised while constructing a [`crate::Catalog`] or
/// a [`crate::SessionConfig`].
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A weight outside the closed interval [0.0, 1.0] (or NaN).
    #[error("Weight {value} for '{entity}' / '{characteristic}' is out of range [0.0, 1.0]")]
    WeightOutOfRange {
        /// Entity the weight was registered for.
        entity: String,
        /// Characteristic the weight was registered for.
        characteristic: String,
        /// The rejected value.
        value: f64,
    },

    /// Entity names must be non-empty after trimming.
    #[error("Entity name cannot be empty")]
    EmptyEntityName,

    /// Characteristic names must be non-empty after trimming.
    #[error("Characteristic name cannot be empty")]
    EmptyCharacteristicName,

    /// A catalog with zero entities cannot host a session.
    #[error("Catalog must contain at least one entity")]
    EmptyCatalog,

    /// The confidence threshold must lie in (0.0, 1.0].
    #[error("Confidence threshold {value} is out of range (0.0, 1.0]")]
    ThresholdOutOfRange {
        /// The rejected value.
        value: f64,
    },
}

/// Errors raised while reading provisioning data.
///
/// A *malformed record* is not an error — it is skipped with an
/// [`crate::IngestDiagnostic`]. Only a missing/unreadable file or an
/// unparseable JSON document is fatal.
#[derive(Debug, Error)]
pub enum IngestError {
    /// A provisioning file could not be read.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A JSON catalog snapshot could not be parsed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Top-level error type for guesswork.
#[derive(Debug, Error)]
pub enum GuessworkError {
    /// Invalid catalog or configuration input.
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Provisioning data could not be read.
    #[error("Ingest error: {0}")]
    Ingest(#[from] IngestError),
}

impl GuessworkError {
    /// Returns true if this is a validation error.
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Returns true if this is an ingestion error.
    #[must_use]
    pub const fn is_ingest(&self) -> bool {
        matches!(self, Self::Ingest(_))
    }
}

/// Result type alias for guesswork operations.
pub type GuessResult<T> = Result<T, GuessworkError>;
