//! Error types for rds-rightsizer
//!
//! Library code uses `crate::error::Result<T>` which returns `RightsizerError`.
//! The binary uses `anyhow::Result<T>` and converts at the CLI boundary, keeping
//! the underlying error reachable for exit-code mapping (see `exit_codes`).
//!
//! ## Absence is not an error
//!
//! A catalog query that matches nothing, or a metric with no datapoints, is an
//! expected outcome and is modelled with `Option`/`MetricValue::NoData` in the
//! resolvers. The variants below are reserved for real failures.
//!
//! ## When to Use Which Error
//!
//! - `ConfigError`: configuration parsing and validation issues
//!   - Automatically converted to `RightsizerError::Config` via `#[from]`
//!
//! - `Rds`/`CloudWatch`/`Pricing`: AWS API failures for the corresponding service
//!   - Never retried; they abort the run
//!
//! - `Catalog`: a price-list entry that could not be interpreted
//!
//! - `ResourceNotFound`: the requested DB instance does not exist in the region
//!
//! - `Validation`: user input rejected before any AWS call is made

use thiserror::Error;

/// Main error type for rds-rightsizer
#[derive(Error, Debug)]
pub enum RightsizerError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Validation error: {field} - {reason}")]
    Validation { field: String, reason: String },

    #[error("Resource not found: {resource_type} - {resource_id}")]
    ResourceNotFound {
        resource_type: String,
        resource_id: String,
    },

    #[error("RDS API error: {0}")]
    Rds(String),

    #[error("CloudWatch API error: {0}")]
    CloudWatch(String),

    #[error("Pricing API error: {0}")]
    Pricing(String),

    #[error("Malformed price list entry: {reason}")]
    Catalog { reason: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// Configuration-specific errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },

    #[error("Failed to parse config: {0}")]
    ParseError(String),
}

impl From<toml::de::Error> for ConfigError {
    fn from(err: toml::de::Error) -> Self {
        ConfigError::ParseError(err.to_string())
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, RightsizerError>;

impl RightsizerError {
    /// Shorthand for a malformed catalog entry
    pub(crate) fn catalog(reason: impl Into<String>) -> Self {
        RightsizerError::Catalog {
            reason: reason.into(),
        }
    }

    /// Shorthand for an input validation failure
    pub(crate) fn validation(field: impl Into<String>, reason: impl Into<String>) -> Self {
        RightsizerError::Validation {
            field: field.into(),
            reason: reason.into(),
        }
    }
}
