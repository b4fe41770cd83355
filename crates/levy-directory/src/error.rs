//! # Directory Error Types
//!
//! Error types for loading rate tables.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Propagation                                    │
//! │                                                                         │
//! │  std::io::Error / toml::de::Error / ValidationError                    │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  DirectoryError (this module) ← Adds path and entity context           │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  anyhow (levy-cli) ← Printed to stderr                                 │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Lookup failures during a calculation are not `DirectoryError`s; they are
//! reported to the resolver as `levy_core::ResolutionError`.

use std::path::PathBuf;

use levy_core::ValidationError;
use thiserror::Error;

/// Rate table loading errors.
#[derive(Debug, Error)]
pub enum DirectoryError {
    /// Rate table file couldn't be read.
    #[error("Failed to read rate table {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Rate table isn't valid TOML or doesn't match the schema.
    #[error("Invalid rate table: {0}")]
    Parse(#[from] toml::de::Error),

    /// A zone or rate failed validation.
    ///
    /// ## When This Occurs
    /// - Bad country code or zip code on a zone
    /// - Rate value out of range, bad currency, inverted validity window
    #[error("Invalid {entity} '{id}': {source}")]
    Validation {
        entity: &'static str,
        id: String,
        #[source]
        source: ValidationError,
    },

    /// Two zones or two rates share an id.
    #[error("Duplicate {entity} id: '{id}'")]
    DuplicateId { entity: &'static str, id: String },

    /// A rate references a zone that isn't in the table.
    #[error("Tax rate '{rate_id}' references unknown zone '{zone_id}'")]
    UnknownZone { rate_id: String, zone_id: String },
}

impl DirectoryError {
    /// Creates a Validation error for an entity.
    pub fn invalid(entity: &'static str, id: impl Into<String>, source: ValidationError) -> Self {
        DirectoryError::Validation {
            entity,
            id: id.into(),
            source,
        }
    }
}

/// Result type for directory operations.
pub type DirectoryResult<T> = Result<T, DirectoryError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = DirectoryError::UnknownZone {
            rate_id: "ca".to_string(),
            zone_id: "california".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Tax rate 'ca' references unknown zone 'california'"
        );

        let err = DirectoryError::invalid(
            "zone",
            "us",
            ValidationError::Required {
                field: "country_iso".to_string(),
            },
        );
        assert_eq!(err.to_string(), "Invalid zone 'us': country_iso is required");
    }
}
