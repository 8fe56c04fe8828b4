//! Error types for catalog operations

use catalog_fields::{FieldViolation, FieldsError};
use thiserror::Error;

use crate::repository::RepositoryError;
use crate::types::ProductId;

/// Result type alias for catalog operations
pub type Result<T> = std::result::Result<T, CatalogError>;

/// Errors that can occur during catalog operations
#[derive(Error, Debug)]
pub enum CatalogError {
    /// The record broke one or more field contracts; nothing was written
    #[error("validation failed: {}", format_violations(.violations))]
    Validation { violations: Vec<FieldViolation> },

    /// No product with this id
    #[error("product not found: {id}")]
    ProductNotFound { id: ProductId },

    /// Field registry error, passed through unchanged
    #[error(transparent)]
    Fields(#[from] FieldsError),

    /// The external store failed
    #[error("repository error: {0}")]
    Repository(#[from] RepositoryError),

    /// Image upload collaborator failed
    #[error("image upload failed: {0}")]
    Upload(String),

    /// Configuration could not be loaded
    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl CatalogError {
    /// The field violations of a validation error; empty for every other error.
    pub fn violations(&self) -> &[FieldViolation] {
        match self {
            Self::Validation { violations } => violations,
            _ => &[],
        }
    }

    /// True for not-found errors, whether for a product or a field definition.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::ProductNotFound { .. } | Self::Fields(FieldsError::FieldNotFound { .. })
        )
    }
}

fn format_violations(violations: &[FieldViolation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Configuration-related errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Configuration parsing failed
    #[error("Failed to parse configuration: {0}")]
    Parse(#[from] Box<figment::Error>),

    /// Invalid configuration value
    #[error("Invalid configuration value for key '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// An explicitly requested configuration file does not exist
    #[error("Configuration file not found: {}", .path.display())]
    NotFound { path: std::path::PathBuf },
}

impl From<figment::Error> for ConfigError {
    fn from(error: figment::Error) -> Self {
        ConfigError::Parse(Box::new(error))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use catalog_fields::ViolationReason;

    #[test]
    fn test_validation_error_lists_every_field() {
        let err = CatalogError::Validation {
            violations: vec![
                FieldViolation::new("title", ViolationReason::Missing),
                FieldViolation::new("macro", ViolationReason::TypeMismatch),
            ],
        };
        assert_eq!(
            err.to_string(),
            "validation failed: title is required, macro has the wrong type"
        );
        assert_eq!(err.violations().len(), 2);
    }

    #[test]
    fn test_not_found() {
        let err = CatalogError::ProductNotFound { id: ProductId(9) };
        assert_eq!(err.to_string(), "product not found: 9");
        assert!(err.is_not_found());
        assert!(err.violations().is_empty());
    }

    #[test]
    fn test_fields_error_is_transparent() {
        let err: CatalogError = FieldsError::FieldNotFound { id: 3 }.into();
        assert_eq!(err.to_string(), "field not found: 3");
        assert!(err.is_not_found());
    }
}
