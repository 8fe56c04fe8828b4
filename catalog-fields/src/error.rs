//! Error types for the fields registry

use thiserror::Error;

/// Result type for fields operations
pub type Result<T> = std::result::Result<T, FieldsError>;

/// Errors that can occur in field registry operations
#[derive(Debug, Error)]
pub enum FieldsError {
    /// Field not found by id
    #[error("field not found: {id}")]
    FieldNotFound { id: u64 },

    /// Duplicate field name
    #[error("duplicate field name: {name}")]
    DuplicateFieldName { name: String },

    /// A draft or patch describes an unusable field definition
    #[error("invalid field definition: {message}")]
    InvalidDefinition { message: String },

    /// Protected field cannot be renamed, retyped or removed
    #[error("field '{name}' is protected and cannot be {action}")]
    ImmutableField { name: String, action: FieldAction },

    /// YAML error while reading built-in definitions
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),
}

/// The forbidden mutation reported by [`FieldsError::ImmutableField`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldAction {
    Renamed,
    Retyped,
    Removed,
}

impl std::fmt::Display for FieldAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            FieldAction::Renamed => "renamed",
            FieldAction::Retyped => "retyped",
            FieldAction::Removed => "removed",
        };
        f.write_str(s)
    }
}

impl FieldsError {
    /// Create an invalid definition error
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidDefinition {
            message: message.into(),
        }
    }

    /// Create an immutable field error
    pub fn immutable(name: impl Into<String>, action: FieldAction) -> Self {
        Self::ImmutableField {
            name: name.into(),
            action,
        }
    }

    /// True for errors caused by the caller's draft or patch (bad or duplicate values).
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::DuplicateFieldName { .. } | Self::InvalidDefinition { .. }
        )
    }
}
