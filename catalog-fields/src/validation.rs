//! Schema validation for product records.
//!
//! [`ValidationEngine`] checks a [`RawRecord`] against an ordered set of
//! [`FieldDef`]s and either returns the normalized record or every violation
//! found. It holds no state and performs no I/O: the same inputs always give
//! the same output.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::types::{FieldDef, SYSTEM_FIELDS};
use crate::value::{is_blank, FieldValue, RawRecord};

/// Whether a record is being created or partially updated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ValidationMode {
    /// Every required field must be present.
    Create,
    /// Only the fields present in the input are checked.
    Update,
}

/// Why a field was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ViolationReason {
    Missing,
    TypeMismatch,
}

impl std::fmt::Display for ViolationReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ViolationReason::Missing => f.write_str("is required"),
            ViolationReason::TypeMismatch => f.write_str("has the wrong type"),
        }
    }
}

/// A single rejected field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldViolation {
    pub field: String,
    pub reason: ViolationReason,
}

impl FieldViolation {
    pub fn new(field: impl Into<String>, reason: ViolationReason) -> Self {
        Self {
            field: field.into(),
            reason,
        }
    }
}

impl std::fmt::Display for FieldViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.field, self.reason)
    }
}

/// A record that passed validation.
///
/// `values` holds only schema fields, in schema order. `system` carries the
/// record-owned keys (`id`, `createdAt`) exactly as submitted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ValidatedRecord {
    pub values: IndexMap<String, FieldValue>,
    pub system: IndexMap<String, Value>,
}

impl ValidatedRecord {
    /// Back to raw form, suitable for feeding through the validator again.
    pub fn to_raw(&self) -> RawRecord {
        self.values
            .iter()
            .map(|(name, value)| (name.clone(), value.to_json()))
            .chain(self.system.iter().map(|(k, v)| (k.clone(), v.clone())))
            .collect()
    }
}

/// Validates raw records against a field schema.
#[derive(Debug, Clone, Copy)]
pub struct ValidationEngine<'a> {
    fields: &'a [FieldDef],
}

impl<'a> ValidationEngine<'a> {
    pub fn new(fields: &'a [FieldDef]) -> Self {
        Self { fields }
    }

    /// Validate `record`. On failure every violation is returned, in schema order.
    pub fn validate(
        &self,
        record: &RawRecord,
        mode: ValidationMode,
    ) -> Result<ValidatedRecord, Vec<FieldViolation>> {
        let mut values = IndexMap::new();
        let mut violations = Vec::new();

        for field in self.fields {
            let Some(raw) = record.get(&field.name) else {
                if mode == ValidationMode::Create && field.required {
                    violations.push(FieldViolation::new(&field.name, ViolationReason::Missing));
                }
                continue;
            };

            if is_blank(raw) {
                if field.required {
                    violations.push(FieldViolation::new(&field.name, ViolationReason::Missing));
                } else {
                    values.insert(field.name.clone(), FieldValue::Empty);
                }
                continue;
            }

            match FieldValue::coerce(&field.type_, raw) {
                Ok(value) => {
                    values.insert(field.name.clone(), value);
                }
                Err(reason) => violations.push(FieldViolation::new(&field.name, reason)),
            }
        }

        if !violations.is_empty() {
            debug!(count = violations.len(), ?mode, "record rejected");
            return Err(violations);
        }

        let mut system = IndexMap::new();
        for key in SYSTEM_FIELDS {
            if let Some(v) = record.get(key) {
                system.insert(key.to_string(), v.clone());
            }
        }

        let dropped = record
            .keys()
            .filter(|k| !SYSTEM_FIELDS.contains(&k.as_str()))
            .filter(|k| !self.fields.iter().any(|f| f.name == **k))
            .count();
        if dropped > 0 {
            debug!(dropped, "unknown keys dropped from record");
        }

        Ok(ValidatedRecord { values, system })
    }
}

/// Shorthand for `ValidationEngine::new(fields).validate(record, mode)`.
pub fn validate(
    fields: &[FieldDef],
    record: &RawRecord,
    mode: ValidationMode,
) -> Result<ValidatedRecord, Vec<FieldViolation>> {
    ValidationEngine::new(fields).validate(record, mode)
}
