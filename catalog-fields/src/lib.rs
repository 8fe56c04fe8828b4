//! Product field registry and schema validator
//!
//! `catalog-fields` is a schema-only crate: it owns the field definitions a
//! product may carry and validates raw product records against them. It knows
//! nothing about repositories or caching; `catalog-products` builds on it.
//!
//! # Architecture
//!
//! - **Session-scoped**: a [`FieldsContext`] lives for one operator session, in memory
//! - **Tagged types**: [`FieldType`] and [`FieldValue`] carry the type contract, not strings
//! - **Pure validation**: [`ValidationEngine`] has no state and no I/O
//! - **Built-in seeding**: [`product_defaults()`] supplies the ten built-in product fields

pub mod context;
pub mod defaults;
pub mod error;
pub mod types;
pub mod validation;
pub mod value;

pub use context::{FieldDefaults, FieldsContext, FieldsContextBuilder};
pub use defaults::{product_defaults, BUILTIN_FIELD_NAMES};
pub use error::{FieldAction, FieldsError, Result};
pub use types::{
    parse_options, Display, Editor, FieldDef, FieldDraft, FieldPatch, FieldType,
    PROTECTED_FIELD, SYSTEM_FIELDS,
};
pub use validation::{
    validate, FieldViolation, ValidatedRecord, ValidationEngine, ValidationMode, ViolationReason,
};
pub use value::{FieldValue, RawRecord};
