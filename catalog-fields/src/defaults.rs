//! Built-in product field definitions.
//!
//! The ten built-in fields are declared in `builtin/product_fields.yaml` and
//! embedded at compile time. `product_defaults()` parses them into a
//! [`FieldDefaults`] ready for `FieldsContext::builder().with_defaults()`.

use crate::context::FieldDefaults;
use crate::error::Result;
use crate::types::FieldDef;

const BUILTIN_PRODUCT_FIELDS: &str = include_str!("../builtin/product_fields.yaml");

/// Names of the built-in product fields, in schema order.
pub const BUILTIN_FIELD_NAMES: [&str; 10] = [
    "title",
    "type",
    "ingredients",
    "manufacturer",
    "location",
    "seals",
    "variation",
    "export",
    "macro",
    "observations",
];

/// All built-in product field definitions.
pub fn product_defaults() -> Result<FieldDefaults> {
    FieldDefaults::from_yaml(BUILTIN_PRODUCT_FIELDS)
}

impl FieldDefaults {
    /// Parse a YAML sequence of field definitions.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let defs: Vec<FieldDef> = serde_yaml_ng::from_str(yaml)?;
        Ok(defs.into_iter().fold(FieldDefaults::new(), FieldDefaults::field))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::FieldType;

    #[test]
    fn builtin_fields_parse_in_order() {
        let defaults = product_defaults().unwrap();
        let names: Vec<_> = defaults.fields().iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, BUILTIN_FIELD_NAMES);
        assert!(defaults.fields().iter().all(|f| f.is_default));
    }

    #[test]
    fn builtin_ids_are_one_through_ten() {
        let defaults = product_defaults().unwrap();
        let ids: Vec<_> = defaults.fields().iter().map(|f| f.id).collect();
        assert_eq!(ids, (1..=10).collect::<Vec<u64>>());
    }

    #[test]
    fn only_title_is_required() {
        let defaults = product_defaults().unwrap();
        let required: Vec<_> = defaults
            .fields()
            .iter()
            .filter(|f| f.required)
            .map(|f| f.name.as_str())
            .collect();
        assert_eq!(required, vec!["title"]);
    }

    #[test]
    fn type_is_select_and_macro_is_number() {
        let defaults = product_defaults().unwrap();
        let by_name = |n: &str| defaults.fields().iter().find(|f| f.name == n).unwrap();
        assert_eq!(
            by_name("type").type_.options(),
            ["Alimento", "Bebida", "Higiene", "Limpeza", "Outro"]
        );
        assert_eq!(by_name("macro").type_, FieldType::Number);
        assert_eq!(by_name("ingredients").type_, FieldType::Textarea);
    }

    #[test]
    fn malformed_yaml_is_an_error() {
        assert!(FieldDefaults::from_yaml("- id: one\n  name: x").is_err());
    }
}
