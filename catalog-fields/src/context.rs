//! FieldsContext: the field registry for one session.
//!
//! Holds the live, ordered set of field definitions for one operator session
//! and enforces the registry invariants: unique names, usable select options,
//! and protection of the built-in fields.

use std::collections::HashMap;

use tracing::{debug, info};

use crate::error::{FieldAction, FieldsError, Result};
use crate::types::{FieldDef, FieldDraft, FieldPatch, FieldType, SYSTEM_FIELDS};

/// A collection of default field definitions.
///
/// Consumers build this to pass to `FieldsContextBuilder::with_defaults()`.
pub struct FieldDefaults {
    fields: Vec<FieldDef>,
}

impl FieldDefaults {
    pub fn new() -> Self {
        Self { fields: Vec::new() }
    }

    /// Add a default field definition.
    pub fn field(mut self, def: FieldDef) -> Self {
        self.fields.push(def);
        self
    }

    /// Access the field definitions.
    pub fn fields(&self) -> &[FieldDef] {
        &self.fields
    }
}

impl Default for FieldDefaults {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for `FieldsContext`. Created by `FieldsContext::builder()`.
pub struct FieldsContextBuilder {
    defaults: Option<FieldDefaults>,
}

impl FieldsContextBuilder {
    /// Provide default field definitions, seeded in the order given.
    pub fn with_defaults(mut self, defaults: FieldDefaults) -> Self {
        self.defaults = Some(defaults);
        self
    }

    /// Build the context, checking the defaults against the registry invariants.
    pub fn build(self) -> Result<FieldsContext> {
        let mut ctx = FieldsContext {
            fields: Vec::new(),
            name_index: HashMap::new(),
            id_index: HashMap::new(),
        };

        if let Some(defaults) = self.defaults {
            for def in defaults.fields {
                ctx.check_type(&def.type_)?;
                if ctx.name_index.contains_key(&def.name) {
                    return Err(FieldsError::DuplicateFieldName { name: def.name });
                }
                if ctx.id_index.contains_key(&def.id) {
                    return Err(FieldsError::invalid(format!(
                        "duplicate field id {} for '{}'",
                        def.id, def.name
                    )));
                }
                ctx.push(def);
            }
        }

        debug!(fields = ctx.fields.len(), "fields context opened");
        Ok(ctx)
    }
}

/// The session's field registry.
///
/// Fields keep insertion order. Lookups by name and id go through indexes
/// that are rebuilt whenever positions shift.
#[derive(Debug, Clone)]
pub struct FieldsContext {
    fields: Vec<FieldDef>,
    name_index: HashMap<String, usize>,
    id_index: HashMap<u64, usize>,
}

impl FieldsContext {
    /// Start building a context.
    ///
    /// ```rust,ignore
    /// let ctx = FieldsContext::builder()
    ///     .with_defaults(product_defaults()?)
    ///     .build()?;
    /// ```
    pub fn builder() -> FieldsContextBuilder {
        FieldsContextBuilder { defaults: None }
    }

    /// All field definitions, in insertion order.
    pub fn list(&self) -> &[FieldDef] {
        &self.fields
    }

    /// Get a field definition by name.
    pub fn get_field_by_name(&self, name: &str) -> Option<&FieldDef> {
        self.name_index.get(name).map(|&i| &self.fields[i])
    }

    /// Get a field definition by id.
    pub fn get_field_by_id(&self, id: u64) -> Option<&FieldDef> {
        self.id_index.get(&id).map(|&i| &self.fields[i])
    }

    /// Add a custom field. The new field gets `max(id) + 1` and is never a default.
    pub fn add(&mut self, draft: FieldDraft) -> Result<FieldDef> {
        let name = draft.name.trim().to_string();
        let label = draft.label.trim().to_string();

        if name.is_empty() {
            return Err(FieldsError::invalid("field name cannot be empty"));
        }
        if label.is_empty() {
            return Err(FieldsError::invalid("field label cannot be empty"));
        }
        self.check_name_available(&name, None)?;
        self.check_type(&draft.type_)?;

        let def = FieldDef {
            id: self.next_id(),
            name,
            label,
            type_: draft.type_,
            required: draft.required,
            is_default: false,
        };
        self.push(def.clone());

        info!(id = def.id, name = %def.name, kind = %def.type_, "field added");
        Ok(def)
    }

    /// Apply a partial update to the field with the given id.
    pub fn update(&mut self, id: u64, patch: FieldPatch) -> Result<FieldDef> {
        let idx = self.index_of(id)?;
        let current = &self.fields[idx];

        let renamed = patch
            .name
            .as_deref()
            .map(str::trim)
            .filter(|n| *n != current.name);
        let retyped = patch.type_.as_ref().filter(|t| **t != current.type_);

        if renamed.is_some() && (current.is_protected() || current.is_default) {
            return Err(FieldsError::immutable(&current.name, FieldAction::Renamed));
        }
        if retyped.is_some_and(|t| !t.same_kind(&current.type_))
            && (current.is_protected() || current.is_default)
        {
            return Err(FieldsError::immutable(&current.name, FieldAction::Retyped));
        }

        let mut updated = current.clone();
        if let Some(name) = renamed {
            if name.is_empty() {
                return Err(FieldsError::invalid("field name cannot be empty"));
            }
            self.check_name_available(name, Some(id))?;
            updated.name = name.to_string();
        }
        if let Some(label) = patch.label.as_deref().map(str::trim) {
            if label.is_empty() {
                return Err(FieldsError::invalid("field label cannot be empty"));
            }
            updated.label = label.to_string();
        }
        if let Some(type_) = retyped {
            self.check_type(type_)?;
            updated.type_ = type_.clone();
        }
        if let Some(required) = patch.required {
            updated.required = required;
        }

        if updated.name != self.fields[idx].name {
            self.name_index.remove(&self.fields[idx].name);
            self.name_index.insert(updated.name.clone(), idx);
        }
        self.fields[idx] = updated.clone();

        info!(id, name = %updated.name, "field updated");
        Ok(updated)
    }

    /// Remove the field with the given id. Existing records keep their stored value.
    pub fn remove(&mut self, id: u64) -> Result<()> {
        let idx = self.index_of(id)?;
        if self.fields[idx].is_protected() {
            return Err(FieldsError::immutable(
                &self.fields[idx].name,
                FieldAction::Removed,
            ));
        }

        let removed = self.fields.remove(idx);
        self.reindex();

        info!(id, name = %removed.name, "field removed");
        Ok(())
    }

    // --- Internal ---

    fn push(&mut self, def: FieldDef) {
        let idx = self.fields.len();
        self.name_index.insert(def.name.clone(), idx);
        self.id_index.insert(def.id, idx);
        self.fields.push(def);
    }

    fn reindex(&mut self) {
        self.name_index.clear();
        self.id_index.clear();
        for (idx, def) in self.fields.iter().enumerate() {
            self.name_index.insert(def.name.clone(), idx);
            self.id_index.insert(def.id, idx);
        }
    }

    fn next_id(&self) -> u64 {
        self.fields.iter().map(|f| f.id).max().unwrap_or(0) + 1
    }

    fn index_of(&self, id: u64) -> Result<usize> {
        self.id_index
            .get(&id)
            .copied()
            .ok_or(FieldsError::FieldNotFound { id })
    }

    fn check_name_available(&self, name: &str, except: Option<u64>) -> Result<()> {
        if SYSTEM_FIELDS.contains(&name) {
            return Err(FieldsError::invalid(format!(
                "'{name}' is reserved for the record itself"
            )));
        }
        match self.get_field_by_name(name) {
            Some(existing) if Some(existing.id) != except => {
                Err(FieldsError::DuplicateFieldName {
                    name: name.to_string(),
                })
            }
            _ => Ok(()),
        }
    }

    fn check_type(&self, type_: &FieldType) -> Result<()> {
        if let FieldType::Select { options } = type_ {
            if options.is_empty() {
                return Err(FieldsError::invalid("select fields need at least one option"));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::defaults::product_defaults;

    fn defaults_ctx() -> FieldsContext {
        FieldsContext::builder()
            .with_defaults(product_defaults().unwrap())
            .build()
            .unwrap()
    }

    fn peso() -> FieldDraft {
        FieldDraft::new("peso", "Peso", FieldType::Number)
    }

    fn title_id(ctx: &FieldsContext) -> u64 {
        ctx.get_field_by_name("title").unwrap().id
    }

    #[test]
    fn build_without_defaults_is_empty() {
        let ctx = FieldsContext::builder().build().unwrap();
        assert!(ctx.list().is_empty());
    }

    #[test]
    fn build_seeds_defaults_in_order() {
        let ctx = defaults_ctx();
        assert_eq!(ctx.list().len(), 10);
        assert_eq!(ctx.list()[0].name, "title");
        assert_eq!(ctx.list()[9].name, "observations");
    }

    #[test]
    fn build_rejects_duplicate_default_names() {
        let def = FieldDef {
            id: 1,
            name: "title".into(),
            label: "Title".into(),
            type_: FieldType::Text,
            required: true,
            is_default: true,
        };
        let mut again = def.clone();
        again.id = 2;
        let result = FieldsContext::builder()
            .with_defaults(FieldDefaults::new().field(def).field(again))
            .build();
        assert!(matches!(result, Err(FieldsError::DuplicateFieldName { .. })));
    }

    #[test]
    fn add_assigns_next_id() {
        let mut ctx = defaults_ctx();
        let def = ctx.add(peso()).unwrap();
        assert_eq!(def.id, 11);
        assert!(!def.is_default);
        assert_eq!(ctx.list().last().unwrap().name, "peso");
        assert_eq!(ctx.get_field_by_id(11).unwrap().name, "peso");
    }

    #[test]
    fn add_to_empty_context_starts_at_one() {
        let mut ctx = FieldsContext::builder().build().unwrap();
        assert_eq!(ctx.add(peso()).unwrap().id, 1);
    }

    #[test]
    fn add_rejects_empty_name_or_label() {
        let mut ctx = defaults_ctx();
        let err = ctx
            .add(FieldDraft::new("  ", "Peso", FieldType::Number))
            .unwrap_err();
        assert!(err.is_validation());
        let err = ctx.add(FieldDraft::new("peso", "", FieldType::Number)).unwrap_err();
        assert!(err.is_validation());
        assert_eq!(ctx.list().len(), 10);
    }

    #[test]
    fn add_rejects_duplicate_name() {
        let mut ctx = defaults_ctx();
        let before = ctx.list().to_vec();
        let err = ctx
            .add(FieldDraft::new("manufacturer", "Maker", FieldType::Text))
            .unwrap_err();
        assert!(matches!(
            err,
            FieldsError::DuplicateFieldName { ref name } if name == "manufacturer"
        ));
        assert_eq!(ctx.list(), before.as_slice());
    }

    #[test]
    fn names_are_case_sensitive() {
        let mut ctx = defaults_ctx();
        assert!(ctx.add(FieldDraft::new("Title", "Alt title", FieldType::Text)).is_ok());
    }

    #[test]
    fn add_rejects_select_without_options() {
        let mut ctx = defaults_ctx();
        let err = ctx
            .add(FieldDraft::new(
                "grade",
                "Grade",
                FieldType::Select { options: vec![] },
            ))
            .unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn add_rejects_system_names() {
        let mut ctx = defaults_ctx();
        assert!(ctx.add(FieldDraft::new("id", "Id", FieldType::Number)).is_err());
        assert!(ctx.add(FieldDraft::new("createdAt", "Created", FieldType::Date)).is_err());
    }

    #[test]
    fn update_title_label_and_required() {
        let mut ctx = defaults_ctx();
        let id = title_id(&ctx);
        let def = ctx
            .update(id, FieldPatch::new().with_label("Nome").with_required(true))
            .unwrap();
        assert_eq!(def.label, "Nome");
        assert_eq!(def.name, "title");
    }

    #[test]
    fn update_title_name_or_type_is_immutable() {
        let mut ctx = defaults_ctx();
        let id = title_id(&ctx);
        let err = ctx.update(id, FieldPatch::new().with_name("name")).unwrap_err();
        assert!(matches!(
            err,
            FieldsError::ImmutableField {
                action: FieldAction::Renamed,
                ..
            }
        ));
        let err = ctx
            .update(id, FieldPatch::new().with_type(FieldType::Textarea))
            .unwrap_err();
        assert!(matches!(
            err,
            FieldsError::ImmutableField {
                action: FieldAction::Retyped,
                ..
            }
        ));
        assert_eq!(ctx.get_field_by_id(id).unwrap().type_, FieldType::Text);
    }

    #[test]
    fn update_with_unchanged_name_is_allowed_on_title() {
        let mut ctx = defaults_ctx();
        let id = title_id(&ctx);
        assert!(ctx
            .update(id, FieldPatch::new().with_name("title").with_label("Título"))
            .is_ok());
    }

    #[test]
    fn builtin_names_are_immutable() {
        let mut ctx = defaults_ctx();
        let id = ctx.get_field_by_name("location").unwrap().id;
        let err = ctx.update(id, FieldPatch::new().with_name("place")).unwrap_err();
        assert!(matches!(err, FieldsError::ImmutableField { .. }));
    }

    #[test]
    fn builtin_select_options_can_change() {
        let mut ctx = defaults_ctx();
        let id = ctx.get_field_by_name("type").unwrap().id;
        let def = ctx
            .update(
                id,
                FieldPatch::new().with_type(FieldType::Select {
                    options: vec!["Alimento".into(), "Pet".into()],
                }),
            )
            .unwrap();
        assert_eq!(def.type_.options(), ["Alimento", "Pet"]);
        assert!(def.is_default);
        assert_eq!(ctx.get_field_by_id(id).unwrap().editor(), crate::types::Editor::Select);
    }

    #[test]
    fn builtin_types_are_immutable() {
        let mut ctx = defaults_ctx();
        let id = ctx.get_field_by_name("macro").unwrap().id;
        let err = ctx
            .update(id, FieldPatch::new().with_type(FieldType::Date))
            .unwrap_err();
        assert!(matches!(
            err,
            FieldsError::ImmutableField {
                action: FieldAction::Retyped,
                ..
            }
        ));
        assert_eq!(ctx.get_field_by_id(id).unwrap().type_, FieldType::Number);

        let type_id = ctx.get_field_by_name("type").unwrap().id;
        assert!(ctx
            .update(type_id, FieldPatch::new().with_type(FieldType::Text))
            .is_err());
    }

    #[test]
    fn retype_custom_field() {
        let mut ctx = defaults_ctx();
        let id = ctx.add(peso()).unwrap().id;
        let def = ctx
            .update(id, FieldPatch::new().with_type(FieldType::Text))
            .unwrap();
        assert_eq!(def.type_, FieldType::Text);
    }

    #[test]
    fn rename_custom_field() {
        let mut ctx = defaults_ctx();
        let id = ctx.add(peso()).unwrap().id;
        ctx.update(id, FieldPatch::new().with_name("weight")).unwrap();
        assert!(ctx.get_field_by_name("peso").is_none());
        assert_eq!(ctx.get_field_by_name("weight").unwrap().id, id);
    }

    #[test]
    fn rename_into_existing_name_fails() {
        let mut ctx = defaults_ctx();
        let id = ctx.add(peso()).unwrap().id;
        let err = ctx.update(id, FieldPatch::new().with_name("macro")).unwrap_err();
        assert!(err.is_validation());
        assert_eq!(ctx.get_field_by_id(id).unwrap().name, "peso");
    }

    #[test]
    fn retype_to_select_requires_options() {
        let mut ctx = defaults_ctx();
        let id = ctx.add(peso()).unwrap().id;
        let err = ctx
            .update(
                id,
                FieldPatch::new().with_type(FieldType::Select { options: vec![] }),
            )
            .unwrap_err();
        assert!(err.is_validation());
        assert_eq!(ctx.get_field_by_id(id).unwrap().type_, FieldType::Number);
    }

    #[test]
    fn update_unknown_id_is_not_found() {
        let mut ctx = defaults_ctx();
        let err = ctx.update(999, FieldPatch::new().with_label("x")).unwrap_err();
        assert!(matches!(err, FieldsError::FieldNotFound { id: 999 }));
    }

    #[test_log::test]
    fn remove_custom_field() {
        let mut ctx = defaults_ctx();
        let id = ctx.add(peso()).unwrap().id;
        ctx.remove(id).unwrap();
        assert!(ctx.get_field_by_name("peso").is_none());
        assert!(ctx.get_field_by_name("title").is_some());
        assert_eq!(ctx.list().len(), 10);
    }

    #[test]
    fn remove_middle_field_keeps_order_and_indexes() {
        let mut ctx = defaults_ctx();
        let id = ctx.get_field_by_name("seals").unwrap().id;
        ctx.remove(id).unwrap();
        let names: Vec<_> = ctx.list().iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names[5], "variation");
        for (i, f) in ctx.list().iter().enumerate() {
            assert_eq!(ctx.get_field_by_id(f.id), Some(&ctx.list()[i]));
        }
    }

    #[test]
    fn remove_title_is_rejected() {
        let mut ctx = defaults_ctx();
        let id = title_id(&ctx);
        let err = ctx.remove(id).unwrap_err();
        assert!(matches!(
            err,
            FieldsError::ImmutableField {
                action: FieldAction::Removed,
                ..
            }
        ));
        assert!(ctx.get_field_by_name("title").is_some());
    }

    #[test]
    fn remove_unknown_id_is_not_found() {
        let mut ctx = defaults_ctx();
        assert!(matches!(
            ctx.remove(42),
            Err(FieldsError::FieldNotFound { id: 42 })
        ));
    }

    #[test]
    fn ids_keep_growing_after_remove() {
        let mut ctx = defaults_ctx();
        let id = ctx.add(peso()).unwrap().id;
        let other = ctx
            .add(FieldDraft::new("lote", "Lote", FieldType::Text))
            .unwrap()
            .id;
        ctx.remove(id).unwrap();
        let next = ctx
            .add(FieldDraft::new("validade", "Validade", FieldType::Date))
            .unwrap();
        assert_eq!(next.id, other + 1);
    }
}
