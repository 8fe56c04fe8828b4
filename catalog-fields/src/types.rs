//! Core field types for the fields registry.
//!
//! A [`FieldDef`] describes one named, typed attribute a product may carry.
//! The shape of the attribute lives in [`FieldType`]; select options travel
//! inside the `Select` variant so an options list can never be attached to a
//! field that has no use for it.

use serde::{Deserialize, Serialize};

/// Name of the built-in field that can never be renamed, retyped or removed.
pub const PROTECTED_FIELD: &str = "title";

/// Keys owned by the record itself rather than by the field schema.
pub const SYSTEM_FIELDS: [&str; 2] = ["id", "createdAt"];

/// The type of a field. Determines what shape the value takes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum FieldType {
    /// Single-line free text.
    Text,
    /// Multi-line free text.
    Textarea,
    /// One value out of a fixed list of options.
    Select {
        #[serde(default)]
        options: Vec<String>,
    },
    /// A finite number.
    Number,
    /// A calendar date.
    Date,
}

impl FieldType {
    /// Wire name of the type, as an operator picks it in the settings screen.
    pub fn name(&self) -> &'static str {
        match self {
            FieldType::Text => "text",
            FieldType::Textarea => "textarea",
            FieldType::Select { .. } => "select",
            FieldType::Number => "number",
            FieldType::Date => "date",
        }
    }

    /// Options of a select field; empty for every other type.
    pub fn options(&self) -> &[String] {
        match self {
            FieldType::Select { options } => options,
            _ => &[],
        }
    }

    /// Same variant, ignoring select options.
    pub fn same_kind(&self, other: &FieldType) -> bool {
        std::mem::discriminant(self) == std::mem::discriminant(other)
    }
}

impl std::fmt::Display for FieldType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// How a field value is edited.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum Editor {
    Input,
    TextArea,
    Select,
    Number,
    Date,
}

/// How a field value is displayed.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum Display {
    Text,
    Paragraph,
    Badge,
    Number,
    Date,
}

/// A field definition: the complete schema for a single named attribute.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FieldDef {
    pub id: u64,
    pub name: String,
    pub label: String,
    #[serde(rename = "type")]
    pub type_: FieldType,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub is_default: bool,
}

impl FieldDef {
    /// Editor capability for this field, chosen by its type.
    pub fn editor(&self) -> Editor {
        match &self.type_ {
            FieldType::Text => Editor::Input,
            FieldType::Textarea => Editor::TextArea,
            FieldType::Select { .. } => Editor::Select,
            FieldType::Number => Editor::Number,
            FieldType::Date => Editor::Date,
        }
    }

    /// Display capability for this field, chosen by its type.
    pub fn display(&self) -> Display {
        match &self.type_ {
            FieldType::Text => Display::Text,
            FieldType::Textarea => Display::Paragraph,
            FieldType::Select { .. } => Display::Badge,
            FieldType::Number => Display::Number,
            FieldType::Date => Display::Date,
        }
    }

    /// Whether this is the protected `title` field.
    pub fn is_protected(&self) -> bool {
        self.name == PROTECTED_FIELD
    }
}

/// Input for adding a custom field.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FieldDraft {
    pub name: String,
    pub label: String,
    #[serde(rename = "type")]
    pub type_: FieldType,
    #[serde(default)]
    pub required: bool,
}

impl FieldDraft {
    pub fn new(name: impl Into<String>, label: impl Into<String>, type_: FieldType) -> Self {
        Self {
            name: name.into(),
            label: label.into(),
            type_,
            required: false,
        }
    }

    pub fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }
}

/// Partial update of a field definition. `None` leaves the attribute untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct FieldPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(
        default,
        rename = "type",
        skip_serializing_if = "Option::is_none"
    )]
    pub type_: Option<FieldType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required: Option<bool>,
}

impl FieldPatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_type(mut self, type_: FieldType) -> Self {
        self.type_ = Some(type_);
        self
    }

    pub fn with_required(mut self, required: bool) -> Self {
        self.required = Some(required);
        self
    }
}

/// Split an operator-entered options string (`"A, B, C"`) into trimmed, non-empty options.
pub fn parse_options(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}
