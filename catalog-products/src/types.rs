//! Core data types for the product catalog

use std::str::FromStr;

use catalog_fields::{FieldValue, RawRecord};
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Repository-assigned product identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(pub u64);

impl std::fmt::Display for ProductId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for ProductId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

/// The semantic role of a product image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageSlot {
    Front,
    Back,
    Additional,
}

impl ImageSlot {
    pub const ALL: [ImageSlot; 3] = [ImageSlot::Front, ImageSlot::Back, ImageSlot::Additional];

    pub fn as_str(&self) -> &'static str {
        match self {
            ImageSlot::Front => "front",
            ImageSlot::Back => "back",
            ImageSlot::Additional => "additional",
        }
    }
}

impl std::fmt::Display for ImageSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ImageSlot {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "front" => Ok(ImageSlot::Front),
            "back" => Ok(ImageSlot::Back),
            "additional" => Ok(ImageSlot::Additional),
            other => Err(format!("unknown image slot: {other}")),
        }
    }
}

/// An image attached to a product: its slot and the uploader's reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductImage {
    pub slot: ImageSlot,
    pub reference: String,
}

/// One catalog entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductRecord {
    pub id: ProductId,
    pub created_at: DateTime<Utc>,
    /// Attribute values keyed by field name.
    pub values: IndexMap<String, FieldValue>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub images: Vec<ProductImage>,
}

impl ProductRecord {
    pub fn value(&self, field: &str) -> Option<&FieldValue> {
        self.values.get(field)
    }

    /// Rendered text of a field, `None` when absent or blank.
    pub fn text(&self, field: &str) -> Option<String> {
        self.values
            .get(field)
            .filter(|v| !v.is_empty())
            .map(ToString::to_string)
    }

    pub fn title(&self) -> Option<String> {
        self.text("title")
    }

    /// The `seals` attribute split into individual seals.
    pub fn seals(&self) -> Vec<String> {
        self.text("seals")
            .map(|s| catalog_fields::parse_options(&s))
            .unwrap_or_default()
    }

    pub fn image(&self, slot: ImageSlot) -> Option<&ProductImage> {
        self.images.iter().find(|i| i.slot == slot)
    }

    /// Raw form of the record, as an edit form starts from.
    pub fn to_raw(&self) -> RawRecord {
        self.values
            .iter()
            .map(|(name, value)| (name.clone(), value.to_json()))
            .collect()
    }
}

/// What callers submit for a create or update: raw values plus images.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductInput {
    pub values: RawRecord,
    /// `None` on update leaves the stored images untouched.
    pub images: Option<Vec<ProductImage>>,
}

impl ProductInput {
    pub fn new(values: RawRecord) -> Self {
        Self {
            values,
            images: None,
        }
    }

    pub fn with_images(mut self, images: Vec<ProductImage>) -> Self {
        self.images = Some(images);
        self
    }
}

impl From<RawRecord> for ProductInput {
    fn from(values: RawRecord) -> Self {
        Self::new(values)
    }
}

/// A validated product handed to the repository for creation.
#[derive(Debug, Clone, PartialEq)]
pub struct NewProduct {
    pub values: IndexMap<String, FieldValue>,
    pub images: Vec<ProductImage>,
}

/// A validated partial update handed to the repository.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ProductPatch {
    pub values: IndexMap<String, FieldValue>,
    pub images: Option<Vec<ProductImage>>,
}

impl ProductPatch {
    /// Apply to a stored record. Only the patched attributes change.
    pub fn apply_to(self, record: &mut ProductRecord) {
        for (name, value) in self.values {
            record.values.insert(name, value);
        }
        if let Some(images) = self.images {
            record.images = images;
        }
    }
}
