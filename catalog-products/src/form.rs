//! Create/edit form drafts
//!
//! A [`ProductForm`] holds what the operator has typed and the image
//! previews they picked. The draft survives every failed submit, so input is
//! never lost to a validation or repository error.

use std::sync::Arc;

use catalog_fields::{FieldViolation, RawRecord};
use serde_json::Value;
use tracing::debug;

use crate::catalog::ProductCatalog;
use crate::error::{CatalogError, Result};
use crate::images::{ImageFile, ImageSlots, ImageUploader, PreviewHandle};
use crate::types::{ImageSlot, ProductId, ProductImage, ProductInput, ProductRecord};

/// Whether submitting creates a new product or updates an existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormMode {
    Create,
    Edit(ProductId),
}

#[derive(Debug)]
pub struct ProductForm {
    mode: FormMode,
    values: RawRecord,
    /// Values the edit form was opened with; only changes from these are sent.
    prefill: RawRecord,
    stored_images: Vec<ProductImage>,
    images: ImageSlots,
    violations: Vec<FieldViolation>,
    notice: Option<String>,
    saved: bool,
}

impl ProductForm {
    /// Empty form for a new product.
    pub fn create(uploader: Arc<dyn ImageUploader>) -> Self {
        Self {
            mode: FormMode::Create,
            values: RawRecord::new(),
            prefill: RawRecord::new(),
            stored_images: Vec::new(),
            images: ImageSlots::new(uploader),
            violations: Vec::new(),
            notice: None,
            saved: false,
        }
    }

    /// Form prefilled from a stored product.
    pub fn edit(record: &ProductRecord, uploader: Arc<dyn ImageUploader>) -> Self {
        Self {
            mode: FormMode::Edit(record.id),
            values: record.to_raw(),
            prefill: record.to_raw(),
            stored_images: record.images.clone(),
            images: ImageSlots::new(uploader),
            violations: Vec::new(),
            notice: None,
            saved: false,
        }
    }

    pub fn mode(&self) -> FormMode {
        self.mode
    }

    pub fn set(&mut self, field: impl Into<String>, value: impl Into<Value>) {
        let field = field.into();
        self.saved = false;
        self.violations.retain(|v| v.field != field);
        self.values.insert(field, value.into());
    }

    pub fn value(&self, field: &str) -> Option<&Value> {
        self.values.get(field)
    }

    pub fn values(&self) -> &RawRecord {
        &self.values
    }

    pub async fn attach_image(
        &mut self,
        slot: ImageSlot,
        file: ImageFile,
    ) -> Result<&PreviewHandle> {
        self.images.attach(slot, file).await
    }

    pub fn remove_image(&mut self, slot: ImageSlot) -> bool {
        self.images.remove(slot)
    }

    pub fn preview(&self, slot: ImageSlot) -> Option<&PreviewHandle> {
        self.images.get(slot)
    }

    /// Violations from the last submit.
    pub fn violations(&self) -> &[FieldViolation] {
        &self.violations
    }

    pub fn violation_for(&self, field: &str) -> Option<&FieldViolation> {
        self.violations.iter().find(|v| v.field == field)
    }

    /// Form-level failure message from the last submit, if it was not a
    /// validation failure.
    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    /// Whether the last submit succeeded and nothing was typed since.
    pub fn saved(&self) -> bool {
        self.saved
    }

    /// Values to send. An edit sends only what differs from the prefill.
    fn submitted_values(&self) -> RawRecord {
        match self.mode {
            FormMode::Create => self.values.clone(),
            FormMode::Edit(_) => self
                .values
                .iter()
                .filter(|(name, value)| self.prefill.get(name.as_str()) != Some(*value))
                .map(|(name, value)| (name.clone(), value.clone()))
                .collect(),
        }
    }

    /// Images to send: stored ones, with newly picked previews taking over
    /// their slots. `None` in edit mode when nothing new was picked.
    fn submitted_images(&self) -> Option<Vec<ProductImage>> {
        let picked = self.images.images();
        match self.mode {
            FormMode::Create => Some(picked),
            FormMode::Edit(_) if picked.is_empty() => None,
            FormMode::Edit(_) => {
                let mut images: Vec<_> = self
                    .stored_images
                    .iter()
                    .filter(|stored| !picked.iter().any(|p| p.slot == stored.slot))
                    .cloned()
                    .collect();
                images.extend(picked);
                images.sort_by_key(|i| i.slot);
                Some(images)
            }
        }
    }

    /// Submit through `catalog`.
    ///
    /// A successful create resets the form. A successful edit keeps it. Any
    /// failure keeps the draft and records violations or a notice.
    pub async fn submit(&mut self, catalog: &ProductCatalog) -> Result<ProductRecord> {
        let input = ProductInput {
            values: self.submitted_values(),
            images: self.submitted_images(),
        };
        let result = match self.mode {
            FormMode::Create => catalog.create(input).await,
            FormMode::Edit(id) => catalog.update(id, input).await,
        };

        match result {
            Ok(record) => {
                self.violations.clear();
                self.notice = None;
                match self.mode {
                    FormMode::Create => self.clear(),
                    FormMode::Edit(_) => {
                        self.prefill = record.to_raw();
                        self.stored_images = record.images.clone();
                    }
                }
                self.saved = true;
                Ok(record)
            }
            Err(e) => {
                self.saved = false;
                match &e {
                    CatalogError::Validation { violations } => {
                        self.violations = violations.clone();
                        self.notice = None;
                    }
                    other => {
                        self.violations.clear();
                        self.notice = Some(other.to_string());
                    }
                }
                debug!(mode = ?self.mode, error = %e, "submit failed; draft kept");
                Err(e)
            }
        }
    }

    /// Reset the draft and release every preview.
    pub fn clear(&mut self) {
        self.values.clear();
        self.violations.clear();
        self.notice = None;
        self.saved = false;
        self.images.release_all();
    }

    /// Abandon the form, releasing every preview still held.
    pub fn cancel(mut self) {
        self.images.release_all();
    }
}
