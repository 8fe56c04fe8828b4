//! Validating adapter between callers and a [`ProductRepository`]

use std::collections::BTreeMap;
use std::sync::Arc;

use catalog_fields::{FieldDef, FieldsContext, ValidationEngine, ValidationMode};
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::error::{CatalogError, Result};
use crate::repository::ProductRepository;
use crate::types::{
    ImageSlot, NewProduct, ProductId, ProductImage, ProductInput, ProductPatch, ProductRecord,
};

/// The field registry shared by every component of one session.
pub type SharedFields = Arc<RwLock<FieldsContext>>;

/// Runs every write through the schema validator before it reaches the
/// repository, and turns missing ids into [`CatalogError::ProductNotFound`].
#[derive(Clone)]
pub struct ProductStore {
    repository: Arc<dyn ProductRepository>,
    fields: SharedFields,
}

impl ProductStore {
    pub fn new(repository: Arc<dyn ProductRepository>, fields: SharedFields) -> Self {
        Self { repository, fields }
    }

    pub fn fields(&self) -> &SharedFields {
        &self.fields
    }

    /// Copy of the live schema. The lock is released before any repository call.
    async fn schema(&self) -> Vec<FieldDef> {
        self.fields.read().await.list().to_vec()
    }

    pub async fn list(&self) -> Result<Vec<ProductRecord>> {
        Ok(self.repository.list().await?)
    }

    pub async fn get(&self, id: ProductId) -> Result<ProductRecord> {
        self.repository
            .get_by_id(id)
            .await?
            .ok_or(CatalogError::ProductNotFound { id })
    }

    pub async fn create(&self, input: ProductInput) -> Result<ProductRecord> {
        let schema = self.schema().await;
        let validated = ValidationEngine::new(&schema)
            .validate(&input.values, ValidationMode::Create)
            .map_err(|violations| CatalogError::Validation { violations })?;

        let record = self
            .repository
            .create(NewProduct {
                values: validated.values,
                images: one_per_slot(input.images.unwrap_or_default()),
            })
            .await?;
        info!(id = %record.id, "created product");
        Ok(record)
    }

    pub async fn update(&self, id: ProductId, input: ProductInput) -> Result<ProductRecord> {
        let schema = self.schema().await;
        let validated = ValidationEngine::new(&schema)
            .validate(&input.values, ValidationMode::Update)
            .map_err(|violations| CatalogError::Validation { violations })?;

        let patch = ProductPatch {
            values: validated.values,
            images: input.images.map(one_per_slot),
        };
        let record = self
            .repository
            .update(id, patch)
            .await?
            .ok_or(CatalogError::ProductNotFound { id })?;
        info!(%id, "updated product");
        Ok(record)
    }

    pub async fn delete(&self, id: ProductId) -> Result<()> {
        if !self.repository.delete(id).await? {
            debug!(%id, "delete of unknown product");
            return Err(CatalogError::ProductNotFound { id });
        }
        info!(%id, "deleted product");
        Ok(())
    }
}

/// Keep one image per slot, the last one given, in slot order.
fn one_per_slot(images: Vec<ProductImage>) -> Vec<ProductImage> {
    let given = images.len();
    let by_slot: BTreeMap<ImageSlot, ProductImage> =
        images.into_iter().map(|image| (image.slot, image)).collect();
    if by_slot.len() != given {
        debug!(given, kept = by_slot.len(), "duplicate image slots collapsed");
    }
    by_slot.into_values().collect()
}

impl std::fmt::Debug for ProductStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProductStore").finish_non_exhaustive()
    }
}
