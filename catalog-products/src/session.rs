//! One operator session: field registry, catalog and uploader wired together

use std::sync::Arc;

use catalog_fields::{product_defaults, FieldDef, FieldDraft, FieldPatch, FieldsContext};
use tokio::sync::RwLock;
use tracing::info;

use crate::catalog::ProductCatalog;
use crate::config::CatalogConfig;
use crate::error::Result;
use crate::form::ProductForm;
use crate::images::{ImageUploader, InMemoryImageUploader};
use crate::repository::{InMemoryProductRepository, ProductRepository};
use crate::store::{ProductStore, SharedFields};
use crate::types::ProductId;

/// Everything a session needs, created at session start and dropped at its end.
///
/// Field edits made here are seen by the next product write; nothing is
/// shared between sessions.
pub struct CatalogSession {
    config: CatalogConfig,
    fields: SharedFields,
    catalog: ProductCatalog,
    uploader: Arc<dyn ImageUploader>,
}

impl CatalogSession {
    /// Build a session over the given collaborators and load the product list.
    pub async fn open(
        config: CatalogConfig,
        repository: Arc<dyn ProductRepository>,
        uploader: Arc<dyn ImageUploader>,
    ) -> Result<Self> {
        config.validate()?;

        let mut builder = FieldsContext::builder();
        if config.builtin_fields {
            builder = builder.with_defaults(product_defaults()?);
        }
        let fields: SharedFields = Arc::new(RwLock::new(builder.build()?));

        let store = ProductStore::new(repository, fields.clone());
        let catalog = ProductCatalog::with_page_size(store, config.page_size);
        catalog.refresh().await?;

        info!(
            page_size = config.page_size,
            products = catalog.products().await.len(),
            "catalog session opened"
        );
        Ok(Self {
            config,
            fields,
            catalog,
            uploader,
        })
    }

    /// Session over the in-memory repository and uploader.
    pub async fn in_memory(config: CatalogConfig) -> Result<Self> {
        let repository = if config.seed_sample_products {
            InMemoryProductRepository::with_sample_data()
        } else {
            InMemoryProductRepository::new()
        };
        Self::open(
            config,
            Arc::new(repository),
            Arc::new(InMemoryImageUploader::new()),
        )
        .await
    }

    pub fn config(&self) -> &CatalogConfig {
        &self.config
    }

    pub fn catalog(&self) -> &ProductCatalog {
        &self.catalog
    }

    pub fn fields(&self) -> &SharedFields {
        &self.fields
    }

    pub fn uploader(&self) -> &Arc<dyn ImageUploader> {
        &self.uploader
    }

    pub async fn list_fields(&self) -> Vec<FieldDef> {
        self.fields.read().await.list().to_vec()
    }

    pub async fn add_field(&self, draft: FieldDraft) -> Result<FieldDef> {
        Ok(self.fields.write().await.add(draft)?)
    }

    pub async fn update_field(&self, id: u64, patch: FieldPatch) -> Result<FieldDef> {
        Ok(self.fields.write().await.update(id, patch)?)
    }

    pub async fn remove_field(&self, id: u64) -> Result<()> {
        Ok(self.fields.write().await.remove(id)?)
    }

    pub fn new_product_form(&self) -> ProductForm {
        ProductForm::create(self.uploader.clone())
    }

    pub async fn edit_product_form(&self, id: ProductId) -> Result<ProductForm> {
        let record = self.catalog.get(id).await?;
        Ok(ProductForm::edit(&record, self.uploader.clone()))
    }
}

impl std::fmt::Debug for CatalogSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatalogSession")
            .field("config", &self.config)
            .field("catalog", &self.catalog)
            .finish_non_exhaustive()
    }
}
