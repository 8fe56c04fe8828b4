//! Repository abstraction and the in-memory session store

use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use catalog_fields::FieldValue;
use chrono::{TimeZone, Utc};
use indexmap::IndexMap;
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::debug;

use crate::types::{NewProduct, ProductId, ProductPatch, ProductRecord};

/// Failure reported by a product repository. The underlying cause is kept.
#[derive(Error, Debug)]
#[error("{message}")]
pub struct RepositoryError {
    message: String,
    #[source]
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl RepositoryError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    pub fn with_source(
        message: impl Into<String>,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        Self {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

pub type RepositoryResult<T> = std::result::Result<T, RepositoryError>;

/// CRUD backend for product records.
///
/// Implementations own persistence. They receive only validated data and
/// must never change a record's `id` or `created_at` after creation.
#[async_trait]
pub trait ProductRepository: Send + Sync {
    /// List all products in storage order
    async fn list(&self) -> RepositoryResult<Vec<ProductRecord>>;

    /// Get a product by id
    async fn get_by_id(&self, id: ProductId) -> RepositoryResult<Option<ProductRecord>>;

    /// Create a product, assigning its id and creation time
    async fn create(&self, product: NewProduct) -> RepositoryResult<ProductRecord>;

    /// Merge a patch into a stored product
    async fn update(
        &self,
        id: ProductId,
        patch: ProductPatch,
    ) -> RepositoryResult<Option<ProductRecord>>;

    /// Delete a product; false when no such id exists
    async fn delete(&self, id: ProductId) -> RepositoryResult<bool>;
}

/// Session-scoped repository keeping products in memory.
#[derive(Debug)]
pub struct InMemoryProductRepository {
    products: RwLock<Vec<ProductRecord>>,
    next_id: AtomicU64,
}

impl InMemoryProductRepository {
    pub fn new() -> Self {
        Self::from_records(Vec::new())
    }

    /// Start from existing records; new ids continue after the largest one.
    pub fn from_records(records: Vec<ProductRecord>) -> Self {
        let next = records.iter().map(|r| r.id.0).max().unwrap_or(0) + 1;
        Self {
            products: RwLock::new(records),
            next_id: AtomicU64::new(next),
        }
    }

    /// Repository seeded with the five demo products.
    pub fn with_sample_data() -> Self {
        Self::from_records(sample_products())
    }
}

impl Default for InMemoryProductRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ProductRepository for InMemoryProductRepository {
    async fn list(&self) -> RepositoryResult<Vec<ProductRecord>> {
        Ok(self.products.read().await.clone())
    }

    async fn get_by_id(&self, id: ProductId) -> RepositoryResult<Option<ProductRecord>> {
        let products = self.products.read().await;
        Ok(products.iter().find(|p| p.id == id).cloned())
    }

    async fn create(&self, product: NewProduct) -> RepositoryResult<ProductRecord> {
        let id = ProductId(self.next_id.fetch_add(1, Ordering::SeqCst));
        let record = ProductRecord {
            id,
            created_at: Utc::now(),
            values: product.values,
            images: product.images,
        };
        self.products.write().await.push(record.clone());
        debug!(%id, "stored product");
        Ok(record)
    }

    async fn update(
        &self,
        id: ProductId,
        patch: ProductPatch,
    ) -> RepositoryResult<Option<ProductRecord>> {
        let mut products = self.products.write().await;
        let Some(record) = products.iter_mut().find(|p| p.id == id) else {
            return Ok(None);
        };
        patch.apply_to(record);
        Ok(Some(record.clone()))
    }

    async fn delete(&self, id: ProductId) -> RepositoryResult<bool> {
        let mut products = self.products.write().await;
        let before = products.len();
        products.retain(|p| p.id != id);
        Ok(products.len() != before)
    }
}

fn sample_products() -> Vec<ProductRecord> {
    const SAMPLES: [(u64, &str, &str, &str, &str, (i32, u32, u32)); 5] = [
        (
            1,
            "Cereal Matinal Integral",
            "Alimento",
            "Nutrifoods",
            "São Paulo",
            (2023, 5, 15),
        ),
        (
            2,
            "Bebida Láctea Fermentada",
            "Bebida",
            "Lacticínios Puro",
            "Minas Gerais",
            (2023, 6, 22),
        ),
        (
            3,
            "Biscoito Integral",
            "Alimento",
            "Nutrifoods",
            "Rio de Janeiro",
            (2023, 7, 10),
        ),
        (
            4,
            "Suco Natural de Laranja",
            "Bebida",
            "Sucos Naturais",
            "Bahia",
            (2023, 8, 5),
        ),
        (
            5,
            "Barra de Cereal",
            "Alimento",
            "Nutrifoods",
            "São Paulo",
            (2023, 9, 18),
        ),
    ];

    SAMPLES
        .iter()
        .map(
            |&(id, title, kind, manufacturer, location, (year, month, day))| {
                let mut values = IndexMap::new();
                values.insert("title".to_string(), FieldValue::Text(title.to_string()));
                values.insert("type".to_string(), FieldValue::Select(kind.to_string()));
                values.insert(
                    "manufacturer".to_string(),
                    FieldValue::Text(manufacturer.to_string()),
                );
                values.insert("location".to_string(), FieldValue::Text(location.to_string()));
                ProductRecord {
                    id: ProductId(id),
                    created_at: Utc
                        .with_ymd_and_hms(year, month, day, 0, 0, 0)
                        .single()
                        .unwrap_or_else(Utc::now),
                    values,
                    images: Vec::new(),
                }
            },
        )
        .collect()
}
