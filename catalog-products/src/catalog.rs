//! The catalog facade consumed by presentation code
//!
//! [`ProductCatalog`] keeps a read cache of the product list with a
//! `loading` flag and a last-error message. Every successful mutation
//! refetches the full list. Filtering and paging only read the cache.

use std::sync::atomic::{AtomicUsize, Ordering};

use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::error::Result;
use crate::query::{paginate, Page, ProductQuery, DEFAULT_PAGE_SIZE};
use crate::store::ProductStore;
use crate::types::{ProductId, ProductInput, ProductRecord};

/// Message stored in [`CatalogState::error`] when the list cannot be fetched.
pub const LOAD_ERROR_MESSAGE: &str = "failed to load products";

/// Snapshot of the facade's cached state.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CatalogState {
    pub products: Vec<ProductRecord>,
    pub loading: bool,
    pub error: Option<String>,
}

#[derive(Debug, Default)]
struct Cache {
    products: Vec<ProductRecord>,
    error: Option<String>,
}

/// Marks the catalog as loading for as long as it lives.
struct LoadingGuard<'a>(&'a AtomicUsize);

impl<'a> LoadingGuard<'a> {
    fn enter(counter: &'a AtomicUsize) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self(counter)
    }
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

pub struct ProductCatalog {
    store: ProductStore,
    cache: RwLock<Cache>,
    in_flight: AtomicUsize,
    page_size: usize,
}

impl ProductCatalog {
    /// A catalog with an empty cache. Call [`refresh`](Self::refresh) to load it.
    pub fn new(store: ProductStore) -> Self {
        Self::with_page_size(store, DEFAULT_PAGE_SIZE)
    }

    pub fn with_page_size(store: ProductStore, page_size: usize) -> Self {
        Self {
            store,
            cache: RwLock::new(Cache::default()),
            in_flight: AtomicUsize::new(0),
            page_size: page_size.max(1),
        }
    }

    pub fn store(&self) -> &ProductStore {
        &self.store
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Refetch the product list.
    ///
    /// On failure the previous cache is kept, `error` is set and the
    /// repository error is returned.
    pub async fn refresh(&self) -> Result<()> {
        let _loading = LoadingGuard::enter(&self.in_flight);
        match self.store.list().await {
            Ok(products) => {
                let mut cache = self.cache.write().await;
                debug!(count = products.len(), "product cache refreshed");
                cache.products = products;
                cache.error = None;
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "product refresh failed");
                self.cache.write().await.error = Some(LOAD_ERROR_MESSAGE.to_string());
                Err(e)
            }
        }
    }

    pub async fn products(&self) -> Vec<ProductRecord> {
        self.cache.read().await.products.clone()
    }

    pub fn is_loading(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst) > 0
    }

    pub async fn error(&self) -> Option<String> {
        self.cache.read().await.error.clone()
    }

    pub async fn state(&self) -> CatalogState {
        let cache = self.cache.read().await;
        CatalogState {
            products: cache.products.clone(),
            loading: self.is_loading(),
            error: cache.error.clone(),
        }
    }

    /// Cached products matching `query`.
    pub async fn filter(&self, query: &ProductQuery) -> Vec<ProductRecord> {
        let cache = self.cache.read().await;
        query.apply(&cache.products).into_iter().cloned().collect()
    }

    /// One page of the cached products matching `query`.
    pub async fn search(&self, query: &ProductQuery, page: usize) -> Page<ProductRecord> {
        paginate(self.filter(query).await, page, self.page_size)
    }

    /// One page of the unfiltered cache.
    pub async fn page(&self, page: usize) -> Page<ProductRecord> {
        self.search(&ProductQuery::default(), page).await
    }

    /// Fetch one product from the repository.
    pub async fn get(&self, id: ProductId) -> Result<ProductRecord> {
        let _loading = LoadingGuard::enter(&self.in_flight);
        self.store.get(id).await
    }

    pub async fn create(&self, input: impl Into<ProductInput>) -> Result<ProductRecord> {
        let _loading = LoadingGuard::enter(&self.in_flight);
        let record = self.store.create(input.into()).await?;
        self.resync().await;
        Ok(record)
    }

    pub async fn update(
        &self,
        id: ProductId,
        input: impl Into<ProductInput>,
    ) -> Result<ProductRecord> {
        let _loading = LoadingGuard::enter(&self.in_flight);
        let record = self.store.update(id, input.into()).await?;
        self.resync().await;
        Ok(record)
    }

    pub async fn delete(&self, id: ProductId) -> Result<()> {
        let _loading = LoadingGuard::enter(&self.in_flight);
        self.store.delete(id).await?;
        self.resync().await;
        Ok(())
    }

    /// Refresh after a write. The write already happened, so a failed
    /// refetch is recorded in `error` rather than returned.
    async fn resync(&self) {
        if self.refresh().await.is_err() {
            info!("mutation applied but product list is stale");
        }
    }
}

impl std::fmt::Debug for ProductCatalog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProductCatalog")
            .field("page_size", &self.page_size)
            .field("loading", &self.is_loading())
            .finish_non_exhaustive()
    }
}
