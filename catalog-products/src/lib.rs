//! Schema-validated product catalog
//!
//! Builds on `catalog-fields` to give presentation code one surface for
//! product records:
//!
//! - [`ProductRepository`]: the CRUD backend, with an in-memory implementation
//! - [`ProductStore`]: validates every write against the live field schema
//! - [`ProductCatalog`]: cached list with loading/error state, filtering and paging
//! - [`ProductForm`] and [`ImageSlots`]: form drafts and preview handle lifecycle
//! - [`CatalogSession`]: wires the above together for one operator session

pub mod catalog;
pub mod config;
pub mod error;
pub mod form;
pub mod images;
pub mod query;
pub mod repository;
pub mod session;
pub mod store;
pub mod types;

pub use catalog::{CatalogState, ProductCatalog, LOAD_ERROR_MESSAGE};
pub use config::{CatalogConfig, ENV_PREFIX};
pub use error::{CatalogError, ConfigError, Result};
pub use form::{FormMode, ProductForm};
pub use images::{ImageFile, ImageSlots, ImageUploader, InMemoryImageUploader, PreviewHandle};
pub use query::{paginate, Page, ProductQuery, DEFAULT_PAGE_SIZE};
pub use repository::{
    InMemoryProductRepository, ProductRepository, RepositoryError, RepositoryResult,
};
pub use session::CatalogSession;
pub use store::{ProductStore, SharedFields};
pub use types::{
    ImageSlot, NewProduct, ProductId, ProductImage, ProductInput, ProductPatch, ProductRecord,
};
