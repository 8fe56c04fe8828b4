//! Filtering and pagination over a cached product list

use serde::{Deserialize, Serialize};

use crate::types::ProductRecord;

/// Default number of products per page.
pub const DEFAULT_PAGE_SIZE: usize = 5;

/// Search text plus exact-match attribute filters. Empty criteria match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductQuery {
    /// Case-insensitive substring of title or manufacturer
    pub search: Option<String>,
    pub product_type: Option<String>,
    pub manufacturer: Option<String>,
    pub location: Option<String>,
}

impl ProductQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn search(mut self, text: impl Into<String>) -> Self {
        self.search = Some(text.into());
        self
    }

    pub fn product_type(mut self, value: impl Into<String>) -> Self {
        self.product_type = Some(value.into());
        self
    }

    pub fn manufacturer(mut self, value: impl Into<String>) -> Self {
        self.manufacturer = Some(value.into());
        self
    }

    pub fn location(mut self, value: impl Into<String>) -> Self {
        self.location = Some(value.into());
        self
    }

    pub fn matches(&self, product: &ProductRecord) -> bool {
        self.matches_search(product)
            && exact(product, "type", self.product_type.as_deref())
            && exact(product, "manufacturer", self.manufacturer.as_deref())
            && exact(product, "location", self.location.as_deref())
    }

    fn matches_search(&self, product: &ProductRecord) -> bool {
        let Some(needle) = self
            .search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
        else {
            return true;
        };
        let needle = needle.to_lowercase();
        ["title", "manufacturer"].iter().any(|field| {
            product
                .text(field)
                .is_some_and(|text| text.to_lowercase().contains(&needle))
        })
    }

    /// The matching products, in their original order.
    pub fn apply<'a>(&self, products: &'a [ProductRecord]) -> Vec<&'a ProductRecord> {
        products.iter().filter(|p| self.matches(p)).collect()
    }
}

fn exact(product: &ProductRecord, field: &str, wanted: Option<&str>) -> bool {
    match wanted.filter(|w| !w.is_empty()) {
        None => true,
        Some(wanted) => product.text(field).as_deref() == Some(wanted),
    }
}

/// One page of results.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// 1-based, clamped into `1..=total_pages`
    pub page: usize,
    pub total_pages: usize,
    pub total_items: usize,
    pub page_size: usize,
}

impl<T> Page<T> {
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }

    pub fn has_previous(&self) -> bool {
        self.page > 1
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            page: self.page,
            total_pages: self.total_pages,
            total_items: self.total_items,
            page_size: self.page_size,
        }
    }
}

/// Slice `items` into the requested page. An empty list has one empty page.
pub fn paginate<T>(items: Vec<T>, page: usize, page_size: usize) -> Page<T> {
    let page_size = page_size.max(1);
    let total_items = items.len();
    let total_pages = total_items.div_ceil(page_size).max(1);
    let page = page.clamp(1, total_pages);
    let items = items
        .into_iter()
        .skip((page - 1) * page_size)
        .take(page_size)
        .collect();
    Page {
        items,
        page,
        total_pages,
        total_items,
        page_size,
    }
}
