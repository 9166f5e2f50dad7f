//! Catalog records produced by a crawl
//!
//! Records are built bottom-up: a [`Product`] only exists once its own page
//! has been parsed, a [`Collection`] once all of its products have been
//! gathered, and a [`Brand`] once all of its collections have.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use url::Url;

/// Free-form properties scraped from a page (label → value)
///
/// Sorted by key so repeated crawls serialize identically.
pub type Properties = BTreeMap<String, String>;

/// A link to a child page discovered on an index page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChildRef {
    /// Absolute address of the child page
    pub url: Url,

    /// Label shown on the card; seeds the child record's name
    pub label: String,

    /// False for archived or delisted entries that should not be crawled
    pub available: bool,
}

impl ChildRef {
    /// Creates an available reference, collapsing whitespace in the label
    pub fn new(url: Url, label: &str) -> Self {
        Self {
            url,
            label: collapse_whitespace(label),
            available: true,
        }
    }

    /// Marks the reference as unavailable
    pub fn unavailable(mut self) -> Self {
        self.available = false;
        self
    }
}

/// A single product (leaf record)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub url: String,
    pub name: String,
    pub description: String,
    pub image_url: String,
    pub properties: Properties,
    pub price: u64,
    pub units: String,
}

/// A collection of products (branch record)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Collection {
    pub url: String,
    pub name: String,
    pub description: String,
    pub properties: Properties,
    pub images_url: Vec<String>,
    pub products: Vec<Product>,
}

/// A brand and all of its collections (root record)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Brand {
    pub url: String,
    pub name: String,
    pub country: Option<String>,
    pub site: Option<String>,
    pub description: String,
    pub image_url: String,
    pub collections: Vec<Collection>,
}

impl Brand {
    /// Total number of products across all collections
    pub fn product_count(&self) -> usize {
        self.collections.iter().map(|c| c.products.len()).sum()
    }
}

/// Trims and collapses runs of whitespace into single spaces
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
