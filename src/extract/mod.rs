//! Page extraction
//!
//! The crawler core never looks at markup itself. It hands page content to a
//! [`PageExtractor`], which returns the scalar fields of a record or the list
//! of child references on an index page. [`HtmlExtractor`] is the default
//! implementation, driven entirely by the CSS selectors in
//! [`SiteConfig`](crate::config::SiteConfig).

mod html;

pub use html::HtmlExtractor;

use crate::model::{ChildRef, Properties};
use thiserror::Error;
use url::Url;

/// Errors raised when a page does not have the expected structure
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("missing element `{selector}`")]
    MissingElement { selector: String },

    #[error("missing attribute `{attr}` on `{selector}`")]
    MissingAttribute { selector: String, attr: String },

    #[error("invalid {field} value {value:?}")]
    InvalidValue { field: &'static str, value: String },

    #[error("cannot resolve link {href:?}: {source}")]
    BadLink {
        href: String,
        #[source]
        source: url::ParseError,
    },
}

/// Which kind of children an index page lists
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListingKind {
    /// A brand page listing its collections
    Collections,
    /// A collection page listing its products
    Products,
}

impl std::fmt::Display for ListingKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Collections => write!(f, "collections"),
            Self::Products => write!(f, "products"),
        }
    }
}

/// Scalar fields of a brand page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrandFields {
    pub name: String,
    pub country: Option<String>,
    pub site: Option<String>,
    pub description: String,
    pub image_url: String,
}

/// Scalar fields of a collection page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionFields {
    pub description: String,
    pub properties: Properties,
    pub images_url: Vec<String>,
}

/// Scalar fields of a product page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductFields {
    pub description: String,
    pub image_url: String,
    pub properties: Properties,
    pub price: u64,
    pub units: String,
}

/// Site-specific extraction used by the crawler
///
/// `url` is the address the content was fetched from; implementations
/// resolve relative links against it.
pub trait PageExtractor {
    fn brand_fields(&self, content: &str, url: &Url) -> Result<BrandFields, ExtractError>;

    fn collection_fields(&self, content: &str, url: &Url)
        -> Result<CollectionFields, ExtractError>;

    fn product_fields(&self, content: &str, url: &Url) -> Result<ProductFields, ExtractError>;

    /// Child references on one index page, in document order
    ///
    /// Entries the site marks as archived are returned with
    /// `available == false` rather than omitted, so the caller decides.
    fn references(
        &self,
        content: &str,
        url: &Url,
        kind: ListingKind,
    ) -> Result<Vec<ChildRef>, ExtractError>;
}
