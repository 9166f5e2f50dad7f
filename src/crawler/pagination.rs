//! Index page discovery
//!
//! A listing advertises its page count through a pager control on page 1.
//! The resolver reads the highest page number from it and builds the
//! addresses of every index page, so the coordinator can fetch pages 2..N in
//! a single concurrent pass.

use crate::ConfigError;
use scraper::{Html, Selector};
use url::Url;

/// Builds index page addresses from the pager on the first page
#[derive(Debug)]
pub struct PaginationResolver {
    pager_links: Selector,
    page_param: String,
}

impl PaginationResolver {
    /// # Arguments
    ///
    /// * `pager_links` - Selector matching the numbered pager links
    /// * `page_param` - Query parameter carrying the page number
    pub fn new(pager_links: &str, page_param: &str) -> Result<Self, ConfigError> {
        let pager_links = Selector::parse(pager_links)
            .map_err(|e| ConfigError::InvalidSelector(format!("pager-links = '{pager_links}': {e}")))?;
        Ok(Self {
            pager_links,
            page_param: page_param.to_string(),
        })
    }

    /// Highest page number advertised by the pager
    ///
    /// A missing pager, or one without any numeric link, means the listing
    /// has a single page.
    pub fn page_count(&self, first_page: &str) -> u32 {
        let document = Html::parse_document(first_page);
        document
            .select(&self.pager_links)
            .filter_map(|link| link.text().collect::<String>().trim().parse::<u32>().ok())
            .max()
            .unwrap_or(1)
            .max(1)
    }

    /// Every index page of the listing, in page order
    ///
    /// The first element is always `base` itself; pages 2..N carry the page
    /// parameter appended to the base query.
    ///
    /// # Example
    ///
    /// ```
    /// use catalog_harvest::crawler::PaginationResolver;
    /// use url::Url;
    ///
    /// let resolver = PaginationResolver::new("a.pager__link", "p").unwrap();
    /// let html = r#"<a class="pager__link">1</a><a class="pager__link">3</a>"#;
    /// let base = Url::parse("https://example.com/brands/ragno/").unwrap();
    ///
    /// let pages = resolver.resolve_index_addresses(html, &base);
    /// assert_eq!(pages.len(), 3);
    /// assert_eq!(pages[2].as_str(), "https://example.com/brands/ragno/?p=3");
    /// ```
    pub fn resolve_index_addresses(&self, first_page: &str, base: &Url) -> Vec<Url> {
        let count = self.page_count(first_page);
        let mut pages = Vec::with_capacity(count as usize);
        pages.push(base.clone());
        pages.extend((2..=count).map(|n| self.page_url(base, n)));
        pages
    }

    fn page_url(&self, base: &Url, page: u32) -> Url {
        let mut url = base.clone();
        url.query_pairs_mut()
            .append_pair(&self.page_param, &page.to_string());
        url
    }
}
