use serde::Deserialize;

/// Main configuration structure for Catalog-Harvest
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Brand pages to crawl, processed one after another
    #[serde(default)]
    pub roots: Vec<String>,

    #[serde(default)]
    pub crawler: CrawlerConfig,

    #[serde(rename = "user-agent", default)]
    pub user_agent: UserAgentConfig,

    #[serde(default)]
    pub output: OutputConfig,

    #[serde(default)]
    pub site: SiteConfig,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", default, deny_unknown_fields)]
pub struct CrawlerConfig {
    /// Maximum number of requests in flight across the whole crawl
    pub max_concurrent_requests: u32,

    /// Retries after the first failed attempt
    pub max_retries: u32,

    /// Backoff unit in milliseconds; the k-th retry waits k units
    pub backoff_unit_ms: u64,

    /// Hard per-request timeout
    pub request_timeout_secs: u64,

    pub connect_timeout_secs: u64,

    /// Query parameter carrying the index page number
    pub page_param: String,

    /// Skip TLS certificate verification
    pub accept_invalid_certs: bool,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            max_concurrent_requests: 5,
            max_retries: 5,
            backoff_unit_ms: 1000,
            request_timeout_secs: 20,
            connect_timeout_secs: 10,
            page_param: "p".to_string(),
            accept_invalid_certs: false,
        }
    }
}

/// User agent rotation configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct UserAgentConfig {
    /// User agent strings to rotate through, one picked per request
    pub pool: Vec<String>,
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            pool: DEFAULT_USER_AGENTS.iter().map(|ua| ua.to_string()).collect(),
        }
    }
}

const DEFAULT_USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/123.0.0.0 Safari/537.36",
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/122.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36",
];

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", default, deny_unknown_fields)]
pub struct OutputConfig {
    /// Directory receiving one JSON document per brand
    pub results_dir: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            results_dir: "./results".to_string(),
        }
    }
}

/// CSS selectors describing the catalog's page layout
///
/// Selectors for `dt`/`dd` pairs (`brand-params`, `params`) name the
/// containing element; the pairs are matched positionally inside it.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", default, deny_unknown_fields)]
pub struct SiteConfig {
    /// Site-wide brand links used to resolve a brand's display name
    pub brand_links: String,
    pub brand_image: String,
    pub brand_params: String,
    pub country_label: String,
    pub site_label: String,

    /// Description paragraph on brand and collection pages
    pub description: String,
    pub product_description: String,

    pub params: String,

    /// Gallery thumbnails carrying the full image in `data-full`
    pub gallery_thumbs: String,
    pub gallery_fallback: String,

    pub pager_links: String,

    pub collection_cards: String,
    pub product_cards: String,
    pub card_title_link: String,

    /// Element that must be present inside a card for it to be crawled
    pub collection_availability: Option<String>,
    pub product_availability: Option<String>,

    pub price: String,
    pub units: String,
    pub product_image: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            brand_links: ".top-vendors a".to_string(),
            brand_image: ".vendor-desc__image img".to_string(),
            brand_params: ".vendor-desc__params".to_string(),
            country_label: "Страна".to_string(),
            site_label: "Официальный сайт".to_string(),
            description: ".article-text p".to_string(),
            product_description: ".static-text p".to_string(),
            params: ".cat-article-params".to_string(),
            gallery_thumbs: ".gallery__thumbs li".to_string(),
            gallery_fallback: ".gallery__port__img img".to_string(),
            pager_links: "a.pager__link".to_string(),
            collection_cards: ".cat-list .cat-card".to_string(),
            product_cards: r#".cat-list .cat-card[itemtype="http://schema.org/Product"]"#
                .to_string(),
            card_title_link: ".cat-card__title-link".to_string(),
            collection_availability: None,
            product_availability: Some(".cat-card__price".to_string()),
            price: ".cat-price__cur".to_string(),
            units: ".cat-price__measure".to_string(),
            product_image: ".cat-article-desc__image img".to_string(),
        }
    }
}

impl SiteConfig {
    /// Every selector in the configuration, paired with its key name
    pub fn selectors(&self) -> Vec<(&'static str, &str)> {
        let mut selectors = vec![
            ("brand-links", self.brand_links.as_str()),
            ("brand-image", self.brand_image.as_str()),
            ("brand-params", self.brand_params.as_str()),
            ("description", self.description.as_str()),
            ("product-description", self.product_description.as_str()),
            ("params", self.params.as_str()),
            ("gallery-thumbs", self.gallery_thumbs.as_str()),
            ("gallery-fallback", self.gallery_fallback.as_str()),
            ("pager-links", self.pager_links.as_str()),
            ("collection-cards", self.collection_cards.as_str()),
            ("product-cards", self.product_cards.as_str()),
            ("card-title-link", self.card_title_link.as_str()),
            ("price", self.price.as_str()),
            ("units", self.units.as_str()),
            ("product-image", self.product_image.as_str()),
        ];
        if let Some(s) = &self.collection_availability {
            selectors.push(("collection-availability", s.as_str()));
        }
        if let Some(s) = &self.product_availability {
            selectors.push(("product-availability", s.as_str()));
        }
        selectors
    }
}
