//! Selector-driven HTML extraction
//!
//! Every selector comes from [`SiteConfig`]; nothing here knows a particular
//! site's class names. Links and image sources are resolved against the page
//! address, descriptions are taken as the inner HTML of their paragraph, and
//! `dt`/`dd` pairs become property maps.

use crate::config::SiteConfig;
use crate::extract::{
    BrandFields, CollectionFields, ExtractError, ListingKind, PageExtractor, ProductFields,
};
use crate::model::{collapse_whitespace, ChildRef, Properties};
use crate::ConfigError;
use scraper::{ElementRef, Html, Selector};
use url::Url;

/// A compiled selector that remembers its source text for error messages
#[derive(Debug)]
struct Rule {
    raw: String,
    selector: Selector,
}

impl Rule {
    fn new(key: &str, raw: &str) -> Result<Self, ConfigError> {
        let selector = Selector::parse(raw)
            .map_err(|e| ConfigError::InvalidSelector(format!("{key} = '{raw}': {e}")))?;
        Ok(Self {
            raw: raw.to_string(),
            selector,
        })
    }

    fn first<'a>(&self, document: &'a Html) -> Option<ElementRef<'a>> {
        document.select(&self.selector).next()
    }

    fn require<'a>(&self, document: &'a Html) -> Result<ElementRef<'a>, ExtractError> {
        self.first(document)
            .ok_or_else(|| ExtractError::MissingElement {
                selector: self.raw.clone(),
            })
    }

    /// Resolved value of `attr` on the first match
    fn require_link(&self, document: &Html, attr: &str, base: &Url) -> Result<String, ExtractError> {
        let element = self.require(document)?;
        let href = element
            .value()
            .attr(attr)
            .ok_or_else(|| ExtractError::MissingAttribute {
                selector: self.raw.clone(),
                attr: attr.to_string(),
            })?;
        resolve(base, href).map(String::from)
    }
}

/// Default [`PageExtractor`] built from [`SiteConfig`] selectors
#[derive(Debug)]
pub struct HtmlExtractor {
    brand_links: Rule,
    brand_image: Rule,
    brand_terms: Rule,
    brand_values: Rule,
    country_label: String,
    site_label: String,
    value_link: Rule,
    description: Rule,
    product_description: Rule,
    param_terms: Rule,
    param_values: Rule,
    gallery_thumbs: Rule,
    gallery_fallback: Rule,
    collection_cards: Rule,
    product_cards: Rule,
    card_title_link: Rule,
    collection_availability: Option<Rule>,
    product_availability: Option<Rule>,
    price: Rule,
    units: Rule,
    product_image: Rule,
}

impl HtmlExtractor {
    /// Compiles every selector in the site configuration
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidSelector`] naming the offending key.
    pub fn new(site: &SiteConfig) -> Result<Self, ConfigError> {
        let optional = |key: &str, raw: &Option<String>| -> Result<Option<Rule>, ConfigError> {
            raw.as_deref().map(|r| Rule::new(key, r)).transpose()
        };

        Ok(Self {
            brand_links: Rule::new("brand-links", &site.brand_links)?,
            brand_image: Rule::new("brand-image", &site.brand_image)?,
            brand_terms: Rule::new("brand-params", &format!("{} dt", site.brand_params))?,
            brand_values: Rule::new("brand-params", &format!("{} dd", site.brand_params))?,
            country_label: site.country_label.trim().to_string(),
            site_label: site.site_label.trim().to_string(),
            value_link: Rule::new("brand-params", "a")?,
            description: Rule::new("description", &site.description)?,
            product_description: Rule::new("product-description", &site.product_description)?,
            param_terms: Rule::new("params", &format!("{} dt", site.params))?,
            param_values: Rule::new("params", &format!("{} dd", site.params))?,
            gallery_thumbs: Rule::new("gallery-thumbs", &site.gallery_thumbs)?,
            gallery_fallback: Rule::new("gallery-fallback", &site.gallery_fallback)?,
            collection_cards: Rule::new("collection-cards", &site.collection_cards)?,
            product_cards: Rule::new("product-cards", &site.product_cards)?,
            card_title_link: Rule::new("card-title-link", &site.card_title_link)?,
            collection_availability: optional(
                "collection-availability",
                &site.collection_availability,
            )?,
            product_availability: optional("product-availability", &site.product_availability)?,
            price: Rule::new("price", &site.price)?,
            units: Rule::new("units", &site.units)?,
            product_image: Rule::new("product-image", &site.product_image)?,
        })
    }

    /// Display name from the site-wide brand list
    ///
    /// The brand page's own heading is not reliable, so the name is the text
    /// of the brand link pointing back at this page. Falls back to the last
    /// path segment of the URL.
    fn brand_name(&self, document: &Html, url: &Url) -> String {
        let listed = document
            .select(&self.brand_links.selector)
            .find(|link| {
                link.value()
                    .attr("href")
                    .and_then(|href| url.join(href.trim()).ok())
                    .is_some_and(|target| &target == url)
            })
            .map(text_of)
            .filter(|name| !name.is_empty());

        listed.unwrap_or_else(|| {
            let slug = url_slug(url);
            tracing::warn!(
                "No brand link points at {}, falling back to '{}'",
                url,
                slug
            );
            slug
        })
    }

    fn description_of(&self, document: &Html, rule: &Rule) -> String {
        rule.first(document)
            .map(|p| p.inner_html().trim().to_string())
            .unwrap_or_default()
    }

    fn properties(&self, document: &Html) -> Properties {
        document
            .select(&self.param_terms.selector)
            .zip(document.select(&self.param_values.selector))
            .map(|(term, value)| (text_of(term), text_of(value)))
            .collect()
    }

    fn gallery(&self, document: &Html, url: &Url) -> Vec<String> {
        let thumbs: Vec<String> = document
            .select(&self.gallery_thumbs.selector)
            .filter_map(|thumb| thumb.value().attr("data-full"))
            .filter_map(|href| resolve(url, href).ok())
            .map(String::from)
            .collect();

        if !thumbs.is_empty() {
            return thumbs;
        }

        self.gallery_fallback
            .require_link(document, "src", url)
            .map(|image| vec![image])
            .unwrap_or_default()
    }
}

impl PageExtractor for HtmlExtractor {
    fn brand_fields(&self, content: &str, url: &Url) -> Result<BrandFields, ExtractError> {
        let document = Html::parse_document(content);

        let image_url = self.brand_image.require_link(&document, "src", url)?;
        let name = self.brand_name(&document, url);

        let mut country = None;
        let mut site = None;
        let pairs = document
            .select(&self.brand_terms.selector)
            .zip(document.select(&self.brand_values.selector));
        for (term, value) in pairs {
            let label = text_of(term);
            let value = value
                .select(&self.value_link.selector)
                .next()
                .map(text_of)
                .unwrap_or_else(|| text_of(value));

            if label == self.country_label {
                country = Some(value);
            } else if label == self.site_label {
                site = Some(value);
            }
        }

        Ok(BrandFields {
            name,
            country,
            site,
            description: self.description_of(&document, &self.description),
            image_url,
        })
    }

    fn collection_fields(
        &self,
        content: &str,
        url: &Url,
    ) -> Result<CollectionFields, ExtractError> {
        let document = Html::parse_document(content);

        Ok(CollectionFields {
            description: self.description_of(&document, &self.description),
            properties: self.properties(&document),
            images_url: self.gallery(&document, url),
        })
    }

    fn product_fields(&self, content: &str, url: &Url) -> Result<ProductFields, ExtractError> {
        let document = Html::parse_document(content);

        let raw_price = text_of(self.price.require(&document)?);
        let price = parse_price(&raw_price)?;
        let units = text_of(self.units.require(&document)?);
        let image_url = self.product_image.require_link(&document, "src", url)?;

        Ok(ProductFields {
            description: self.description_of(&document, &self.product_description),
            image_url,
            properties: self.properties(&document),
            price,
            units,
        })
    }

    fn references(
        &self,
        content: &str,
        url: &Url,
        kind: ListingKind,
    ) -> Result<Vec<ChildRef>, ExtractError> {
        let document = Html::parse_document(content);
        let (cards, availability) = match kind {
            ListingKind::Collections => (&self.collection_cards, &self.collection_availability),
            ListingKind::Products => (&self.product_cards, &self.product_availability),
        };

        let mut references = Vec::new();
        for card in document.select(&cards.selector) {
            let Some(link) = card.select(&self.card_title_link.selector).next() else {
                tracing::debug!("Card without title link on {}", url);
                continue;
            };
            let Some(href) = link.value().attr("href") else {
                tracing::debug!("Title link without href on {}", url);
                continue;
            };
            let target = match resolve(url, href) {
                Ok(target) => target,
                Err(e) => {
                    tracing::debug!("Skipping card on {}: {}", url, e);
                    continue;
                }
            };

            let mut child = ChildRef::new(target, &link.text().collect::<String>());
            if let Some(marker) = availability {
                if card.select(&marker.selector).next().is_none() {
                    child = child.unavailable();
                }
            }
            references.push(child);
        }

        Ok(references)
    }
}

fn text_of(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}

fn resolve(base: &Url, href: &str) -> Result<Url, ExtractError> {
    base.join(href.trim()).map_err(|source| ExtractError::BadLink {
        href: href.to_string(),
        source,
    })
}

/// Prices are rendered with digit grouping ("12 340"), sometimes with
/// non-breaking spaces.
fn parse_price(raw: &str) -> Result<u64, ExtractError> {
    let digits: String = raw.chars().filter(|c| !c.is_whitespace()).collect();
    digits.parse().map_err(|_| ExtractError::InvalidValue {
        field: "price",
        value: raw.to_string(),
    })
}

fn url_slug(url: &Url) -> String {
    url.path_segments()
        .and_then(|segments| segments.filter(|s| !s.is_empty()).last())
        .map(collapse_whitespace)
        .or_else(|| url.host_str().map(str::to_string))
        .unwrap_or_else(|| url.to_string())
}
