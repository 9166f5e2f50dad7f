//! Crawler coordinator - main crawl orchestration logic
//!
//! Every level of the catalog is walked the same way:
//! 1. Fetch the node's own page, which doubles as index page 1
//! 2. Resolve pagination and fetch pages 2..N concurrently
//! 3. Collect child references in page order, dropping unavailable ones
//! 4. Fan out one task per child
//! 5. Fan in, keeping discovery order whatever the completion order
//! 6. Build the record from the page's own fields plus its children
//!
//! A child that fails is logged and left out of its parent. A node whose own
//! page fails is reported to its parent, which treats it like any other
//! failed child.

use crate::config::Config;
use crate::crawler::agents::UserAgentPool;
use crate::crawler::fetcher::{build_http_client, Fetcher, PageSource, RetryPolicy};
use crate::crawler::gate::AdmissionGate;
use crate::crawler::pagination::PaginationResolver;
use crate::extract::{ExtractError, HtmlExtractor, ListingKind, PageExtractor};
use crate::model::{Brand, ChildRef, Collection, Product};
use crate::output::{JsonFileSink, ResultSink};
use crate::{ConfigError, CrawlError};
use futures::future::join_all;
use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;
use url::Url;

/// Outcome of a run over several brands
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunReport {
    /// Brands crawled and handed to the sink
    pub persisted: usize,

    /// Brands whose crawl or persistence failed
    pub failed: usize,
}

/// Walks brand → collection → product and assembles the records
pub struct Coordinator<S, E> {
    source: S,
    extractor: E,
    pagination: PaginationResolver,
}

impl<S: PageSource, E: PageExtractor> Coordinator<S, E> {
    pub fn new(source: S, extractor: E, pagination: PaginationResolver) -> Self {
        Self {
            source,
            extractor,
            pagination,
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Crawls a brand page and everything below it
    ///
    /// # Errors
    ///
    /// Fails only when the brand page itself cannot be fetched or parsed.
    /// Failed collections and products are logged and omitted.
    pub async fn crawl_brand(&self, url: &Url) -> Result<Brand, CrawlError> {
        let page = self.source.fetch(url).await?;
        let fields = self
            .extractor
            .brand_fields(&page, url)
            .map_err(|source| extraction(url, source))?;

        let references = self
            .collect_references(&page, url, ListingKind::Collections)
            .await?;
        tracing::info!(
            "{}: {} collections to crawl",
            fields.name,
            references.len()
        );

        let collections = gather_ordered(url, ListingKind::Collections, references, |child| {
            self.crawl_collection(child)
        })
        .await;

        Ok(Brand {
            url: url.to_string(),
            name: fields.name,
            country: fields.country,
            site: fields.site,
            description: fields.description,
            image_url: fields.image_url,
            collections,
        })
    }

    /// Crawls one collection page and all of its products
    pub async fn crawl_collection(&self, reference: ChildRef) -> Result<Collection, CrawlError> {
        let ChildRef { url, label, .. } = reference;

        let page = self.source.fetch(&url).await?;
        let fields = self
            .extractor
            .collection_fields(&page, &url)
            .map_err(|source| extraction(&url, source))?;

        let references = self
            .collect_references(&page, &url, ListingKind::Products)
            .await?;
        tracing::debug!("{}: {} products to crawl", label, references.len());

        let products = gather_ordered(&url, ListingKind::Products, references, |child| {
            self.crawl_product(child)
        })
        .await;

        Ok(Collection {
            url: url.to_string(),
            name: label,
            description: fields.description,
            properties: fields.properties,
            images_url: fields.images_url,
            products,
        })
    }

    /// Fetches and parses a single product page
    pub async fn crawl_product(&self, reference: ChildRef) -> Result<Product, CrawlError> {
        let ChildRef { url, label, .. } = reference;

        let page = self.source.fetch(&url).await?;
        let fields = self
            .extractor
            .product_fields(&page, &url)
            .map_err(|source| extraction(&url, source))?;

        Ok(Product {
            url: url.to_string(),
            name: label,
            description: fields.description,
            image_url: fields.image_url,
            properties: fields.properties,
            price: fields.price,
            units: fields.units,
        })
    }

    /// References from every index page of a listing
    ///
    /// `first_page` has already been fetched. Remaining pages are fetched
    /// together; one that fails is logged and contributes nothing.
    async fn collect_references(
        &self,
        first_page: &str,
        base: &Url,
        kind: ListingKind,
    ) -> Result<Vec<ChildRef>, CrawlError> {
        let pages = self.pagination.resolve_index_addresses(first_page, base);
        let mut references = self
            .extractor
            .references(first_page, base, kind)
            .map_err(|source| extraction(base, source))?;

        if pages.len() > 1 {
            tracing::debug!("{}: {} index pages", base, pages.len());
            let rest = join_all(
                pages[1..]
                    .iter()
                    .map(|page_url| self.index_page_references(page_url, kind)),
            )
            .await;

            for (page_url, result) in pages[1..].iter().zip(rest) {
                match result {
                    Ok(found) => references.extend(found),
                    Err(e) => tracing::error!("Skipping index page {}: {}", page_url, e),
                }
            }
        }

        let discovered = references.len();
        references.retain(|child| child.available);
        if references.len() < discovered {
            tracing::debug!(
                "{}: skipping {} unavailable {}",
                base,
                discovered - references.len(),
                kind
            );
        }

        Ok(references)
    }

    async fn index_page_references(
        &self,
        page_url: &Url,
        kind: ListingKind,
    ) -> Result<Vec<ChildRef>, CrawlError> {
        let content = self.source.fetch(page_url).await?;
        self.extractor
            .references(&content, page_url, kind)
            .map_err(|source| extraction(page_url, source))
    }
}

/// Runs `task` for every reference concurrently and keeps the successes in
/// reference order
async fn gather_ordered<T, F, Fut>(
    parent: &Url,
    kind: ListingKind,
    references: Vec<ChildRef>,
    task: F,
) -> Vec<T>
where
    F: Fn(ChildRef) -> Fut,
    Fut: Future<Output = Result<T, CrawlError>>,
{
    let total = references.len();
    let done = AtomicUsize::new(0);

    let results = join_all(references.into_iter().map(|child| {
        let url = child.url.clone();
        let pending = task(child);
        let done = &done;
        async move {
            let result = pending.await;
            let finished = done.fetch_add(1, Ordering::Relaxed) + 1;
            match kind {
                ListingKind::Collections => {
                    tracing::info!("{}: {}/{} collections done", parent, finished, total)
                }
                ListingKind::Products => {
                    tracing::debug!("{}: {}/{} products done", parent, finished, total)
                }
            }
            (url, result)
        }
    }))
    .await;

    let mut children = Vec::with_capacity(total);
    for (url, result) in results {
        match result {
            Ok(child) => children.push(child),
            Err(e) => tracing::error!("Dropping {} from {}: {}", url, parent, e),
        }
    }

    if children.len() < total {
        tracing::warn!(
            "{}: kept {} of {} {}",
            parent,
            children.len(),
            total,
            kind
        );
    }

    children
}

fn extraction(url: &Url, source: ExtractError) -> CrawlError {
    CrawlError::Extraction {
        url: url.to_string(),
        source,
    }
}

/// Crawls each root in turn and hands every brand to `sink`
///
/// A brand is fully crawled and persisted before the next one starts. A
/// failing brand or sink write is logged and counted, and the run moves on.
///
/// # Errors
///
/// [`CrawlError::AllRootsFailed`] when not a single brand was persisted.
pub async fn crawl_roots<S, E, K>(
    coordinator: &Coordinator<S, E>,
    roots: &[Url],
    sink: &K,
) -> Result<RunReport, CrawlError>
where
    S: PageSource,
    E: PageExtractor,
    K: ResultSink,
{
    let mut report = RunReport::default();

    for (index, root) in roots.iter().enumerate() {
        tracing::info!("[{}/{}] Crawling {}", index + 1, roots.len(), root);
        let start_time = Instant::now();

        let brand = match coordinator.crawl_brand(root).await {
            Ok(brand) => brand,
            Err(e) => {
                tracing::error!("Brand {} failed: {}", root, e);
                report.failed += 1;
                continue;
            }
        };

        tracing::info!(
            "{}: {} collections, {} products in {:?}",
            brand.name,
            brand.collections.len(),
            brand.product_count(),
            start_time.elapsed()
        );

        match sink.persist(&brand) {
            Ok(()) => report.persisted += 1,
            Err(e) => {
                tracing::error!("Failed to persist {}: {}", brand.name, e);
                report.failed += 1;
            }
        }
    }

    if report.persisted == 0 && report.failed > 0 {
        return Err(CrawlError::AllRootsFailed {
            failed: report.failed,
        });
    }

    Ok(report)
}

/// Runs a complete crawl from configuration
///
/// Builds the admission gate, HTTP client, extractor and JSON sink described
/// by `config`, then crawls every configured root.
pub async fn run_crawl(config: Config) -> Result<RunReport, CrawlError> {
    let roots = config
        .roots
        .iter()
        .map(|root| Url::parse(root))
        .collect::<Result<Vec<_>, _>>()?;

    if roots.is_empty() {
        return Err(ConfigError::Validation("no root URLs configured".to_string()).into());
    }

    let gate = AdmissionGate::new(config.crawler.max_concurrent_requests as usize);
    let fetcher = Fetcher::new(
        build_http_client(&config.crawler)?,
        gate,
        UserAgentPool::new(&config.user_agent),
        RetryPolicy::from(&config.crawler),
    );
    let extractor = HtmlExtractor::new(&config.site)?;
    let pagination = PaginationResolver::new(&config.site.pager_links, &config.crawler.page_param)?;
    let coordinator = Coordinator::new(fetcher, extractor, pagination);
    let sink = JsonFileSink::new(&config.output.results_dir);

    tracing::info!(
        "Crawling {} brands with at most {} requests in flight",
        roots.len(),
        config.crawler.max_concurrent_requests
    );

    crawl_roots(&coordinator, &roots, &sink).await
}
