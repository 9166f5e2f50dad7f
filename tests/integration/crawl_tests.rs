//! Integration tests for the crawler
//!
//! These tests use wiremock to serve a small catalog and run the full
//! brand → collection → product crawl end-to-end, down to the JSON files.

mod fixtures;

use catalog_harvest::config::Config;
use catalog_harvest::crawler::run_crawl;
use catalog_harvest::{Brand, CrawlError, RunReport};
use fixtures::{brand_page, collection_index, collection_page, product_page};
use std::path::Path;
use std::time::{Duration, Instant};
use tempfile::TempDir;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration pointing at the mock server
fn create_test_config(roots: Vec<String>, results_dir: &Path) -> Config {
    let mut config = Config::default();
    config.roots = roots;
    config.crawler.backoff_unit_ms = 1; // Very short for testing
    config.crawler.request_timeout_secs = 5;
    config.user_agent.pool = vec!["TestBot/1.0".to_string()];
    config.output.results_dir = results_dir.display().to_string();
    config.site.collection_availability = Some(".cat-card__price".to_string());
    config
}

fn html(body: String) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .set_body_string(body)
        .insert_header("content-type", "text/html; charset=utf-8")
}

async fn mount_page(server: &MockServer, page_path: &str, body: String) {
    Mock::given(method("GET"))
        .and(path(page_path))
        .respond_with(html(body))
        .mount(server)
        .await;
}

fn read_brand(results_dir: &Path, file: &str) -> Brand {
    let content = std::fs::read_to_string(results_dir.join(file)).expect("missing output file");
    serde_json::from_str(&content).expect("invalid brand JSON")
}

#[tokio::test]
async fn test_full_crawl_with_pagination_and_delisted_collection() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();
    let results = TempDir::new().unwrap();

    // Page 2 of the brand listing; mounted first so it wins over the bare path
    Mock::given(method("GET"))
        .and(path("/brands/ragno/"))
        .and(query_param("p", "2"))
        .respond_with(html(collection_index(&[("/c/gamma/", "Gamma", true)])))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/brands/ragno/"))
        .respond_with(html(brand_page(
            "/brands/ragno/",
            "Ragno",
            &[("/c/alpha/", "Alpha", true), ("/c/beta/", "Beta", false)],
            2,
        )))
        .expect(1)
        .mount(&mock_server)
        .await;

    // The delisted collection must never be requested
    Mock::given(method("GET"))
        .and(path("/c/beta/"))
        .respond_with(html(collection_page("beta", &[], 1)))
        .expect(0)
        .mount(&mock_server)
        .await;

    mount_page(
        &mock_server,
        "/c/alpha/",
        collection_page(
            "alpha",
            &[("/p/a1/", "Alpha   One", true), ("/p/a2/", "Alpha Two", false)],
            1,
        ),
    )
    .await;
    mount_page(
        &mock_server,
        "/c/gamma/",
        collection_page("gamma", &[("/p/g1/", "Gamma One", true)], 1),
    )
    .await;
    mount_page(&mock_server, "/p/a1/", product_page("a1", "2 450")).await;
    mount_page(&mock_server, "/p/g1/", product_page("g1", "990")).await;

    let config = create_test_config(vec![format!("{}/brands/ragno/", base_url)], results.path());
    let report = run_crawl(config).await.expect("Crawl failed");
    assert_eq!(
        report,
        RunReport {
            persisted: 1,
            failed: 0
        }
    );

    let brand = read_brand(results.path(), "ragno.json");
    assert_eq!(brand.name, "Ragno");
    assert_eq!(brand.url, format!("{}/brands/ragno/", base_url));
    assert_eq!(brand.country.as_deref(), Some("Италия"));
    assert_eq!(brand.site.as_deref(), Some("Ragno.example"));
    assert_eq!(brand.description, "Ragno makes porcelain stoneware.");
    assert_eq!(brand.image_url, format!("{}/upload/Ragno.png", base_url));

    let names: Vec<&str> = brand.collections.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["Alpha", "Gamma"]);

    let alpha = &brand.collections[0];
    assert_eq!(alpha.url, format!("{}/c/alpha/", base_url));
    assert_eq!(alpha.properties.get("Format").map(String::as_str), Some("60x60"));
    assert_eq!(
        alpha.images_url,
        vec![
            format!("{}/upload/alpha-1.jpg", base_url),
            format!("{}/upload/alpha-2.jpg", base_url),
        ]
    );
    assert_eq!(alpha.products.len(), 1);
    assert_eq!(alpha.products[0].name, "Alpha One");
    assert_eq!(alpha.products[0].price, 2450);
    assert_eq!(alpha.products[0].units, "м²");

    let gamma = &brand.collections[1];
    assert_eq!(gamma.products.len(), 1);
    assert_eq!(gamma.products[0].price, 990);
}

#[tokio::test]
async fn test_collection_failing_every_retry_is_omitted() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();
    let results = TempDir::new().unwrap();

    mount_page(
        &mock_server,
        "/brands/fabresa/",
        brand_page(
            "/brands/fabresa/",
            "Fabresa",
            &[("/c/ok/", "Ok", true), ("/c/broken/", "Broken", true)],
            1,
        ),
    )
    .await;
    mount_page(
        &mock_server,
        "/c/ok/",
        collection_page("ok", &[("/p/1/", "One", true)], 1),
    )
    .await;
    mount_page(&mock_server, "/p/1/", product_page("one", "100")).await;

    // Initial attempt plus five retries
    Mock::given(method("GET"))
        .and(path("/c/broken/"))
        .respond_with(ResponseTemplate::new(500))
        .expect(6)
        .mount(&mock_server)
        .await;

    let config = create_test_config(vec![format!("{}/brands/fabresa/", base_url)], results.path());
    let report = run_crawl(config).await.expect("Crawl failed");
    assert_eq!(report.persisted, 1);

    let brand = read_brand(results.path(), "fabresa.json");
    assert_eq!(brand.collections.len(), 1);
    assert_eq!(brand.collections[0].name, "Ok");
    assert_eq!(brand.collections[0].products.len(), 1);
}

#[tokio::test]
async fn test_transient_product_failure_recovers() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();
    let results = TempDir::new().unwrap();

    mount_page(
        &mock_server,
        "/brands/decocer/",
        brand_page("/brands/decocer/", "Decocer", &[("/c/x/", "X", true)], 1),
    )
    .await;
    mount_page(
        &mock_server,
        "/c/x/",
        collection_page("x", &[("/p/flaky/", "Flaky", true)], 1),
    )
    .await;

    Mock::given(method("GET"))
        .and(path("/p/flaky/"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(2)
        .expect(2)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/p/flaky/"))
        .respond_with(html(product_page("flaky", "1 000")))
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = create_test_config(vec![format!("{}/brands/decocer/", base_url)], results.path());
    run_crawl(config).await.expect("Crawl failed");

    let brand = read_brand(results.path(), "decocer.json");
    assert_eq!(brand.collections[0].products.len(), 1);
    assert_eq!(brand.collections[0].products[0].price, 1000);
}

#[tokio::test]
async fn test_brands_processed_sequentially_with_partial_failure() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();
    let results = TempDir::new().unwrap();

    Mock::given(method("GET"))
        .and(path("/brands/gone/"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;
    mount_page(
        &mock_server,
        "/brands/kerranova/",
        brand_page("/brands/kerranova/", "Kerranova", &[], 1),
    )
    .await;

    let config = create_test_config(
        vec![
            format!("{}/brands/gone/", base_url),
            format!("{}/brands/kerranova/", base_url),
        ],
        results.path(),
    );
    let report = run_crawl(config).await.expect("Crawl failed");

    assert_eq!(
        report,
        RunReport {
            persisted: 1,
            failed: 1
        }
    );
    let brand = read_brand(results.path(), "kerranova.json");
    assert!(brand.collections.is_empty());
}

#[tokio::test]
async fn test_all_roots_failing_is_an_error() {
    let mock_server = MockServer::start().await;
    let results = TempDir::new().unwrap();

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(502))
        .mount(&mock_server)
        .await;

    let mut config = create_test_config(
        vec![format!("{}/brands/down/", mock_server.uri())],
        results.path(),
    );
    config.crawler.max_retries = 1;

    let err = run_crawl(config).await.unwrap_err();
    assert!(matches!(err, CrawlError::AllRootsFailed { failed: 1 }));
}

#[tokio::test]
async fn test_concurrency_ceiling_applies_across_levels() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();
    let results = TempDir::new().unwrap();

    let products: Vec<(String, String)> = (1..=6)
        .map(|i| (format!("/p/{i}/"), format!("Tile {i}")))
        .collect();
    let cards: Vec<(&str, &str, bool)> = products
        .iter()
        .map(|(href, label)| (href.as_str(), label.as_str(), true))
        .collect();

    mount_page(
        &mock_server,
        "/brands/slow/",
        brand_page("/brands/slow/", "Slow", &[("/c/slow/", "Slow", true)], 1),
    )
    .await;
    mount_page(&mock_server, "/c/slow/", collection_page("slow", &cards, 1)).await;
    for (i, (href, _)) in products.iter().enumerate() {
        Mock::given(method("GET"))
            .and(path(href.as_str()))
            .respond_with(
                html(product_page(&format!("tile{}", i + 1), "100"))
                    .set_delay(Duration::from_millis(100)),
            )
            .mount(&mock_server)
            .await;
    }

    let mut config = create_test_config(vec![format!("{}/brands/slow/", base_url)], results.path());
    config.crawler.max_concurrent_requests = 2;

    let started = Instant::now();
    run_crawl(config).await.expect("Crawl failed");

    // Six 100ms product fetches, two at a time
    assert!(started.elapsed() >= Duration::from_millis(300));

    let brand = read_brand(results.path(), "slow.json");
    let names: Vec<&str> = brand.collections[0]
        .products
        .iter()
        .map(|p| p.name.as_str())
        .collect();
    assert_eq!(
        names,
        vec!["Tile 1", "Tile 2", "Tile 3", "Tile 4", "Tile 5", "Tile 6"]
    );
}

#[tokio::test]
async fn test_repeat_crawl_output_is_byte_identical() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_page(
        &mock_server,
        "/brands/ragno/",
        brand_page(
            "/brands/ragno/",
            "Ragno",
            &[("/c/a/", "A", true), ("/c/b/", "B", true)],
            1,
        ),
    )
    .await;
    mount_page(
        &mock_server,
        "/c/a/",
        collection_page("a", &[("/p/1/", "One", true), ("/p/2/", "Two", true)], 1),
    )
    .await;
    mount_page(&mock_server, "/c/b/", collection_page("b", &[], 1)).await;
    mount_page(&mock_server, "/p/1/", product_page("one", "10")).await;
    mount_page(&mock_server, "/p/2/", product_page("two", "20")).await;

    let first_dir = TempDir::new().unwrap();
    let second_dir = TempDir::new().unwrap();
    for dir in [&first_dir, &second_dir] {
        let config = create_test_config(vec![format!("{}/brands/ragno/", base_url)], dir.path());
        run_crawl(config).await.expect("Crawl failed");
    }

    let first = std::fs::read(first_dir.path().join("ragno.json")).unwrap();
    let second = std::fs::read(second_dir.path().join("ragno.json")).unwrap();
    assert_eq!(first, second);
}
