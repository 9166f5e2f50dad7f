//! Crawler module for fetching and assembling the catalog
//!
//! This module contains the core crawling logic, including:
//! - The shared admission gate bounding in-flight requests
//! - HTTP fetching with linear-backoff retry
//! - Index page discovery from the pager
//! - Brand/collection/product coordination with ordered fan-in

mod agents;
mod coordinator;
mod fetcher;
mod gate;
mod pagination;

pub use agents::UserAgentPool;
pub use coordinator::{crawl_roots, run_crawl, Coordinator, RunReport};
pub use fetcher::{build_http_client, Fetcher, PageSource, RetryPolicy};
pub use gate::AdmissionGate;
pub use pagination::PaginationResolver;
