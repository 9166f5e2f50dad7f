//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the crawler, including:
//! - Building the HTTP client with timeouts and compression
//! - Admission through the shared [`AdmissionGate`]
//! - A rotating user agent per request
//! - Retry with linear backoff for transient failures

use crate::config::CrawlerConfig;
use crate::crawler::agents::UserAgentPool;
use crate::crawler::gate::AdmissionGate;
use crate::{CrawlError, FetchError};
use reqwest::{header, Client};
use std::future::Future;
use std::time::Duration;
use url::Url;

/// Anything that can turn an address into page content
///
/// [`Fetcher`] is the network implementation; the coordinator only depends
/// on this trait.
pub trait PageSource {
    fn fetch(&self, url: &Url) -> impl Future<Output = Result<String, CrawlError>>;
}

/// How often and how patiently a failed request is retried
///
/// | Attempt | Wait before it |
/// |---------|----------------|
/// | 1 (initial) | none |
/// | 2 (retry 1) | 1 × unit |
/// | 3 (retry 2) | 2 × unit |
/// | k + 1 (retry k) | k × unit |
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt
    pub max_retries: u32,
    pub unit: Duration,
}

impl RetryPolicy {
    pub fn new(max_retries: u32, unit: Duration) -> Self {
        Self { max_retries, unit }
    }

    /// Delay before the `retry`-th retry (1-based)
    pub fn delay_before(&self, retry: u32) -> Duration {
        self.unit.saturating_mul(retry)
    }

    /// Upper bound on requests issued for one address
    pub fn max_attempts(&self) -> u32 {
        self.max_retries + 1
    }
}

impl From<&CrawlerConfig> for RetryPolicy {
    fn from(config: &CrawlerConfig) -> Self {
        Self::new(
            config.max_retries,
            Duration::from_millis(config.backoff_unit_ms),
        )
    }
}

/// Builds an HTTP client with proper configuration
///
/// No default user agent is set; [`Fetcher`] sends one from its pool with
/// every request.
pub fn build_http_client(config: &CrawlerConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .timeout(Duration::from_secs(config.request_timeout_secs))
        .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
        .danger_accept_invalid_certs(config.accept_invalid_certs)
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetches pages under the admission gate, retrying transient failures
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: Client,
    gate: AdmissionGate,
    agents: UserAgentPool,
    policy: RetryPolicy,
}

impl Fetcher {
    pub fn new(
        client: Client,
        gate: AdmissionGate,
        agents: UserAgentPool,
        policy: RetryPolicy,
    ) -> Self {
        Self {
            client,
            gate,
            agents,
            policy,
        }
    }

    pub fn gate(&self) -> &AdmissionGate {
        &self.gate
    }

    /// Fetches `url`, retrying until it succeeds or the policy runs out
    ///
    /// Network errors, timeouts and non-2xx statuses are all retried. The gate
    /// permit is only held while a request is in flight, never during the
    /// backoff sleep.
    ///
    /// # Errors
    ///
    /// [`CrawlError::FetchExhausted`] carrying the last failure once
    /// `max_retries` retries have failed.
    pub async fn fetch(&self, url: &Url) -> Result<String, CrawlError> {
        let mut retry = 0;
        loop {
            let error = match self.attempt(url).await {
                Ok(body) => return Ok(body),
                Err(e) => e,
            };

            if retry >= self.policy.max_retries {
                return Err(CrawlError::FetchExhausted {
                    url: url.to_string(),
                    attempts: retry + 1,
                    last: error,
                });
            }

            retry += 1;
            let delay = self.policy.delay_before(retry);
            tracing::warn!(
                "Fetch of {} failed ({}), retry {}/{} in {:?}",
                url,
                error,
                retry,
                self.policy.max_retries,
                delay
            );
            tokio::time::sleep(delay).await;
        }
    }

    /// One request, holding a gate permit until the body is read
    async fn attempt(&self, url: &Url) -> Result<String, FetchError> {
        let _permit = self
            .gate
            .admit()
            .await
            .map_err(|_| FetchError::GateClosed)?;

        let mut request = self.client.get(url.clone());
        if let Some(agent) = self.agents.pick() {
            request = request.header(header::USER_AGENT, agent);
        }

        let response = request.send().await.map_err(|source| FetchError::Request {
            url: url.to_string(),
            source,
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.text().await.map_err(|source| FetchError::Body {
            url: url.to_string(),
            source,
        })?;
        tracing::trace!("Fetched {} ({} bytes)", url, body.len());
        Ok(body)
    }
}

impl PageSource for Fetcher {
    async fn fetch(&self, url: &Url) -> Result<String, CrawlError> {
        Fetcher::fetch(self, url).await
    }
}
