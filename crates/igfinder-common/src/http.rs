//! Allowlisted HTTP client with retry and exponential backoff.
//!
//! Requests may only target approved hosts. Transient failures (HTTP 429,
//! HTTP 5xx, timeouts, refused connections) are retried; anything else is
//! returned to the caller immediately.

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE, RETRY_AFTER};
use reqwest::{Client, ClientBuilder, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::HashSet;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

use crate::error::{IgFinderError, Result};
use crate::run_config::EnsemblConfig;

/// Backoff schedule: `base_delay * 2^attempt`, capped at `max_delay`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl RetryPolicy {
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt.min(16));
        self.base_delay.saturating_mul(factor).min(self.max_delay)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 5,
            base_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(30),
        }
    }
}

impl From<&EnsemblConfig> for RetryPolicy {
    fn from(cfg: &EnsemblConfig) -> Self {
        Self {
            max_retries: cfg.max_retries,
            base_delay: Duration::from_millis(cfg.base_delay_ms),
            max_delay: Duration::from_millis(cfg.max_delay_ms),
        }
    }
}

/// Status codes worth another attempt.
pub fn is_retryable_status(status: StatusCode) -> bool {
    status == StatusCode::TOO_MANY_REQUESTS
        || status == StatusCode::REQUEST_TIMEOUT
        || status.is_server_error()
}

fn is_retryable_error(err: &reqwest::Error) -> bool {
    err.is_timeout() || err.is_connect()
}

/// Seconds from a `Retry-After` header; HTTP-date values are ignored.
fn retry_after(resp: &Response) -> Option<Duration> {
    let value = resp.headers().get(RETRY_AFTER)?.to_str().ok()?;
    let secs: f64 = value.trim().parse().ok()?;
    (secs.is_finite() && secs >= 0.0).then(|| Duration::from_secs_f64(secs))
}

/// A network-capped HTTP client that only talks to approved domains.
#[derive(Debug, Clone)]
pub struct SandboxClient {
    client: Client,
    allowlist: HashSet<String>,
    retry: RetryPolicy,
}

impl SandboxClient {
    /// Creates a client with the default allowlist of Ensembl REST hosts.
    pub fn new(timeout: Duration, user_agent: &str, retry: RetryPolicy) -> Result<Self> {
        let mut allowlist = HashSet::new();
        let domains = [
            "rest.ensembl.org",        // Ensembl REST (also covers grch37.rest.ensembl.org)
            "rest.ensemblgenomes.org", // Ensembl Genomes
            "localhost",               // local mirror
            "127.0.0.1",               // local mirror alt
        ];
        for d in domains {
            allowlist.insert(d.to_string());
        }

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let client = ClientBuilder::new()
            .timeout(timeout)
            .user_agent(user_agent)
            .default_headers(headers)
            .build()
            .map_err(|e| IgFinderError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { client, allowlist, retry })
    }

    /// Client for the configured Ensembl server, with any extra approved hosts.
    pub fn from_config(cfg: &EnsemblConfig) -> Result<Self> {
        let mut client = Self::new(
            Duration::from_secs(cfg.timeout_secs),
            &cfg.user_agent,
            RetryPolicy::from(cfg),
        )?;
        for host in &cfg.extra_hosts {
            client.allow_domain(host.trim());
        }
        Ok(client)
    }

    /// Appends an exact hostname to the allowlist.
    pub fn allow_domain(&mut self, domain: &str) {
        self.allowlist.insert(domain.to_string());
    }

    /// Validates if a URL is permitted under the current sandbox policy.
    pub fn is_allowed(&self, url: &str) -> bool {
        if let Ok(parsed) = Url::parse(url) {
            if let Some(host) = parsed.host_str() {
                for allowed in &self.allowlist {
                    if host == allowed || host.ends_with(&format!(".{}", allowed)) {
                        return true;
                    }
                }
            }
        }
        false
    }

    fn check(&self, url: &str) -> Result<()> {
        if !self.is_allowed(url) {
            return Err(IgFinderError::Security(format!(
                "domain not in allowlist for URL {}",
                url
            )));
        }
        Ok(())
    }

    /// GET a JSON document, retrying transient failures.
    pub async fn get_json<T: DeserializeOwned>(&self, url: &str, query: &[(&str, &str)]) -> Result<T> {
        self.check(url)?;
        let request = self.client.get(url).query(query);
        let resp = self.send_with_retry(request).await?;
        Ok(resp.json::<T>().await?)
    }

    /// POST a JSON body and decode a JSON reply, retrying transient failures.
    pub async fn post_json<B, T>(&self, url: &str, query: &[(&str, &str)], body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.check(url)?;
        let request = self.client.post(url).query(query).json(body);
        let resp = self.send_with_retry(request).await?;
        Ok(resp.json::<T>().await?)
    }

    async fn send_with_retry(&self, request: RequestBuilder) -> Result<Response> {
        let mut attempt: u32 = 0;
        loop {
            let req = request
                .try_clone()
                .ok_or_else(|| IgFinderError::Config("request body cannot be replayed".to_string()))?;

            let wait = match req.send().await {
                Ok(resp) if resp.status().is_success() => return Ok(resp),
                Ok(resp) => {
                    let status = resp.status();
                    if !is_retryable_status(status) || attempt >= self.retry.max_retries {
                        let url = resp.url().to_string();
                        let body = resp.text().await.unwrap_or_default();
                        return Err(IgFinderError::Other(anyhow::anyhow!(
                            "HTTP {} from {} after {} attempt(s): {}",
                            status,
                            url,
                            attempt + 1,
                            body.trim()
                        )));
                    }
                    let wait = retry_after(&resp)
                        .unwrap_or_else(|| self.retry.delay_for(attempt))
                        .min(self.retry.max_delay);
                    warn!(%status, attempt = attempt + 1, wait_ms = wait.as_millis() as u64, "Transient HTTP status, retrying");
                    wait
                }
                Err(e) => {
                    if !is_retryable_error(&e) || attempt >= self.retry.max_retries {
                        return Err(e.into());
                    }
                    let wait = self.retry.delay_for(attempt);
                    warn!(error = %e, attempt = attempt + 1, wait_ms = wait.as_millis() as u64, "Request failed, retrying");
                    wait
                }
            };

            tokio::time::sleep(wait).await;
            attempt += 1;
            debug!(attempt, "Retrying request");
        }
    }
}
