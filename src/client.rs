//! Rate-limited API fetcher
//!
//! [`ApiClient`] issues one GET at a time with the rotator's active key and
//! applies the [`retry`](crate::retry) policy until it gets an HTTP 200 or the
//! attempt budget runs out. Exhaustion is not an error: [`ApiClient::fetch`]
//! returns `Ok(None)` and the caller treats the request as "no data".

use crate::config::{ApiConfig, RetryConfig};
use crate::error::{Error, Result};
use crate::keys::KeyRotator;
use crate::retry::{self, Failure};
use serde::de::DeserializeOwned;
use tracing::{debug, error, warn};

/// Header carrying the API key
pub const API_KEY_HEADER: &str = "X-Api-Key";

/// How much of an error body is logged
const ERROR_BODY_LOG_LIMIT: usize = 300;

/// Query parameters of a request
pub type Query = Vec<(String, String)>;

/// Sequential API client that owns the run's key rotation state
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    rotator: KeyRotator,
    retry: RetryConfig,
    attempts: u64,
}

impl ApiClient {
    /// Build a client from the API and retry sections of the config
    pub fn new(api: &ApiConfig, retry: RetryConfig) -> Result<Self> {
        let rotator = if api.random_start {
            KeyRotator::with_random_start(api.api_keys.iter().cloned())?
        } else {
            KeyRotator::new(api.api_keys.iter().cloned())?
        };

        let http = reqwest::Client::builder()
            .timeout(api.request_timeout)
            .build()
            .map_err(|e| Error::config(format!("failed to create HTTP client: {}", e), "api"))?;

        Ok(Self::with_parts(http, &api.base_url, rotator, retry))
    }

    /// Assemble a client from already-built parts
    pub fn with_parts(
        http: reqwest::Client,
        base_url: &str,
        rotator: KeyRotator,
        retry: RetryConfig,
    ) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            rotator,
            retry,
            attempts: 0,
        }
    }

    /// The key rotator (read-only)
    pub fn rotator(&self) -> &KeyRotator {
        &self.rotator
    }

    /// Total HTTP attempts issued by this client so far
    pub fn attempts(&self) -> u64 {
        self.attempts
    }

    /// Attempt budget for a single logical request
    pub fn max_attempts(&self) -> u32 {
        retry::max_attempts(&self.retry, self.rotator.len())
    }

    /// Absolute URL for an endpoint path
    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// GET `path` and decode the JSON body as `T`
    ///
    /// Returns `Ok(Some(_))` on HTTP 200, `Ok(None)` when the retry budget is
    /// exhausted, and `Err(Error::MalformedResponse)` when a 200 body does not
    /// decode. Malformed bodies are not retried.
    pub async fn fetch<T: DeserializeOwned>(&mut self, path: &str, query: &Query) -> Result<Option<T>> {
        let url = self.url(path);
        let max_attempts = self.max_attempts();
        let key_count = self.rotator.len();

        for attempt in 0..max_attempts {
            let failure = match self.attempt(&url, query).await {
                Ok(body) => {
                    if attempt > 0 {
                        debug!(url = %url, attempts = attempt + 1, "request succeeded after retry");
                    }
                    return serde_json::from_slice(&body).map(Some).map_err(|e| {
                        Error::MalformedResponse {
                            url: url.clone(),
                            reason: e.to_string(),
                        }
                    });
                }
                Err(failure) => failure,
            };

            warn!(
                url = %url,
                attempt = attempt + 1,
                max_attempts,
                key = %self.rotator.current(),
                failure = %failure,
                "API request failed"
            );

            if attempt + 1 == max_attempts {
                break;
            }

            let action = retry::plan(&self.retry, &failure, attempt, key_count);
            if failure != Failure::RateLimited
                && self.retry.cycle_cooldown.is_some()
                && retry::closes_cycle(attempt, key_count)
            {
                warn!(
                    wait_secs = action.wait.as_secs(),
                    "all API keys have been tried, cooling down"
                );
            }
            if action.rotate {
                self.rotator.rotate();
            }
            if !action.wait.is_zero() {
                tokio::time::sleep(action.wait).await;
            }
        }

        error!(url = %url, max_attempts, "giving up after exhausting retry budget");
        Ok(None)
    }

    /// One HTTP round trip. Returns the body of a 200 or the failure kind.
    async fn attempt(&mut self, url: &str, query: &Query) -> std::result::Result<Vec<u8>, Failure> {
        self.attempts += 1;

        let response = self
            .http
            .get(url)
            .query(query)
            .header(API_KEY_HEADER, self.rotator.current().expose())
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| Failure::Transport(e.to_string()))?;

        let status = response.status().as_u16();
        match Failure::from_status(status) {
            None => response
                .bytes()
                .await
                .map(|b| b.to_vec())
                .map_err(|e| Failure::Transport(e.to_string())),
            Some(failure) => {
                if !matches!(failure, Failure::RateLimited) {
                    let body = response.text().await.unwrap_or_default();
                    let snippet: String = body.chars().take(ERROR_BODY_LOG_LIMIT).collect();
                    warn!(url = %url, status, body = %snippet, "error response body");
                }
                Err(failure)
            }
        }
    }
}
