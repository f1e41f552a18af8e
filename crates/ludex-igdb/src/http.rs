//! HTTP backend abstraction for the IGDB API.
//!
//! This module provides a trait-based HTTP backend that allows for
//! dependency injection and easy testing. The production implementation
//! uses reqwest with automatic retry logic for transient errors.

use crate::config::IgdbClientConfig;
use crate::error::{IgdbError, IgdbResult};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

// ============================================================================
// HTTP Backend Trait
// ============================================================================

/// Trait for HTTP backends that POST an Apicalypse body and decode JSON.
///
/// This is an implementation detail - external code should use the
/// `CatalogPort` trait.
#[async_trait]
pub trait HttpBackend: Send + Sync {
    /// POST `body` to `{base}/{endpoint}` and deserialize the response.
    async fn post_query<T: DeserializeOwned + Send>(
        &self,
        endpoint: &str,
        body: &str,
    ) -> IgdbResult<T>;
}

// ============================================================================
// Reqwest Backend
// ============================================================================

/// Production HTTP backend using reqwest with retry logic.
///
/// Implements exponential backoff for transient server errors (5xx)
/// and network errors.
pub struct ReqwestBackend {
    client: reqwest::Client,
    base_url: Url,
    client_id: String,
    access_token: String,
    timeout: Duration,
    max_retries: u8,
    retry_base_delay: Duration,
}

impl ReqwestBackend {
    /// Create a new reqwest backend with the given configuration.
    pub fn new(config: &IgdbClientConfig) -> IgdbResult<Self> {
        if !config.has_credentials() {
            return Err(IgdbError::MissingCredentials);
        }
        // A trailing slash makes `join` append instead of replacing the
        // last path segment.
        let mut base = config.base_url.trim_end_matches('/').to_string();
        base.push('/');
        let base_url = Url::parse(&base)?;

        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.clone())
            .build()?;

        Ok(Self {
            client,
            base_url,
            client_id: config.client_id.clone(),
            access_token: config.access_token.clone(),
            timeout: config.timeout,
            max_retries: config.max_retries,
            retry_base_delay: config.retry_base_delay,
        })
    }

    async fn send_once(&self, url: &Url, endpoint: &str, body: &str) -> IgdbResult<String> {
        let response = self
            .client
            .post(url.as_str())
            .header("Client-ID", &self.client_id)
            .header("Authorization", format!("Bearer {}", self.access_token))
            .header("Accept", "application/json")
            .body(body.to_string())
            .send()
            .await
            .map_err(|e| self.classify(e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(IgdbError::ApiRequestFailed {
                status: status.as_u16(),
                endpoint: endpoint.to_string(),
            });
        }
        response.text().await.map_err(|e| self.classify(e))
    }

    fn classify(&self, e: reqwest::Error) -> IgdbError {
        if e.is_timeout() {
            IgdbError::Timeout {
                elapsed_ms: u64::try_from(self.timeout.as_millis()).unwrap_or(u64::MAX),
            }
        } else {
            IgdbError::Network(e)
        }
    }

    /// POST with automatic retry for transient errors.
    async fn post_with_retry(&self, endpoint: &str, body: &str) -> IgdbResult<String> {
        let url = self.base_url.join(endpoint)?;
        let mut attempt: u8 = 0;
        loop {
            match self.send_once(&url, endpoint, body).await {
                Ok(text) => return Ok(text),
                Err(e) if e.is_retryable() && attempt < self.max_retries => {
                    let delay = self.retry_base_delay * 2u32.pow(u32::from(attempt));
                    attempt += 1;
                    warn!(
                        endpoint,
                        attempt,
                        delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                        error = %e,
                        "IGDB request failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

#[async_trait]
impl HttpBackend for ReqwestBackend {
    async fn post_query<T: DeserializeOwned + Send>(
        &self,
        endpoint: &str,
        body: &str,
    ) -> IgdbResult<T> {
        debug!(endpoint, body, "IGDB query");
        let text = self.post_with_retry(endpoint, body).await?;
        Ok(serde_json::from_str(&text)?)
    }
}

// ============================================================================
// Fake Backend for Testing
// ============================================================================

#[cfg(test)]
pub mod testing {
    use super::*;
    use std::collections::{HashMap, VecDeque};
    use std::sync::Mutex;

    /// Canned response for the fake backend.
    #[derive(Clone, Debug)]
    pub enum CannedResponse {
        Json(serde_json::Value),
        Status(u16),
    }

    /// A fake HTTP backend that returns canned responses per endpoint, in
    /// order, and records every body it was sent.
    #[derive(Default)]
    pub struct FakeBackend {
        responses: Mutex<HashMap<String, VecDeque<CannedResponse>>>,
        requests: Mutex<Vec<(String, String)>>,
    }

    impl FakeBackend {
        pub fn new() -> Self {
            Self::default()
        }

        /// Queue a response for an endpoint.
        pub fn with_response(self, endpoint: &str, response: CannedResponse) -> Self {
            self.responses
                .lock()
                .unwrap()
                .entry(endpoint.to_string())
                .or_default()
                .push_back(response);
            self
        }

        /// Bodies sent so far, as `(endpoint, body)`.
        pub fn requests(&self) -> Vec<(String, String)> {
            self.requests.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl HttpBackend for FakeBackend {
        async fn post_query<T: DeserializeOwned + Send>(
            &self,
            endpoint: &str,
            body: &str,
        ) -> IgdbResult<T> {
            self.requests
                .lock()
                .unwrap()
                .push((endpoint.to_string(), body.to_string()));
            let canned = self
                .responses
                .lock()
                .unwrap()
                .get_mut(endpoint)
                .and_then(VecDeque::pop_front);

            match canned {
                Some(CannedResponse::Json(json)) => Ok(serde_json::from_value(json)?),
                Some(CannedResponse::Status(status)) => Err(IgdbError::ApiRequestFailed {
                    status,
                    endpoint: endpoint.to_string(),
                }),
                None => Err(IgdbError::ApiRequestFailed {
                    status: 404,
                    endpoint: endpoint.to_string(),
                }),
            }
        }
    }
}
