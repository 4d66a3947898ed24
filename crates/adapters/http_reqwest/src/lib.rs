//! # wattbridge-adapter-http-reqwest
//!
//! HTTP adapter: implements the [`Fetcher`] port with `reqwest`.
//!
//! ## Responsibilities
//! - Issue one bounded `GET` per call
//! - Decode the response body as a JSON document
//! - Classify failures into [`FetchError`] (timeout, transport, status,
//!   decode)
//!
//! ## Dependency rule
//! Depends on `wattbridge-app` (for the port) and `wattbridge-domain` (for
//! the payload and error types).

pub mod config;
pub mod error;

use std::future::Future;
use std::time::Duration;

use serde_json::Value;
use wattbridge_app::ports::Fetcher;
use wattbridge_domain::error::FetchError;
use wattbridge_domain::payload::RawPayload;

pub use config::HttpConfig;
pub use error::HttpError;

/// [`Fetcher`] backed by a shared [`reqwest::Client`].
#[derive(Debug, Clone)]
pub struct ReqwestFetcher {
    client: reqwest::Client,
}

impl ReqwestFetcher {
    /// Build a fetcher from configuration.
    ///
    /// # Errors
    ///
    /// Returns [`HttpError::Client`] when the TLS backend cannot be
    /// initialised.
    pub fn new(config: &HttpConfig) -> Result<Self, HttpError> {
        Self::with_timeout(config.timeout())
    }

    /// Build a fetcher whose requests give up after `timeout`.
    ///
    /// # Errors
    ///
    /// Same as [`ReqwestFetcher::new`].
    pub fn with_timeout(timeout: Duration) -> Result<Self, HttpError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("wattbridge/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(HttpError::Client)?;
        Ok(Self { client })
    }

    async fn get_json(&self, url: &str) -> Result<Value, HttpError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|err| HttpError::from_request(url, err))?;

        let status = response.status();
        if !status.is_success() {
            return Err(HttpError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        response
            .json::<Value>()
            .await
            .map_err(|err| HttpError::from_request(url, err))
    }
}

impl Fetcher for ReqwestFetcher {
    fn fetch(&self, url: &str) -> impl Future<Output = Result<RawPayload, FetchError>> + Send {
        async move {
            tracing::debug!(url, "requesting current state");
            match self.get_json(url).await {
                Ok(value) => Ok(RawPayload::new(value)),
                Err(err) => {
                    tracing::debug!(url, error = %err, "request failed");
                    Err(err.into_domain())
                }
            }
        }
    }
}
