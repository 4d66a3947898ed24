//! HTTP adapter error types.

use wattbridge_domain::error::FetchError;

/// Errors specific to the HTTP adapter.
#[derive(Debug, thiserror::Error)]
pub enum HttpError {
    /// The reqwest client could not be built.
    #[error("failed to build HTTP client")]
    Client(#[source] reqwest::Error),

    /// The request could not be completed.
    #[error("request to {url} failed")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The device answered with a non-success status.
    #[error("request to {url} returned status {status}")]
    Status { url: String, status: u16 },

    /// The body is not a JSON document.
    #[error("response from {url} is not valid JSON")]
    Decode {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}

impl HttpError {
    /// Classify a reqwest error raised while fetching `url`.
    pub(crate) fn from_request(url: &str, source: reqwest::Error) -> Self {
        let url = url.to_string();
        if source.is_decode() {
            Self::Decode { url, source }
        } else {
            Self::Request { url, source }
        }
    }

    /// Convert into a [`FetchError`] for propagation across the fetcher port.
    pub fn into_domain(self) -> FetchError {
        match self {
            Self::Request { url, source } if source.is_timeout() => FetchError::Timeout { url },
            Self::Request { url, source } => FetchError::Transport {
                url,
                source: Box::new(source),
            },
            Self::Status { url, status } => FetchError::Status { url, status },
            Self::Decode { url, source } => FetchError::Decode {
                url,
                source: Box::new(source),
            },
            Self::Client(source) => FetchError::Transport {
                url: String::new(),
                source: Box::new(source),
            },
        }
    }
}

impl From<HttpError> for FetchError {
    fn from(err: HttpError) -> Self {
        err.into_domain()
    }
}
