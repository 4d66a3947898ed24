//! Fetcher port: retrieves a device's current-state document.

use std::future::Future;

use wattbridge_domain::error::FetchError;
use wattbridge_domain::payload::RawPayload;

/// Path and query of the current-state endpoint on a device.
pub const CURRENT_STATE_PATH: &str = "/api.php?get=currentstate";

/// URL of the current-state endpoint for a device at `address`.
#[must_use]
pub fn current_state_url(address: &str) -> String {
    format!("http://{address}{CURRENT_STATE_PATH}")
}

/// Performs one bounded request and decodes the response body.
///
/// Implementations must enforce their own timeout; a request that never
/// completes would otherwise stall the device's cycle.
pub trait Fetcher {
    /// Issue a GET to `url` and decode the body as a structured document.
    fn fetch(&self, url: &str) -> impl Future<Output = Result<RawPayload, FetchError>> + Send;
}

impl<T: Fetcher + Send + Sync> Fetcher for std::sync::Arc<T> {
    fn fetch(&self, url: &str) -> impl Future<Output = Result<RawPayload, FetchError>> + Send {
        (**self).fetch(url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_build_current_state_url() {
        assert_eq!(
            current_state_url("192.168.1.40"),
            "http://192.168.1.40/api.php?get=currentstate"
        );
    }

    #[test]
    fn should_keep_port_in_address() {
        assert_eq!(
            current_state_url("127.0.0.1:8080"),
            "http://127.0.0.1:8080/api.php?get=currentstate"
        );
    }
}
