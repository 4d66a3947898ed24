//! Concrete [`DeviceContext`] backed by a fetcher, a value store and a
//! status reporter.

use std::sync::Arc;
use std::time::Duration;

use wattbridge_domain::error::FetchError;
use wattbridge_domain::id::ComponentId;
use wattbridge_domain::payload::RawPayload;
use wattbridge_domain::state::PublishedState;

use crate::ports::{DeviceContext, Fetcher, SlotReport, StatusReporter, ValueStore};

/// Default upper bound on one fetch.
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(5);

/// [`DeviceContext`] implementation that delegates to its three adapters.
///
/// Wraps `Arc`-ed adapters so it is cheaply cloneable and can be handed to
/// one polling task per device. Every fetch is bounded by `fetch_timeout`
/// on top of whatever the fetcher enforces itself.
pub struct HostContext<F, S, R> {
    fetcher: Arc<F>,
    store: Arc<S>,
    reporter: Arc<R>,
    fetch_timeout: Duration,
}

impl<F, S, R> HostContext<F, S, R> {
    pub fn new(fetcher: Arc<F>, store: Arc<S>, reporter: Arc<R>) -> Self {
        Self {
            fetcher,
            store,
            reporter,
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
        }
    }

    #[must_use]
    pub fn with_fetch_timeout(mut self, fetch_timeout: Duration) -> Self {
        self.fetch_timeout = fetch_timeout;
        self
    }

    #[must_use]
    pub fn fetch_timeout(&self) -> Duration {
        self.fetch_timeout
    }
}

impl<F, S, R> Clone for HostContext<F, S, R> {
    fn clone(&self) -> Self {
        Self {
            fetcher: Arc::clone(&self.fetcher),
            store: Arc::clone(&self.store),
            reporter: Arc::clone(&self.reporter),
            fetch_timeout: self.fetch_timeout,
        }
    }
}

impl<F, S, R> DeviceContext for HostContext<F, S, R>
where
    F: Fetcher + Send + Sync + 'static,
    S: ValueStore + Send + Sync + 'static,
    R: StatusReporter + Send + Sync + 'static,
{
    async fn fetch(&self, url: &str) -> Result<RawPayload, FetchError> {
        match tokio::time::timeout(self.fetch_timeout, self.fetcher.fetch(url)).await {
            Ok(result) => result,
            Err(_) => Err(FetchError::Timeout {
                url: url.to_string(),
            }),
        }
    }

    fn publish(&self, id: ComponentId, state: PublishedState) {
        self.store.publish(id, state);
    }

    fn report(&self, report: &SlotReport) {
        self.reporter.report(report);
    }
}
