//! Device context port: everything an update cycle talks to.

use std::future::Future;

use wattbridge_domain::error::FetchError;
use wattbridge_domain::id::ComponentId;
use wattbridge_domain::payload::RawPayload;
use wattbridge_domain::state::PublishedState;

use super::status::SlotReport;

/// Context handed to update cycles.
///
/// This is a **port**: the binary crate provides a concrete implementation
/// ([`HostContext`](crate::services::host_context::HostContext)) backed by a
/// fetcher, a value store and a status reporter. Tests provide recording
/// fakes.
pub trait DeviceContext: Send + Sync {
    /// Fetch the current-state document at `url`, bounded by a timeout.
    fn fetch(&self, url: &str) -> impl Future<Output = Result<RawPayload, FetchError>> + Send;

    /// Publish a component's new state.
    fn publish(&self, id: ComponentId, state: PublishedState);

    /// Report a finalized update slot.
    fn report(&self, report: &SlotReport);
}

impl<T: DeviceContext + ?Sized> DeviceContext for std::sync::Arc<T> {
    fn fetch(&self, url: &str) -> impl Future<Output = Result<RawPayload, FetchError>> + Send {
        (**self).fetch(url)
    }

    fn publish(&self, id: ComponentId, state: PublishedState) {
        (**self).publish(id, state);
    }

    fn report(&self, report: &SlotReport) {
        (**self).report(report);
    }
}
