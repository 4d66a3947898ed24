//! Recording [`DeviceContext`] shared by the unit tests of this crate.

use std::collections::VecDeque;
use std::future::Future;
use std::sync::Mutex;
use std::time::Duration;

use serde_json::Value;
use wattbridge_domain::error::FetchError;
use wattbridge_domain::id::ComponentId;
use wattbridge_domain::payload::RawPayload;
use wattbridge_domain::state::PublishedState;

use crate::ports::{DeviceContext, SlotReport};

/// What the next fetch returns.
pub enum Scripted {
    Payload(Value),
    Timeout,
    Status(u16),
    /// Never completes within a test's lifetime.
    Hang,
}

#[derive(Default)]
pub struct RecordingContext {
    script: Mutex<VecDeque<Scripted>>,
    fetches: Mutex<Vec<String>>,
    published: Mutex<Vec<(ComponentId, PublishedState)>>,
    reports: Mutex<Vec<SlotReport>>,
}

impl RecordingContext {
    pub fn scripted(responses: impl IntoIterator<Item = Scripted>) -> Self {
        Self {
            script: Mutex::new(responses.into_iter().collect()),
            ..Self::default()
        }
    }

    pub fn fetches(&self) -> Vec<String> {
        self.fetches.lock().unwrap().clone()
    }

    pub fn published(&self) -> Vec<(ComponentId, PublishedState)> {
        self.published.lock().unwrap().clone()
    }

    pub fn reports(&self) -> Vec<SlotReport> {
        self.reports.lock().unwrap().clone()
    }
}

impl DeviceContext for RecordingContext {
    fn fetch(&self, url: &str) -> impl Future<Output = Result<RawPayload, FetchError>> + Send {
        self.fetches.lock().unwrap().push(url.to_string());
        let next = self
            .script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Scripted::Timeout);
        let url = url.to_string();
        async move {
            match next {
                Scripted::Payload(value) => Ok(RawPayload::new(value)),
                Scripted::Timeout => Err(FetchError::Timeout { url }),
                Scripted::Status(status) => Err(FetchError::Status { url, status }),
                Scripted::Hang => {
                    tokio::time::sleep(Duration::from_secs(3600)).await;
                    Err(FetchError::Timeout { url })
                }
            }
        }
    }

    fn publish(&self, id: ComponentId, state: PublishedState) {
        self.published.lock().unwrap().push((id, state));
    }

    fn report(&self, report: &SlotReport) {
        self.reports.lock().unwrap().push(report.clone());
    }
}
