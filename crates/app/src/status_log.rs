//! Status reporter that writes every finalized slot to the log.

use crate::ports::{SlotOutcome, SlotReport, StatusReporter};

/// Logs successful slots at `debug` and failed slots at `warn`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingStatusReporter;

impl StatusReporter for TracingStatusReporter {
    fn report(&self, report: &SlotReport) {
        let elapsed_ms = (report.finished_at - report.started_at).num_milliseconds();
        match &report.outcome {
            SlotOutcome::Updated => tracing::debug!(
                cycle = %report.cycle,
                device = %report.device,
                component = %report.key,
                elapsed_ms,
                "component updated"
            ),
            SlotOutcome::Failed(failure) => tracing::warn!(
                cycle = %report.cycle,
                device = %report.device,
                component = %report.key,
                elapsed_ms,
                error = %failure,
                "component not updated"
            ),
        }
    }
}
