//! In-memory energy counter for devices that only report instantaneous power.

use crate::time::{Timestamp, elapsed_hours};

/// Integrates power samples into imported and exported watt-hours.
///
/// Positive power counts as imported, negative as exported. Totals start at
/// zero whenever the component is constructed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SimCounter {
    last: Option<(Timestamp, f64)>,
    imported: f64,
    exported: f64,
}

impl SimCounter {
    /// Record a power sample and return `(imported, exported)` so far.
    ///
    /// Energy between two samples uses the mean of both readings.
    pub fn sample(&mut self, power: f64, at: Timestamp) -> (f64, f64) {
        if let Some((previous_at, previous_power)) = self.last {
            let energy = (previous_power + power) / 2.0 * elapsed_hours(previous_at, at);
            if energy >= 0.0 {
                self.imported += energy;
            } else {
                self.exported -= energy;
            }
        }
        self.last = Some((at, power));
        (self.imported, self.exported)
    }
}
