//! Time and timestamp helpers.

use chrono::{DateTime, Utc};

/// UTC timestamp used for slot bookkeeping and energy integration.
pub type Timestamp = DateTime<Utc>;

/// Return the current UTC time.
#[must_use]
pub fn now() -> Timestamp {
    Utc::now()
}

/// Hours elapsed from `from` to `to`, clamped at zero when the clock moved
/// backwards.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn elapsed_hours(from: Timestamp, to: Timestamp) -> f64 {
    let millis = (to - from).num_milliseconds().max(0);
    millis as f64 / 3_600_000.0
}
