//! Status port: the host's view of how each component's update went.

use std::fmt;
use std::sync::Arc;

use wattbridge_domain::error::{ComponentUpdateError, FetchError};
use wattbridge_domain::id::{ComponentId, CycleId, DeviceId};
use wattbridge_domain::state::FaultState;
use wattbridge_domain::time::Timestamp;

/// Why a component was not updated in a cycle.
#[derive(Debug, Clone)]
pub enum UpdateFailure {
    /// The cycle's fetch failed, so no component could be updated.
    Fetch(Arc<FetchError>),
    /// This component could not map the payload.
    Component(ComponentUpdateError),
    /// The cycle ended before this component's outcome was recorded.
    Interrupted,
}

impl UpdateFailure {
    #[must_use]
    pub fn fetch(err: FetchError) -> Self {
        Self::Fetch(Arc::new(err))
    }
}

impl From<ComponentUpdateError> for UpdateFailure {
    fn from(err: ComponentUpdateError) -> Self {
        Self::Component(err)
    }
}

impl fmt::Display for UpdateFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fetch(err) => write!(f, "{err}"),
            Self::Component(err) => write!(f, "{err}"),
            Self::Interrupted => f.write_str("update cycle interrupted"),
        }
    }
}

/// Outcome recorded against one slot.
#[derive(Debug, Clone)]
pub enum SlotOutcome {
    Updated,
    Failed(UpdateFailure),
}

impl SlotOutcome {
    #[must_use]
    pub fn is_updated(&self) -> bool {
        matches!(self, Self::Updated)
    }

    /// Fault state the host should show for the component.
    #[must_use]
    pub fn fault_state(&self) -> FaultState {
        match self {
            Self::Updated => FaultState::ok(),
            Self::Failed(failure) => FaultState::error(failure.to_string()),
        }
    }
}

impl From<Result<(), UpdateFailure>> for SlotOutcome {
    fn from(result: Result<(), UpdateFailure>) -> Self {
        match result {
            Ok(()) => Self::Updated,
            Err(failure) => Self::Failed(failure),
        }
    }
}

/// Final record of one component's slot in one cycle.
#[derive(Debug, Clone)]
pub struct SlotReport {
    pub cycle: CycleId,
    pub device: DeviceId,
    pub component: ComponentId,
    pub key: String,
    pub started_at: Timestamp,
    pub finished_at: Timestamp,
    pub outcome: SlotOutcome,
}

/// Receives every finalized slot.
pub trait StatusReporter {
    fn report(&self, report: &SlotReport);
}

impl<T: StatusReporter + ?Sized> StatusReporter for Arc<T> {
    fn report(&self, report: &SlotReport) {
        (**self).report(report);
    }
}

impl<A: StatusReporter, B: StatusReporter> StatusReporter for (A, B) {
    fn report(&self, report: &SlotReport) {
        self.0.report(report);
        self.1.report(report);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wattbridge_domain::state::FaultLevel;

    #[test]
    fn should_map_updated_outcome_to_ok_fault_state() {
        assert!(SlotOutcome::Updated.fault_state().is_ok());
    }

    #[test]
    fn should_carry_fetch_error_message_into_fault_state() {
        let outcome = SlotOutcome::Failed(UpdateFailure::fetch(FetchError::Timeout {
            url: "http://10.0.0.9/api.php?get=currentstate".to_string(),
        }));
        let fault = outcome.fault_state();
        assert_eq!(fault.level, FaultLevel::Error);
        assert_eq!(
            fault.message,
            "request to http://10.0.0.9/api.php?get=currentstate timed out"
        );
    }

    #[test]
    fn should_convert_result_into_outcome() {
        let outcome: SlotOutcome = Err::<(), _>(UpdateFailure::Interrupted).into();
        assert!(!outcome.is_updated());
        assert_eq!(outcome.fault_state().message, "update cycle interrupted");
    }
}
