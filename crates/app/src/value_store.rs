//! In-process value store backed by a tokio broadcast channel.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use tokio::sync::broadcast;

use wattbridge_domain::id::ComponentId;
use wattbridge_domain::state::{FaultState, PublishedState};

use crate::ports::{SlotReport, StatusReporter, ValueStore};

/// A state published for one component.
pub type Publication = (ComponentId, PublishedState);

/// In-process value store using a tokio [`broadcast`] channel.
///
/// Keeps the last state and the last fault state of every component so
/// they can be read back, and forwards every publication to subscribers.
/// Publishing succeeds even when there are no active subscribers.
pub struct InProcessValueStore {
    sender: broadcast::Sender<Publication>,
    latest: Mutex<HashMap<ComponentId, PublishedState>>,
    faults: Mutex<HashMap<ComponentId, FaultState>>,
}

impl InProcessValueStore {
    /// Create a new store with the given channel capacity.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self {
            sender,
            latest: Mutex::default(),
            faults: Mutex::default(),
        }
    }

    /// Subscribe to publications made *after* this call.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<Publication> {
        self.sender.subscribe()
    }

    /// Last state published for `id`.
    #[must_use]
    pub fn latest(&self, id: ComponentId) -> Option<PublishedState> {
        self.latest
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&id)
            .cloned()
    }

    /// Fault state from the last finalized slot of `id`.
    #[must_use]
    pub fn fault(&self, id: ComponentId) -> Option<FaultState> {
        self.faults
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&id)
            .cloned()
    }
}

impl ValueStore for InProcessValueStore {
    fn publish(&self, id: ComponentId, state: PublishedState) {
        self.latest
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id, state.clone());
        // no receivers is fine
        let _ = self.sender.send((id, state));
    }
}

impl StatusReporter for InProcessValueStore {
    fn report(&self, report: &SlotReport) {
        self.faults
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(report.component, report.outcome.fault_state());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::{SlotOutcome, UpdateFailure};
    use wattbridge_domain::id::{CycleId, DeviceId};
    use wattbridge_domain::state::{FaultLevel, InverterState};
    use wattbridge_domain::time::now;

    fn inverter(power: f64) -> PublishedState {
        PublishedState::Inverter(InverterState {
            power,
            exported: 0.0,
        })
    }

    fn report(component: u32, outcome: SlotOutcome) -> SlotReport {
        SlotReport {
            cycle: CycleId::new(),
            device: DeviceId::new(1),
            component: ComponentId::new(component),
            key: format!("component{component}"),
            started_at: now(),
            finished_at: now(),
            outcome,
        }
    }

    #[tokio::test]
    async fn should_deliver_publication_to_subscriber() {
        let store = InProcessValueStore::new(16);
        let mut rx = store.subscribe();

        store.publish(ComponentId::new(2), inverter(-900.0));

        let (id, state) = rx.recv().await.unwrap();
        assert_eq!(id, ComponentId::new(2));
        assert_eq!(state, inverter(-900.0));
    }

    #[test]
    fn should_publish_without_subscribers() {
        let store = InProcessValueStore::new(16);
        store.publish(ComponentId::new(2), inverter(-900.0));
        assert_eq!(store.latest(ComponentId::new(2)), Some(inverter(-900.0)));
    }

    #[test]
    fn should_keep_only_latest_state() {
        let store = InProcessValueStore::new(16);
        store.publish(ComponentId::new(2), inverter(-900.0));
        store.publish(ComponentId::new(2), inverter(-1000.0));

        assert_eq!(store.latest(ComponentId::new(2)), Some(inverter(-1000.0)));
        assert_eq!(store.latest(ComponentId::new(3)), None);
    }

    #[test]
    fn should_track_fault_state_from_reports() {
        let store = InProcessValueStore::new(16);
        store.report(&report(
            1,
            SlotOutcome::Failed(UpdateFailure::Interrupted),
        ));
        store.report(&report(2, SlotOutcome::Updated));

        let fault = store.fault(ComponentId::new(1)).unwrap();
        assert_eq!(fault.level, FaultLevel::Error);
        assert_eq!(fault.message, "update cycle interrupted");
        assert!(store.fault(ComponentId::new(2)).unwrap().is_ok());
    }

    #[test]
    fn should_clear_fault_after_successful_update() {
        let store = InProcessValueStore::new(16);
        store.report(&report(
            1,
            SlotOutcome::Failed(UpdateFailure::Interrupted),
        ));
        store.report(&report(1, SlotOutcome::Updated));

        assert!(store.fault(ComponentId::new(1)).unwrap().is_ok());
    }
}
