//! Multi-component update context.
//!
//! [`MultiComponentUpdate`] is a guard created at the start of a cycle. It
//! acquires one slot per component and finalizes every slot exactly once,
//! either through [`finish`](MultiComponentUpdate::finish) or, if the cycle
//! exits any other way (early return, cancelled future, panic), when it is
//! dropped. Slots that never had an outcome recorded are reported as
//! [`UpdateFailure::Interrupted`].

use std::collections::BTreeMap;

use wattbridge_domain::device::Device;
use wattbridge_domain::error::FetchError;
use wattbridge_domain::id::{ComponentId, CycleId, DeviceId};
use wattbridge_domain::time::{self, Timestamp};

use crate::ports::{DeviceContext, SlotOutcome, SlotReport, UpdateFailure};

struct Slot {
    component: ComponentId,
    started_at: Timestamp,
    outcome: Option<SlotOutcome>,
}

/// Outcomes of one finished cycle, keyed like the device's components.
#[derive(Debug, Clone)]
pub struct CycleReport {
    pub cycle: CycleId,
    pub device: DeviceId,
    pub outcomes: BTreeMap<String, SlotOutcome>,
}

impl CycleReport {
    /// No slot was acquired: the device had no components.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    /// Number of components updated successfully.
    #[must_use]
    pub fn updated(&self) -> usize {
        self.outcomes.values().filter(|o| o.is_updated()).count()
    }

    /// Failed slots with their failure.
    pub fn failures(&self) -> impl Iterator<Item = (&str, &UpdateFailure)> {
        self.outcomes.iter().filter_map(|(key, outcome)| match outcome {
            SlotOutcome::Failed(failure) => Some((key.as_str(), failure)),
            SlotOutcome::Updated => None,
        })
    }

    #[must_use]
    pub fn outcome(&self, key: &str) -> Option<&SlotOutcome> {
        self.outcomes.get(key)
    }
}

/// Guard over one update cycle of one device.
pub struct MultiComponentUpdate<'c, C: DeviceContext> {
    ctx: &'c C,
    cycle: CycleId,
    device: DeviceId,
    slots: BTreeMap<String, Slot>,
}

impl<'c, C: DeviceContext> MultiComponentUpdate<'c, C> {
    /// Acquire a slot for every component currently on `device`.
    pub fn begin(ctx: &'c C, device: &Device) -> Self {
        Self::begin_with(
            ctx,
            device.id(),
            device
                .components()
                .iter()
                .map(|(key, component)| (key.clone(), component.id())),
        )
    }

    /// Acquire a slot for each `(key, component id)` pair.
    pub fn begin_with(
        ctx: &'c C,
        device: DeviceId,
        components: impl IntoIterator<Item = (String, ComponentId)>,
    ) -> Self {
        let started_at = time::now();
        let slots: BTreeMap<_, _> = components
            .into_iter()
            .map(|(key, component)| {
                let slot = Slot {
                    component,
                    started_at,
                    outcome: None,
                };
                (key, slot)
            })
            .collect();
        let cycle = CycleId::new();
        tracing::debug!(%cycle, %device, slots = slots.len(), "update slots acquired");
        Self {
            ctx,
            cycle,
            device,
            slots,
        }
    }

    #[must_use]
    pub fn cycle(&self) -> CycleId {
        self.cycle
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Record the outcome for the slot at `key`, replacing an earlier one.
    pub fn record(&mut self, key: &str, result: Result<(), UpdateFailure>) {
        match self.slots.get_mut(key) {
            Some(slot) => slot.outcome = Some(result.into()),
            None => tracing::warn!(cycle = %self.cycle, key, "no update slot acquired"),
        }
    }

    /// Fail every slot that has no outcome yet with the cycle's fetch error.
    pub fn fail_all(&mut self, err: FetchError) {
        let failure = UpdateFailure::fetch(err);
        for slot in self.slots.values_mut().filter(|s| s.outcome.is_none()) {
            slot.outcome = Some(SlotOutcome::Failed(failure.clone()));
        }
    }

    /// Finalize all slots and return the cycle's report.
    pub fn finish(mut self) -> CycleReport {
        self.finalize()
    }

    fn finalize(&mut self) -> CycleReport {
        let finished_at = time::now();
        let mut outcomes = BTreeMap::new();
        for (key, slot) in std::mem::take(&mut self.slots) {
            let outcome = slot
                .outcome
                .unwrap_or(SlotOutcome::Failed(UpdateFailure::Interrupted));
            self.ctx.report(&SlotReport {
                cycle: self.cycle,
                device: self.device,
                component: slot.component,
                key: key.clone(),
                started_at: slot.started_at,
                finished_at,
                outcome: outcome.clone(),
            });
            outcomes.insert(key, outcome);
        }
        CycleReport {
            cycle: self.cycle,
            device: self.device,
            outcomes,
        }
    }
}

impl<C: DeviceContext> Drop for MultiComponentUpdate<'_, C> {
    fn drop(&mut self) {
        if !self.slots.is_empty() {
            tracing::warn!(cycle = %self.cycle, "update cycle left early, finalizing open slots");
            self.finalize();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::RecordingContext;
    use wattbridge_domain::error::ComponentUpdateError;

    fn slots(ids: &[u32]) -> Vec<(String, ComponentId)> {
        ids.iter()
            .map(|&id| (format!("component{id}"), ComponentId::new(id)))
            .collect()
    }

    #[test]
    fn should_report_every_slot_once_on_finish() {
        let ctx = RecordingContext::default();
        let mut update = MultiComponentUpdate::begin_with(&ctx, DeviceId::new(1), slots(&[1, 2]));
        update.record("component1", Ok(()));
        update.record("component2", Ok(()));
        let report = update.finish();

        assert_eq!(report.updated(), 2);
        assert_eq!(ctx.reports().len(), 2);
    }

    #[test]
    fn should_report_interrupted_when_dropped_without_finish() {
        let ctx = RecordingContext::default();
        {
            let mut update =
                MultiComponentUpdate::begin_with(&ctx, DeviceId::new(1), slots(&[1, 2]));
            update.record("component1", Ok(()));
        }

        let reports = ctx.reports();
        assert_eq!(reports.len(), 2);
        let second = reports.iter().find(|r| r.key == "component2").unwrap();
        assert!(matches!(
            second.outcome,
            SlotOutcome::Failed(UpdateFailure::Interrupted)
        ));
        let first = reports.iter().find(|r| r.key == "component1").unwrap();
        assert!(first.outcome.is_updated());
    }

    #[test]
    fn should_finalize_slots_when_cycle_panics() {
        let ctx = RecordingContext::default();
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _update = MultiComponentUpdate::begin_with(&ctx, DeviceId::new(1), slots(&[3]));
            panic!("component blew up");
        }));

        assert!(result.is_err());
        assert_eq!(ctx.reports().len(), 1);
    }

    #[test]
    fn should_fail_open_slots_with_fetch_error() {
        let ctx = RecordingContext::default();
        let mut update = MultiComponentUpdate::begin_with(&ctx, DeviceId::new(1), slots(&[1, 2]));
        update.fail_all(FetchError::Timeout {
            url: "http://device".to_string(),
        });
        let report = update.finish();

        assert_eq!(report.failures().count(), 2);
        assert!(
            report
                .failures()
                .all(|(_, f)| matches!(f, UpdateFailure::Fetch(_)))
        );
    }

    #[test]
    fn should_keep_recorded_outcome_when_failing_remaining_slots() {
        let ctx = RecordingContext::default();
        let mut update = MultiComponentUpdate::begin_with(&ctx, DeviceId::new(1), slots(&[1, 2]));
        update.record(
            "component1",
            Err(ComponentUpdateError::NoPowerReading { kind: "bat" }.into()),
        );
        update.fail_all(FetchError::Timeout {
            url: "http://device".to_string(),
        });
        let report = update.finish();

        assert!(matches!(
            report.outcome("component1"),
            Some(SlotOutcome::Failed(UpdateFailure::Component(_)))
        ));
        assert!(matches!(
            report.outcome("component2"),
            Some(SlotOutcome::Failed(UpdateFailure::Fetch(_)))
        ));
    }

    #[test]
    fn should_ignore_outcome_for_unknown_slot() {
        let ctx = RecordingContext::default();
        let mut update = MultiComponentUpdate::begin_with(&ctx, DeviceId::new(1), slots(&[1]));
        update.record("component9", Ok(()));
        let report = update.finish();

        assert_eq!(report.outcomes.len(), 1);
        assert!(report.outcome("component9").is_none());
    }

    #[test]
    fn should_report_nothing_for_empty_cycle() {
        let ctx = RecordingContext::default();
        let update = MultiComponentUpdate::begin_with(&ctx, DeviceId::new(1), Vec::new());
        assert!(update.is_empty());
        let report = update.finish();

        assert!(report.is_empty());
        assert!(ctx.reports().is_empty());
    }

    #[test]
    fn should_stamp_reports_with_cycle_and_device() {
        let ctx = RecordingContext::default();
        let update = MultiComponentUpdate::begin_with(&ctx, DeviceId::new(4), slots(&[1]));
        let cycle = update.cycle();
        drop(update);

        let reports = ctx.reports();
        assert_eq!(reports[0].cycle, cycle);
        assert_eq!(reports[0].device, DeviceId::new(4));
        assert_eq!(reports[0].component, ComponentId::new(1));
        assert!(reports[0].finished_at >= reports[0].started_at);
    }
}
