//! Grid counter (meter) component.

use serde::Deserialize;

use super::{Binding, ComponentKind, SimCounter, bind};
use crate::config::ComponentConfig;
use crate::error::{ComponentUpdateError, InvalidComponentConfig};
use crate::id::{ComponentId, DeviceId};
use crate::payload::RawPayload;
use crate::state::CounterState;
use crate::time::Timestamp;

const POWER: (&str, &str) = ("2913", "0");
const FREQUENCY: (&str, &str) = ("2914", "0");
const PHASE_POWER: &str = "2897";
const PHASE_VOLTAGE: &str = "2833";
const PHASES: [&str; 3] = ["1", "2", "3"];

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct CounterParams {}

/// Grid meter measured by the device.
#[derive(Debug)]
pub struct CounterComponent {
    binding: Binding,
    sim: SimCounter,
}

impl CounterComponent {
    /// Default configuration shape for this kind.
    #[must_use]
    pub fn default_config() -> ComponentConfig {
        ComponentConfig::new(ComponentId::default(), ComponentKind::Counter.tag(), "BatterX counter")
    }

    /// Bind a counter to `device_id`.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidComponentConfig`] when the configuration is declared
    /// for another type or carries unknown parameters.
    pub fn construct(
        device_id: DeviceId,
        config: ComponentConfig,
    ) -> Result<Self, InvalidComponentConfig> {
        let (binding, CounterParams {}) = bind(ComponentKind::Counter, device_id, config)?;
        Ok(Self {
            binding,
            sim: SimCounter::default(),
        })
    }

    pub(super) fn binding(&self) -> &Binding {
        &self.binding
    }

    pub(super) fn update(
        &mut self,
        payload: &RawPayload,
        now: Timestamp,
    ) -> Result<CounterState, ComponentUpdateError> {
        let power = payload.number(POWER.0, POWER.1)?;
        // centihertz and centivolts on the wire
        let frequency = payload.number(FREQUENCY.0, FREQUENCY.1)? / 100.0;

        let mut powers = [0.0; 3];
        let mut voltages = [0.0; 3];
        for (i, &phase) in PHASES.iter().enumerate() {
            powers[i] = payload.number(PHASE_POWER, phase)?;
            voltages[i] = payload.number(PHASE_VOLTAGE, phase)? / 100.0;
        }

        let (imported, exported) = self.sim.sample(power, now);
        Ok(CounterState {
            power,
            powers,
            voltages,
            frequency,
            imported,
            exported,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::now;
    use serde_json::json;

    fn counter() -> CounterComponent {
        CounterComponent::construct(DeviceId::new(1), CounterComponent::default_config()).unwrap()
    }

    #[test]
    fn should_scale_frequency_and_voltages() {
        let payload = RawPayload::new(json!({
            "2913": {"0": 1200},
            "2914": {"0": 5001},
            "2897": {"1": 400, "2": 400, "3": 400},
            "2833": {"1": 23010, "2": 23120, "3": 22980}
        }));
        let state = counter().update(&payload, now()).unwrap();
        assert!((state.power - 1200.0).abs() < f64::EPSILON);
        assert!((state.frequency - 50.01).abs() < 1e-9);
        assert!((state.voltages[0] - 230.1).abs() < 1e-9);
        assert!((state.voltages[2] - 229.8).abs() < 1e-9);
        assert_eq!(state.powers, [400.0, 400.0, 400.0]);
    }

    #[test]
    fn should_fail_when_a_phase_is_missing() {
        let payload = RawPayload::new(json!({
            "2913": {"0": 1200},
            "2914": {"0": 5000},
            "2897": {"1": 400, "2": 400},
            "2833": {"1": 23000, "2": 23000, "3": 23000}
        }));
        assert_eq!(
            counter().update(&payload, now()),
            Err(ComponentUpdateError::MissingRegister {
                register: "2897",
                channel: "3"
            })
        );
    }
}
