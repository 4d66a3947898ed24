//! Battery storage component.

use serde::Deserialize;

use super::{Binding, ComponentKind, SimCounter, bind};
use crate::config::ComponentConfig;
use crate::error::{ComponentUpdateError, InvalidComponentConfig};
use crate::id::{ComponentId, DeviceId};
use crate::payload::RawPayload;
use crate::state::BatState;
use crate::time::Timestamp;

const POWER: (&str, &str) = ("1121", "1");
const SOC: (&str, &str) = ("1074", "1");

/// Battery-specific parameters. None are defined yet.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct BatteryParams {}

/// Battery attached to the device.
#[derive(Debug)]
pub struct BatteryComponent {
    binding: Binding,
    sim: SimCounter,
}

impl BatteryComponent {
    /// Default configuration shape for this kind.
    #[must_use]
    pub fn default_config() -> ComponentConfig {
        ComponentConfig::new(ComponentId::default(), ComponentKind::Battery.tag(), "BatterX battery")
    }

    /// Bind a battery to `device_id`.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidComponentConfig`] when the configuration is declared
    /// for another type or carries unknown parameters.
    pub fn construct(
        device_id: DeviceId,
        config: ComponentConfig,
    ) -> Result<Self, InvalidComponentConfig> {
        let (binding, BatteryParams {}) = bind(ComponentKind::Battery, device_id, config)?;
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
    ) -> Result<BatState, ComponentUpdateError> {
        let power = payload.number(POWER.0, POWER.1)?;
        let soc = payload.number(SOC.0, SOC.1)?;
        let (imported, exported) = self.sim.sample(power, now);
        Ok(BatState {
            power,
            soc,
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

    fn battery() -> BatteryComponent {
        let mut config = BatteryComponent::default_config();
        config.id = ComponentId::new(3);
        BatteryComponent::construct(DeviceId::new(1), config).unwrap()
    }

    #[test]
    fn should_read_power_and_soc() {
        let payload = RawPayload::new(json!({"1121": {"1": -640}, "1074": {"1": 72}}));
        let state = battery().update(&payload, now()).unwrap();
        assert!((state.power + 640.0).abs() < f64::EPSILON);
        assert!((state.soc - 72.0).abs() < f64::EPSILON);
    }

    #[test]
    fn should_fail_without_soc_register() {
        let payload = RawPayload::new(json!({"1121": {"1": 100}}));
        assert_eq!(
            battery().update(&payload, now()),
            Err(ComponentUpdateError::MissingRegister {
                register: "1074",
                channel: "1"
            })
        );
    }
}
