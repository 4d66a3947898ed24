//! Hybrid inverter component.

use serde::Deserialize;

use super::{Binding, ComponentKind, SimCounter, bind};
use crate::config::ComponentConfig;
use crate::error::{ComponentUpdateError, InvalidComponentConfig};
use crate::id::{ComponentId, DeviceId};
use crate::payload::RawPayload;
use crate::state::InverterState;
use crate::time::Timestamp;

const POWER: (&str, &str) = ("1634", "0");

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct InverterParams {}

/// PV inverter built into the device.
#[derive(Debug)]
pub struct InverterComponent {
    binding: Binding,
    sim: SimCounter,
}

impl InverterComponent {
    /// Default configuration shape for this kind.
    #[must_use]
    pub fn default_config() -> ComponentConfig {
        ComponentConfig::new(ComponentId::default(), ComponentKind::Inverter.tag(), "BatterX inverter")
    }

    /// Bind an inverter to `device_id`.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidComponentConfig`] when the configuration is declared
    /// for another type or carries unknown parameters.
    pub fn construct(
        device_id: DeviceId,
        config: ComponentConfig,
    ) -> Result<Self, InvalidComponentConfig> {
        let (binding, InverterParams {}) = bind(ComponentKind::Inverter, device_id, config)?;
        Ok(Self {
            binding,
            sim: SimCounter::default(),
        })
    }

    pub(super) fn binding(&self) -> &Binding {
        &self.binding
    }

    /// Generated power as a negative number of watts.
    pub(super) fn power(&self, payload: &RawPayload) -> Result<f64, ComponentUpdateError> {
        payload.number(POWER.0, POWER.1).map(|p| -p)
    }

    pub(super) fn inverter_state(&mut self, power: f64, now: Timestamp) -> InverterState {
        let (_, exported) = self.sim.sample(power, now);
        InverterState { power, exported }
    }

    pub(super) fn update(
        &mut self,
        payload: &RawPayload,
        now: Timestamp,
    ) -> Result<InverterState, ComponentUpdateError> {
        let power = self.power(payload)?;
        Ok(self.inverter_state(power, now))
    }
}
