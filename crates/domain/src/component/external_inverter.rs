//! External inverter component: a second PV inverter metered by the device.

use serde::Deserialize;

use super::{Binding, ComponentKind, SimCounter, bind};
use crate::config::ComponentConfig;
use crate::error::{ComponentUpdateError, InvalidComponentConfig};
use crate::id::{ComponentId, DeviceId};
use crate::payload::RawPayload;
use crate::state::InverterState;
use crate::time::Timestamp;

const POWER: (&str, &str) = ("2913", "3");

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ExternalInverterParams {}

/// Inverter connected behind the device's external meter input.
#[derive(Debug)]
pub struct ExternalInverterComponent {
    binding: Binding,
    sim: SimCounter,
}

impl ExternalInverterComponent {
    /// Default configuration shape for this kind.
    #[must_use]
    pub fn default_config() -> ComponentConfig {
        ComponentConfig::new(
            ComponentId::default(),
            ComponentKind::ExternalInverter.tag(),
            "BatterX external inverter",
        )
    }

    /// Bind an external inverter to `device_id`.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidComponentConfig`] when the configuration is declared
    /// for another type or carries unknown parameters.
    pub fn construct(
        device_id: DeviceId,
        config: ComponentConfig,
    ) -> Result<Self, InvalidComponentConfig> {
        let (binding, ExternalInverterParams {}) =
            bind(ComponentKind::ExternalInverter, device_id, config)?;
        Ok(Self {
            binding,
            sim: SimCounter::default(),
        })
    }

    pub(super) fn binding(&self) -> &Binding {
        &self.binding
    }

    pub(super) fn power(&self, payload: &RawPayload) -> Result<f64, ComponentUpdateError> {
        payload.number(POWER.0, POWER.1).map(|p| -p)
    }

    pub(super) fn update(
        &mut self,
        payload: &RawPayload,
        now: Timestamp,
    ) -> Result<InverterState, ComponentUpdateError> {
        let power = self.power(payload)?;
        let (_, exported) = self.sim.sample(power, now);
        Ok(InverterState { power, exported })
    }
}
