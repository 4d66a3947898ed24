//! Components: the measurement units a device exposes.
//!
//! Every component reads the same current-state payload and maps its own
//! registers onto a [`PublishedState`]. Mapping is pure apart from the
//! simulated energy counter each component keeps in memory.

mod battery;
mod counter;
mod external_inverter;
mod inverter;
mod sim_counter;

pub use battery::BatteryComponent;
pub use counter::CounterComponent;
pub use external_inverter::ExternalInverterComponent;
pub use inverter::InverterComponent;
pub use sim_counter::SimCounter;

use serde::de::DeserializeOwned;

use crate::combine::DerivedState;
use crate::config::ComponentConfig;
use crate::error::{ComponentUpdateError, InvalidComponentConfig};
use crate::id::{ComponentId, DeviceId};
use crate::payload::RawPayload;
use crate::state::PublishedState;
use crate::time::Timestamp;

/// The closed set of component kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComponentKind {
    Battery,
    Counter,
    Inverter,
    ExternalInverter,
}

impl ComponentKind {
    pub const ALL: [Self; 4] = [
        Self::Battery,
        Self::Counter,
        Self::Inverter,
        Self::ExternalInverter,
    ];

    /// Tag used for this kind in configuration files.
    #[must_use]
    pub fn tag(self) -> &'static str {
        match self {
            Self::Battery => "bat",
            Self::Counter => "counter",
            Self::Inverter => "inverter",
            Self::ExternalInverter => "external_inverter",
        }
    }
}

impl std::fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.tag())
    }
}

/// Device and configuration a component instance is bound to.
#[derive(Debug, Clone, PartialEq)]
pub struct Binding {
    pub device_id: DeviceId,
    pub config: ComponentConfig,
}

/// Check the declared tag and parse the type-specific parameters.
fn bind<P: DeserializeOwned>(
    kind: ComponentKind,
    device_id: DeviceId,
    config: ComponentConfig,
) -> Result<(Binding, P), InvalidComponentConfig> {
    if config.component_type != kind.tag() {
        return Err(InvalidComponentConfig::TypeMismatch {
            expected: kind.tag(),
            declared: config.component_type,
        });
    }
    let params = serde_json::from_value(config.configuration.clone())
        .map_err(InvalidComponentConfig::Malformed)?;
    Ok((Binding { device_id, config }, params))
}

/// A constructed component.
#[derive(Debug)]
pub enum Component {
    Battery(BatteryComponent),
    Counter(CounterComponent),
    Inverter(InverterComponent),
    ExternalInverter(ExternalInverterComponent),
}

impl Component {
    #[must_use]
    pub fn kind(&self) -> ComponentKind {
        match self {
            Self::Battery(_) => ComponentKind::Battery,
            Self::Counter(_) => ComponentKind::Counter,
            Self::Inverter(_) => ComponentKind::Inverter,
            Self::ExternalInverter(_) => ComponentKind::ExternalInverter,
        }
    }

    fn binding(&self) -> &Binding {
        match self {
            Self::Battery(c) => c.binding(),
            Self::Counter(c) => c.binding(),
            Self::Inverter(c) => c.binding(),
            Self::ExternalInverter(c) => c.binding(),
        }
    }

    #[must_use]
    pub fn config(&self) -> &ComponentConfig {
        &self.binding().config
    }

    #[must_use]
    pub fn id(&self) -> ComponentId {
        self.binding().config.id
    }

    #[must_use]
    pub fn device_id(&self) -> DeviceId {
        self.binding().device_id
    }

    /// Map the payload onto this component's state.
    ///
    /// # Errors
    ///
    /// Returns [`ComponentUpdateError`] when a register the component needs
    /// is missing or not numeric.
    pub fn update(
        &mut self,
        payload: &RawPayload,
        now: Timestamp,
    ) -> Result<PublishedState, ComponentUpdateError> {
        match self {
            Self::Battery(c) => c.update(payload, now).map(PublishedState::Battery),
            Self::Counter(c) => c.update(payload, now).map(PublishedState::Counter),
            Self::Inverter(c) => c.update(payload, now).map(PublishedState::Inverter),
            Self::ExternalInverter(c) => c.update(payload, now).map(PublishedState::Inverter),
        }
    }

    /// Read the power figure this component contributes to a combined state.
    ///
    /// # Errors
    ///
    /// Returns [`ComponentUpdateError::NoPowerReading`] for kinds that do not
    /// feed a combiner, or a register error from the payload.
    pub fn extract(&self, payload: &RawPayload) -> Result<f64, ComponentUpdateError> {
        match self {
            Self::Inverter(c) => c.power(payload),
            Self::ExternalInverter(c) => c.power(payload),
            other => Err(ComponentUpdateError::NoPowerReading {
                kind: other.kind().tag(),
            }),
        }
    }

    /// Turn a combined reading into this component's published state.
    ///
    /// # Errors
    ///
    /// Returns [`ComponentUpdateError::NoDerivedState`] unless this is an
    /// inverter.
    pub fn apply_derived(
        &mut self,
        derived: DerivedState,
        now: Timestamp,
    ) -> Result<PublishedState, ComponentUpdateError> {
        match self {
            Self::Inverter(c) => Ok(PublishedState::Inverter(c.inverter_state(derived.power, now))),
            other => Err(ComponentUpdateError::NoDerivedState {
                kind: other.kind().tag(),
            }),
        }
    }
}
