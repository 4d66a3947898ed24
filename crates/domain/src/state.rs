//! Published states: what a component hands to the value store.

use serde::{Deserialize, Serialize};

/// Battery reading. Positive power charges the battery.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatState {
    /// Watts.
    pub power: f64,
    /// State of charge in percent.
    pub soc: f64,
    /// Watt-hours charged since start-up.
    pub imported: f64,
    /// Watt-hours discharged since start-up.
    pub exported: f64,
}

/// Grid counter reading. Positive power is drawn from the grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CounterState {
    pub power: f64,
    pub powers: [f64; 3],
    /// Volts per phase.
    pub voltages: [f64; 3],
    /// Hertz.
    pub frequency: f64,
    pub imported: f64,
    pub exported: f64,
}

/// Inverter reading. Generation is reported as negative power.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InverterState {
    pub power: f64,
    /// Watt-hours generated since start-up.
    pub exported: f64,
}

/// Any state a component may publish.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PublishedState {
    Battery(BatState),
    Counter(CounterState),
    Inverter(InverterState),
}

impl PublishedState {
    /// Instantaneous power of the reading, in watts.
    #[must_use]
    pub fn power(&self) -> f64 {
        match self {
            Self::Battery(state) => state.power,
            Self::Counter(state) => state.power,
            Self::Inverter(state) => state.power,
        }
    }
}

/// Severity of a component's last update outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FaultLevel {
    #[default]
    Ok,
    Warning,
    Error,
}

impl std::fmt::Display for FaultLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Ok => f.write_str("ok"),
            Self::Warning => f.write_str("warning"),
            Self::Error => f.write_str("error"),
        }
    }
}

/// Fault state reported for a component when its update slot is finalized.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FaultState {
    pub level: FaultLevel,
    pub message: String,
}

impl FaultState {
    /// The component updated cleanly.
    #[must_use]
    pub fn ok() -> Self {
        Self::default()
    }

    /// The component could not be updated.
    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: FaultLevel::Error,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.level == FaultLevel::Ok
    }
}
