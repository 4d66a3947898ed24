//! Raw payload: the document a device returns for one update cycle.
//!
//! The current-state document is keyed by register code, then by channel
//! index:
//!
//! ```json
//! { "1121": { "1": 1500 }, "1074": { "1": 87 } }
//! ```
//!
//! A payload lives for one cycle and is lent to every component by shared
//! reference. It is intentionally not `Clone`.

use serde_json::Value;

use crate::error::ComponentUpdateError;

/// Read-only structured document fetched from a device.
#[derive(Debug, PartialEq)]
pub struct RawPayload(Value);

impl RawPayload {
    /// Wrap an already-decoded document.
    #[must_use]
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    /// Borrow the underlying document.
    #[must_use]
    pub fn as_value(&self) -> &Value {
        &self.0
    }

    /// Read a numeric value at `register/channel`.
    ///
    /// # Errors
    ///
    /// Returns [`ComponentUpdateError::MissingRegister`] when either key is
    /// absent and [`ComponentUpdateError::NotNumeric`] when the value is not a
    /// JSON number.
    pub fn number(
        &self,
        register: &'static str,
        channel: &'static str,
    ) -> Result<f64, ComponentUpdateError> {
        let value = self
            .0
            .get(register)
            .and_then(|channels| channels.get(channel))
            .ok_or(ComponentUpdateError::MissingRegister { register, channel })?;

        value
            .as_f64()
            .ok_or(ComponentUpdateError::NotNumeric { register, channel })
    }
}

impl From<Value> for RawPayload {
    fn from(value: Value) -> Self {
        Self::new(value)
    }
}
