//! Derived-value combiner.
//!
//! A hybrid inverter and an external inverter behind the same device report
//! their power separately; the host sees one inverter whose power is the sum
//! of both. Both readings must come from the same moment in time, which this
//! function cannot check.

use serde::{Deserialize, Serialize};

/// Combined reading of two power sources.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DerivedState {
    /// Watts.
    pub power: f64,
}

/// Combine two power readings into one derived state.
#[must_use]
pub fn combine(reading_a: f64, reading_b: f64) -> DerivedState {
    DerivedState {
        power: reading_a + reading_b,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_sum_both_readings() {
        assert_eq!(combine(-1500.0, -300.0), DerivedState { power: -1800.0 });
    }

    #[test]
    fn should_return_same_state_for_same_inputs() {
        assert_eq!(combine(5.0, 3.0), combine(5.0, 3.0));
    }

    #[test]
    fn should_be_commutative() {
        assert_eq!(combine(5.0, 3.0), combine(3.0, 5.0));
    }

    #[test]
    fn should_keep_first_reading_when_second_is_zero() {
        assert_eq!(combine(-420.0, 0.0).power, -420.0);
    }
}
