//! # wattbridge-app
//!
//! Application layer: use-cases and **port definitions** (traits).
//!
//! ## Responsibilities
//! - Define **port traits** that adapters must implement (driven/outbound ports):
//!   - `Fetcher`: one bounded request for a device's current state
//!   - `ValueStore`: one-way sink for published component states
//!   - `StatusReporter`: receives the outcome of every update slot
//!   - `DeviceContext`: the bundle of the three a cycle runs against
//! - Provide the **multi-component update** guard that finalizes every slot
//!   exactly once, whichever way a cycle exits
//! - Define **use-cases**:
//!   - `update_device`: one fetch, fan-out to every component
//!   - `read_legacy`: single-shot read with an optional external inverter
//!   - `poll_device`: repeat `update_device` on an interval
//! - Provide **in-process infrastructure** (value store, tracing reporter)
//!
//! ## Dependency rule
//! Depends on `wattbridge-domain` only (plus `tokio` for timers and channels).
//! Never imports adapter crates. Adapters depend on *this* crate, not the reverse.

pub mod ports;
pub mod services;
pub mod status_log;
pub mod update_context;
pub mod value_store;

#[cfg(test)]
mod testing;
