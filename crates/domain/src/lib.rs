//! # wattbridge-domain
//!
//! Pure domain model for reading multi-component energy devices.
//!
//! ## Responsibilities
//! - Foundational types: typed identifiers, error taxonomy, timestamps
//! - Define the **raw payload** a device returns for one update cycle
//! - Define **components** (battery, counter, inverter, external inverter)
//!   and how each maps a payload onto its published state
//! - Define the **component registry** that turns a wire type tag into a
//!   constructed component
//! - Define the **device** aggregate owning a keyed set of components
//! - Define the **combiner** that derives one state from two readings
//!
//! ## Dependency rule
//! This crate has **no internal dependencies**.
//! It must never import anything from `app`, adapters, or external IO crates.
//! All IO boundaries are expressed as traits in the `app` crate (ports).

pub mod error;
pub mod id;
pub mod time;

pub mod combine;
pub mod component;
pub mod config;
pub mod device;
pub mod payload;
pub mod registry;
pub mod state;
