//! Application services: use-case implementations.
//!
//! Each service is generic over the [`DeviceContext`](crate::ports::DeviceContext)
//! it runs against, keeping this layer decoupled from concrete adapters.

pub mod device_update;
pub mod host_context;
pub mod legacy;
pub mod poller;
