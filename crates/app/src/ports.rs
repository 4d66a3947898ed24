//! Port definitions: traits that adapters implement.
//!
//! Ports are the boundaries between the application core and the outside world.
//! They are defined here (in `app`) so that both the use-case layer and the
//! adapter layer can depend on them without creating circular dependencies.

pub mod device_context;
pub mod fetcher;
pub mod status;
pub mod value_store;

pub use device_context::DeviceContext;
pub use fetcher::Fetcher;
pub use status::{SlotOutcome, SlotReport, StatusReporter, UpdateFailure};
pub use value_store::ValueStore;
