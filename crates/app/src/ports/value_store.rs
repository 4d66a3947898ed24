//! Value store port: where component states are published.

use wattbridge_domain::id::ComponentId;
use wattbridge_domain::state::PublishedState;

/// One-way sink for component states, keyed by component id.
///
/// Publishing never fails from the caller's point of view and nothing is
/// read back.
pub trait ValueStore {
    fn publish(&self, id: ComponentId, state: PublishedState);
}

impl<T: ValueStore + ?Sized> ValueStore for std::sync::Arc<T> {
    fn publish(&self, id: ComponentId, state: PublishedState) {
        (**self).publish(id, state);
    }
}
