//! Device: one physical endpoint exposing a keyed set of components.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::component::Component;
use crate::config::{ComponentConfigInput, DeviceConfig, DeviceConfigInput};
use crate::error::{InvalidDeviceConfig, WattbridgeError};
use crate::id::{ComponentId, DeviceId};
use crate::registry::ComponentRegistry;

/// Key a component is stored under.
#[must_use]
pub fn component_key(id: ComponentId) -> String {
    format!("component{id}")
}

/// A configured device and the components bound to it.
#[derive(Debug)]
pub struct Device {
    config: DeviceConfig,
    address: String,
    registry: Arc<ComponentRegistry>,
    components: BTreeMap<String, Component>,
}

impl Device {
    /// Create a device using the built-in component registry.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidDeviceConfig`] when the configuration cannot be
    /// normalized or carries no address.
    pub fn new(config: impl Into<DeviceConfigInput>) -> Result<Self, InvalidDeviceConfig> {
        Self::with_registry(config, ComponentRegistry::builtin())
    }

    /// Create a device resolving component types through `registry`.
    ///
    /// # Errors
    ///
    /// Same as [`Device::new`].
    pub fn with_registry(
        config: impl Into<DeviceConfigInput>,
        registry: Arc<ComponentRegistry>,
    ) -> Result<Self, InvalidDeviceConfig> {
        let config = config.into().normalize()?;
        let address = config
            .address()
            .map(str::to_string)
            .ok_or_else(|| InvalidDeviceConfig::MissingAddress {
                name: config.name.clone(),
            })?;
        Ok(Self {
            config,
            address,
            registry,
            components: BTreeMap::new(),
        })
    }

    #[must_use]
    pub fn id(&self) -> DeviceId {
        self.config.id
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.config.name
    }

    #[must_use]
    pub fn config(&self) -> &DeviceConfig {
        &self.config
    }

    /// Address the device's local API is reachable at.
    #[must_use]
    pub fn address(&self) -> &str {
        &self.address
    }

    /// Resolve, construct and store a component.
    ///
    /// A component with the same id replaces the previous one. On error the
    /// component collection is left untouched.
    ///
    /// # Errors
    ///
    /// Returns [`WattbridgeError::UnknownComponentType`] for unregistered
    /// types and [`WattbridgeError::InvalidComponentConfig`] when the
    /// configuration cannot be normalized or constructed.
    pub fn add_component(
        &mut self,
        config: impl Into<ComponentConfigInput>,
    ) -> Result<ComponentId, WattbridgeError> {
        let component = self.registry.construct(self.config.id, config)?;
        let id = component.id();
        self.components.insert(component_key(id), component);
        Ok(id)
    }

    /// Components keyed by `component<id>`.
    #[must_use]
    pub fn components(&self) -> &BTreeMap<String, Component> {
        &self.components
    }

    #[must_use]
    pub fn component(&self, key: &str) -> Option<&Component> {
        self.components.get(key)
    }

    pub fn component_mut(&mut self, key: &str) -> Option<&mut Component> {
        self.components.get_mut(key)
    }

    pub fn components_mut(&mut self) -> impl Iterator<Item = (&String, &mut Component)> {
        self.components.iter_mut()
    }

    /// Whether at least one component has been added.
    #[must_use]
    pub fn is_configured(&self) -> bool {
        !self.components.is_empty()
    }
}
