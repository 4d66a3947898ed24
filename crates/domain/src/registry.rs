//! Component type registry: maps wire type tags to factories.
//!
//! The built-in registry is created on first use and never mutated after
//! that. Code that needs a different set of types (tests, partial setups)
//! builds its own [`ComponentRegistry`] instead.

use std::collections::BTreeMap;
use std::sync::{Arc, LazyLock};

use crate::component::{
    BatteryComponent, Component, ComponentKind, CounterComponent, ExternalInverterComponent,
    InverterComponent,
};
use crate::config::{ComponentConfig, ComponentConfigInput};
use crate::error::{InvalidComponentConfig, UnknownComponentType, WattbridgeError};
use crate::id::DeviceId;

/// Builds a component bound to a device. Must not perform IO.
pub type ComponentFactory =
    fn(DeviceId, ComponentConfig) -> Result<Component, InvalidComponentConfig>;

/// Produces the default configuration shape for a type.
pub type ConfigShape = fn() -> ComponentConfig;

/// What is registered under one tag.
#[derive(Debug, Clone, Copy)]
pub struct Registration {
    pub factory: ComponentFactory,
    pub config_shape: ConfigShape,
}

static BUILTIN: LazyLock<Arc<ComponentRegistry>> =
    LazyLock::new(|| Arc::new(ComponentRegistry::with_builtin_types()));

/// Registry of known component types.
#[derive(Debug, Clone, Default)]
pub struct ComponentRegistry {
    entries: BTreeMap<String, Registration>,
}

impl ComponentRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry holding every built-in component kind.
    #[must_use]
    pub fn with_builtin_types() -> Self {
        let mut registry = Self::new();
        for kind in ComponentKind::ALL {
            let (factory, config_shape): (ComponentFactory, ConfigShape) = match kind {
                ComponentKind::Battery => (
                    |d, c| BatteryComponent::construct(d, c).map(Component::Battery),
                    BatteryComponent::default_config,
                ),
                ComponentKind::Counter => (
                    |d, c| CounterComponent::construct(d, c).map(Component::Counter),
                    CounterComponent::default_config,
                ),
                ComponentKind::Inverter => (
                    |d, c| InverterComponent::construct(d, c).map(Component::Inverter),
                    InverterComponent::default_config,
                ),
                ComponentKind::ExternalInverter => (
                    |d, c| {
                        ExternalInverterComponent::construct(d, c)
                            .map(Component::ExternalInverter)
                    },
                    ExternalInverterComponent::default_config,
                ),
            };
            registry.register(kind.tag(), factory, config_shape);
        }
        registry
    }

    /// The process-wide registry of built-in types.
    #[must_use]
    pub fn builtin() -> Arc<Self> {
        Arc::clone(&BUILTIN)
    }

    /// Register `tag`, replacing any previous registration.
    pub fn register(
        &mut self,
        tag: impl Into<String>,
        factory: ComponentFactory,
        config_shape: ConfigShape,
    ) {
        self.entries.insert(
            tag.into(),
            Registration {
                factory,
                config_shape,
            },
        );
    }

    /// Registered tags in sorted order.
    #[must_use]
    pub fn tags(&self) -> Vec<String> {
        self.entries.keys().cloned().collect()
    }

    /// Look up the registration for `tag`.
    ///
    /// # Errors
    ///
    /// Returns [`UnknownComponentType`] listing every registered tag when
    /// `tag` is absent.
    pub fn resolve(&self, tag: &str) -> Result<&Registration, UnknownComponentType> {
        self.entries.get(tag).ok_or_else(|| UnknownComponentType {
            tag: tag.to_string(),
            known: self.tags(),
        })
    }

    /// Default configuration for `tag`.
    ///
    /// # Errors
    ///
    /// Returns [`UnknownComponentType`] when `tag` is absent.
    pub fn default_config(&self, tag: &str) -> Result<ComponentConfig, UnknownComponentType> {
        self.resolve(tag).map(|reg| (reg.config_shape)())
    }

    /// Resolve, normalize and construct a component in one step.
    ///
    /// # Errors
    ///
    /// Returns [`WattbridgeError::UnknownComponentType`] when the declared
    /// type is not registered and [`WattbridgeError::InvalidComponentConfig`]
    /// when normalization or the factory fails.
    pub fn construct(
        &self,
        device_id: DeviceId,
        input: impl Into<ComponentConfigInput>,
    ) -> Result<Component, WattbridgeError> {
        let input = input.into();
        let registration = self.resolve(input.type_tag()?)?;
        let config = input.normalize()?;
        Ok((registration.factory)(device_id, config)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::id::ComponentId;
    use serde_json::json;

    #[test]
    fn should_register_all_builtin_kinds() {
        assert_eq!(
            ComponentRegistry::builtin().tags(),
            ["bat", "counter", "external_inverter", "inverter"]
        );
    }

    #[test]
    fn should_list_known_tags_when_resolving_unknown_type() {
        let err = ComponentRegistry::builtin().resolve("heatpump").unwrap_err();
        assert_eq!(err.tag, "heatpump");
        assert_eq!(
            err.to_string(),
            "illegal component type heatpump. Allowed values: bat,counter,external_inverter,inverter"
        );
    }

    #[test]
    fn should_construct_from_raw_mapping() {
        let component = ComponentRegistry::builtin()
            .construct(DeviceId::new(1), json!({"id": 3, "type": "bat"}))
            .unwrap();
        assert_eq!(component.kind(), ComponentKind::Battery);
        assert_eq!(component.id(), ComponentId::new(3));
    }

    #[test]
    fn should_construct_from_typed_config() {
        let config = ComponentConfig::new(ComponentId::new(2), "inverter", "Roof");
        let component = ComponentRegistry::builtin()
            .construct(DeviceId::new(1), config)
            .unwrap();
        assert_eq!(component.kind(), ComponentKind::Inverter);
        assert_eq!(component.config().name, "Roof");
    }

    #[test]
    fn should_fail_for_unregistered_type_in_custom_registry() {
        let mut registry = ComponentRegistry::new();
        registry.register(
            "bat",
            |d, c| BatteryComponent::construct(d, c).map(Component::Battery),
            BatteryComponent::default_config,
        );
        let result = registry.construct(DeviceId::new(1), json!({"id": 1, "type": "counter"}));
        match result {
            Err(WattbridgeError::UnknownComponentType(err)) => assert_eq!(err.known, ["bat"]),
            other => panic!("expected unknown type, got {other:?}"),
        }
    }

    #[test]
    fn should_reject_invalid_config_before_construction() {
        let result =
            ComponentRegistry::builtin().construct(DeviceId::new(1), json!({"type": "counter"}));
        assert!(matches!(
            result,
            Err(WattbridgeError::InvalidComponentConfig(
                InvalidComponentConfig::MissingField("id")
            ))
        ));
    }

    #[test]
    fn should_produce_default_config_shape() {
        let config = ComponentRegistry::builtin()
            .default_config("external_inverter")
            .unwrap();
        assert_eq!(config.component_type, "external_inverter");
        assert_eq!(config.configuration, json!({}));
    }
}
