//! Device and component configuration records.
//!
//! Configuration arrives either as a raw mapping (straight out of a config
//! file) or as an already-typed record. Both are accepted and normalized into
//! the typed form before anything is constructed from them.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{InvalidComponentConfig, InvalidDeviceConfig};
use crate::id::{ComponentId, DeviceId};

/// Connection settings of a device.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceConfiguration {
    /// Host or `host:port` of the device's local API.
    pub ip_address: Option<String>,
}

/// Configuration of one physical device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceConfig {
    pub id: DeviceId,
    pub name: String,
    #[serde(rename = "type")]
    pub device_type: String,
    pub configuration: DeviceConfiguration,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            id: DeviceId::default(),
            name: "BatterX".to_string(),
            device_type: "batterx".to_string(),
            configuration: DeviceConfiguration::default(),
        }
    }
}

impl DeviceConfig {
    /// Build a default configuration pointing at `ip_address`.
    #[must_use]
    pub fn with_address(ip_address: impl Into<String>) -> Self {
        Self {
            configuration: DeviceConfiguration {
                ip_address: Some(ip_address.into()),
            },
            ..Self::default()
        }
    }

    /// The configured address, if it is present and non-empty.
    #[must_use]
    pub fn address(&self) -> Option<&str> {
        self.configuration
            .ip_address
            .as_deref()
            .map(str::trim)
            .filter(|addr| !addr.is_empty())
    }
}

/// Either form a device configuration may arrive in.
#[derive(Debug, Clone)]
pub enum DeviceConfigInput {
    Raw(Value),
    Typed(DeviceConfig),
}

impl DeviceConfigInput {
    /// Normalize into a typed configuration with a usable address.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidDeviceConfig::Malformed`] when a raw mapping does not
    /// fit the shape, or [`InvalidDeviceConfig::MissingAddress`] when no
    /// address is configured.
    pub fn normalize(self) -> Result<DeviceConfig, InvalidDeviceConfig> {
        let config = match self {
            Self::Raw(value) => {
                serde_json::from_value(value).map_err(InvalidDeviceConfig::Malformed)?
            }
            Self::Typed(config) => config,
        };
        if config.address().is_none() {
            return Err(InvalidDeviceConfig::MissingAddress { name: config.name });
        }
        Ok(config)
    }
}

impl From<Value> for DeviceConfigInput {
    fn from(value: Value) -> Self {
        Self::Raw(value)
    }
}

impl From<DeviceConfig> for DeviceConfigInput {
    fn from(config: DeviceConfig) -> Self {
        Self::Typed(config)
    }
}

/// Configuration of one component on a device.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentConfig {
    pub id: ComponentId,
    #[serde(rename = "type")]
    pub component_type: String,
    #[serde(default)]
    pub name: String,
    /// Type-specific parameters, validated by the component's factory.
    #[serde(default = "empty_object")]
    pub configuration: Value,
}

fn empty_object() -> Value {
    Value::Object(serde_json::Map::new())
}

impl ComponentConfig {
    /// Build a configuration with an empty parameter set.
    #[must_use]
    pub fn new(id: ComponentId, component_type: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id,
            component_type: component_type.into(),
            name: name.into(),
            configuration: empty_object(),
        }
    }
}

/// Either form a component configuration may arrive in.
#[derive(Debug, Clone)]
pub enum ComponentConfigInput {
    Raw(Value),
    Typed(ComponentConfig),
}

impl ComponentConfigInput {
    /// The declared type tag.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidComponentConfig::MissingField`] when a raw mapping
    /// carries no string `type`.
    pub fn type_tag(&self) -> Result<&str, InvalidComponentConfig> {
        match self {
            Self::Raw(value) => value
                .get("type")
                .and_then(Value::as_str)
                .ok_or(InvalidComponentConfig::MissingField("type")),
            Self::Typed(config) => Ok(&config.component_type),
        }
    }

    /// Normalize into the typed record.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidComponentConfig::MissingField`] when `id` or `type`
    /// is absent, or [`InvalidComponentConfig::Malformed`] when the mapping
    /// does not fit the record shape.
    pub fn normalize(self) -> Result<ComponentConfig, InvalidComponentConfig> {
        match self {
            Self::Raw(value) => {
                if value.get("id").is_none() {
                    return Err(InvalidComponentConfig::MissingField("id"));
                }
                if value.get("type").is_none() {
                    return Err(InvalidComponentConfig::MissingField("type"));
                }
                serde_json::from_value(value).map_err(InvalidComponentConfig::Malformed)
            }
            Self::Typed(config) => Ok(config),
        }
    }
}

impl From<Value> for ComponentConfigInput {
    fn from(value: Value) -> Self {
        Self::Raw(value)
    }
}

impl From<ComponentConfig> for ComponentConfigInput {
    fn from(config: ComponentConfig) -> Self {
        Self::Typed(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn should_normalize_raw_device_config() {
        let input = DeviceConfigInput::from(json!({
            "id": 2,
            "name": "Garage",
            "configuration": {"ip_address": "192.168.1.50"}
        }));
        let config = input.normalize().unwrap();
        assert_eq!(config.id, DeviceId::new(2));
        assert_eq!(config.name, "Garage");
        assert_eq!(config.device_type, "batterx");
        assert_eq!(config.address(), Some("192.168.1.50"));
    }

    #[test]
    fn should_reject_device_without_address() {
        let input = DeviceConfigInput::from(DeviceConfig::default());
        assert!(matches!(
            input.normalize(),
            Err(InvalidDeviceConfig::MissingAddress { .. })
        ));
    }

    #[test]
    fn should_reject_blank_address() {
        let input = DeviceConfigInput::from(DeviceConfig::with_address("  "));
        assert!(matches!(
            input.normalize(),
            Err(InvalidDeviceConfig::MissingAddress { .. })
        ));
    }

    #[test]
    fn should_reject_malformed_raw_device_config() {
        let input = DeviceConfigInput::from(json!({"id": "not-a-number"}));
        assert!(matches!(
            input.normalize(),
            Err(InvalidDeviceConfig::Malformed(_))
        ));
    }

    #[test]
    fn should_read_type_tag_from_raw_mapping() {
        let input = ComponentConfigInput::from(json!({"id": 1, "type": "bat"}));
        assert_eq!(input.type_tag().unwrap(), "bat");
    }

    #[test]
    fn should_read_type_tag_from_typed_config() {
        let input = ComponentConfigInput::from(ComponentConfig::new(
            ComponentId::new(1),
            "counter",
            "Grid",
        ));
        assert_eq!(input.type_tag().unwrap(), "counter");
    }

    #[test]
    fn should_report_missing_type() {
        let input = ComponentConfigInput::from(json!({"id": 1}));
        assert!(matches!(
            input.type_tag(),
            Err(InvalidComponentConfig::MissingField("type"))
        ));
    }

    #[test]
    fn should_report_missing_id() {
        let input = ComponentConfigInput::from(json!({"type": "bat"}));
        assert!(matches!(
            input.normalize(),
            Err(InvalidComponentConfig::MissingField("id"))
        ));
    }

    #[test]
    fn should_default_configuration_to_empty_object() {
        let config = ComponentConfigInput::from(json!({"id": 3, "type": "bat"}))
            .normalize()
            .unwrap();
        assert_eq!(config.configuration, json!({}));
        assert_eq!(config.name, "");
    }

    #[test]
    fn should_report_malformed_id() {
        let input = ComponentConfigInput::from(json!({"id": -1, "type": "bat"}));
        assert!(matches!(
            input.normalize(),
            Err(InvalidComponentConfig::Malformed(_))
        ));
    }
}
