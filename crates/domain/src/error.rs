//! Error taxonomy shared across the workspace.
//!
//! Construction-time errors ([`UnknownComponentType`],
//! [`InvalidComponentConfig`], [`InvalidDeviceConfig`]) propagate to whoever
//! configures a device. Cycle-time errors ([`FetchError`],
//! [`ComponentUpdateError`]) are contained by the update transaction and
//! reported per component instead of being returned further.

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Top-level error, each layer converts into it via `#[from]`.
#[derive(Debug, thiserror::Error)]
pub enum WattbridgeError {
    #[error("unknown component type")]
    UnknownComponentType(#[from] UnknownComponentType),

    #[error("invalid component configuration")]
    InvalidComponentConfig(#[from] InvalidComponentConfig),

    #[error("invalid device configuration")]
    InvalidDeviceConfig(#[from] InvalidDeviceConfig),

    #[error("fetch failed")]
    Fetch(#[from] FetchError),

    #[error("component update failed")]
    ComponentUpdate(#[from] ComponentUpdateError),
}

/// A configuration names a component type that is not registered.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("illegal component type {tag}. Allowed values: {}", known.join(","))]
pub struct UnknownComponentType {
    /// The tag that failed to resolve.
    pub tag: String,
    /// Tags registered at the time of the lookup, sorted.
    pub known: Vec<String>,
}

/// A component configuration could not be normalized.
#[derive(Debug, thiserror::Error)]
pub enum InvalidComponentConfig {
    /// A required field is absent from a raw mapping.
    #[error("component configuration is missing field `{0}`")]
    MissingField(&'static str),

    /// The mapping does not match the configuration shape of its type.
    #[error("component configuration does not match its type")]
    Malformed(#[source] serde_json::Error),

    /// A factory received a configuration declared for another type.
    #[error("factory for `{expected}` cannot build a `{declared}` component")]
    TypeMismatch {
        expected: &'static str,
        declared: String,
    },
}

/// A device configuration could not be normalized.
#[derive(Debug, thiserror::Error)]
pub enum InvalidDeviceConfig {
    #[error("device configuration does not match its shape")]
    Malformed(#[source] serde_json::Error),

    #[error("device `{name}` has no ip address configured")]
    MissingAddress { name: String },
}

/// The per-cycle network request failed; no component can be updated.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("request to {url} timed out")]
    Timeout { url: String },

    #[error("request to {url} failed")]
    Transport {
        url: String,
        #[source]
        source: BoxError,
    },

    #[error("request to {url} returned status {status}")]
    Status { url: String, status: u16 },

    #[error("response from {url} is not a valid document")]
    Decode {
        url: String,
        #[source]
        source: BoxError,
    },
}

/// A single component could not map the payload onto its state.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ComponentUpdateError {
    #[error("register {register}/{channel} missing from payload")]
    MissingRegister {
        register: &'static str,
        channel: &'static str,
    },

    #[error("register {register}/{channel} is not numeric")]
    NotNumeric {
        register: &'static str,
        channel: &'static str,
    },

    #[error("`{kind}` components provide no power reading")]
    NoPowerReading { kind: &'static str },

    #[error("`{kind}` components cannot apply a derived state")]
    NoDerivedState { kind: &'static str },
}
