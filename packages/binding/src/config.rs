//! Binding configuration.

use serde::{Deserialize, Serialize};

use crate::BindingError;

/// When faults are routed to the [`ExceptionSink`](crate::ExceptionSink).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExceptionRouting {
    /// Only when the binding has no listener to observe the fault.
    #[default]
    Unobserved,
    /// For every fault, whether or not a listener saw it.
    Always,
}

/// Process-wide binding configuration, carried by
/// [`BindingServices`](crate::BindingServices).
///
/// # Example
///
/// ```rust
/// use tether_binding::{BindingConfig, ExceptionRouting};
///
/// let config = BindingConfig::from_json(r#"{ "exception_routing": "always" }"#).unwrap();
/// assert_eq!(config.exception_routing, ExceptionRouting::Always);
/// assert!(!config.debug);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BindingConfig {
    pub exception_routing: ExceptionRouting,
    /// Trace every binding to the debug sink, not just those whose target path
    /// carries a debug tag.
    pub debug: bool,
}

impl BindingConfig {
    pub fn from_json(json: &str) -> Result<Self, BindingError> {
        serde_json::from_str(json).map_err(|e| BindingError::Config {
            message: e.to_string(),
        })
    }

    pub fn to_json(&self) -> Result<String, BindingError> {
        serde_json::to_string(self).map_err(|e| BindingError::Config {
            message: e.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_routes_only_unobserved_faults() {
        let config = BindingConfig::default();
        assert_eq!(config.exception_routing, ExceptionRouting::Unobserved);
        assert!(!config.debug);
    }

    #[test]
    fn empty_object_uses_defaults() {
        assert_eq!(BindingConfig::from_json("{}").unwrap(), BindingConfig::default());
    }

    #[test]
    fn parses_all_fields() {
        let config =
            BindingConfig::from_json(r#"{"exception_routing":"always","debug":true}"#).unwrap();
        assert_eq!(config.exception_routing, ExceptionRouting::Always);
        assert!(config.debug);
    }

    #[test]
    fn json_roundtrip() {
        let config = BindingConfig {
            exception_routing: ExceptionRouting::Always,
            debug: true,
        };
        let json = config.to_json().unwrap();
        assert_eq!(BindingConfig::from_json(&json).unwrap(), config);
    }

    #[test]
    fn invalid_json_is_a_config_error() {
        let err = BindingConfig::from_json(r#"{"exception_routing":"sometimes"}"#).unwrap_err();
        assert!(matches!(err, BindingError::Config { .. }));
    }
}
