//! # Loader Configuration
//!
//! Configuration parsed from host-provided JSON.

use serde::{Deserialize, Serialize};

/// Asset loader configuration
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LoaderConfig {
    /// Start with diagnostics enabled
    pub enable_diagnostics: bool,

    /// Upper bound for `create_instanced_asset`
    pub max_instances: u32,

    /// Register node names with the name registry
    pub register_names: bool,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            enable_diagnostics: false,
            max_instances: 1024,
            register_names: true,
        }
    }
}

impl LoaderConfig {
    /// Parse config from bytes (JSON)
    pub fn from_bytes(data: &[u8]) -> Result<Self, serde_json::Error> {
        if data.is_empty() {
            log::warn!("Empty loader config, using defaults");
            return Ok(Self::default());
        }

        serde_json::from_slice(data)
    }

    /// Serialize to bytes
    pub fn to_bytes(&self) -> Vec<u8> {
        serde_json::to_vec(self).unwrap_or_default()
    }
}

/// Ubershader provider configuration
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct UbershaderConfig {
    /// Build archetypes for clearcoat, sheen, transmission and volume.
    /// When off, those requirements are stripped from incoming keys.
    pub enable_extensions: bool,
}

impl Default for UbershaderConfig {
    fn default() -> Self {
        Self { enable_extensions: true }
    }
}

impl UbershaderConfig {
    pub fn from_bytes(data: &[u8]) -> Result<Self, serde_json::Error> {
        if data.is_empty() {
            log::warn!("Empty ubershader config, using defaults");
            return Ok(Self::default());
        }

        serde_json::from_slice(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_bytes_give_defaults() {
        let config = LoaderConfig::from_bytes(b"").unwrap();
        assert_eq!(config, LoaderConfig::default());
        assert_eq!(config.max_instances, 1024);
        assert!(config.register_names);
    }

    #[test]
    fn test_partial_json_keeps_other_defaults() {
        let config = LoaderConfig::from_bytes(br#"{"maxInstances": 8}"#).unwrap();
        assert_eq!(config.max_instances, 8);
        assert!(!config.enable_diagnostics);
        assert!(config.register_names);
    }

    #[test]
    fn test_bytes_round_trip() {
        let config = LoaderConfig {
            enable_diagnostics: true,
            max_instances: 3,
            register_names: false,
        };
        let parsed = LoaderConfig::from_bytes(&config.to_bytes()).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_malformed_json_is_rejected() {
        assert!(LoaderConfig::from_bytes(b"{not json").is_err());
        assert!(UbershaderConfig::from_bytes(b"[]").is_err());
    }

    #[test]
    fn test_ubershader_extensions_flag() {
        let config = UbershaderConfig::from_bytes(br#"{"enableExtensions": false}"#).unwrap();
        assert!(!config.enable_extensions);
        assert!(UbershaderConfig::default().enable_extensions);
    }
}
