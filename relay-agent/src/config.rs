// ABOUTME: Backend configuration with a type discriminator and pass-through table.
// ABOUTME: The flattened remainder goes verbatim to the backend factory.

use serde::{Deserialize, Serialize};

/// Backend configuration with type discriminator
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Backend type: "process", "mock", etc.
    #[serde(rename = "type")]
    pub backend_type: String,

    /// Remaining fields passed to the backend factory
    #[serde(flatten)]
    pub config: toml::Table,
}

impl BackendConfig {
    /// Get backend type name
    pub fn backend_type(&self) -> &str {
        &self.backend_type
    }

    /// Convert config table to serde_json::Value for the registry
    pub fn to_json_value(&self) -> serde_json::Value {
        let json_str = serde_json::to_string(&self.config).unwrap_or_default();
        serde_json::from_str(&json_str).unwrap_or(serde_json::json!({}))
    }
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            backend_type: "process".to_string(),
            config: toml::Table::new(),
        }
    }
}
