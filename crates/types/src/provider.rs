//! Provider (LLM backend) configuration records

use crate::Params;
use serde::{Deserialize, Serialize};

/// Configuration for a single completion backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Key of this provider in the `providers` section
    pub name: String,
    /// Registered provider type (mock, openai, anthropic, ...)
    #[serde(rename = "type")]
    pub kind: String,
    /// Request timeout in seconds
    pub timeout: u64,
    /// Maximum retries for failed requests
    pub max_retries: u32,
    /// API key, usually supplied through `${...}`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// Model identifier
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    /// Pass-through parameters interpreted by the provider client
    #[serde(default)]
    pub additional_params: Params,
}

impl ProviderConfig {
    /// Whether an API key with a non-empty value is configured
    pub fn has_api_key(&self) -> bool {
        self.api_key.as_deref().is_some_and(|key| !key.is_empty())
    }

    /// API key with everything but the last four characters masked
    pub fn masked_api_key(&self) -> Option<String> {
        self.api_key.as_deref().map(crate::utils::mask_secret)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider(api_key: Option<&str>) -> ProviderConfig {
        ProviderConfig {
            name: "openai".to_string(),
            kind: "openai".to_string(),
            timeout: 30,
            max_retries: 3,
            api_key: api_key.map(str::to_string),
            model: Some("gpt-4".to_string()),
            additional_params: Params::new(),
        }
    }

    #[test]
    fn test_api_key_presence() {
        assert!(provider(Some("sk-test")).has_api_key());
        assert!(!provider(Some("")).has_api_key());
        assert!(!provider(None).has_api_key());
    }

    #[test]
    fn test_type_serialized_under_type_key() {
        let json = serde_json::to_value(provider(None)).unwrap();
        assert_eq!(json["type"], "openai");
        assert!(json.get("api_key").is_none());
    }
}
