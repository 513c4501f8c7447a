//! Tool configuration records

use crate::Params;
use serde::{Deserialize, Serialize};

/// Configuration for a callable tool
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolConfig {
    /// Key of this tool in the `tools` section
    pub name: String,
    /// Registered tool type
    #[serde(rename = "type")]
    pub kind: String,
    /// Human-readable name
    pub display_name: String,
    /// Whether agents may invoke this tool
    pub enabled: bool,
    /// Invocation timeout in seconds
    pub timeout: u64,
    /// Pass-through parameters interpreted by the tool
    #[serde(default)]
    pub additional_params: Params,
}
