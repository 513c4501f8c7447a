//! Agent configuration records

use crate::{MemoryConfig, ProviderConfig, ToolConfig};
use serde::{Deserialize, Serialize};

/// Configuration binding a provider, a memory and a set of tools
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentConfig {
    /// Key of this agent in the `agents` section
    pub name: String,
    /// Human-readable name
    pub display_name: String,
    /// Key of the provider in the `providers` section
    pub provider: String,
    /// Key of the memory in the `memories` section
    #[serde(skip_serializing_if = "Option::is_none")]
    pub memory: Option<String>,
    /// Keys of the tools in the `tools` section, in declaration order
    #[serde(default)]
    pub tools: Vec<String>,
    /// Maximum wall-clock time for a task in seconds
    pub execution_timeout: u64,
    /// Failures in a row before the agent gives up
    pub max_consecutive_failures: u32,
    /// Emit step-by-step output
    pub verbose: bool,
    /// Optional system prompt override
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_prompt: Option<String>,
}

/// An agent together with the records it references
#[derive(Debug, Clone)]
pub struct ResolvedAgent<'a> {
    pub agent: &'a AgentConfig,
    pub provider: &'a ProviderConfig,
    pub memory: Option<&'a MemoryConfig>,
    /// Tool records in the agent's declaration order
    pub tools: Vec<&'a ToolConfig>,
}
