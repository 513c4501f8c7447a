//! Top-level configuration record

use crate::{AgentConfig, MemoryConfig, ProviderConfig, ResolvedAgent, ToolConfig};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Fully resolved, validated configuration
///
/// Built once per load and never mutated afterwards. Share it across threads
/// or tasks behind an `Arc`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RootConfig {
    /// Log level as written in the document (INFO, debug, ...)
    pub log_level: String,
    /// Debug mode
    pub debug: bool,
    /// Upper bound on concurrently running agent tasks
    pub max_concurrent_tasks: u32,
    /// Serve the web API
    pub web_api_enabled: bool,
    /// Web API port
    pub web_api_port: u16,
    /// Web API bind address
    pub web_api_host: String,
    /// Require authentication on the web API
    pub web_api_auth_enabled: bool,
    /// Providers by name
    #[serde(default)]
    pub providers: BTreeMap<String, ProviderConfig>,
    /// Memories by name
    #[serde(default)]
    pub memories: BTreeMap<String, MemoryConfig>,
    /// Tools by name
    #[serde(default)]
    pub tools: BTreeMap<String, ToolConfig>,
    /// Agents by name
    #[serde(default)]
    pub agents: BTreeMap<String, AgentConfig>,
}

impl RootConfig {
    /// Look up an agent and borrow every record it references
    ///
    /// Returns `None` if the agent does not exist. References are checked at
    /// load time, so a loaded configuration never has dangling ones.
    pub fn resolve_agent(&self, name: &str) -> Option<ResolvedAgent<'_>> {
        let agent = self.agents.get(name)?;
        let provider = self.providers.get(&agent.provider)?;
        let memory = match &agent.memory {
            Some(key) => Some(self.memories.get(key)?),
            None => None,
        };
        let tools = agent
            .tools
            .iter()
            .map(|key| self.tools.get(key))
            .collect::<Option<Vec<_>>>()?;

        Some(ResolvedAgent {
            agent,
            provider,
            memory,
            tools,
        })
    }

    /// Tools that agents are allowed to invoke
    pub fn enabled_tools(&self) -> impl Iterator<Item = &ToolConfig> {
        self.tools.values().filter(|tool| tool.enabled)
    }

    /// One-line overview used in logs
    pub fn summary(&self) -> String {
        format!(
            "{} providers, {} memories, {} tools ({} enabled), {} agents",
            self.providers.len(),
            self.memories.len(),
            self.tools.len(),
            self.enabled_tools().count(),
            self.agents.len()
        )
    }
}
