//! Shared types for the CortexAi configuration subsystem
//!
//! This crate contains the typed configuration records handed to the agent
//! runtime, provider clients, memory backends and tools, together with the
//! error taxonomy of the loader.

pub mod agent;
pub mod error;
pub mod memory;
pub mod provider;
pub mod root;
pub mod tool;
pub mod utils;

// Re-export commonly used types
pub use agent::{AgentConfig, ResolvedAgent};
pub use error::{ConfigError, LoadStage, Result};
pub use memory::MemoryConfig;
pub use provider::ProviderConfig;
pub use root::RootConfig;
pub use tool::ToolConfig;

/// Loosely typed pass-through value (string, number, boolean or nested)
pub type ParamValue = serde_json::Value;

/// Opaque `additional_params` bag
pub type Params = std::collections::BTreeMap<String, ParamValue>;
