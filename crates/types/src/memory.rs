//! Memory (agent state storage) configuration records

use crate::Params;
use serde::{Deserialize, Serialize};

/// Configuration for a memory backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryConfig {
    /// Key of this memory in the `memories` section
    pub name: String,
    /// Registered memory type (in_memory, vector_db, ...)
    #[serde(rename = "type")]
    pub kind: String,
    /// Maximum number of stored items
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_items: Option<u64>,
    /// Vector database endpoint
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vector_db_url: Option<String>,
    /// Vector database collection
    #[serde(skip_serializing_if = "Option::is_none")]
    pub collection: Option<String>,
    /// Pass-through parameters interpreted by the memory backend
    #[serde(default)]
    pub additional_params: Params,
}

impl MemoryConfig {
    /// Whether this memory is backed by an external vector store
    pub fn is_vector_backed(&self) -> bool {
        self.vector_db_url.is_some()
    }
}
