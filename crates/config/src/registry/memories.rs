//! Built-in memory types

use super::{EntrySchema, FieldKind, SchemaRegistry};

/// Conversation history kept in process
pub const IN_MEMORY: &str = "in_memory";
/// Embedding store behind an external vector database
pub const VECTOR_DB: &str = "vector_db";

/// Register the built-in memory types
pub fn register(registry: &mut SchemaRegistry) {
    registry
        .register_memory(EntrySchema::memory(IN_MEMORY).optional("max_items", FieldKind::Integer))
        .register_memory(
            EntrySchema::memory(VECTOR_DB)
                .required("vector_db_url", FieldKind::Url)
                .required("collection", FieldKind::String)
                .optional("max_items", FieldKind::Integer)
                .optional("embedding_model", FieldKind::String)
                .optional("dimension", FieldKind::PositiveCount),
        );
}
