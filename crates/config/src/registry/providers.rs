//! Built-in provider types

use super::{EntrySchema, FieldKind, SchemaRegistry};

/// Deterministic provider used in tests and demos
pub const MOCK: &str = "mock";
pub const OPENAI: &str = "openai";
pub const ANTHROPIC: &str = "anthropic";

/// Register the built-in provider types
pub fn register(registry: &mut SchemaRegistry) {
    registry
        .register_provider(
            EntrySchema::provider(MOCK)
                .optional("model", FieldKind::String)
                .optional("seed", FieldKind::Integer)
                .optional("response_delay", FieldKind::Number),
        )
        .register_provider(
            EntrySchema::provider(OPENAI)
                .required("api_key", FieldKind::String)
                .required("model", FieldKind::String)
                .optional("organization", FieldKind::String)
                .optional("base_url", FieldKind::Url),
        )
        .register_provider(
            EntrySchema::provider(ANTHROPIC)
                .required("api_key", FieldKind::String)
                .required("model", FieldKind::String)
                .optional("base_url", FieldKind::Url),
        );
}
