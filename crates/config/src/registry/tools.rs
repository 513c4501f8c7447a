//! Built-in tool types

use super::{EntrySchema, FieldKind, SchemaRegistry};

pub const SCRAPER: &str = "scraper";
pub const SEARCH: &str = "search";
pub const FILE_READER: &str = "file_reader";
pub const FILE_WRITER: &str = "file_writer";
pub const PYTHON_EXECUTOR: &str = "python_executor";

/// Register the built-in tool types
pub fn register(registry: &mut SchemaRegistry) {
    registry
        .register_tool(
            EntrySchema::tool(SCRAPER)
                .optional("user_agent", FieldKind::String)
                .optional("max_content_length", FieldKind::Integer),
        )
        .register_tool(
            EntrySchema::tool(SEARCH)
                .optional("api_key", FieldKind::String)
                .optional("max_results", FieldKind::PositiveCount),
        )
        .register_tool(
            EntrySchema::tool(FILE_READER)
                .optional("base_dir", FieldKind::String)
                .optional("max_file_size", FieldKind::Integer),
        )
        .register_tool(EntrySchema::tool(FILE_WRITER).optional("base_dir", FieldKind::String))
        .register_tool(
            EntrySchema::tool(PYTHON_EXECUTOR).optional("allowed_modules", FieldKind::StringList),
        );
}
