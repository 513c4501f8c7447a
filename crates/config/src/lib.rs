//! Configuration management for the CortexAi agent framework
//!
//! This crate reads layered YAML configuration, resolves `${NAME}`
//! placeholders against the environment and `.env` files, validates the
//! result against a registry of provider, memory and tool types, and builds
//! the typed records from `cortex_types`.

pub mod builder;
pub mod defaults;
pub mod env;
pub mod loader;
pub mod registry;
pub mod substitute;
pub mod validation;
pub mod value;

pub use builder::ConfigBuilder;
pub use env::{resolve_environment, EnvPrecedence, Environment, ENV_PREFIX_VAR};
pub use loader::{ConfigLoader, ConfigSource, OVERRIDE_PREFIX, SAMPLE_CONFIG};
pub use registry::{EntrySchema, FieldKind, SchemaRegistry, Section};
pub use substitute::{placeholder_names, substitute, SubstitutionMode, Substitutor};
pub use validation::{ConfigValidator, ValidatedDocument, ValidationIssue, ValidationReport};
