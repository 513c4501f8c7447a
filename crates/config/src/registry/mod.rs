//! Registry of provider, memory and tool types
//!
//! Each entry of the `providers`, `memories` and `tools` sections names a
//! type. The validator looks that type up here and checks the entry against
//! the registered [`EntrySchema`]. Adding a backend means registering a
//! schema; the validator itself never special-cases a type.

pub mod memories;
pub mod providers;
pub mod tools;

use crate::substitute::contains_placeholder;
use crate::value::{as_bool, as_f64, as_u64, describe, is_negative};
use cortex_types::utils::is_http_url;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

/// Expected shape of a field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    String,
    /// http(s) URL; unresolved placeholders are left to the warning pass
    Url,
    Boolean,
    /// Any number
    Number,
    /// Non-negative integer that fits in `u32`
    Count,
    /// Strictly positive integer that fits in `u32`
    PositiveCount,
    /// Non-negative integer
    Integer,
    /// Strictly positive number of seconds
    Seconds,
    /// TCP port, 1..=65535
    Port,
    /// Free-form mapping; null counts as empty
    Mapping,
    /// Sequence of strings
    StringList,
}

impl FieldKind {
    /// Check a present, non-null value
    pub fn check(self, value: &Value) -> Result<(), String> {
        match self {
            FieldKind::String => match value {
                Value::String(_) => Ok(()),
                other => Err(format!("expected a string, found {}", describe(other))),
            },
            FieldKind::Url => match value {
                Value::String(url) if contains_placeholder(url) || is_http_url(url) => Ok(()),
                Value::String(url) => Err(format!("'{url}' is not an http(s) URL")),
                other => Err(format!("expected a URL string, found {}", describe(other))),
            },
            FieldKind::Boolean => as_bool(value)
                .map(|_| ())
                .ok_or_else(|| format!("expected a boolean, found {}", describe(value))),
            FieldKind::Number => as_f64(value)
                .map(|_| ())
                .ok_or_else(|| format!("expected a number, found {}", describe(value))),
            FieldKind::Count => check_integer(value, 0, u64::from(u32::MAX)),
            FieldKind::PositiveCount => check_integer(value, 1, u64::from(u32::MAX)),
            FieldKind::Integer => check_integer(value, 0, u64::MAX),
            FieldKind::Seconds => check_integer(value, 1, u64::MAX),
            FieldKind::Port => check_integer(value, 1, u64::from(u16::MAX)),
            FieldKind::Mapping => match value {
                Value::Object(_) | Value::Null => Ok(()),
                other => Err(format!("expected a mapping, found {}", describe(other))),
            },
            FieldKind::StringList => match value {
                Value::Array(items) if items.iter().all(Value::is_string) => Ok(()),
                Value::Array(_) => Err("expected a sequence of strings".to_string()),
                other => Err(format!("expected a sequence, found {}", describe(other))),
            },
        }
    }
}

fn check_integer(value: &Value, min: u64, max: u64) -> Result<(), String> {
    if is_negative(value) {
        return Err("must be non-negative".to_string());
    }
    match as_u64(value) {
        Some(n) if n < min => Err(format!("must be at least {min}")),
        Some(n) if n > max => Err(format!("must be at most {max}")),
        Some(_) => Ok(()),
        None => Err(format!("expected an integer, found {}", describe(value))),
    }
}

/// One permitted field of an entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub kind: FieldKind,
    pub required: bool,
}

/// Configuration section an entry lives in
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Section {
    Providers,
    Memories,
    Tools,
    Agents,
}

impl Section {
    pub const ALL: [Section; 4] = [
        Section::Providers,
        Section::Memories,
        Section::Tools,
        Section::Agents,
    ];

    /// Top-level document key
    pub fn key(self) -> &'static str {
        match self {
            Section::Providers => "providers",
            Section::Memories => "memories",
            Section::Tools => "tools",
            Section::Agents => "agents",
        }
    }

    /// Singular noun used in messages
    pub fn noun(self) -> &'static str {
        match self {
            Section::Providers => "provider",
            Section::Memories => "memory",
            Section::Tools => "tool",
            Section::Agents => "agent",
        }
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Permitted fields of one entry type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntrySchema {
    type_name: String,
    fields: BTreeMap<String, FieldSpec>,
}

impl EntrySchema {
    /// Schema with no fields
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            fields: BTreeMap::new(),
        }
    }

    /// Provider schema pre-populated with the fields every provider accepts
    pub fn provider(type_name: impl Into<String>) -> Self {
        Self::new(type_name)
            .required("type", FieldKind::String)
            .optional("timeout", FieldKind::Seconds)
            .optional("max_retries", FieldKind::Count)
            .optional("additional_params", FieldKind::Mapping)
    }

    /// Memory schema pre-populated with the fields every memory accepts
    pub fn memory(type_name: impl Into<String>) -> Self {
        Self::new(type_name)
            .required("type", FieldKind::String)
            .optional("additional_params", FieldKind::Mapping)
    }

    /// Tool schema pre-populated with the fields every tool accepts
    pub fn tool(type_name: impl Into<String>) -> Self {
        Self::new(type_name)
            .optional("type", FieldKind::String)
            .optional("name", FieldKind::String)
            .optional("enabled", FieldKind::Boolean)
            .optional("timeout", FieldKind::Seconds)
            .optional("additional_params", FieldKind::Mapping)
    }

    /// Fixed schema of an agent entry
    pub fn agent() -> Self {
        Self::new("agent")
            .optional("name", FieldKind::String)
            .optional("description", FieldKind::String)
            .required("provider", FieldKind::String)
            .optional("memory", FieldKind::String)
            .optional("tools", FieldKind::StringList)
            .optional("execution_timeout", FieldKind::Seconds)
            .optional("max_consecutive_failures", FieldKind::Count)
            .optional("verbose", FieldKind::Boolean)
            .optional("system_prompt", FieldKind::String)
    }

    pub fn required(mut self, name: impl Into<String>, kind: FieldKind) -> Self {
        self.fields.insert(name.into(), FieldSpec { kind, required: true });
        self
    }

    pub fn optional(mut self, name: impl Into<String>, kind: FieldKind) -> Self {
        self.fields.insert(name.into(), FieldSpec { kind, required: false });
        self
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.get(name)
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &FieldSpec)> {
        self.fields.iter().map(|(name, spec)| (name.as_str(), spec))
    }

    pub fn required_fields(&self) -> impl Iterator<Item = &str> {
        self.fields()
            .filter(|(_, spec)| spec.required)
            .map(|(name, _)| name)
    }
}

/// Type name → schema, per section
#[derive(Debug, Clone, Default)]
pub struct SchemaRegistry {
    providers: BTreeMap<String, EntrySchema>,
    memories: BTreeMap<String, EntrySchema>,
    tools: BTreeMap<String, EntrySchema>,
}

impl SchemaRegistry {
    /// Registry without any types
    pub fn empty() -> Self {
        Self::default()
    }

    /// Registry with every built-in provider, memory and tool type
    pub fn builtin() -> Self {
        let mut registry = Self::empty();
        providers::register(&mut registry);
        memories::register(&mut registry);
        tools::register(&mut registry);
        registry
    }

    /// Register (or replace) a provider type
    pub fn register_provider(&mut self, schema: EntrySchema) -> &mut Self {
        self.providers.insert(schema.type_name.clone(), schema);
        self
    }

    /// Register (or replace) a memory type
    pub fn register_memory(&mut self, schema: EntrySchema) -> &mut Self {
        self.memories.insert(schema.type_name.clone(), schema);
        self
    }

    /// Register (or replace) a tool type
    pub fn register_tool(&mut self, schema: EntrySchema) -> &mut Self {
        self.tools.insert(schema.type_name.clone(), schema);
        self
    }

    fn section(&self, section: Section) -> Option<&BTreeMap<String, EntrySchema>> {
        match section {
            Section::Providers => Some(&self.providers),
            Section::Memories => Some(&self.memories),
            Section::Tools => Some(&self.tools),
            Section::Agents => None,
        }
    }

    /// Schema registered for `type_name` in `section`
    pub fn lookup(&self, section: Section, type_name: &str) -> Option<&EntrySchema> {
        self.section(section)?.get(type_name)
    }

    /// Registered type names of a section, sorted
    pub fn type_names(&self, section: Section) -> Vec<&str> {
        self.section(section)
            .map(|types| types.keys().map(String::as_str).collect())
            .unwrap_or_default()
    }
}
