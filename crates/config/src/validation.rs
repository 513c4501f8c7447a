//! Configuration validation

use crate::registry::{EntrySchema, FieldKind, SchemaRegistry, Section};
use crate::substitute::contains_placeholder;
use crate::value::as_bool;
use cortex_types::{utils::join_path, ConfigError, Result};
use serde_json::{Map, Value};
use std::collections::HashSet;
use tracing::{debug, warn};

/// Accepted `log_level` spellings, compared case-insensitively
pub const LOG_LEVELS: [&str; 7] = [
    "trace", "debug", "info", "warn", "warning", "error", "critical",
];

/// Top-level scalar settings and their shapes
const ROOT_FIELDS: [(&str, FieldKind); 7] = [
    ("log_level", FieldKind::String),
    ("debug", FieldKind::Boolean),
    ("max_concurrent_tasks", FieldKind::PositiveCount),
    ("web_api_enabled", FieldKind::Boolean),
    ("web_api_port", FieldKind::Port),
    ("web_api_host", FieldKind::String),
    ("web_api_auth_enabled", FieldKind::Boolean),
];

/// A document that passed validation
///
/// Only [`ConfigValidator::validate`] constructs one, so the builder can rely
/// on its shape.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedDocument {
    document: Value,
}

impl ValidatedDocument {
    pub fn as_value(&self) -> &Value {
        &self.document
    }

    pub fn into_inner(self) -> Value {
        self.document
    }
}

/// Configuration validator
pub struct ConfigValidator<'a> {
    registry: &'a SchemaRegistry,
    agent_schema: EntrySchema,
}

impl<'a> ConfigValidator<'a> {
    pub fn new(registry: &'a SchemaRegistry) -> Self {
        Self {
            registry,
            agent_schema: EntrySchema::agent(),
        }
    }

    /// Validate a resolved document, failing with the first error
    pub fn validate(&self, document: Value) -> Result<ValidatedDocument> {
        let report = self.check(&document);

        for issue in &report.warnings {
            warn!(field = %issue.field, "{}", issue.message);
        }
        if let Some((first, rest)) = report.errors.split_first() {
            for issue in rest {
                debug!(field = %issue.field, "Additional validation error: {}", issue.message);
            }
            return Err(ConfigError::validation(&first.field, &first.message));
        }

        debug!("{}", report.summary());
        Ok(ValidatedDocument { document })
    }

    /// Collect every error and warning without failing
    pub fn check(&self, document: &Value) -> ValidationReport {
        let mut report = ValidationReport::new();

        let Some(root) = document.as_object() else {
            report.add_error("(root)", "Configuration document must be a mapping");
            return report;
        };

        self.validate_root(root, &mut report);

        for section in [Section::Providers, Section::Memories, Section::Tools] {
            if let Some(entries) = section_entries(root, section, &mut report) {
                for (name, entry) in entries {
                    self.validate_typed_entry(section, name, entry, &mut report);
                }
            }
        }

        if let Some(agents) = section_entries(root, Section::Agents, &mut report) {
            for (name, entry) in agents {
                self.validate_agent(root, name, entry, &mut report);
            }
        }

        report
    }

    fn validate_root(&self, root: &Map<String, Value>, report: &mut ValidationReport) {
        for (key, value) in root {
            let known_section = Section::ALL.iter().any(|s| s.key() == key);
            match ROOT_FIELDS.iter().find(|(name, _)| name == key) {
                Some(_) if value.is_null() => {}
                Some((_, kind)) => check_field(key, *kind, value, report),
                None if known_section => {}
                None => report.add_warning(key, &format!("Unknown top-level key '{key}' ignored")),
            }
        }

        if let Some(Value::String(level)) = root.get("log_level") {
            if !LOG_LEVELS.contains(&level.to_ascii_lowercase().as_str()) {
                report.add_error(
                    "log_level",
                    &format!("Invalid log level: {level}. Valid levels: {LOG_LEVELS:?}"),
                );
            }
        }

        let auth = root.get("web_api_auth_enabled").and_then(as_bool);
        let web = root.get("web_api_enabled").and_then(as_bool);
        if web == Some(true) && auth != Some(true) {
            report.add_warning(
                "web_api_auth_enabled",
                "Web API is enabled without authentication",
            );
        }
    }

    fn validate_typed_entry(
        &self,
        section: Section,
        name: &str,
        entry: &Value,
        report: &mut ValidationReport,
    ) {
        let path = join_path(section.key(), name);
        let Some(fields) = entry.as_object() else {
            report.add_error(&path, &format!("{} entry must be a mapping", section.noun()));
            return;
        };

        let type_name = match fields.get("type") {
            Some(Value::String(kind)) => kind.as_str(),
            Some(other) if !other.is_null() => {
                report.add_error(&join_path(&path, "type"), "type must be a string");
                return;
            }
            // Tools may omit their type; it defaults to the entry key
            _ if section == Section::Tools => name,
            _ => {
                report.add_error(&join_path(&path, "type"), "Missing required field 'type'");
                return;
            }
        };

        let Some(schema) = self.registry.lookup(section, type_name) else {
            report.add_error(
                &join_path(&path, "type"),
                &format!(
                    "Unknown {} type '{type_name}'. Registered types: {:?}",
                    section.noun(),
                    self.registry.type_names(section)
                ),
            );
            return;
        };

        check_entry_fields(&path, schema, fields, report);

        if section == Section::Providers {
            if let Some(Value::String(key)) = fields.get("api_key") {
                if key.trim().is_empty() {
                    report.add_warning(
                        &join_path(&path, "api_key"),
                        &format!("API key for provider {name} is empty"),
                    );
                }
            }
        }
    }

    fn validate_agent(
        &self,
        root: &Map<String, Value>,
        name: &str,
        entry: &Value,
        report: &mut ValidationReport,
    ) {
        let path = join_path(Section::Agents.key(), name);
        let Some(fields) = entry.as_object() else {
            report.add_error(&path, "agent entry must be a mapping");
            return;
        };

        check_entry_fields(&path, &self.agent_schema, fields, report);

        if let Some(Value::String(provider)) = fields.get("provider") {
            if !section_has(root, Section::Providers, provider) {
                report.add_error(
                    &join_path(&path, "provider"),
                    &format!("Agent {name} references unknown provider '{provider}'"),
                );
            }
        }

        if let Some(Value::String(memory)) = fields.get("memory") {
            if !section_has(root, Section::Memories, memory) {
                report.add_error(
                    &join_path(&path, "memory"),
                    &format!("Agent {name} references unknown memory '{memory}'"),
                );
            }
        }

        if let Some(Value::Array(tools)) = fields.get("tools") {
            let tools_path = join_path(&path, "tools");
            let mut seen = HashSet::new();
            for tool in tools.iter().filter_map(Value::as_str) {
                if !seen.insert(tool) {
                    report.add_warning(&tools_path, &format!("Tool '{tool}' listed twice"));
                }
                match section_entry(root, Section::Tools, tool) {
                    None => report.add_error(
                        &tools_path,
                        &format!("Agent {name} references unknown tool '{tool}'"),
                    ),
                    Some(tool_entry) => {
                        let enabled = tool_entry.get("enabled").and_then(as_bool);
                        if enabled == Some(false) {
                            report.add_warning(
                                &tools_path,
                                &format!("Agent {name} uses disabled tool '{tool}'"),
                            );
                        }
                    }
                }
            }
        }
    }
}

/// Entries of a section, reporting a section that is not a mapping
fn section_entries<'d>(
    root: &'d Map<String, Value>,
    section: Section,
    report: &mut ValidationReport,
) -> Option<&'d Map<String, Value>> {
    match root.get(section.key()) {
        None | Some(Value::Null) => None,
        Some(Value::Object(entries)) => Some(entries),
        Some(_) => {
            report.add_error(
                section.key(),
                &format!("Section '{section}' must be a mapping of name to {}", section.noun()),
            );
            None
        }
    }
}

fn section_entry<'d>(
    root: &'d Map<String, Value>,
    section: Section,
    name: &str,
) -> Option<&'d Value> {
    root.get(section.key())?.as_object()?.get(name)
}

fn section_has(root: &Map<String, Value>, section: Section, name: &str) -> bool {
    section_entry(root, section, name).is_some()
}

fn check_entry_fields(
    path: &str,
    schema: &EntrySchema,
    fields: &Map<String, Value>,
    report: &mut ValidationReport,
) {
    for (key, value) in fields {
        let field_path = join_path(path, key);
        match schema.field(key) {
            None => report.add_error(
                &field_path,
                &format!("Unknown field '{key}' for type '{}'", schema.type_name()),
            ),
            Some(spec) if value.is_null() => {
                if spec.required {
                    report.add_error(&field_path, &format!("Required field '{key}' is empty"));
                }
            }
            Some(spec) if spec.required && is_unresolved(value) => report.add_error(
                &field_path,
                &format!("Required field '{key}' references an unset environment variable"),
            ),
            Some(spec) => check_field(&field_path, spec.kind, value, report),
        }
    }

    for required in schema.required_fields() {
        if !fields.contains_key(required) {
            report.add_error(
                &join_path(path, required),
                &format!("Missing required field '{required}'"),
            );
        }
    }
}

fn is_unresolved(value: &Value) -> bool {
    value.as_str().is_some_and(contains_placeholder)
}

fn check_field(path: &str, kind: FieldKind, value: &Value, report: &mut ValidationReport) {
    if let Err(message) = kind.check(value) {
        report.add_error(path, &message);
        return;
    }
    if let Value::String(text) = value {
        if contains_placeholder(text) {
            report.add_warning(path, &format!("Unresolved placeholder in '{text}'"));
        }
    }
}

/// Validation report containing errors and warnings
#[derive(Debug, Clone)]
pub struct ValidationReport {
    pub errors: Vec<ValidationIssue>,
    pub warnings: Vec<ValidationIssue>,
}

/// A validation issue (error or warning)
#[derive(Debug, Clone)]
pub struct ValidationIssue {
    pub field: String,
    pub message: String,
}

impl ValidationReport {
    pub fn new() -> Self {
        Self {
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }

    pub fn add_error(&mut self, field: &str, message: &str) {
        self.errors.push(ValidationIssue {
            field: field.to_string(),
            message: message.to_string(),
        });
    }

    pub fn add_warning(&mut self, field: &str, message: &str) {
        self.warnings.push(ValidationIssue {
            field: field.to_string(),
            message: message.to_string(),
        });
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    pub fn is_valid(&self) -> bool {
        !self.has_errors()
    }

    pub fn summary(&self) -> String {
        format!("Validation: {} errors, {} warnings", self.errors.len(), self.warnings.len())
    }
}

impl Default for ValidationReport {
    fn default() -> Self {
        Self::new()
    }
}
