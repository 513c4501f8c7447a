//! Conversion of a validated document into typed records

use crate::defaults;
use crate::registry::memories::IN_MEMORY;
use crate::validation::ValidatedDocument;
use crate::value::{as_bool, as_u64};
use cortex_types::{
    utils::join_path, AgentConfig, ConfigError, MemoryConfig, Params, ProviderConfig, Result,
    RootConfig, ToolConfig,
};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Entry fields with a dedicated record slot; anything else a type schema
/// allows is folded into `additional_params`
const PROVIDER_FIELDS: &[&str] = &["type", "timeout", "max_retries", "api_key", "model"];
const MEMORY_FIELDS: &[&str] = &["type", "max_items", "vector_db_url", "collection"];
const TOOL_FIELDS: &[&str] = &["type", "name", "enabled", "timeout"];

/// Builds a [`RootConfig`] from a [`ValidatedDocument`]
pub struct ConfigBuilder;

impl ConfigBuilder {
    /// Copy validated values into records, applying defaults
    pub fn build(document: &ValidatedDocument) -> Result<RootConfig> {
        let empty = Map::new();
        let root = document.as_value().as_object().unwrap_or(&empty);

        Ok(RootConfig {
            log_level: string_or(root, "log_level", defaults::LOG_LEVEL),
            debug: bool_or(root, "debug", defaults::DEBUG),
            max_concurrent_tasks: u32_or(
                root,
                "max_concurrent_tasks",
                defaults::MAX_CONCURRENT_TASKS,
            ),
            web_api_enabled: bool_or(root, "web_api_enabled", defaults::WEB_API_ENABLED),
            web_api_port: get(root, "web_api_port")
                .and_then(as_u64)
                .and_then(|port| u16::try_from(port).ok())
                .unwrap_or(defaults::WEB_API_PORT),
            web_api_host: string_or(root, "web_api_host", defaults::WEB_API_HOST),
            web_api_auth_enabled: bool_or(
                root,
                "web_api_auth_enabled",
                defaults::WEB_API_AUTH_ENABLED,
            ),
            providers: build_section(root, "providers", build_provider)?,
            memories: build_section(root, "memories", build_memory)?,
            tools: build_section(root, "tools", build_tool)?,
            agents: build_section(root, "agents", build_agent)?,
        })
    }
}

fn build_section<T>(
    root: &Map<String, Value>,
    key: &str,
    build: fn(&str, &Map<String, Value>, &str) -> Result<T>,
) -> Result<BTreeMap<String, T>> {
    let Some(entries) = get(root, key).and_then(Value::as_object) else {
        return Ok(BTreeMap::new());
    };

    entries
        .iter()
        .map(|(name, entry)| {
            let path = join_path(key, name);
            let fields = entry
                .as_object()
                .ok_or_else(|| ConfigError::MissingDefault { path: path.clone() })?;
            Ok((name.clone(), build(name, fields, &path)?))
        })
        .collect()
}

fn build_provider(name: &str, entry: &Map<String, Value>, path: &str) -> Result<ProviderConfig> {
    Ok(ProviderConfig {
        name: name.to_string(),
        kind: required_string(entry, "type", path)?,
        timeout: u64_or(entry, "timeout", defaults::PROVIDER_TIMEOUT_SECS),
        max_retries: u32_or(entry, "max_retries", defaults::PROVIDER_MAX_RETRIES),
        api_key: optional_string(entry, "api_key"),
        model: optional_string(entry, "model"),
        additional_params: params(entry, PROVIDER_FIELDS),
    })
}

fn build_memory(name: &str, entry: &Map<String, Value>, path: &str) -> Result<MemoryConfig> {
    let kind = required_string(entry, "type", path)?;
    let max_items = match get(entry, "max_items").and_then(as_u64) {
        Some(max) => Some(max),
        None if kind == IN_MEMORY => Some(defaults::IN_MEMORY_MAX_ITEMS),
        None => None,
    };

    Ok(MemoryConfig {
        name: name.to_string(),
        kind,
        max_items,
        vector_db_url: optional_string(entry, "vector_db_url"),
        collection: optional_string(entry, "collection"),
        additional_params: params(entry, MEMORY_FIELDS),
    })
}

fn build_tool(name: &str, entry: &Map<String, Value>, _path: &str) -> Result<ToolConfig> {
    Ok(ToolConfig {
        name: name.to_string(),
        kind: string_or(entry, "type", name),
        display_name: string_or(entry, "name", name),
        enabled: bool_or(entry, "enabled", defaults::TOOL_ENABLED),
        timeout: u64_or(entry, "timeout", defaults::TOOL_TIMEOUT_SECS),
        additional_params: params(entry, TOOL_FIELDS),
    })
}

fn build_agent(name: &str, entry: &Map<String, Value>, path: &str) -> Result<AgentConfig> {
    let tools = match get(entry, "tools") {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(Value::as_str)
            .map(str::to_string)
            .collect(),
        _ => Vec::new(),
    };

    Ok(AgentConfig {
        name: name.to_string(),
        display_name: string_or(entry, "name", name),
        provider: required_string(entry, "provider", path)?,
        memory: optional_string(entry, "memory"),
        tools,
        execution_timeout: u64_or(
            entry,
            "execution_timeout",
            defaults::AGENT_EXECUTION_TIMEOUT_SECS,
        ),
        max_consecutive_failures: u32_or(
            entry,
            "max_consecutive_failures",
            defaults::AGENT_MAX_CONSECUTIVE_FAILURES,
        ),
        verbose: bool_or(entry, "verbose", defaults::AGENT_VERBOSE),
        system_prompt: optional_string(entry, "system_prompt"),
    })
}

/// Non-null value of a field
fn get<'m>(map: &'m Map<String, Value>, key: &str) -> Option<&'m Value> {
    map.get(key).filter(|value| !value.is_null())
}

fn optional_string(map: &Map<String, Value>, key: &str) -> Option<String> {
    get(map, key).and_then(Value::as_str).map(str::to_string)
}

fn required_string(map: &Map<String, Value>, key: &str, path: &str) -> Result<String> {
    optional_string(map, key).ok_or_else(|| ConfigError::MissingDefault {
        path: join_path(path, key),
    })
}

fn string_or(map: &Map<String, Value>, key: &str, default: &str) -> String {
    optional_string(map, key).unwrap_or_else(|| default.to_string())
}

fn bool_or(map: &Map<String, Value>, key: &str, default: bool) -> bool {
    get(map, key).and_then(as_bool).unwrap_or(default)
}

fn u64_or(map: &Map<String, Value>, key: &str, default: u64) -> u64 {
    get(map, key).and_then(as_u64).unwrap_or(default)
}

fn u32_or(map: &Map<String, Value>, key: &str, default: u32) -> u32 {
    get(map, key)
        .and_then(as_u64)
        .and_then(|n| u32::try_from(n).ok())
        .unwrap_or(default)
}

/// Explicit `additional_params` plus type-specific fields without a record
/// slot; explicit entries win on a name clash
fn params(entry: &Map<String, Value>, known: &[&str]) -> Params {
    let mut params: Params = get(entry, "additional_params")
        .and_then(Value::as_object)
        .map(|bag| bag.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
        .unwrap_or_default();

    for (key, value) in entry {
        if key == "additional_params" || known.contains(&key.as_str()) || value.is_null() {
            continue;
        }
        params.entry(key.clone()).or_insert_with(|| value.clone());
    }
    params
}
