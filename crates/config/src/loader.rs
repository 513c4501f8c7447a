//! Configuration loader implementation

use crate::builder::ConfigBuilder;
use crate::env::{EnvPrecedence, Environment};
use crate::registry::{SchemaRegistry, Section};
use crate::substitute::{SubstitutionMode, Substitutor};
use crate::validation::{ConfigValidator, ValidationReport};
use cortex_types::{ConfigError, Result, RootConfig};
use figment::{
    providers::{Format, Serialized, Yaml},
    Figment,
};
use serde_json::{Map, Value};
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Bundled sample configuration
pub const SAMPLE_CONFIG: &str = include_str!("../sample_config.yml");

/// Prefix of variables that override document keys (`CORTEX_LOG_LEVEL`,
/// `CORTEX_PROVIDERS__OPENAI__TIMEOUT`)
pub const OVERRIDE_PREFIX: &str = "CORTEX_";

/// Top-level keys an override may target
const OVERRIDABLE_KEYS: [&str; 11] = [
    "log_level",
    "debug",
    "max_concurrent_tasks",
    "web_api_enabled",
    "web_api_port",
    "web_api_host",
    "web_api_auth_enabled",
    "providers",
    "memories",
    "tools",
    "agents",
];

/// Where a configuration layer comes from
#[derive(Debug, Clone)]
pub enum ConfigSource {
    /// YAML file on disk
    File(PathBuf),
    /// YAML text
    Yaml(String),
    /// Programmatic mapping
    Value(Value),
}

impl ConfigSource {
    pub fn file<P: AsRef<Path>>(path: P) -> Self {
        ConfigSource::File(path.as_ref().to_path_buf())
    }

    pub fn yaml(content: impl Into<String>) -> Self {
        ConfigSource::Yaml(content.into())
    }

    pub fn value(value: Value) -> Self {
        ConfigSource::Value(value)
    }

    /// Read YAML text from an open stream
    pub fn from_reader<R: Read>(mut reader: R) -> Result<Self> {
        let mut content = String::new();
        reader
            .read_to_string(&mut content)
            .map_err(|source| ConfigError::Io {
                path: "<stream>".to_string(),
                source,
            })?;
        Ok(ConfigSource::Yaml(content))
    }

    fn describe(&self) -> String {
        match self {
            ConfigSource::File(path) => path.display().to_string(),
            ConfigSource::Yaml(_) => "<yaml string>".to_string(),
            ConfigSource::Value(_) => "<mapping>".to_string(),
        }
    }
}

/// Configuration loader: parse → resolve environment → substitute → validate → build
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    environment: Option<Environment>,
    dotenv_path: Option<PathBuf>,
    precedence: EnvPrecedence,
    mode: SubstitutionMode,
    env_prefix: Option<String>,
    env_overrides: bool,
    registry: SchemaRegistry,
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self {
            environment: None,
            dotenv_path: None,
            precedence: EnvPrecedence::default(),
            mode: SubstitutionMode::default(),
            env_prefix: None,
            env_overrides: true,
            registry: SchemaRegistry::builtin(),
        }
    }
}

impl ConfigLoader {
    /// Loader with the process environment, permissive substitution and the
    /// built-in registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Loader configured from `CONFIG_USE_DOTENV` (default true, reads `.env`),
    /// `CONFIG_ENV_PREFIX` and `CONFIG_STRICT_ENV` (default false)
    pub fn from_env() -> Self {
        let flag = |name: &str, default: bool| {
            std::env::var(name)
                .ok()
                .and_then(|v| crate::value::as_bool(&Value::String(v)))
                .unwrap_or(default)
        };

        let mut loader = Self::new().strict(flag("CONFIG_STRICT_ENV", false));
        if flag("CONFIG_USE_DOTENV", true) {
            loader = loader.with_dotenv(".env");
        }
        if let Ok(prefix) = std::env::var(crate::env::ENV_PREFIX_VAR) {
            loader = loader.with_env_prefix(prefix);
        }
        loader
    }

    /// Resolve placeholders against `environment` instead of the process environment
    pub fn with_environment(mut self, environment: Environment) -> Self {
        self.environment = Some(environment);
        self
    }

    /// Also read variables from a dotenv file, if it exists
    pub fn with_dotenv<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.dotenv_path = Some(path.as_ref().to_path_buf());
        self
    }

    pub fn with_precedence(mut self, precedence: EnvPrecedence) -> Self {
        self.precedence = precedence;
        self
    }

    /// Fail on unset placeholders instead of leaving them in place
    pub fn strict(mut self, strict: bool) -> Self {
        self.mode = if strict {
            SubstitutionMode::Strict
        } else {
            SubstitutionMode::Permissive
        };
        self
    }

    /// Namespacing prefix for placeholder lookups, overriding `CONFIG_ENV_PREFIX`
    pub fn with_env_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.env_prefix = Some(prefix.into());
        self
    }

    /// Apply `CORTEX_*` overrides (enabled by default)
    pub fn env_overrides(mut self, enabled: bool) -> Self {
        self.env_overrides = enabled;
        self
    }

    pub fn with_registry(mut self, registry: SchemaRegistry) -> Self {
        self.registry = registry;
        self
    }

    /// Registry used for validation, for registering extra types
    pub fn registry_mut(&mut self) -> &mut SchemaRegistry {
        &mut self.registry
    }

    pub fn mode(&self) -> SubstitutionMode {
        self.mode
    }

    /// Load a single source
    pub fn load(&self, source: ConfigSource) -> Result<RootConfig> {
        self.load_layers([source])
    }

    /// Load configuration from a YAML file
    pub fn load_file<P: AsRef<Path>>(&self, path: P) -> Result<RootConfig> {
        self.load(ConfigSource::file(path))
    }

    /// Load configuration from YAML text
    pub fn load_from_str(&self, yaml_content: &str) -> Result<RootConfig> {
        self.load(ConfigSource::yaml(yaml_content))
    }

    /// Load configuration from an in-memory mapping
    pub fn load_from_value(&self, value: Value) -> Result<RootConfig> {
        self.load(ConfigSource::value(value))
    }

    /// Merge sources in order (later layers win) and load the result
    pub fn load_layers<I>(&self, sources: I) -> Result<RootConfig>
    where
        I: IntoIterator<Item = ConfigSource>,
    {
        let raw = self.parse(sources)?;
        let environment = self.resolve_environment()?;
        let resolved = self.resolve(raw, &environment)?;

        let validated = ConfigValidator::new(&self.registry).validate(resolved)?;
        let config = ConfigBuilder::build(&validated)?;

        info!("Configuration loaded: {}", config.summary());
        Ok(config)
    }

    /// Run every stage up to validation and return the full report
    pub fn check_layers<I>(&self, sources: I) -> Result<ValidationReport>
    where
        I: IntoIterator<Item = ConfigSource>,
    {
        let raw = self.parse(sources)?;
        let environment = self.resolve_environment()?;
        let resolved = self.resolve(raw, &environment)?;
        Ok(ConfigValidator::new(&self.registry).check(&resolved))
    }

    /// Parse and merge sources without substituting anything
    pub fn parse<I>(&self, sources: I) -> Result<Value>
    where
        I: IntoIterator<Item = ConfigSource>,
    {
        let mut figment = Figment::new();
        let mut origins = Vec::new();

        for source in sources {
            origins.push(source.describe());
            figment = match source {
                ConfigSource::File(path) => {
                    if !path.exists() {
                        return Err(ConfigError::FileNotFound {
                            path: path.display().to_string(),
                        });
                    }
                    figment.merge(Yaml::file(path))
                }
                ConfigSource::Yaml(content) => figment.merge(Yaml::string(&content)),
                ConfigSource::Value(value) => {
                    if !value.is_object() {
                        return Err(ConfigError::Parse {
                            origin: "<mapping>".to_string(),
                            message: "programmatic configuration must be a mapping".to_string(),
                        });
                    }
                    figment.merge(Serialized::defaults(value))
                }
            };
        }

        let raw: Value = figment.extract().map_err(|e| ConfigError::Parse {
            origin: e
                .metadata
                .as_ref()
                .and_then(|metadata| metadata.source.as_ref())
                .map(ToString::to_string)
                .unwrap_or_else(|| origins.join(", ")),
            message: e.to_string(),
        })?;

        debug!(sources = %origins.join(", "), "Parsed configuration sources");
        Ok(raw)
    }

    /// Process (or injected) environment combined with the dotenv file
    pub fn resolve_environment(&self) -> Result<Environment> {
        let base = self
            .environment
            .clone()
            .unwrap_or_else(Environment::from_process);
        let environment = base.resolve(self.dotenv_path.as_deref(), self.precedence)?;
        debug!(variables = environment.len(), "Resolved environment");
        Ok(environment)
    }

    /// Apply overrides and substitute placeholders
    fn resolve(&self, mut raw: Value, environment: &Environment) -> Result<Value> {
        if self.env_overrides {
            apply_overrides(&mut raw, environment);
        }

        let substitutor = Substitutor::new(environment, self.mode);
        let substitutor = match self.env_prefix.as_deref() {
            Some(prefix) => substitutor.with_prefix(Some(prefix)),
            None => substitutor,
        };
        substitutor.substitute(&raw)
    }

    /// Write the bundled sample configuration to `path`
    pub fn create_example<P: AsRef<Path>>(path: P) -> Result<()> {
        let path = path.as_ref();
        std::fs::write(path, SAMPLE_CONFIG).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })
    }
}

/// Set document keys from `CORTEX_*` variables
///
/// `__` separates nesting levels. Variable names are upper-case by convention,
/// so each segment matches an existing key case-insensitively (`OPENAI` reaches
/// an `OpenAI` entry) and new keys are created lower-cased. Values are parsed
/// as YAML scalars so `true` and `60` keep their types.
fn apply_overrides(document: &mut Value, environment: &Environment) {
    for (name, raw) in environment.iter() {
        let Some(rest) = name.strip_prefix(OVERRIDE_PREFIX) else {
            continue;
        };
        let key = rest.to_ascii_lowercase();
        let path: Vec<&str> = key.split("__").collect();
        if path.iter().any(|segment| segment.is_empty()) || !OVERRIDABLE_KEYS.contains(&path[0]) {
            continue;
        }
        // Sections hold named entries; overriding a whole section makes no sense
        if path.len() == 1 && Section::ALL.iter().any(|s| s.key() == path[0]) {
            continue;
        }

        debug!(variable = name, key = %path.join("."), "Applying environment override");
        set_path(document, &path, parse_scalar(raw));
    }
}

fn parse_scalar(raw: &str) -> Value {
    if raw.trim().is_empty() {
        return Value::String(raw.to_string());
    }
    match serde_yaml::from_str::<Value>(raw) {
        Ok(value @ (Value::Bool(_) | Value::Number(_) | Value::String(_))) => value,
        _ => Value::String(raw.to_string()),
    }
}

fn set_path(document: &mut Value, path: &[&str], value: Value) {
    let Some((last, parents)) = path.split_last() else {
        return;
    };

    let mut current = document;
    for segment in parents {
        if !current.is_object() {
            *current = Value::Object(Map::new());
        }
        let Value::Object(map) = current else {
            return;
        };
        let key = existing_key(map, segment);
        current = map.entry(key).or_insert_with(|| Value::Object(Map::new()));
    }

    if !current.is_object() {
        *current = Value::Object(Map::new());
    }
    if let Value::Object(map) = current {
        let key = existing_key(map, last);
        map.insert(key, value);
    }
}

/// Key of `map` equal to `segment` ignoring ASCII case, else `segment`
fn existing_key(map: &Map<String, Value>, segment: &str) -> String {
    if map.contains_key(segment) {
        return segment.to_string();
    }
    map.keys()
        .find(|key| key.eq_ignore_ascii_case(segment))
        .cloned()
        .unwrap_or_else(|| segment.to_string())
}
