//! `${NAME}` placeholder substitution

use crate::env::Environment;
use cortex_types::{utils::join_path, ConfigError, Result};
use serde_json::{Map, Value};
use std::collections::BTreeSet;
use std::sync::LazyLock;
use tracing::debug;

static PLACEHOLDER: LazyLock<regex::Regex> = LazyLock::new(|| {
    regex::Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)\}").expect("placeholder pattern is valid")
});

/// What to do with a placeholder whose variable is not set
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SubstitutionMode {
    /// Leave the literal `${NAME}` in place
    #[default]
    Permissive,
    /// Fail with [`ConfigError::MissingEnvironmentVariable`]
    Strict,
}

/// Walks a document and replaces placeholders in every string leaf
#[derive(Debug, Clone)]
pub struct Substitutor<'a> {
    env: &'a Environment,
    mode: SubstitutionMode,
    prefix: Option<&'a str>,
}

impl<'a> Substitutor<'a> {
    /// Substitutor using the prefix from `CONFIG_ENV_PREFIX`, if any
    pub fn new(env: &'a Environment, mode: SubstitutionMode) -> Self {
        Self {
            env,
            mode,
            prefix: env.prefix(),
        }
    }

    /// Override the namespacing prefix
    pub fn with_prefix(mut self, prefix: Option<&'a str>) -> Self {
        self.prefix = prefix.filter(|p| !p.is_empty());
        self
    }

    /// Substitute the whole document, returning a new tree
    pub fn substitute(&self, document: &Value) -> Result<Value> {
        self.walk(document, "")
    }

    fn walk(&self, value: &Value, path: &str) -> Result<Value> {
        match value {
            Value::String(text) => self.substitute_str(text, path).map(Value::String),
            Value::Array(items) => items
                .iter()
                .enumerate()
                .map(|(index, item)| self.walk(item, &format!("{path}[{index}]")))
                .collect::<Result<Vec<_>>>()
                .map(Value::Array),
            Value::Object(entries) => {
                let mut out = Map::with_capacity(entries.len());
                for (key, item) in entries {
                    out.insert(key.clone(), self.walk(item, &join_path(path, key))?);
                }
                Ok(Value::Object(out))
            }
            other => Ok(other.clone()),
        }
    }

    /// Substitute the placeholders of a single string
    ///
    /// Variable values that carry placeholders of their own are expanded
    /// against the same environment.
    pub fn substitute_str(&self, text: &str, path: &str) -> Result<String> {
        self.expand(text, path, &mut Vec::new())
    }

    fn expand(&self, text: &str, path: &str, active: &mut Vec<String>) -> Result<String> {
        if !text.contains("${") {
            return Ok(text.to_string());
        }

        let mut out = String::with_capacity(text.len());
        let mut last = 0;
        for caps in PLACEHOLDER.captures_iter(text) {
            let (Some(whole), Some(name)) = (caps.get(0), caps.get(1)) else {
                continue;
            };
            out.push_str(&text[last..whole.start()]);
            match self.lookup(name.as_str()) {
                Some(_) if active.iter().any(|n| n == name.as_str()) => match self.mode {
                    SubstitutionMode::Permissive => {
                        debug!(name = name.as_str(), path, "Leaving self-referencing placeholder");
                        out.push_str(whole.as_str());
                    }
                    SubstitutionMode::Strict => {
                        return Err(ConfigError::CyclicEnvironmentVariable {
                            name: name.as_str().to_string(),
                            path: path.to_string(),
                        });
                    }
                },
                Some(value) => {
                    active.push(name.as_str().to_string());
                    let expanded = self.expand(value, path, active);
                    active.pop();
                    out.push_str(&expanded?);
                }
                None => match self.mode {
                    SubstitutionMode::Permissive => {
                        debug!(name = name.as_str(), path, "Leaving unresolved placeholder");
                        out.push_str(whole.as_str());
                    }
                    SubstitutionMode::Strict => {
                        return Err(ConfigError::MissingEnvironmentVariable {
                            name: name.as_str().to_string(),
                            path: path.to_string(),
                        });
                    }
                },
            }
            last = whole.end();
        }
        out.push_str(&text[last..]);
        Ok(out)
    }

    fn lookup(&self, name: &str) -> Option<&'a str> {
        if let Some(prefix) = self.prefix {
            if let Some(value) = self.env.get(&format!("{prefix}{name}")) {
                return Some(value);
            }
        }
        self.env.get(name)
    }
}

/// Substitute every placeholder in `document` against `env`
pub fn substitute(document: &Value, env: &Environment, mode: SubstitutionMode) -> Result<Value> {
    Substitutor::new(env, mode).substitute(document)
}

/// Whether a string still carries a `${NAME}` placeholder
pub fn contains_placeholder(text: &str) -> bool {
    PLACEHOLDER.is_match(text)
}

/// Every variable name referenced by a placeholder anywhere in the document
pub fn placeholder_names(document: &Value) -> BTreeSet<String> {
    let mut names = BTreeSet::new();
    collect_names(document, &mut names);
    names
}

fn collect_names(value: &Value, names: &mut BTreeSet<String>) {
    match value {
        Value::String(text) => {
            for caps in PLACEHOLDER.captures_iter(text) {
                if let Some(name) = caps.get(1) {
                    names.insert(name.as_str().to_string());
                }
            }
        }
        Value::Array(items) => items.iter().for_each(|item| collect_names(item, names)),
        Value::Object(entries) => entries.values().for_each(|item| collect_names(item, names)),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::ENV_PREFIX_VAR;
    use proptest::prelude::*;
    use serde_json::json;

    fn env() -> Environment {
        Environment::from_pairs([
            ("OPENAI_API_KEY", "sk-test"),
            ("HOST", "localhost"),
            ("PORT", "6333"),
        ])
    }

    #[test]
    fn test_whole_and_embedded_placeholders() {
        let doc = json!({
            "providers": {
                "openai": { "api_key": "${OPENAI_API_KEY}", "timeout": 30 }
            },
            "memories": {
                "long_term": { "vector_db_url": "http://${HOST}:${PORT}/v1" }
            },
            "debug": true
        });

        let out = substitute(&doc, &env(), SubstitutionMode::Permissive).unwrap();
        assert_eq!(out["providers"]["openai"]["api_key"], "sk-test");
        assert_eq!(out["providers"]["openai"]["timeout"], 30);
        assert_eq!(
            out["memories"]["long_term"]["vector_db_url"],
            "http://localhost:6333/v1"
        );
        assert_eq!(out["debug"], true);
    }

    #[test]
    fn test_permissive_keeps_literal() {
        let doc = json!({ "key": "prefix-${NOT_SET}-suffix" });
        let out = substitute(&doc, &env(), SubstitutionMode::Permissive).unwrap();
        assert_eq!(out["key"], "prefix-${NOT_SET}-suffix");
    }

    #[test]
    fn test_strict_reports_name_and_path() {
        let doc = json!({ "providers": { "openai": { "api_key": "${OPENAI_API_KEY}" } } });
        let err = substitute(&doc, &Environment::new(), SubstitutionMode::Strict).unwrap_err();
        match err {
            ConfigError::MissingEnvironmentVariable { name, path } => {
                assert_eq!(name, "OPENAI_API_KEY");
                assert_eq!(path, "providers.openai.api_key");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_sequences_are_walked() {
        let doc = json!({ "agents": { "a": { "tools": ["${HOST}", "search"] } } });
        let out = substitute(&doc, &env(), SubstitutionMode::Strict).unwrap();
        assert_eq!(out["agents"]["a"]["tools"], json!(["localhost", "search"]));

        let err = substitute(
            &json!({ "list": ["ok", "${NOPE}"] }),
            &env(),
            SubstitutionMode::Strict,
        )
        .unwrap_err();
        assert_eq!(err.location(), "list[1]");
    }

    #[test]
    fn test_prefixed_lookup_falls_back_to_bare_name() {
        let env = Environment::from_pairs([
            (ENV_PREFIX_VAR, "TEST_"),
            ("TEST_OPENAI_API_KEY", "sk-namespaced"),
            ("HOST", "bare-host"),
        ]);
        let doc = json!({ "key": "${OPENAI_API_KEY}", "host": "${HOST}" });
        let out = substitute(&doc, &env, SubstitutionMode::Strict).unwrap();
        assert_eq!(out["key"], "sk-namespaced");
        assert_eq!(out["host"], "bare-host");
    }

    #[test]
    fn test_variable_values_are_expanded() {
        let env = env().with_var("DB_URL", "http://${HOST}:${PORT}");
        let doc = json!({ "url": "${DB_URL}/v1" });
        let out = substitute(&doc, &env, SubstitutionMode::Strict).unwrap();
        assert_eq!(out["url"], "http://localhost:6333/v1");

        let env = env.with_var("SECRET", "${NOT_SET}");
        let doc = json!({ "providers": { "openai": { "api_key": "${SECRET}" } } });
        let out = substitute(&doc, &env, SubstitutionMode::Permissive).unwrap();
        assert_eq!(out["providers"]["openai"]["api_key"], "${NOT_SET}");

        let err = substitute(&doc, &env, SubstitutionMode::Strict).unwrap_err();
        match err {
            ConfigError::MissingEnvironmentVariable { name, path } => {
                assert_eq!(name, "NOT_SET");
                assert_eq!(path, "providers.openai.api_key");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_self_reference_does_not_loop() {
        let env = Environment::from_pairs([("A", "x-${B}"), ("B", "${A}")]);
        let doc = json!({ "key": "${A}" });

        let out = substitute(&doc, &env, SubstitutionMode::Permissive).unwrap();
        assert_eq!(out["key"], "x-${A}");

        let err = substitute(&doc, &env, SubstitutionMode::Strict).unwrap_err();
        match err {
            ConfigError::CyclicEnvironmentVariable { name, .. } => assert_eq!(name, "A"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_invalid_placeholder_syntax_is_left_alone() {
        let doc = json!({ "a": "${}", "b": "${1ABC}", "c": "$HOST" });
        let out = substitute(&doc, &env(), SubstitutionMode::Strict).unwrap();
        assert_eq!(out, doc);
    }

    #[test]
    fn test_placeholder_names() {
        let doc = json!({
            "a": "${OPENAI_API_KEY}",
            "b": ["${HOST}:${PORT}", 1],
            "c": { "d": "${HOST}" }
        });
        let names: Vec<_> = placeholder_names(&doc).into_iter().collect();
        assert_eq!(names, ["HOST", "OPENAI_API_KEY", "PORT"]);
        assert!(contains_placeholder("x ${Y} z"));
        assert!(!contains_placeholder("plain"));
    }

    fn leaf() -> impl Strategy<Value = Value> {
        prop_oneof![
            any::<bool>().prop_map(Value::from),
            any::<i64>().prop_map(Value::from),
            "[a-z ]{0,8}".prop_map(Value::from),
            prop::sample::select(vec!["${HOST}", "${MISSING}", "x-${PORT}-y", "${OPENAI_API_KEY}"])
                .prop_map(Value::from),
        ]
    }

    fn document() -> impl Strategy<Value = Value> {
        leaf().prop_recursive(4, 32, 4, |inner| {
            prop_oneof![
                prop::collection::vec(inner.clone(), 0..4).prop_map(Value::Array),
                prop::collection::btree_map("[a-z]{1,6}", inner, 0..4)
                    .prop_map(|m| Value::Object(m.into_iter().collect())),
            ]
        })
    }

    proptest! {
        #[test]
        fn prop_substitution_is_idempotent(doc in document()) {
            let env = env();
            let once = substitute(&doc, &env, SubstitutionMode::Permissive).unwrap();
            let twice = substitute(&once, &env, SubstitutionMode::Permissive).unwrap();
            prop_assert_eq!(once, twice);
        }
    }
}
