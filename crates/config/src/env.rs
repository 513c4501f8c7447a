//! Environment resolution
//!
//! Builds the name → value mapping that placeholders are resolved against.
//! The process environment is read once into an [`Environment`] snapshot and
//! optionally combined with a dotenv file; nothing here writes back to the
//! real process environment.

use cortex_types::{ConfigError, Result};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{debug, warn};

/// Variable holding the namespacing prefix applied to placeholder lookups
pub const ENV_PREFIX_VAR: &str = "CONFIG_ENV_PREFIX";

/// Private-use character standing in for `$` while a dotenv file is parsed
const DOLLAR_STANDIN: char = '\u{E000}';

fn unmask(text: &str) -> String {
    text.replace(DOLLAR_STANDIN, "$")
}

/// Which side wins when the process environment and a dotenv file both set a name
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum EnvPrecedence {
    /// Process values win; the file only fills gaps
    #[default]
    ProcessFirst,
    /// File values override the process environment
    FileFirst,
}

/// Snapshot of environment variables
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Environment {
    vars: BTreeMap<String, String>,
}

impl Environment {
    /// Empty environment
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the current process environment
    ///
    /// Variables whose name or value is not valid unicode are skipped.
    pub fn from_process() -> Self {
        let vars = std::env::vars_os()
            .filter_map(|(key, value)| Some((key.into_string().ok()?, value.into_string().ok()?)))
            .collect();
        Self { vars }
    }

    /// Synthetic environment, mostly for tests and programmatic configuration
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            vars: pairs
                .into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        }
    }

    /// Read a dotenv file
    ///
    /// Returns `Ok(None)` if the file does not exist. Malformed lines are
    /// skipped with a warning. Values are taken verbatim: `${NAME}` references
    /// inside them are resolved later against the merged environment, never
    /// against the process environment.
    pub fn from_dotenv<P: AsRef<Path>>(path: P) -> Result<Option<Self>> {
        let path = path.as_ref();
        if !path.exists() {
            debug!(path = %path.display(), "Dotenv file not found, skipping");
            return Ok(None);
        }

        let environment_error = |message: String| ConfigError::Environment {
            path: path.display().to_string(),
            message,
        };

        let content = std::fs::read_to_string(path).map_err(|e| environment_error(e.to_string()))?;
        if content.contains(DOLLAR_STANDIN) {
            return Err(environment_error(format!(
                "contains the reserved character U+{:04X}",
                u32::from(DOLLAR_STANDIN)
            )));
        }

        // dotenvy expands `$NAME` from the process environment while parsing
        let masked = content.replace('$', &DOLLAR_STANDIN.to_string());

        let mut vars = BTreeMap::new();
        for (index, item) in dotenvy::from_read_iter(masked.as_bytes()).enumerate() {
            match item {
                Ok((key, value)) => {
                    vars.insert(key, unmask(&value));
                }
                Err(dotenvy::Error::Io(e)) => return Err(environment_error(e.to_string())),
                Err(e) => {
                    warn!(
                        path = %path.display(),
                        entry = index + 1,
                        error = %unmask(&e.to_string()),
                        "Skipping malformed dotenv line"
                    );
                }
            }
        }

        debug!(path = %path.display(), count = vars.len(), "Loaded dotenv file");
        Ok(Some(Self { vars }))
    }

    /// Combine this environment with an optional dotenv file
    pub fn resolve(self, dotenv: Option<&Path>, precedence: EnvPrecedence) -> Result<Self> {
        let Some(path) = dotenv else {
            return Ok(self);
        };
        match Self::from_dotenv(path)? {
            Some(file) => Ok(self.merged_with(file, precedence)),
            None => Ok(self),
        }
    }

    fn merged_with(self, file: Environment, precedence: EnvPrecedence) -> Self {
        let (mut base, overlay) = match precedence {
            EnvPrecedence::ProcessFirst => (file.vars, self.vars),
            EnvPrecedence::FileFirst => (self.vars, file.vars),
        };
        base.extend(overlay);
        Self { vars: base }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.vars.get(name).map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.vars.contains_key(name)
    }

    /// Return a copy with one more variable set
    pub fn with_var(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.vars.insert(name.into(), value.into());
        self
    }

    /// Namespacing prefix from `CONFIG_ENV_PREFIX`, if set and non-empty
    pub fn prefix(&self) -> Option<&str> {
        self.get(ENV_PREFIX_VAR).filter(|prefix| !prefix.is_empty())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.vars.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }
}

/// Resolve the environment placeholders are substituted against
pub fn resolve_environment(
    base: Environment,
    dotenv: Option<&Path>,
    precedence: EnvPrecedence,
) -> Result<Environment> {
    base.resolve(dotenv, precedence)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn dotenv_file(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_process_environment_wins_by_default() {
        let file = dotenv_file("OPENAI_API_KEY=from-file\nVECTOR_DB_URL=http://localhost:6333\n");
        let base = Environment::from_pairs([("OPENAI_API_KEY", "from-process")]);

        let env = resolve_environment(base, Some(file.path()), EnvPrecedence::default()).unwrap();
        assert_eq!(env.get("OPENAI_API_KEY"), Some("from-process"));
        assert_eq!(env.get("VECTOR_DB_URL"), Some("http://localhost:6333"));
    }

    #[test]
    fn test_file_first_precedence() {
        let file = dotenv_file("OPENAI_API_KEY=from-file\n");
        let base = Environment::from_pairs([("OPENAI_API_KEY", "from-process")]);

        let env = resolve_environment(base, Some(file.path()), EnvPrecedence::FileFirst).unwrap();
        assert_eq!(env.get("OPENAI_API_KEY"), Some("from-file"));
    }

    #[test]
    fn test_comments_quotes_and_malformed_lines() {
        let file = dotenv_file(concat!(
            "# secrets\n\n",
            "ANTHROPIC_API_KEY=\"sk-quoted\"\n",
            "this line has no equals sign\n",
            "LOG=debug\n",
        ));

        let env = Environment::from_dotenv(file.path()).unwrap().unwrap();
        assert_eq!(env.get("ANTHROPIC_API_KEY"), Some("sk-quoted"));
        assert_eq!(env.get("LOG"), Some("debug"));
        assert_eq!(env.len(), 2);
    }

    #[test]
    fn test_dotenv_references_kept_verbatim() {
        let file = dotenv_file(concat!(
            "HOME_DIR=${HOME}\n",
            "SINGLE='${OPENAI_API_KEY}'\n",
            "DOUBLE=\"key-${OPENAI_API_KEY}\"\n",
            "BARE=$PATH\n",
            "PRICE=\"$5\"\n",
        ));

        let env = Environment::from_dotenv(file.path()).unwrap().unwrap();
        assert_eq!(env.get("HOME_DIR"), Some("${HOME}"));
        assert_eq!(env.get("SINGLE"), Some("${OPENAI_API_KEY}"));
        assert_eq!(env.get("DOUBLE"), Some("key-${OPENAI_API_KEY}"));
        assert_eq!(env.get("BARE"), Some("$PATH"));
        assert_eq!(env.get("PRICE"), Some("$5"));
    }

    #[test]
    fn test_missing_dotenv_is_ignored() {
        let base = Environment::from_pairs([("A", "1")]);
        let env = resolve_environment(
            base.clone(),
            Some(Path::new("/nonexistent/cortex/.env")),
            EnvPrecedence::ProcessFirst,
        )
        .unwrap();
        assert_eq!(env, base);
    }

    #[test]
    fn test_prefix() {
        assert_eq!(Environment::new().prefix(), None);
        assert_eq!(
            Environment::from_pairs([(ENV_PREFIX_VAR, "")]).prefix(),
            None
        );
        assert_eq!(
            Environment::from_pairs([(ENV_PREFIX_VAR, "TEST_")]).prefix(),
            Some("TEST_")
        );
    }
}
