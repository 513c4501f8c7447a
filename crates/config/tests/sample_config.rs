//! End-to-end loads of the bundled sample configuration

use cortex_config::{ConfigLoader, ConfigSource, Environment, SAMPLE_CONFIG};
use cortex_types::{ConfigError, LoadStage};
use serde_json::json;
use std::path::PathBuf;

fn sample_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("sample_config.yml")
}

fn sample_env() -> Environment {
    Environment::from_pairs([
        ("OPENAI_API_KEY", "sk-test"),
        ("ANTHROPIC_API_KEY", "sk-test2"),
        ("VECTOR_DB_URL", "http://localhost:6333"),
    ])
}

#[test]
fn test_sample_config_loads() {
    let config = ConfigLoader::new()
        .with_environment(sample_env())
        .strict(true)
        .load_file(sample_path())
        .unwrap();

    let openai = &config.providers["openai"];
    assert_eq!(openai.additional_params["temperature"], json!(0.7));
    assert_eq!(openai.api_key.as_deref(), Some("sk-test"));
    assert_eq!(config.providers["anthropic"].api_key.as_deref(), Some("sk-test2"));
    assert_eq!(
        config.memories["long_term"].vector_db_url.as_deref(),
        Some("http://localhost:6333")
    );

    assert_eq!(config.agents["researcher"].tools, ["scraper", "search"]);
    assert!(config.agents["researcher"].verbose);
    assert_eq!(config.providers["anthropic"].max_retries, 3);
}

#[test]
fn test_sample_config_resolves_agents() {
    let config = ConfigLoader::new()
        .with_environment(sample_env())
        .load(ConfigSource::yaml(SAMPLE_CONFIG))
        .unwrap();

    for name in config.agents.keys() {
        assert!(config.resolve_agent(name).is_some(), "agent {name} does not resolve");
    }

    let researcher = config.resolve_agent("researcher").unwrap();
    assert_eq!(researcher.provider.kind, "openai");
    assert_eq!(researcher.memory.unwrap().collection.as_deref(), Some("agent_memory"));
    let tools: Vec<_> = researcher.tools.iter().map(|t| t.display_name.as_str()).collect();
    assert_eq!(tools, ["Web Scraper", "Web Search"]);
}

#[test]
fn test_sample_config_strict_without_openai_key() {
    let env = Environment::from_pairs([
        ("ANTHROPIC_API_KEY", "sk-test2"),
        ("VECTOR_DB_URL", "http://localhost:6333"),
    ]);
    let err = ConfigLoader::new()
        .with_environment(env)
        .strict(true)
        .load_file(sample_path())
        .unwrap_err();

    assert_eq!(err.stage(), LoadStage::Substitution);
    match err {
        ConfigError::MissingEnvironmentVariable { name, path } => {
            assert_eq!(name, "OPENAI_API_KEY");
            assert_eq!(path, "providers.openai.api_key");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_sample_config_permissive_without_vector_db_url() {
    let env = Environment::from_pairs([
        ("OPENAI_API_KEY", "sk-test"),
        ("ANTHROPIC_API_KEY", "sk-test2"),
    ]);
    let err = ConfigLoader::new()
        .with_environment(env)
        .load_file(sample_path())
        .unwrap_err();

    assert_eq!(err.stage(), LoadStage::Validation);
    assert_eq!(err.location(), "memories.long_term.vector_db_url");
}

#[test]
fn test_sample_config_with_broken_reference() {
    let overlay = r#"
agents:
  researcher:
    provider: nonexistent
"#;
    let err = ConfigLoader::new()
        .with_environment(sample_env())
        .load_layers([ConfigSource::file(sample_path()), ConfigSource::yaml(overlay)])
        .unwrap_err();

    assert_eq!(err.stage(), LoadStage::Validation);
    assert_eq!(err.location(), "agents.researcher.provider");
}

#[test]
fn test_sample_config_is_shareable() {
    fn assert_send_sync<T: Send + Sync>(_: &T) {}

    let config = std::sync::Arc::new(
        ConfigLoader::new()
            .with_environment(sample_env())
            .load_file(sample_path())
            .unwrap(),
    );
    assert_send_sync(&config);

    let worker = {
        let config = std::sync::Arc::clone(&config);
        std::thread::spawn(move || config.summary())
    };
    assert_eq!(worker.join().unwrap(), config.summary());
}
