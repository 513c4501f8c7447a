use crate::{LoadArgs, OutputFormat};
use anyhow::{bail, Context, Result};
use cortex_config::{placeholder_names, ConfigLoader, ConfigSource, EnvPrecedence, ValidationReport};
use cortex_types::RootConfig;
use std::path::Path;
use tracing::info;

/// Build a loader from command-line options
fn loader(args: &LoadArgs) -> ConfigLoader {
    let mut loader = ConfigLoader::new()
        .strict(args.strict)
        .env_overrides(!args.no_overrides);

    if !args.no_env_file {
        loader = loader.with_dotenv(&args.env_file);
    }
    if args.env_file_first {
        loader = loader.with_precedence(EnvPrecedence::FileFirst);
    }
    if let Some(prefix) = &args.env_prefix {
        loader = loader.with_env_prefix(prefix.clone());
    }
    loader
}

fn sources(args: &LoadArgs) -> Vec<ConfigSource> {
    args.files.iter().map(ConfigSource::file).collect()
}

pub fn check(args: &LoadArgs) -> Result<()> {
    let loader = loader(args);
    let report = loader.check_layers(sources(args))?;
    print_report(&report);

    if report.has_errors() {
        bail!("{}", report.summary());
    }

    // Validation passed; building catches anything the report cannot
    let config = loader.load_layers(sources(args))?;
    println!("OK: {}", config.summary());
    Ok(())
}

fn print_report(report: &ValidationReport) {
    for issue in &report.errors {
        println!("error   {}: {}", issue.field, issue.message);
    }
    for issue in &report.warnings {
        println!("warning {}: {}", issue.field, issue.message);
    }
    println!("{}", report.summary());
}

pub fn show(args: &LoadArgs, format: OutputFormat, reveal_secrets: bool) -> Result<()> {
    let mut config = loader(args).load_layers(sources(args))?;
    if !reveal_secrets {
        mask_secrets(&mut config);
    }

    let rendered = match format {
        OutputFormat::Yaml => serde_yaml::to_string(&config).context("Failed to render YAML")?,
        OutputFormat::Json => {
            serde_json::to_string_pretty(&config).context("Failed to render JSON")?
        }
    };
    println!("{rendered}");
    Ok(())
}

fn mask_secrets(config: &mut RootConfig) {
    for provider in config.providers.values_mut() {
        provider.api_key = provider.masked_api_key();
    }
}

pub fn env(args: &LoadArgs) -> Result<()> {
    let loader = loader(args);
    let raw = loader.parse(sources(args))?;
    let environment = loader.resolve_environment()?;

    let names = placeholder_names(&raw);
    if names.is_empty() {
        println!("No environment variables referenced");
        return Ok(());
    }

    let mut missing = 0;
    for name in &names {
        let prefixed = args.env_prefix.as_ref().map(|prefix| format!("{prefix}{name}"));
        let source = match prefixed.as_deref() {
            Some(prefixed) if environment.contains(prefixed) => Some(prefixed),
            _ if environment.contains(name) => Some(name.as_str()),
            _ => None,
        };

        match source {
            Some(var) if var == name.as_str() => println!("set     {name}"),
            Some(var) => println!("set     {name} (from {var})"),
            None => {
                missing += 1;
                println!("missing {name}");
            }
        }
    }

    info!(referenced = names.len(), missing, "Checked environment references");
    if missing > 0 && args.strict {
        bail!("{missing} referenced variable(s) not set");
    }
    Ok(())
}

pub fn example(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        bail!("{} already exists (use --force to overwrite)", path.display());
    }
    ConfigLoader::create_example(path)?;
    println!("Wrote sample configuration to {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn args(files: Vec<PathBuf>) -> LoadArgs {
        LoadArgs {
            files,
            env_file: PathBuf::from(".env"),
            no_env_file: true,
            env_file_first: false,
            strict: false,
            env_prefix: None,
            no_overrides: true,
        }
    }

    #[test]
    fn test_example_refuses_overwrite() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.yml");

        example(&path, false).unwrap();
        assert!(example(&path, false).is_err());
        example(&path, true).unwrap();
    }

    #[test]
    fn test_check_reports_broken_reference() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.yml");
        std::fs::write(
            &path,
            "providers:\n  mock:\n    type: mock\nagents:\n  basic:\n    provider: missing\n",
        )
        .unwrap();

        let err = check(&args(vec![path])).unwrap_err();
        assert!(err.to_string().contains("1 errors"));
    }

    #[test]
    fn test_check_accepts_valid_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.yml");
        std::fs::write(
            &path,
            "providers:\n  mock:\n    type: mock\nagents:\n  basic:\n    provider: mock\n",
        )
        .unwrap();

        check(&args(vec![path])).unwrap();
    }
}
