//! cortexctl - inspect and validate CortexAi configuration files

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::env;
use std::path::PathBuf;
use tracing::debug;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

#[derive(Debug, Parser)]
#[command(name = "cortexctl", version, about = "Inspect and validate CortexAi configuration")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

/// Options shared by every command that loads configuration
#[derive(Debug, Clone, clap::Args)]
struct LoadArgs {
    /// Configuration files, merged in order (later files win)
    #[arg(required = true, env = "CONFIG_PATH", value_delimiter = ',')]
    files: Vec<PathBuf>,

    /// Dotenv file with additional variables
    #[arg(long, default_value = ".env")]
    env_file: PathBuf,

    /// Ignore the dotenv file
    #[arg(long)]
    no_env_file: bool,

    /// Let dotenv values override the process environment
    #[arg(long)]
    env_file_first: bool,

    /// Fail on placeholders whose variable is not set
    #[arg(long, env = "CONFIG_STRICT_ENV")]
    strict: bool,

    /// Prefix tried first when resolving placeholders
    #[arg(long, env = "CONFIG_ENV_PREFIX")]
    env_prefix: Option<String>,

    /// Ignore CORTEX_* override variables
    #[arg(long)]
    no_overrides: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    Yaml,
    Json,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Validate configuration and report every error and warning
    Check {
        #[command(flatten)]
        load: LoadArgs,
    },
    /// Print the fully resolved configuration
    Show {
        #[command(flatten)]
        load: LoadArgs,
        #[arg(long, value_enum, default_value_t = OutputFormat::Yaml)]
        format: OutputFormat,
        /// Print API keys in clear text
        #[arg(long)]
        reveal_secrets: bool,
    },
    /// List referenced environment variables and whether they resolve
    Env {
        #[command(flatten)]
        load: LoadArgs,
    },
    /// Write the sample configuration
    Example {
        /// Destination path
        path: PathBuf,
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

fn main() -> Result<()> {
    init_logging()?;

    let cli = Cli::parse();
    debug!(command = ?cli.command, "Running command");

    match cli.command {
        Command::Check { load } => commands::check(&load),
        Command::Show {
            load,
            format,
            reveal_secrets,
        } => commands::show(&load, format, reveal_secrets),
        Command::Env { load } => commands::env(&load),
        Command::Example { path, force } => commands::example(&path, force),
    }
}

/// Initialize logging based on environment variables
fn init_logging() -> Result<()> {
    let log_level = env::var("RUST_LOG").unwrap_or_else(|_| "warn".to_string());
    let log_format = env::var("LOG_FORMAT").unwrap_or_else(|_| "pretty".to_string());

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&log_level));

    let registry = tracing_subscriber::registry().with(env_filter);

    match log_format.as_str() {
        "json" => {
            registry
                .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
                .try_init()
                .context("Failed to initialize JSON logging")?;
        }
        _ => {
            registry
                .with(
                    tracing_subscriber::fmt::layer()
                        .compact()
                        .with_target(false)
                        .with_writer(std::io::stderr),
                )
                .try_init()
                .context("Failed to initialize logging")?;
        }
    }

    debug!(level = %log_level, format = %log_format, "Logging initialized");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_check_with_layers() {
        let cli = Cli::try_parse_from([
            "cortexctl",
            "check",
            "base.yml",
            "local.yml",
            "--strict",
            "--env-file",
            "config/.env",
        ])
        .unwrap();

        match cli.command {
            Command::Check { load } => {
                assert_eq!(load.files, [PathBuf::from("base.yml"), PathBuf::from("local.yml")]);
                assert!(load.strict);
                assert_eq!(load.env_file, PathBuf::from("config/.env"));
                assert!(!load.no_overrides);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_show_format() {
        let cli =
            Cli::try_parse_from(["cortexctl", "show", "config.yml", "--format", "json"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::Show {
                format: OutputFormat::Json,
                reveal_secrets: false,
                ..
            }
        ));
    }

    #[test]
    fn test_parse_example() {
        let cli = Cli::try_parse_from(["cortexctl", "example", "out.yml", "--force"]).unwrap();
        match cli.command {
            Command::Example { path, force } => {
                assert_eq!(path, PathBuf::from("out.yml"));
                assert!(force);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
