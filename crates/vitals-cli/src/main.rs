// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use clap::Parser;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::process;
use tracing_subscriber::EnvFilter;
use vitals_cli::{PipelineConfig, run_pipeline};
use vitals_core::VitalsError;

const LOG_ENV: &str = "VITALS_LOG";
const DEFAULT_LOG_FILTER: &str = "vitals=info";

/// Generate, corrupt, clean and analyze synthetic health-tracking readings.
#[derive(Debug, Parser)]
#[command(name = "vitals")]
#[command(version)]
struct Cli {
    /// Random seed for reproducible runs
    #[arg(long)]
    seed: Option<u64>,

    /// Number of simulated users
    #[arg(long)]
    users: Option<usize>,

    /// Number of simulated days
    #[arg(long)]
    days: Option<usize>,

    /// Fraction of all cells blanked out
    #[arg(long)]
    missing_fraction: Option<f64>,

    /// Fraction of each metric's valid cells replaced by extremes
    #[arg(long)]
    outlier_fraction: Option<f64>,

    /// Pipeline config JSON; flags override its values
    #[arg(long)]
    config: Option<PathBuf>,

    /// Write the report here instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Pretty-print the JSON report
    #[arg(long)]
    pretty: bool,
}

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error(transparent)]
    Vitals(#[from] VitalsError),
    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },
    #[error("{context}: {source}")]
    Json {
        context: String,
        #[source]
        source: serde_json::Error,
    },
}

impl CliError {
    fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    fn json(context: impl Into<String>, source: serde_json::Error) -> Self {
        Self::Json {
            context: context.into(),
            source,
        }
    }

    fn code(&self) -> &'static str {
        match self {
            Self::Vitals(err) => err.code(),
            Self::Io { .. } => "io_error",
            Self::Json { .. } => "json_error",
        }
    }
}

fn main() {
    init_tracing();
    if let Err(err) = run(Cli::parse()) {
        eprintln!("error[{}]: {err}", err.code());
        process::exit(1);
    }
}

/// Logs go to stderr so stdout stays a single JSON document.
fn init_tracing() {
    let filter =
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: Cli) -> Result<(), CliError> {
    let config = resolve_config(&cli)?;
    let run = run_pipeline(&config)?;
    write_json_output(&run.report, cli.output.as_deref(), cli.pretty)
}

fn resolve_config(cli: &Cli) -> Result<PipelineConfig, CliError> {
    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => PipelineConfig::default(),
    };
    if let Some(seed) = cli.seed {
        config.seed = seed;
    }
    if let Some(users) = cli.users {
        config.generator.users = users;
    }
    if let Some(days) = cli.days {
        config.generator.days = days;
    }
    if let Some(fraction) = cli.missing_fraction {
        config.corruption.missing_fraction = fraction;
    }
    if let Some(fraction) = cli.outlier_fraction {
        config.corruption.outlier_fraction = fraction;
    }
    config.validate()?;
    Ok(config)
}

fn load_config(path: &Path) -> Result<PipelineConfig, CliError> {
    let raw = fs::read_to_string(path)
        .map_err(|source| CliError::io(format!("failed to read '{}'", path.display()), source))?;
    serde_json::from_str(&raw).map_err(|source| {
        CliError::json(
            format!("failed to parse pipeline config '{}'", path.display()),
            source,
        )
    })
}

fn write_json_output<T: Serialize>(
    payload: &T,
    output_path: Option<&Path>,
    pretty: bool,
) -> Result<(), CliError> {
    let encoded = if pretty {
        serde_json::to_string_pretty(payload)
    } else {
        serde_json::to_string(payload)
    }
    .map_err(|source| CliError::json("failed to serialize JSON output", source))?;

    if let Some(path) = output_path {
        fs::write(path, format!("{encoded}\n"))
            .map_err(|source| CliError::io(format!("failed to write '{}'", path.display()), source))
    } else {
        println!("{encoded}");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{Cli, CliError, resolve_config};
    use clap::Parser;
    use std::path::PathBuf;
    use vitals_core::VitalsError;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("vitals-cli-{}-{name}", std::process::id()))
    }

    #[test]
    fn flags_override_defaults() {
        let cli = Cli::try_parse_from([
            "vitals",
            "--seed",
            "9",
            "--users",
            "20",
            "--missing-fraction",
            "0.1",
        ])
        .expect("flags should parse");
        let config = resolve_config(&cli).expect("config should resolve");
        assert_eq!(config.seed, 9);
        assert_eq!(config.generator.users, 20);
        assert_eq!(config.generator.days, 90);
        assert_eq!(config.corruption.missing_fraction, 0.1);
    }

    #[test]
    fn flags_override_config_file_values() {
        let path = temp_path("override.json");
        std::fs::write(&path, r#"{"seed": 3, "generator": {"users": 15, "days": 30}}"#)
            .expect("temp config should write");
        let cli = Cli::try_parse_from([
            "vitals",
            "--config",
            path.to_str().expect("temp path should be utf-8"),
            "--days",
            "45",
        ])
        .expect("flags should parse");
        let config = resolve_config(&cli).expect("config should resolve");
        std::fs::remove_file(&path).expect("temp config should be removed");

        assert_eq!(config.seed, 3);
        assert_eq!(config.generator.users, 15);
        assert_eq!(config.generator.days, 45);
    }

    #[test]
    fn invalid_fraction_maps_to_invalid_input() {
        let cli = Cli::try_parse_from(["vitals", "--outlier-fraction", "1.5"])
            .expect("flags should parse");
        let err = resolve_config(&cli).expect_err("fraction above one must fail");
        assert_eq!(err.code(), "invalid_input");
    }

    #[test]
    fn missing_config_file_is_io_error() {
        let cli = Cli::try_parse_from(["vitals", "--config", "/nonexistent/vitals.json"])
            .expect("flags should parse");
        let err = resolve_config(&cli).expect_err("missing file must fail");
        assert_eq!(err.code(), "io_error");
        assert!(err.to_string().contains("failed to read"));
    }

    #[test]
    fn malformed_config_file_is_json_error() {
        let path = temp_path("malformed.json");
        std::fs::write(&path, "{ seed: ").expect("temp config should write");
        let cli = Cli::try_parse_from([
            "vitals",
            "--config",
            path.to_str().expect("temp path should be utf-8"),
        ])
        .expect("flags should parse");
        let err = resolve_config(&cli).expect_err("malformed file must fail");
        std::fs::remove_file(&path).expect("temp config should be removed");
        assert_eq!(err.code(), "json_error");
    }

    #[test]
    fn io_errors_keep_context_and_source() {
        let err = CliError::io(
            "failed to read 'x.json'",
            std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        );
        assert_eq!(err.to_string(), "failed to read 'x.json': gone");
        let source = std::error::Error::source(&err).expect("io error keeps its source");
        assert_eq!(source.to_string(), "gone");
    }

    #[test]
    fn invariant_violations_keep_their_code() {
        let err = CliError::from(VitalsError::invariant_violation("1 missing cell"));
        assert_eq!(err.code(), "invariant_violation");
        assert_eq!(err.to_string(), "invariant violation: 1 missing cell");
    }
}
