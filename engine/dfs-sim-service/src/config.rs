//! Service configuration management
//!
//! Layering, lowest to highest precedence: built-in defaults, a TOML file,
//! `DFS_SIM_*` environment variables (a `.env` file is loaded first by the
//! binary), then command-line flags.

use anyhow::{bail, Context, Result};
use lineup_simulator::{SimConfig, SimilarityKind, UnresolvedPolicy};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Main service configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Simulation parameters handed to the compute core
    pub simulation: SimConfig,

    /// Where results are written
    pub output: OutputConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Output locations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Ranked lineup table
    pub rankings_file: PathBuf,

    /// Directory for the intermediate tables when `show_intermediate` is set
    pub intermediate_dir: PathBuf,

    /// Number of lineups echoed to stdout after a run
    pub summary_rows: usize,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// Log format (json, pretty, compact)
    pub format: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            rankings_file: PathBuf::from("sim_rankings.csv"),
            intermediate_dir: PathBuf::from("."),
            summary_rows: 10,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: "info".to_string(), format: "compact".to_string() }
    }
}

/// Load configuration from an optional file and the process environment
pub fn load_config(path: Option<&Path>) -> Result<ServiceConfig> {
    let mut config = match path {
        Some(path) => {
            tracing::debug!("Loading configuration from file: {:?}", path);
            load_from_file(path)?
        }
        None => ServiceConfig::default(),
    };

    apply_env_overrides(&mut config, |key| std::env::var(key).ok())?;

    Ok(config)
}

/// Load configuration from a TOML file
pub fn load_from_file(path: &Path) -> Result<ServiceConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file {}", path.display()))?;
    toml::from_str(&content).with_context(|| format!("Failed to parse config file {}", path.display()))
}

/// Write configuration as TOML
pub fn save_to_file(config: &ServiceConfig, path: &Path) -> Result<()> {
    let content = toml::to_string_pretty(config).context("Failed to serialize configuration")?;
    std::fs::write(path, content).with_context(|| format!("Failed to write config file {}", path.display()))
}

/// Override configuration from `DFS_SIM_*` variables
///
/// `lookup` abstracts the environment so overrides can be tested without
/// touching process state.
pub fn apply_env_overrides<F>(config: &mut ServiceConfig, lookup: F) -> Result<()>
where
    F: Fn(&str) -> Option<String>,
{
    let sim = &mut config.simulation;

    if let Some(value) = lookup("DFS_SIM_CONTEST_SIZE") {
        sim.contest_size = parse_var("DFS_SIM_CONTEST_SIZE", &value)?;
    }
    if let Some(value) = lookup("DFS_SIM_TRIALS") {
        sim.trials = parse_var("DFS_SIM_TRIALS", &value)?;
    }
    if let Some(value) = lookup("DFS_SIM_MAX_TRIALS") {
        sim.max_trials = parse_var("DFS_SIM_MAX_TRIALS", &value)?;
    }
    if let Some(value) = lookup("DFS_SIM_SEED") {
        sim.random_seed = Some(parse_var("DFS_SIM_SEED", &value)?);
    }
    if let Some(value) = lookup("DFS_SIM_SHOW_INTERMEDIATE") {
        sim.show_intermediate = parse_var("DFS_SIM_SHOW_INTERMEDIATE", &value)?;
    }
    if let Some(value) = lookup("DFS_SIM_CHUNK_SIZE") {
        sim.chunk_size = parse_var("DFS_SIM_CHUNK_SIZE", &value)?;
    }
    if let Some(value) = lookup("DFS_SIM_SIMILARITY") {
        sim.similarity = parse_similarity(&value)?;
    }
    if let Some(value) = lookup("DFS_SIM_UNRESOLVED_POLICY") {
        sim.unresolved_policy = parse_policy(&value)?;
    }

    if let Some(level) = lookup("DFS_SIM_LOG_LEVEL") {
        config.logging.level = level;
    }
    if let Some(format) = lookup("DFS_SIM_LOG_FORMAT") {
        config.logging.format = format;
    }
    if let Some(dir) = lookup("DFS_SIM_OUTPUT_DIR") {
        config.output.intermediate_dir = PathBuf::from(dir);
    }

    Ok(())
}

fn parse_var<T>(key: &str, value: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    value.trim().parse().with_context(|| format!("Invalid value for {key}: {value:?}"))
}

pub fn parse_policy(value: &str) -> Result<UnresolvedPolicy> {
    match value.trim().to_lowercase().as_str() {
        "abort" => Ok(UnresolvedPolicy::Abort),
        "skip_lineup" | "skip" => Ok(UnresolvedPolicy::SkipLineup),
        other => bail!("Invalid unresolved policy: {other} (expected abort or skip_lineup)"),
    }
}

pub fn parse_similarity(value: &str) -> Result<SimilarityKind> {
    match value.trim().to_lowercase().as_str() {
        "token_sort" => Ok(SimilarityKind::TokenSort),
        "skim" => Ok(SimilarityKind::Skim),
        other => bail!("Invalid similarity: {other} (expected token_sort or skim)"),
    }
}

/// Validate configuration
pub fn validate_config(config: &ServiceConfig) -> Result<()> {
    config.simulation.validate().context("Invalid simulation configuration")?;

    let valid_levels = ["trace", "debug", "info", "warn", "error"];
    if !valid_levels.contains(&config.logging.level.as_str()) {
        bail!("Invalid log level: {}", config.logging.level);
    }

    let valid_formats = ["json", "pretty", "compact"];
    if !valid_formats.contains(&config.logging.format.as_str()) {
        bail!("Invalid log format: {}", config.logging.format);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> =
            pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults_are_valid() {
        let config = ServiceConfig::default();
        assert_eq!(config.simulation.contest_size, 359_281);
        assert_eq!(config.simulation.trials, 2_000);
        assert_eq!(config.output.rankings_file, PathBuf::from("sim_rankings.csv"));
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_env_overrides() {
        let mut config = ServiceConfig::default();
        apply_env_overrides(
            &mut config,
            env(&[
                ("DFS_SIM_TRIALS", "500"),
                ("DFS_SIM_SEED", "42"),
                ("DFS_SIM_SHOW_INTERMEDIATE", "true"),
                ("DFS_SIM_UNRESOLVED_POLICY", "skip_lineup"),
                ("DFS_SIM_LOG_FORMAT", "json"),
            ]),
        )
        .unwrap();

        assert_eq!(config.simulation.trials, 500);
        assert_eq!(config.simulation.random_seed, Some(42));
        assert!(config.simulation.show_intermediate);
        assert_eq!(config.simulation.unresolved_policy, UnresolvedPolicy::SkipLineup);
        assert_eq!(config.logging.format, "json");
    }

    #[test]
    fn test_bad_env_value_is_an_error() {
        let mut config = ServiceConfig::default();
        let err = apply_env_overrides(&mut config, env(&[("DFS_SIM_TRIALS", "many")])).unwrap_err();
        assert!(err.to_string().contains("DFS_SIM_TRIALS"));
    }

    #[test]
    fn test_validation_rejects_bad_logging() {
        let mut config = ServiceConfig::default();
        config.logging.level = "loud".to_string();
        assert!(validate_config(&config).is_err());

        let mut config = ServiceConfig::default();
        config.simulation.trials = 0;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_file_round_trip_with_partial_sections() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dfs-sim.toml");
        std::fs::write(&path, "[simulation]\ntrials = 750\nrandom_seed = 9\n\n[logging]\nlevel = \"debug\"\n")
            .unwrap();

        let config = load_from_file(&path).unwrap();
        assert_eq!(config.simulation.trials, 750);
        assert_eq!(config.simulation.random_seed, Some(9));
        assert_eq!(config.simulation.contest_size, 359_281);
        assert_eq!(config.logging.level, "debug");

        let copy = dir.path().join("copy.toml");
        save_to_file(&config, &copy).unwrap();
        assert_eq!(load_from_file(&copy).unwrap(), config);
    }
}
