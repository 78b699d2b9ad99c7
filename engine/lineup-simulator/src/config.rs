//! Configuration for a simulation run

use crate::error::SimError;
use crate::{DEFAULT_CHUNK_SIZE, DEFAULT_CONTEST_SIZE, DEFAULT_MAX_TRIALS, DEFAULT_TRIALS};
use player_registry::{SimilarityKind, DEFAULT_SUGGESTION_COUNT};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// What to do with lineups that reference unresolvable player names
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnresolvedPolicy {
    /// Fail the whole run, reporting every unresolved name
    #[default]
    Abort,
    /// Drop affected lineups (logged and listed in the report) and continue
    SkipLineup,
}

/// Configuration for a simulation run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Number of entries in the real contest
    pub contest_size: u64,

    /// Number of simulated trials
    pub trials: usize,

    /// Upper bound accepted for `trials`
    pub max_trials: usize,

    /// Seed for reproducible runs; `None` draws one from entropy
    #[serde(skip_serializing_if = "Option::is_none")]
    pub random_seed: Option<u64>,

    /// Keep the full simulation and rank matrices in the report
    pub show_intermediate: bool,

    /// Trials processed per chunk; bounds memory to lineups x chunk_size
    pub chunk_size: usize,

    /// Suggestions reported per unresolved name
    pub suggestion_count: usize,

    /// Similarity measure for name suggestions
    pub similarity: SimilarityKind,

    /// Handling of lineups with unresolved names
    pub unresolved_policy: UnresolvedPolicy,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            contest_size: DEFAULT_CONTEST_SIZE,
            trials: DEFAULT_TRIALS,
            max_trials: DEFAULT_MAX_TRIALS,
            random_seed: None,
            show_intermediate: false,
            chunk_size: DEFAULT_CHUNK_SIZE,
            suggestion_count: DEFAULT_SUGGESTION_COUNT,
            similarity: SimilarityKind::default(),
            unresolved_policy: UnresolvedPolicy::default(),
        }
    }
}

impl SimConfig {
    /// Check value ranges before any input is touched
    pub fn validate(&self) -> Result<(), SimError> {
        if self.contest_size == 0 {
            return Err(SimError::Config("contest_size must be at least 1".to_string()));
        }
        if self.trials == 0 {
            return Err(SimError::Config("trials must be at least 1".to_string()));
        }
        if self.trials > self.max_trials {
            return Err(SimError::Config(format!(
                "trials ({}) exceeds max_trials ({})",
                self.trials, self.max_trials
            )));
        }
        if self.chunk_size == 0 {
            return Err(SimError::Config("chunk_size must be at least 1".to_string()));
        }
        if self.suggestion_count == 0 {
            return Err(SimError::Config("suggestion_count must be at least 1".to_string()));
        }
        Ok(())
    }

    /// Number of chunks needed to cover all trials
    pub fn chunk_count(&self) -> usize {
        self.trials.div_ceil(self.chunk_size)
    }

    /// Load configuration from TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, SimError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| SimError::Config(format!("failed to read {}: {e}", path.display())))?;
        toml::from_str(&content)
            .map_err(|e| SimError::Config(format!("failed to parse {}: {e}", path.display())))
    }

    /// Save configuration to TOML file
    pub fn to_file(&self, path: impl AsRef<Path>) -> Result<(), SimError> {
        let path = path.as_ref();
        let content =
            toml::to_string_pretty(self).map_err(|e| SimError::Config(e.to_string()))?;
        std::fs::write(path, content)
            .map_err(|e| SimError::Config(format!("failed to write {}: {e}", path.display())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = SimConfig::default();
        assert_eq!(config.contest_size, DEFAULT_CONTEST_SIZE);
        assert_eq!(config.trials, DEFAULT_TRIALS);
        assert_eq!(config.unresolved_policy, UnresolvedPolicy::Abort);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validation_errors() {
        let bad = [
            SimConfig { contest_size: 0, ..Default::default() },
            SimConfig { trials: 0, ..Default::default() },
            SimConfig { trials: 20_001, max_trials: 20_000, ..Default::default() },
            SimConfig { chunk_size: 0, ..Default::default() },
            SimConfig { suggestion_count: 0, ..Default::default() },
        ];
        for config in bad {
            assert!(matches!(config.validate(), Err(SimError::Config(_))), "{config:?}");
        }
    }

    #[test]
    fn test_chunk_count() {
        let config = SimConfig { trials: 2_500, chunk_size: 1_000, ..Default::default() };
        assert_eq!(config.chunk_count(), 3);
        let config = SimConfig { trials: 1_000, chunk_size: 1_000, ..Default::default() };
        assert_eq!(config.chunk_count(), 1);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: SimConfig = toml::from_str(
            r#"
            trials = 500
            random_seed = 7
            unresolved_policy = "skip_lineup"
            similarity = "skim"
            "#,
        )
        .unwrap();

        assert_eq!(config.trials, 500);
        assert_eq!(config.random_seed, Some(7));
        assert_eq!(config.unresolved_policy, UnresolvedPolicy::SkipLineup);
        assert_eq!(config.similarity, SimilarityKind::Skim);
        assert_eq!(config.contest_size, DEFAULT_CONTEST_SIZE);
    }

    #[test]
    fn test_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sim.toml");
        let config = SimConfig { trials: 321, random_seed: Some(9), ..Default::default() };

        config.to_file(&path).unwrap();
        assert_eq!(SimConfig::from_file(&path).unwrap(), config);
    }
}
