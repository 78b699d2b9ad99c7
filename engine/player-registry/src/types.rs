use crate::error::RegistryError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Normalize a player name for lookups (trimmed, lowercase)
pub fn normalize_name(name: &str) -> String {
    name.trim().to_lowercase()
}

/// One row of the statistics table as handed over by the input adapter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatsRow {
    /// Player name as spelled in the statistics source
    pub name: String,

    /// Mean fantasy points
    pub projection: f64,

    /// Standard deviation of fantasy points
    pub std_dev: f64,

    /// Projected ownership as a percentage (0-100)
    pub ownership_pct: f64,
}

impl StatsRow {
    pub fn new(name: impl Into<String>, projection: f64, std_dev: f64, ownership_pct: f64) -> Self {
        Self { name: name.into(), projection, std_dev, ownership_pct }
    }
}

/// A player's performance distribution and ownership
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    /// Normalized (lowercase) name, unique within a store
    pub name: String,

    /// Mean of the performance distribution
    pub projection: f64,

    /// Standard deviation of the performance distribution (>= 0)
    pub std_dev: f64,

    /// Fraction of the field expected to roster this player (0-1)
    pub ownership: f64,
}

impl Player {
    /// Build a player from a statistics row, converting ownership to a fraction
    ///
    /// Zero ownership is accepted here; it only becomes an error once it
    /// zeroes out a lineup's duplication estimate.
    pub fn from_row(row: &StatsRow) -> Result<Self, RegistryError> {
        let name = normalize_name(&row.name);
        if name.is_empty() {
            return Err(RegistryError::EmptyName);
        }

        let invalid = |field: &'static str, value: f64| RegistryError::InvalidStat {
            name: name.clone(),
            field,
            value,
        };

        if !row.projection.is_finite() {
            return Err(invalid("projection", row.projection));
        }
        if !row.std_dev.is_finite() || row.std_dev < 0.0 {
            return Err(invalid("std dev", row.std_dev));
        }
        if !row.ownership_pct.is_finite() || !(0.0..=100.0).contains(&row.ownership_pct) {
            return Err(invalid("ownership%", row.ownership_pct));
        }

        Ok(Self {
            projection: row.projection,
            std_dev: row.std_dev,
            ownership: row.ownership_pct / 100.0,
            name,
        })
    }
}

/// A single lineup-name -> statistics-name hint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NameMapping {
    pub lineup_name: String,
    pub stats_name: String,
}

impl NameMapping {
    pub fn new(lineup_name: impl Into<String>, stats_name: impl Into<String>) -> Self {
        Self { lineup_name: lineup_name.into(), stats_name: stats_name.into() }
    }
}

/// User-supplied mapping table, many-to-many, keyed by normalized lineup name
///
/// Candidates for a lineup name keep the order they appeared in the table.
#[derive(Debug, Clone, Default)]
pub struct NameMappings {
    by_lineup_name: HashMap<String, Vec<String>>,
}

impl NameMappings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_pairs<'a, I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = &'a NameMapping>,
    {
        let mut mappings = Self::new();
        for pair in pairs {
            mappings.insert(&pair.lineup_name, &pair.stats_name);
        }
        mappings
    }

    /// Add a hint, skipping blank entries and exact repeats
    pub fn insert(&mut self, lineup_name: &str, stats_name: &str) {
        let lineup_name = normalize_name(lineup_name);
        let stats_name = normalize_name(stats_name);
        if lineup_name.is_empty() || stats_name.is_empty() {
            return;
        }

        let candidates = self.by_lineup_name.entry(lineup_name).or_default();
        if !candidates.contains(&stats_name) {
            candidates.push(stats_name);
        }
    }

    /// Statistics-name candidates for a (normalized) lineup name
    pub fn candidates(&self, lineup_name: &str) -> &[String] {
        self.by_lineup_name.get(lineup_name).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn len(&self) -> usize {
        self.by_lineup_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_lineup_name.is_empty()
    }
}
