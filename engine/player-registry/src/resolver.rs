use crate::registry::PlayerStatsStore;
use crate::similarity::Similarity;
use crate::types::{normalize_name, NameMappings};
use std::fmt;
use tracing::{debug, warn};

/// A suggested statistics name for an unresolved lineup name
#[derive(Debug, Clone, PartialEq)]
pub struct Suggestion {
    pub name: String,
    pub score: f64,
}

/// Outcome of resolving one lineup name
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    /// Name is a statistics key as-is
    Exact,
    /// Name was aliased to a mapped statistics name
    Mapped { stats_name: String },
    /// No automatic resolution; ranked suggestions for a human to review
    Unresolved { suggestions: Vec<Suggestion> },
}

/// An unresolved name with its suggestions and the lineups that use it
#[derive(Debug, Clone, PartialEq)]
pub struct UnresolvedName {
    pub name: String,
    pub suggestions: Vec<Suggestion>,
    pub lineup_ids: Vec<u32>,
}

impl fmt::Display for UnresolvedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "'{}' (lineups {:?})", self.name, self.lineup_ids)?;
        if !self.suggestions.is_empty() {
            let candidates: Vec<String> = self
                .suggestions
                .iter()
                .map(|s| format!("{} ({:.1})", s.name, s.score))
                .collect();
            write!(f, ", did you mean: {}", candidates.join(", "))?;
        }
        Ok(())
    }
}

/// Summary of a batch resolution pass
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResolutionReport {
    /// Distinct names found directly in the statistics
    pub exact: usize,

    /// Distinct names resolved through the mapping table, (lineup name, stats name)
    pub mapped: Vec<(String, String)>,

    /// Names that could not be resolved, in first-seen order
    pub unresolved: Vec<UnresolvedName>,
}

impl ResolutionReport {
    pub fn is_complete(&self) -> bool {
        self.unresolved.is_empty()
    }

    /// Record an unresolved occurrence of `name` in `lineup_id`
    pub fn record_unresolved(&mut self, name: &str, lineup_id: u32, suggestions: &[Suggestion]) {
        match self.unresolved.iter_mut().find(|entry| entry.name == name) {
            Some(entry) => {
                if !entry.lineup_ids.contains(&lineup_id) {
                    entry.lineup_ids.push(lineup_id);
                }
            }
            None => self.unresolved.push(UnresolvedName {
                name: name.to_string(),
                suggestions: suggestions.to_vec(),
                lineup_ids: vec![lineup_id],
            }),
        }
    }
}

/// Reconciles lineup spellings against statistics names
///
/// Resolution order: exact key, then the explicit mapping table, then
/// similarity suggestions (which never resolve automatically).
pub struct NameResolver<'a> {
    mappings: &'a NameMappings,
    similarity: Box<dyn Similarity>,
    suggestion_count: usize,
}

impl<'a> NameResolver<'a> {
    pub fn new(
        mappings: &'a NameMappings,
        similarity: Box<dyn Similarity>,
        suggestion_count: usize,
    ) -> Self {
        Self { mappings, similarity, suggestion_count }
    }

    /// Resolve a candidate name, aliasing it in `store` when a mapping applies
    pub fn resolve(&self, store: &mut PlayerStatsStore, candidate: &str) -> Resolution {
        let name = normalize_name(candidate);
        if store.contains_canonical(&name) {
            return Resolution::Exact;
        }

        for stats_name in self.mappings.candidates(&name) {
            if store.contains_canonical(stats_name) && store.add_alias(&name, stats_name).is_ok() {
                debug!("Resolved '{}' via mapping to '{}'", name, stats_name);
                return Resolution::Mapped { stats_name: stats_name.clone() };
            }
        }

        let suggestions = self.suggest(store, &name);
        warn!(
            "Player '{}' not found in statistics; {} suggestion(s) available",
            name,
            suggestions.len()
        );
        Resolution::Unresolved { suggestions }
    }

    /// Top-N statistics names by similarity, stable on equal scores
    pub fn suggest(&self, store: &PlayerStatsStore, candidate: &str) -> Vec<Suggestion> {
        let mut scored: Vec<Suggestion> = store
            .names()
            .map(|name| Suggestion {
                score: self.similarity.similarity(candidate, name),
                name: name.to_string(),
            })
            .collect();

        scored.sort_by(|a, b| b.score.total_cmp(&a.score));
        scored.truncate(self.suggestion_count);
        scored
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::similarity::{SimilarityKind, TokenSortRatio};
    use crate::types::{NameMapping, StatsRow};

    fn create_test_store() -> PlayerStatsStore {
        PlayerStatsStore::from_rows(&[
            StatsRow::new("Nick Chubb", 15.0, 5.0, 12.0),
            StatsRow::new("Gabriel Davis", 9.8, 5.2, 4.0),
            StatsRow::new("Josh Allen", 23.4, 7.0, 22.5),
        ])
        .unwrap()
    }

    #[test]
    fn test_exact_match() {
        let mappings = NameMappings::new();
        let resolver = NameResolver::new(&mappings, Box::new(TokenSortRatio), 3);
        let mut store = create_test_store();

        assert_eq!(resolver.resolve(&mut store, "Josh Allen"), Resolution::Exact);
        assert_eq!(store.alias_count(), 0);
    }

    #[test]
    fn test_mapping_uses_first_known_candidate() {
        let mappings = NameMappings::from_pairs(&[
            NameMapping::new("Gabe Davis", "G. Davis"),
            NameMapping::new("Gabe Davis", "Gabriel Davis"),
        ]);
        let resolver = NameResolver::new(&mappings, Box::new(TokenSortRatio), 3);
        let mut store = create_test_store();

        let resolution = resolver.resolve(&mut store, "gabe davis");
        assert_eq!(resolution, Resolution::Mapped { stats_name: "gabriel davis".into() });
        assert_eq!(store.get("gabe davis").unwrap().name, "gabriel davis");
    }

    #[test]
    fn test_unresolved_returns_ranked_suggestions() {
        let mappings = NameMappings::new();
        let resolver = NameResolver::new(&mappings, SimilarityKind::TokenSort.build(), 2);
        let mut store = create_test_store();

        let resolution = resolver.resolve(&mut store, "Nick Chub");
        match resolution {
            Resolution::Unresolved { suggestions } => {
                assert_eq!(suggestions.len(), 2);
                assert_eq!(suggestions[0].name, "nick chubb");
                assert!(suggestions[0].score >= suggestions[1].score);
            }
            other => panic!("expected unresolved, got {other:?}"),
        }
        assert!(store.get("nick chub").is_err());
    }

    struct ConstantSimilarity;

    impl Similarity for ConstantSimilarity {
        fn similarity(&self, _a: &str, _b: &str) -> f64 {
            1.0
        }
    }

    #[test]
    fn test_equal_scores_keep_load_order() {
        let mappings = NameMappings::new();
        let resolver = NameResolver::new(&mappings, Box::new(ConstantSimilarity), 5);
        let store = create_test_store();

        let names: Vec<String> =
            resolver.suggest(&store, "anyone").into_iter().map(|s| s.name).collect();
        assert_eq!(names, ["nick chubb", "gabriel davis", "josh allen"]);
    }

    #[test]
    fn test_report_groups_lineups_per_name() {
        let mut report = ResolutionReport::default();
        let suggestions = vec![Suggestion { name: "nick chubb".into(), score: 90.0 }];
        report.record_unresolved("nick chub", 2, &suggestions);
        report.record_unresolved("nick chub", 5, &suggestions);
        report.record_unresolved("nick chub", 5, &suggestions);
        report.record_unresolved("jj", 3, &[]);

        assert!(!report.is_complete());
        assert_eq!(report.unresolved.len(), 2);
        assert_eq!(report.unresolved[0].lineup_ids, [2, 5]);
        assert_eq!(
            report.unresolved[0].to_string(),
            "'nick chub' (lineups [2, 5]), did you mean: nick chubb (90.0)"
        );
        assert_eq!(report.unresolved[1].to_string(), "'jj' (lineups [3])");
    }
}
