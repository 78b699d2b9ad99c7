//! Lineup parsing and the resolved lineup book

use crate::config::UnresolvedPolicy;
use crate::error::SimError;
use player_registry::{normalize_name, NameResolver, PlayerStatsStore, Resolution, ResolutionReport};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{info, warn};

/// One candidate lineup
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lineup {
    /// 1-based position in the lineup input
    pub id: u32,

    /// Original `position:name` slot tokens
    pub raw_slots: Vec<String>,

    /// Normalized player names, in slot order
    pub player_names: Vec<String>,
}

/// Split a `position:name` slot on its first colon
pub fn split_slot(slot: &str) -> Option<(&str, &str)> {
    slot.split_once(':').map(|(position, name)| (position.trim(), name.trim()))
}

impl Lineup {
    /// Parse a lineup from its raw slot tokens
    pub fn parse(id: u32, raw_slots: &[String]) -> Result<Self, SimError> {
        if raw_slots.is_empty() {
            return Err(SimError::MalformedInput(format!("lineup {id} has no slots")));
        }

        let mut player_names = Vec::with_capacity(raw_slots.len());
        for slot in raw_slots {
            let (_, name) = split_slot(slot).ok_or_else(|| {
                SimError::MalformedInput(format!(
                    "lineup {id}: slot '{slot}' is not in 'position:name' form"
                ))
            })?;
            let name = normalize_name(name);
            if name.is_empty() {
                return Err(SimError::MalformedInput(format!(
                    "lineup {id}: slot '{slot}' has an empty player name"
                )));
            }
            player_names.push(name);
        }

        Ok(Self { id, raw_slots: raw_slots.to_vec(), player_names })
    }

    /// Position labels, in slot order
    pub fn positions(&self) -> impl Iterator<Item = &str> {
        self.raw_slots.iter().filter_map(|slot| split_slot(slot).map(|(position, _)| position))
    }

    pub fn roster_size(&self) -> usize {
        self.player_names.len()
    }
}

/// Parse every lineup row, assigning 1-based ids in input order
///
/// All lineups must have the same roster size.
pub fn parse_lineups(rows: &[Vec<String>]) -> Result<Vec<Lineup>, SimError> {
    if rows.is_empty() {
        return Err(SimError::MalformedInput("lineup table is empty".to_string()));
    }

    let mut lineups = Vec::with_capacity(rows.len());
    for (index, row) in rows.iter().enumerate() {
        let lineup = Lineup::parse(index as u32 + 1, row)?;
        if let Some(first) = lineups.first().map(Lineup::roster_size) {
            if lineup.roster_size() != first {
                return Err(SimError::MalformedInput(format!(
                    "lineup {} has {} slots, expected {}",
                    lineup.id,
                    lineup.roster_size(),
                    first
                )));
            }
        }
        lineups.push(lineup);
    }

    Ok(lineups)
}

/// Lineups whose players all resolve against the statistics store
#[derive(Debug, Clone)]
pub struct LineupBook {
    lineups: Vec<Lineup>,

    /// Store indices of each lineup's players, parallel to `lineups`
    rosters: Vec<Vec<usize>>,

    /// Ids of lineups dropped under `UnresolvedPolicy::SkipLineup`
    skipped: Vec<u32>,

    roster_size: usize,
}

impl LineupBook {
    /// Resolve every player name and build the book
    ///
    /// Mapped names are aliased in `store`. Unresolved names abort or drop
    /// their lineups according to `policy`; either way they are reported.
    pub fn resolve(
        lineups: Vec<Lineup>,
        store: &mut PlayerStatsStore,
        resolver: &NameResolver<'_>,
        policy: UnresolvedPolicy,
    ) -> Result<(Self, ResolutionReport), SimError> {
        let mut report = ResolutionReport::default();
        let mut cache: HashMap<String, Resolution> = HashMap::new();
        let mut unresolved_ids = Vec::new();

        for lineup in &lineups {
            let mut resolved = true;
            for name in &lineup.player_names {
                if !cache.contains_key(name) {
                    let resolution = resolver.resolve(store, name);
                    match &resolution {
                        Resolution::Exact => report.exact += 1,
                        Resolution::Mapped { stats_name } => {
                            report.mapped.push((name.clone(), stats_name.clone()))
                        }
                        Resolution::Unresolved { .. } => {}
                    }
                    cache.insert(name.clone(), resolution);
                }

                if let Some(Resolution::Unresolved { suggestions }) = cache.get(name) {
                    report.record_unresolved(name, lineup.id, suggestions);
                    resolved = false;
                }
            }
            if !resolved {
                unresolved_ids.push(lineup.id);
            }
        }

        info!(
            "Resolved player names: {} exact, {} mapped, {} unresolved",
            report.exact,
            report.mapped.len(),
            report.unresolved.len()
        );

        if !report.is_complete() && policy == UnresolvedPolicy::Abort {
            return Err(SimError::UnresolvedPlayerName { names: report.unresolved });
        }

        let mut kept = Vec::with_capacity(lineups.len());
        let mut rosters = Vec::with_capacity(lineups.len());
        for lineup in lineups {
            if unresolved_ids.contains(&lineup.id) {
                warn!("Skipping lineup {} with unresolved player names", lineup.id);
                continue;
            }

            let roster = lineup
                .player_names
                .iter()
                .map(|name| {
                    store.index_of(name).ok_or_else(|| {
                        SimError::MalformedInput(format!("player '{name}' vanished from statistics"))
                    })
                })
                .collect::<Result<Vec<_>, _>>()?;
            rosters.push(roster);
            kept.push(lineup);
        }

        if kept.is_empty() {
            return Err(SimError::UnresolvedPlayerName { names: report.unresolved });
        }

        let roster_size = kept[0].roster_size();
        Ok((Self { lineups: kept, rosters, skipped: unresolved_ids, roster_size }, report))
    }

    pub fn lineups(&self) -> &[Lineup] {
        &self.lineups
    }

    /// Store indices of each lineup's players
    pub fn rosters(&self) -> &[Vec<usize>] {
        &self.rosters
    }

    pub fn skipped(&self) -> &[u32] {
        &self.skipped
    }

    pub fn roster_size(&self) -> usize {
        self.roster_size
    }

    pub fn len(&self) -> usize {
        self.lineups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lineups.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use player_registry::{NameMapping, NameMappings, SimilarityKind, StatsRow};

    fn row(slots: &[&str]) -> Vec<String> {
        slots.iter().map(|s| s.to_string()).collect()
    }

    fn create_test_store() -> PlayerStatsStore {
        PlayerStatsStore::from_rows(&[
            StatsRow::new("Josh Allen", 23.4, 7.0, 22.5),
            StatsRow::new("Nick Chubb", 15.0, 5.0, 12.0),
            StatsRow::new("Gabriel Davis", 9.8, 5.2, 4.0),
        ])
        .unwrap()
    }

    #[test]
    fn test_parse_splits_on_first_colon() {
        let lineup = Lineup::parse(1, &row(&["QB:Josh Allen", "FLEX: Odd:Name "])).unwrap();
        assert_eq!(lineup.player_names, ["josh allen", "odd:name"]);
        assert_eq!(lineup.positions().collect::<Vec<_>>(), ["QB", "FLEX"]);
        assert_eq!(lineup.raw_slots[1], "FLEX: Odd:Name ");
    }

    #[test]
    fn test_parse_rejects_bad_slots() {
        assert!(matches!(Lineup::parse(3, &row(&["Josh Allen"])), Err(SimError::MalformedInput(_))));
        assert!(matches!(Lineup::parse(3, &row(&["QB:  "])), Err(SimError::MalformedInput(_))));
        assert!(matches!(Lineup::parse(3, &[]), Err(SimError::MalformedInput(_))));
    }

    #[test]
    fn test_parse_lineups_assigns_ids_and_checks_roster_size() {
        let lineups =
            parse_lineups(&[row(&["QB:Josh Allen", "RB:Nick Chubb"]), row(&["QB:A", "RB:B"])])
                .unwrap();
        assert_eq!(lineups.iter().map(|l| l.id).collect::<Vec<_>>(), [1, 2]);

        let err = parse_lineups(&[row(&["QB:A", "RB:B"]), row(&["QB:A"])]).unwrap_err();
        assert_eq!(err, SimError::MalformedInput("lineup 2 has 1 slots, expected 2".into()));

        assert!(parse_lineups(&[]).is_err());
    }

    #[test]
    fn test_resolve_with_mapping() {
        let mappings = NameMappings::from_pairs(&[NameMapping::new("Gabe Davis", "Gabriel Davis")]);
        let resolver = NameResolver::new(&mappings, SimilarityKind::TokenSort.build(), 3);
        let mut store = create_test_store();
        let lineups = parse_lineups(&[
            row(&["QB:Josh Allen", "WR:Gabe Davis"]),
            row(&["QB:Josh Allen", "RB:Nick Chubb"]),
        ])
        .unwrap();

        let (book, report) =
            LineupBook::resolve(lineups, &mut store, &resolver, UnresolvedPolicy::Abort).unwrap();

        assert_eq!(book.len(), 2);
        assert_eq!(book.rosters(), [vec![0, 2], vec![0, 1]]);
        assert_eq!(book.lineups()[0].player_names, ["josh allen", "gabe davis"]);
        assert_eq!(report.exact, 2);
        assert_eq!(report.mapped, [("gabe davis".to_string(), "gabriel davis".to_string())]);
    }

    #[test]
    fn test_resolve_abort_reports_all_unresolved() {
        let mappings = NameMappings::new();
        let resolver = NameResolver::new(&mappings, SimilarityKind::TokenSort.build(), 1);
        let mut store = create_test_store();
        let lineups = parse_lineups(&[
            row(&["QB:Josh Alen", "RB:Nick Chubb"]),
            row(&["QB:Josh Allen", "RB:Nick Chub"]),
            row(&["QB:Josh Alen", "RB:Nick Chubb"]),
        ])
        .unwrap();

        let err = LineupBook::resolve(lineups, &mut store, &resolver, UnresolvedPolicy::Abort)
            .unwrap_err();
        match err {
            SimError::UnresolvedPlayerName { names } => {
                assert_eq!(names.len(), 2);
                assert_eq!(names[0].name, "josh alen");
                assert_eq!(names[0].lineup_ids, [1, 3]);
                assert_eq!(names[0].suggestions[0].name, "josh allen");
                assert_eq!(names[1].name, "nick chub");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_resolve_skip_drops_lineups() {
        let mappings = NameMappings::new();
        let resolver = NameResolver::new(&mappings, SimilarityKind::TokenSort.build(), 1);
        let mut store = create_test_store();
        let lineups = parse_lineups(&[
            row(&["QB:Josh Alen", "RB:Nick Chubb"]),
            row(&["QB:Josh Allen", "RB:Nick Chubb"]),
        ])
        .unwrap();

        let (book, report) =
            LineupBook::resolve(lineups, &mut store, &resolver, UnresolvedPolicy::SkipLineup)
                .unwrap();
        assert_eq!(book.len(), 1);
        assert_eq!(book.lineups()[0].id, 2);
        assert_eq!(book.skipped(), [1]);
        assert_eq!(report.unresolved.len(), 1);
    }

    #[test]
    fn test_resolve_skip_with_nothing_left_fails() {
        let mappings = NameMappings::new();
        let resolver = NameResolver::new(&mappings, SimilarityKind::TokenSort.build(), 1);
        let mut store = create_test_store();
        let lineups = parse_lineups(&[row(&["QB:Nobody"])]).unwrap();

        assert!(matches!(
            LineupBook::resolve(lineups, &mut store, &resolver, UnresolvedPolicy::SkipLineup),
            Err(SimError::UnresolvedPlayerName { .. })
        ));
    }
}
