//! Rank-to-payout conversion and duplication-adjusted expected value

use crate::duplication::{DuplicationRecord, MIN_DUPLICATION};
use crate::error::SimError;
use crate::lineup::LineupBook;
use crate::ranking::RankMatrix;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::info;

/// One row of the payout table as handed over by the input adapter
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PayoutRow {
    pub rank: u32,
    pub payout: f64,
}

impl PayoutRow {
    pub fn new(rank: u32, payout: f64) -> Self {
        Self { rank, payout }
    }
}

/// Prize money by finishing rank (1 = best)
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PayoutTable {
    payouts: BTreeMap<u32, f64>,
}

impl PayoutTable {
    pub fn from_rows(rows: &[PayoutRow]) -> Result<Self, SimError> {
        if rows.is_empty() {
            return Err(SimError::MalformedInput("payout table is empty".to_string()));
        }

        let mut payouts = BTreeMap::new();
        for row in rows {
            if row.rank == 0 {
                return Err(SimError::MalformedInput("payout ranks start at 1".to_string()));
            }
            if !row.payout.is_finite() || row.payout < 0.0 {
                return Err(SimError::MalformedInput(format!(
                    "payout for rank {} is {}",
                    row.rank, row.payout
                )));
            }
            if payouts.insert(row.rank, row.payout).is_some() {
                return Err(SimError::MalformedInput(format!(
                    "rank {} appears more than once in the payout table",
                    row.rank
                )));
            }
        }

        Ok(Self { payouts })
    }

    pub fn get(&self, rank: u32) -> Option<f64> {
        self.payouts.get(&rank).copied()
    }

    pub fn max_rank(&self) -> u32 {
        self.payouts.keys().next_back().copied().unwrap_or(0)
    }

    pub fn len(&self) -> usize {
        self.payouts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.payouts.is_empty()
    }

    /// Every rank a min-ranked field of `num_lineups` can produce must be paid,
    /// even if ties mean some of them never occur
    pub fn validate_coverage(&self, num_lineups: usize) -> Result<(), SimError> {
        match (1..=num_lineups as u32).find(|rank| !self.payouts.contains_key(rank)) {
            Some(rank) => Err(SimError::PayoutCoverage { rank, num_lineups }),
            None => Ok(()),
        }
    }
}

/// Final expected value of one lineup
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinalResult {
    pub lineup_id: u32,
    pub player_names: Vec<String>,
    pub raw_slots: Vec<String>,
    pub duplication: f64,

    /// Sum of payouts over all trials, before duplication
    pub total_payout: f64,

    /// Mean per-trial payout divided by duplication
    pub expected_money: f64,
}

/// Converts ranks to payouts and payouts to duplication-adjusted value
pub struct PayoutRanker {
    table: PayoutTable,
}

impl PayoutRanker {
    /// Validates coverage up front so no trial runs against a short table
    pub fn new(table: PayoutTable, num_lineups: usize) -> Result<Self, SimError> {
        table.validate_coverage(num_lineups)?;
        Ok(Self { table })
    }

    pub fn payout_for(&self, rank: u32) -> Result<f64, SimError> {
        self.table.get(rank).ok_or(SimError::PayoutCoverage {
            rank,
            num_lineups: self.table.max_rank() as usize,
        })
    }

    /// Add each lineup's payouts for a block of trials into `totals`
    ///
    /// Lineups are summed in parallel, each in trial order, then merged in
    /// lineup order so the floating-point result is reproducible.
    pub fn accumulate(&self, ranks: &RankMatrix, totals: &mut [f64]) -> Result<(), SimError> {
        let chunk_totals = ranks
            .rows()
            .par_iter()
            .map(|row| {
                row.iter().try_fold(0.0, |sum, &rank| Ok::<f64, SimError>(sum + self.payout_for(rank)?))
            })
            .collect::<Result<Vec<f64>, SimError>>()?;

        for (total, chunk) in totals.iter_mut().zip(chunk_totals) {
            *total += chunk;
        }
        Ok(())
    }

    /// Divide totals by duplication and trials, sorted best first
    ///
    /// Equal expected money keeps lineup id order.
    pub fn finalize(
        &self,
        book: &LineupBook,
        duplication: &[DuplicationRecord],
        totals: &[f64],
        trials: usize,
    ) -> Result<Vec<FinalResult>, SimError> {
        if duplication.len() != book.len() || totals.len() != book.len() {
            return Err(SimError::MalformedInput(format!(
                "{} lineups but {} duplication records and {} payout totals",
                book.len(),
                duplication.len(),
                totals.len()
            )));
        }

        let mut results = Vec::with_capacity(book.len());
        for ((lineup, record), &total_payout) in book.lineups().iter().zip(duplication).zip(totals) {
            if record.lineup_id != lineup.id {
                return Err(SimError::MalformedInput(format!(
                    "duplication record {} does not match lineup {}",
                    record.lineup_id, lineup.id
                )));
            }
            let expected_money = total_payout / record.duplication / trials as f64;
            if !record.duplication.is_finite()
                || record.duplication < MIN_DUPLICATION
                || !expected_money.is_finite()
            {
                return Err(SimError::ZeroDuplication {
                    lineup_id: lineup.id,
                    duplication: record.duplication,
                });
            }

            results.push(FinalResult {
                lineup_id: lineup.id,
                player_names: lineup.player_names.clone(),
                raw_slots: lineup.raw_slots.clone(),
                duplication: record.duplication,
                total_payout,
                expected_money,
            });
        }

        results.sort_by(|a, b| {
            b.expected_money.total_cmp(&a.expected_money).then(a.lineup_id.cmp(&b.lineup_id))
        });

        if let Some(best) = results.first() {
            info!(
                "Best lineup {} with expected money {:.4} over {} trials",
                best.lineup_id, best.expected_money, trials
            );
        }
        Ok(results)
    }
}
