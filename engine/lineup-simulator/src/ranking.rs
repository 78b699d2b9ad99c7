//! Per-trial ranking with min-rank ties

use crate::simulation::SimulationMatrix;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Rank scores descending, tied scores sharing the best rank
///
/// A score's rank is 1 + the number of strictly greater scores, so
/// `[10, 10, 7]` ranks `[1, 1, 3]`.
pub fn min_rank(scores: &[f64]) -> Vec<u32> {
    let mut order: Vec<usize> = (0..scores.len()).collect();
    order.sort_by(|&a, &b| scores[b].total_cmp(&scores[a]));

    let mut ranks = vec![0u32; scores.len()];
    for (position, &index) in order.iter().enumerate() {
        ranks[index] = match position.checked_sub(1).map(|prev| order[prev]) {
            Some(prev) if scores[prev] == scores[index] => ranks[prev],
            _ => position as u32 + 1,
        };
    }
    ranks
}

/// Integer rank of each lineup in each trial, lineup-major like the
/// simulation matrix it was computed from
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RankMatrix {
    rows: Vec<Vec<u32>>,
    trials: usize,
}

impl RankMatrix {
    /// Rank every trial column; columns are independent and ranked in parallel
    pub fn from_scores(scores: &SimulationMatrix) -> Self {
        let columns: Vec<Vec<u32>> =
            (0..scores.trials()).into_par_iter().map(|t| min_rank(&scores.column(t))).collect();
        Self::from_columns(scores.lineups(), columns)
    }

    /// Build from per-trial rank columns
    pub fn from_columns(lineups: usize, columns: Vec<Vec<u32>>) -> Self {
        let trials = columns.len();
        let mut rows = vec![Vec::with_capacity(trials); lineups];
        for column in columns {
            for (row, rank) in rows.iter_mut().zip(column) {
                row.push(rank);
            }
        }
        Self { rows, trials }
    }

    /// Append another block of trials for the same lineups
    pub fn extend(&mut self, other: RankMatrix) {
        if self.rows.is_empty() {
            *self = other;
            return;
        }
        for (row, more) in self.rows.iter_mut().zip(other.rows) {
            row.extend(more);
        }
        self.trials += other.trials;
    }

    pub fn get(&self, lineup: usize, trial: usize) -> u32 {
        self.rows[lineup][trial]
    }

    /// Ranks of one lineup across trials
    pub fn row(&self, lineup: usize) -> &[u32] {
        &self.rows[lineup]
    }

    pub fn rows(&self) -> &[Vec<u32>] {
        &self.rows
    }

    pub fn lineups(&self) -> usize {
        self.rows.len()
    }

    pub fn trials(&self) -> usize {
        self.trials
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_min_rank_ties_share_best_rank() {
        assert_eq!(min_rank(&[10.0, 10.0, 7.0]), [1, 1, 3]);
        assert_eq!(min_rank(&[7.0, 10.0, 10.0]), [3, 1, 1]);
        assert_eq!(min_rank(&[5.0, 9.0, 5.0, 1.0, 9.0]), [3, 1, 3, 5, 1]);
        assert_eq!(min_rank(&[4.0, 4.0, 4.0]), [1, 1, 1]);
        assert!(min_rank(&[]).is_empty());
    }

    #[test]
    fn test_rank_matrix_from_scores() {
        let scores = SimulationMatrix::from_rows(vec![
            vec![10.0, 1.0],
            vec![10.0, 2.0],
            vec![7.0, 3.0],
        ]);
        let ranks = RankMatrix::from_scores(&scores);

        assert_eq!(ranks.lineups(), 3);
        assert_eq!(ranks.trials(), 2);
        assert_eq!(ranks.rows(), [vec![1, 3], vec![1, 2], vec![3, 1]]);
    }

    #[test]
    fn test_rank_matrix_extend() {
        let mut ranks = RankMatrix::default();
        ranks.extend(RankMatrix::from_columns(2, vec![vec![1, 2]]));
        ranks.extend(RankMatrix::from_columns(2, vec![vec![2, 1], vec![1, 1]]));

        assert_eq!(ranks.trials(), 3);
        assert_eq!(ranks.row(0), [1, 2, 1]);
        assert_eq!(ranks.row(1), [2, 1, 1]);
    }

    proptest! {
        #[test]
        fn prop_rank_is_one_plus_strictly_better(scores in prop::collection::vec(0i32..8, 1..40)) {
            let scores: Vec<f64> = scores.into_iter().map(f64::from).collect();
            let ranks = min_rank(&scores);
            for (i, &score) in scores.iter().enumerate() {
                let better = scores.iter().filter(|&&other| other > score).count();
                prop_assert_eq!(ranks[i] as usize, better + 1);
            }
        }
    }
}
