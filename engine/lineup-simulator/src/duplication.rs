//! Duplication estimate: how many contest entries share each exact lineup
//!
//! Players are treated as independent picks, so a lineup's joint ownership is
//! the product of its players' ownership fractions. Products are normalized
//! across the candidate set and scaled by contest size.

use crate::error::SimError;
use crate::lineup::LineupBook;
use player_registry::PlayerStatsStore;
use serde::{Deserialize, Serialize};
use tracing::info;

/// Smallest duplication payouts may be divided by
///
/// Anything below this, including subnormal values from near-zero ownership,
/// is rejected as [`SimError::ZeroDuplication`].
pub const MIN_DUPLICATION: f64 = 1e-9;

/// Duplication estimate for one lineup
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DuplicationRecord {
    pub lineup_id: u32,
    pub ownership_product: f64,
    pub normalized_ownership: f64,
    pub duplication: f64,
}

pub struct DuplicationModel {
    contest_size: u64,
}

impl DuplicationModel {
    pub fn new(contest_size: u64) -> Self {
        Self { contest_size }
    }

    /// One record per lineup in the book, in book order
    pub fn estimate(
        &self,
        book: &LineupBook,
        store: &PlayerStatsStore,
    ) -> Result<Vec<DuplicationRecord>, SimError> {
        let products: Vec<(u32, f64)> = book
            .lineups()
            .iter()
            .zip(book.rosters())
            .map(|(lineup, roster)| {
                let product = roster
                    .iter()
                    .filter_map(|&index| store.player_at(index))
                    .map(|player| player.ownership)
                    .product::<f64>();
                (lineup.id, product)
            })
            .collect();

        self.normalize(&products)
    }

    /// Normalize `(lineup_id, ownership_product)` pairs into records
    pub fn normalize(&self, products: &[(u32, f64)]) -> Result<Vec<DuplicationRecord>, SimError> {
        let total: f64 = products.iter().map(|(_, product)| product).sum();
        if !(total.is_finite() && total > 0.0) {
            return Err(SimError::DegenerateOwnership { total });
        }

        let records = products
            .iter()
            .map(|&(lineup_id, ownership_product)| {
                let normalized_ownership = ownership_product / total;
                let duplication = normalized_ownership * self.contest_size as f64;
                if duplication >= MIN_DUPLICATION {
                    Ok(DuplicationRecord { lineup_id, ownership_product, normalized_ownership, duplication })
                } else {
                    Err(SimError::ZeroDuplication { lineup_id, duplication })
                }
            })
            .collect::<Result<Vec<_>, _>>()?;

        info!(
            "Estimated duplication for {} lineups (total ownership product {:.3e}, contest size {})",
            records.len(),
            total,
            self.contest_size
        );
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_two_lineup_scenario() {
        let model = DuplicationModel::new(100);
        let records = model.normalize(&[(1, 0.5), (2, 0.25)]).unwrap();

        assert!((records[0].normalized_ownership - 2.0 / 3.0).abs() < 1e-12);
        assert!((records[1].normalized_ownership - 1.0 / 3.0).abs() < 1e-12);
        assert!((records[0].duplication - 66.666_666_666).abs() < 1e-6);
        assert!((records[1].duplication - 33.333_333_333).abs() < 1e-6);
    }

    #[test]
    fn test_zero_total_is_degenerate() {
        let model = DuplicationModel::new(100);
        assert_eq!(
            model.normalize(&[(1, 0.0), (2, 0.0)]),
            Err(SimError::DegenerateOwnership { total: 0.0 })
        );
    }

    #[test]
    fn test_single_zero_product_is_reported() {
        let model = DuplicationModel::new(100);
        assert_eq!(
            model.normalize(&[(1, 0.2), (2, 0.0)]),
            Err(SimError::ZeroDuplication { lineup_id: 2, duplication: 0.0 })
        );
    }

    #[test]
    fn test_subnormal_duplication_is_rejected() {
        let model = DuplicationModel::new(100);
        let err = model.normalize(&[(1, 1.0), (2, 1e-320)]).unwrap_err();
        assert!(matches!(err, SimError::ZeroDuplication { lineup_id: 2, .. }));

        let records = model.normalize(&[(1, 1.0), (2, 1e-10)]).unwrap();
        assert!(records[1].duplication >= MIN_DUPLICATION);
    }

    proptest! {
        #[test]
        fn prop_normalized_ownership_sums_to_one(
            products in prop::collection::vec(1e-6f64..1.0, 1..50),
            contest_size in 1u64..1_000_000,
        ) {
            let pairs: Vec<(u32, f64)> =
                products.iter().enumerate().map(|(i, &p)| (i as u32 + 1, p)).collect();
            let records = DuplicationModel::new(contest_size).normalize(&pairs).unwrap();

            let sum: f64 = records.iter().map(|r| r.normalized_ownership).sum();
            prop_assert!((sum - 1.0).abs() < 1e-9);
            for record in &records {
                let expected = record.normalized_ownership * contest_size as f64;
                prop_assert_eq!(record.duplication, expected);
            }
        }

        #[test]
        fn prop_raising_ownership_raises_duplication(
            products in prop::collection::vec(1e-4f64..0.5, 2..20),
            bump in 1.01f64..2.0,
        ) {
            let model = DuplicationModel::new(10_000);
            let pairs: Vec<(u32, f64)> =
                products.iter().enumerate().map(|(i, &p)| (i as u32 + 1, p)).collect();
            let mut raised = pairs.clone();
            raised[0].1 *= bump;

            let before = model.normalize(&pairs).unwrap();
            let after = model.normalize(&raised).unwrap();
            prop_assert!(after[0].duplication > before[0].duplication);
        }
    }
}
