//! Monte Carlo sampling of player outcomes and lineup scores
//!
//! Every player gets an independent normal draw per trial; a lineup's score
//! is the sum of its players' draws in that trial. Trials are produced in
//! chunks, and each (player, chunk) pair owns a random stream seeded from the
//! run seed, so output is identical no matter how rayon schedules the work
//! and the full matrix is exactly the concatenation of its chunks.

use crate::error::SimError;
use crate::lineup::LineupBook;
use player_registry::PlayerStatsStore;
use rand::distributions::Distribution;
use rand::rngs::StdRng;
use rand::SeedableRng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use statrs::distribution::Normal;
use std::collections::HashMap;

/// Simulated total score of each lineup in each trial (lineup-major)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SimulationMatrix {
    rows: Vec<Vec<f64>>,
    trials: usize,
}

impl SimulationMatrix {
    /// Build from per-lineup rows; all rows must have the same length
    pub fn from_rows(rows: Vec<Vec<f64>>) -> Self {
        let trials = rows.first().map_or(0, Vec::len);
        debug_assert!(rows.iter().all(|row| row.len() == trials));
        Self { rows, trials }
    }

    /// Append another block of trials for the same lineups
    pub fn extend(&mut self, other: SimulationMatrix) {
        if self.rows.is_empty() {
            *self = other;
            return;
        }
        for (row, more) in self.rows.iter_mut().zip(other.rows) {
            row.extend(more);
        }
        self.trials += other.trials;
    }

    pub fn get(&self, lineup: usize, trial: usize) -> f64 {
        self.rows[lineup][trial]
    }

    /// Scores of one lineup across trials
    pub fn row(&self, lineup: usize) -> &[f64] {
        &self.rows[lineup]
    }

    /// Scores of every lineup in one trial
    pub fn column(&self, trial: usize) -> Vec<f64> {
        self.rows.iter().map(|row| row[trial]).collect()
    }

    pub fn rows(&self) -> &[Vec<f64>] {
        &self.rows
    }

    pub fn lineups(&self) -> usize {
        self.rows.len()
    }

    pub fn trials(&self) -> usize {
        self.trials
    }
}

#[derive(Debug, Clone, Copy)]
enum Sampler {
    /// Zero standard deviation: always the projection
    Constant(f64),
    Normal(Normal),
}

#[derive(Debug, Clone)]
struct PlayerDistribution {
    /// Index in the statistics store; keys the player's random stream
    store_index: usize,
    sampler: Sampler,
}

impl PlayerDistribution {
    fn sample(&self, seed: u64, chunk_index: usize, len: usize) -> Vec<f64> {
        match self.sampler {
            Sampler::Constant(value) => vec![value; len],
            Sampler::Normal(normal) => {
                let mut rng = StdRng::seed_from_u64(stream_seed(seed, self.store_index, chunk_index));
                (0..len).map(|_| normal.sample(&mut rng)).collect()
            }
        }
    }
}

/// Draws player outcomes and sums them into lineup scores
#[derive(Debug, Clone)]
pub struct SimulationEngine {
    /// Distinct players appearing in the book, in first-appearance order
    players: Vec<PlayerDistribution>,

    /// Each lineup's players as indices into `players`
    rosters: Vec<Vec<usize>>,

    seed: u64,
    chunk_size: usize,
}

impl SimulationEngine {
    pub fn new(
        book: &LineupBook,
        store: &PlayerStatsStore,
        seed: u64,
        chunk_size: usize,
    ) -> Result<Self, SimError> {
        if chunk_size == 0 {
            return Err(SimError::Config("chunk_size must be at least 1".to_string()));
        }

        let mut dense: HashMap<usize, usize> = HashMap::new();
        let mut players = Vec::new();
        let mut rosters = Vec::with_capacity(book.len());

        for roster in book.rosters() {
            let mut dense_roster = Vec::with_capacity(roster.len());
            for &store_index in roster {
                let slot = match dense.get(&store_index) {
                    Some(&slot) => slot,
                    None => {
                        let player = store.player_at(store_index).ok_or_else(|| {
                            SimError::MalformedInput(format!("no player at index {store_index}"))
                        })?;
                        let sampler = if player.std_dev == 0.0 {
                            Sampler::Constant(player.projection)
                        } else {
                            Normal::new(player.projection, player.std_dev)
                                .map(Sampler::Normal)
                                .map_err(|e| {
                                    SimError::MalformedInput(format!(
                                        "player '{}' has an invalid distribution: {e}",
                                        player.name
                                    ))
                                })?
                        };
                        players.push(PlayerDistribution { store_index, sampler });
                        dense.insert(store_index, players.len() - 1);
                        players.len() - 1
                    }
                };
                dense_roster.push(slot);
            }
            rosters.push(dense_roster);
        }

        Ok(Self { players, rosters, seed, chunk_size })
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn player_count(&self) -> usize {
        self.players.len()
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// `(chunk_index, trial_count)` for each chunk covering `trials`
    pub fn chunks(&self, trials: usize) -> impl Iterator<Item = (usize, usize)> + '_ {
        (0..trials.div_ceil(self.chunk_size)).map(move |chunk_index| {
            let start = chunk_index * self.chunk_size;
            (chunk_index, self.chunk_size.min(trials - start))
        })
    }

    /// Lineup scores for one chunk of `len` trials
    pub fn simulate_chunk(&self, chunk_index: usize, len: usize) -> SimulationMatrix {
        let samples: Vec<Vec<f64>> = self
            .players
            .par_iter()
            .map(|player| player.sample(self.seed, chunk_index, len))
            .collect();

        let rows: Vec<Vec<f64>> = self
            .rosters
            .par_iter()
            .map(|roster| {
                (0..len).map(|t| roster.iter().map(|&p| samples[p][t]).sum::<f64>()).collect()
            })
            .collect();

        SimulationMatrix::from_rows(rows)
    }

    /// Full lineups x trials matrix, built chunk by chunk
    pub fn simulate(&self, trials: usize) -> SimulationMatrix {
        let mut matrix = SimulationMatrix::default();
        for (chunk_index, len) in self.chunks(trials) {
            matrix.extend(self.simulate_chunk(chunk_index, len));
        }
        matrix
    }
}

/// Seed for one player's stream within one chunk (splitmix64 finalizer)
fn stream_seed(seed: u64, store_index: usize, chunk_index: usize) -> u64 {
    fn mix(mut z: u64) -> u64 {
        z = z.wrapping_add(0x9E37_79B9_7F4A_7C15);
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
        z ^ (z >> 31)
    }
    mix(mix(seed ^ mix(store_index as u64)) ^ chunk_index as u64)
}
