//! Per-column residue counting and log-odds profile construction.
//!
//! A [`FrequencyProfile`] is the accumulator state for one bin in
//! frequency-profile mode: an M x alphabet count matrix. Accumulation is
//! commutative and associative, so the final counts do not depend on the
//! order in which concurrently produced slices arrive.
//!
//! A [`NullModel`] collects background residue counts over whole chain
//! sequences. Combining a bin's counts with the null model yields a
//! [`Profile`] of negative log-odds scores.

use serde::{Deserialize, Serialize};

use super::{residue_index, Sequence, ALPHABET_SIZE};

/// Pseudocount added to every cell when converting counts to probabilities.
/// Keeps scores finite for residues never observed in a column.
const PSEUDOCOUNT: f64 = 1.0;

/// An M x alphabet matrix of residue counts for one bin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrequencyProfile {
    columns: Vec<[u64; ALPHABET_SIZE]>,
}

impl FrequencyProfile {
    /// Creates an empty profile with `len` columns.
    #[must_use]
    pub fn new(len: usize) -> Self {
        Self { columns: vec![[0; ALPHABET_SIZE]; len] }
    }

    /// Number of columns.
    #[must_use]
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// True if the profile has no columns.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Adds one sequence, counting each residue in its column.
    ///
    /// Characters that are not residues (gaps) are skipped.
    ///
    /// # Panics
    /// Panics if the sequence length does not match the column count; slices
    /// routed to a bin always have the library's fragment size.
    pub fn add(&mut self, seq: &Sequence) {
        assert_eq!(
            seq.len(),
            self.columns.len(),
            "sequence '{}' does not span the profile columns",
            seq.name
        );
        for (column, &code) in self.columns.iter_mut().zip(&seq.residues) {
            if let Some(index) = residue_index(code) {
                column[index] += 1;
            }
        }
    }

    /// Total observations in one column.
    #[must_use]
    pub fn total(&self, column: usize) -> u64 {
        self.columns[column].iter().sum()
    }

    /// Raw count for a residue index in one column.
    #[must_use]
    pub fn count(&self, column: usize, index: usize) -> u64 {
        self.columns[column][index]
    }

    /// Converts accumulated counts into negative log-odds scores against a
    /// background model. Without a null model the background is uniform.
    #[must_use]
    pub fn to_profile(&self, null: Option<&NullModel>) -> Profile {
        let scores = self
            .columns
            .iter()
            .map(|column| {
                let total: u64 = column.iter().sum();
                let denom = total as f64 + PSEUDOCOUNT * ALPHABET_SIZE as f64;
                let mut row = [0.0; ALPHABET_SIZE];
                for (index, score) in row.iter_mut().enumerate() {
                    let p = (column[index] as f64 + PSEUDOCOUNT) / denom;
                    let background = match null {
                        Some(model) => model.probability(index),
                        None => 1.0 / ALPHABET_SIZE as f64,
                    };
                    *score = -(p / background).log2();
                }
                row
            })
            .collect();
        Profile { scores }
    }
}

/// Background residue frequencies accumulated over whole chain sequences.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NullModel {
    counts: [u64; ALPHABET_SIZE],
}

impl NullModel {
    /// Creates an empty null model.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Counts every residue of a whole chain sequence.
    pub fn add_sequence(&mut self, seq: &Sequence) {
        for &code in &seq.residues {
            if let Some(index) = residue_index(code) {
                self.counts[index] += 1;
            }
        }
    }

    /// Total residues observed.
    #[must_use]
    pub fn total(&self) -> u64 {
        self.counts.iter().sum()
    }

    /// Smoothed background probability of a residue index.
    #[must_use]
    pub fn probability(&self, index: usize) -> f64 {
        let denom = self.total() as f64 + PSEUDOCOUNT * ALPHABET_SIZE as f64;
        (self.counts[index] as f64 + PSEUDOCOUNT) / denom
    }
}

/// An M x alphabet matrix of negative log-odds scores, the finalized
/// frequency-profile representation of one bin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    scores: Vec<[f64; ALPHABET_SIZE]>,
}

impl Profile {
    /// Number of columns.
    #[must_use]
    pub fn len(&self) -> usize {
        self.scores.len()
    }

    /// True if the profile has no columns.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }

    /// Score for a residue index in one column. Lower is more favored.
    #[must_use]
    pub fn score(&self, column: usize, index: usize) -> f64 {
        self.scores[column][index]
    }
}
