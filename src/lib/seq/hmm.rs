//! Trained profile HMMs.
//!
//! The numeric model construction happens in an external trainer; flib only
//! carries the trained model through to the output library. The model text
//! is therefore stored opaquely, alongside the column count used to enforce
//! library shape invariants.

use serde::{Deserialize, Serialize};

/// One trained profile HMM, as emitted by the external trainer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hmm {
    /// Number of match columns, equal to the library's fragment size.
    pub columns: usize,
    /// The trainer's model output, stored verbatim.
    pub model: String,
}

impl Hmm {
    /// Creates an HMM from a column count and raw model text.
    #[must_use]
    pub fn new(columns: usize, model: impl Into<String>) -> Self {
        Self { columns, model: model.into() }
    }
}
