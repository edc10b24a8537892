//! Structure-side data model: chains, coordinates, and entry parsing.

pub mod pdb;
pub mod superpose;

use std::path::Path;

use crate::errors::Result;
use crate::seq::Sequence;

/// A 3D coordinate, typically an alpha-carbon position.
pub type Coords = [f64; 3];

/// One residue of a chain: its one-letter code and, when the structure
/// resolves it, its alpha-carbon position. Disordered residues have no
/// coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct ChainResidue {
    /// One-letter residue code.
    pub code: u8,
    /// Alpha-carbon position, absent for disordered residues.
    pub ca: Option<Coords>,
}

/// An ordered run of residues from one structure entry.
///
/// Read-only after parsing. The sequence view and the coordinate array are
/// derived on demand; callers that need both repeatedly should derive them
/// once per chain.
#[derive(Debug, Clone, PartialEq)]
pub struct Chain {
    /// Identifier, e.g. `1abc_A`.
    pub name: String,
    residues: Vec<ChainResidue>,
}

impl Chain {
    /// Creates a chain from parsed residues.
    #[must_use]
    pub fn new(name: impl Into<String>, residues: Vec<ChainResidue>) -> Self {
        Self { name: name.into(), residues }
    }

    /// Number of residues.
    #[must_use]
    pub fn len(&self) -> usize {
        self.residues.len()
    }

    /// True if the chain has no residues.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.residues.is_empty()
    }

    /// The chain's residue string, named after the chain.
    #[must_use]
    pub fn as_sequence(&self) -> Sequence {
        Sequence::new(self.name.clone(), self.residues.iter().map(|r| r.code).collect())
    }

    /// The per-residue coordinate array, aligned to [`Chain::as_sequence`].
    /// `None` marks a disordered residue.
    #[must_use]
    pub fn sequence_coords(&self) -> Vec<Option<Coords>> {
        self.residues.iter().map(|r| r.ca).collect()
    }
}

/// Parses entry files into chains.
///
/// Injected into the pipeline so tests can drive it with fabricated chains
/// instead of on-disk structures.
pub trait ChainSource: Send + Sync {
    /// Reads all chains from one entry file.
    ///
    /// # Errors
    /// Returns [`crate::errors::FlibError::EntryRead`] when the entry cannot
    /// be opened or parsed. The pipeline treats this as a per-entry failure,
    /// not a fatal one.
    fn read_chains(&self, path: &Path) -> Result<Vec<Chain>>;
}
