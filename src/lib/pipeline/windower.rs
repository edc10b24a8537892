//! Chain windowing, classification, and routing.

use log::debug;

use crate::errors::Result;
use crate::library::StructureLibrary;
use crate::structure::{Chain, Coords};

use super::router::BinRouter;
use super::IngestStats;

/// Lazily walks every fragment-sized window of one chain.
///
/// The chain's coordinate array is derived once up front and reused for
/// every offset. Offsets whose span contains a disordered residue are
/// skipped and counted; scanning continues at the next offset, so a single
/// gap never discards the rest of the chain. The walk is finite and cannot
/// be restarted.
pub struct ChainWindower {
    coords: Vec<Option<Coords>>,
    scratch: Vec<Coords>,
    size: usize,
    next: usize,
    gapped: u64,
}

impl ChainWindower {
    /// Creates a windower over one chain for the given fragment size.
    #[must_use]
    pub fn new(chain: &Chain, size: usize) -> Self {
        Self {
            coords: chain.sequence_coords(),
            scratch: vec![[0.0; 3]; size],
            size,
            next: 0,
            gapped: 0,
        }
    }

    /// Advances to the next gap-free window, returning its start offset and
    /// coordinates, or `None` when the chain is exhausted.
    pub fn next_window(&mut self) -> Option<(usize, &[Coords])> {
        while self.next + self.size <= self.coords.len() {
            let start = self.next;
            self.next += 1;
            if self.fill(start) {
                return Some((start, &self.scratch));
            }
            self.gapped += 1;
        }
        None
    }

    /// Offsets skipped so far because of a disordered residue.
    #[must_use]
    pub fn gapped(&self) -> u64 {
        self.gapped
    }

    fn fill(&mut self, start: usize) -> bool {
        for (slot, coords) in self.scratch.iter_mut().zip(&self.coords[start..start + self.size]) {
            match coords {
                Some(c) => *slot = *c,
                None => return false,
            }
        }
        true
    }
}

/// Classifies every valid window of a chain and routes the corresponding
/// sequence slices to their bins.
///
/// Chains shorter than the fragment size are skipped whole and reported.
/// When a null model is attached, the chain's full sequence is sent to it
/// once, before windowing and independent of how many windows survive.
pub(crate) fn process_chain(
    library: &dyn StructureLibrary,
    chain: &Chain,
    router: &BinRouter,
    stats: &IngestStats,
) -> Result<()> {
    stats.record_chain();
    let fragment_size = library.fragment_size();
    let sequence = chain.as_sequence();

    if sequence.len() < fragment_size {
        stats.record_short_chain();
        debug!(
            "Chain {} is too short: {} residues, fragment size {}",
            chain.name,
            sequence.len(),
            fragment_size
        );
        return Ok(());
    }

    if router.has_null_model() {
        router.send_null(sequence.clone())?;
    }

    let mut windower = ChainWindower::new(chain, fragment_size);
    while let Some((start, window)) = windower.next_window() {
        let bin = library.classify(window);
        stats.record_window();
        router.route(bin, sequence.slice(start, start + fragment_size))?;
        stats.record_routed();
    }
    stats.record_gapped_windows(windower.gapped());
    Ok(())
}
