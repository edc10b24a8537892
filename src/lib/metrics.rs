//! Ingestion metrics and TSV output.

use anyhow::{Context, Result};
use fgoxide::io::DelimFile;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Counts collected while ingesting a corpus of structure entries.
///
/// `routed_slices` always equals `windows`: every valid window produces
/// exactly one routed slice.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngestMetrics {
    /// Entries processed, including failures.
    pub entries: u64,
    /// Entries that failed to open or parse and were skipped.
    pub failed_entries: u64,
    /// Chains derived from all parsed entries.
    pub chains: u64,
    /// Chains shorter than the fragment size, skipped whole.
    pub short_chains: u64,
    /// Valid, gap-free windows classified against the structure library.
    pub windows: u64,
    /// Window offsets skipped because a residue in range was disordered.
    pub gapped_windows: u64,
    /// Sequence slices delivered to bin accumulators.
    pub routed_slices: u64,
}

/// Write ingest metrics to a TSV file.
///
/// # Errors
/// Returns an error if the file cannot be created or written to.
pub fn write_ingest_metrics<P: AsRef<Path>>(path: P, metrics: &IngestMetrics) -> Result<()> {
    let path = path.as_ref();
    DelimFile::default()
        .write_tsv(&path, [metrics.clone()])
        .with_context(|| format!("Failed to write ingest metrics: {}", path.display()))
}
