//! Multiple sequence alignments with cheap appends.
//!
//! The alignment accumulator for one bin. Every entry added during ingestion
//! is a window-sized slice, so entries can be appended directly instead of
//! going through a general column-reconciling insert, which would be
//! quadratic in the number of entries.

use serde::{Deserialize, Serialize};
use std::io::{self, Write};

use super::Sequence;

/// A fixed-column multiple sequence alignment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Msa {
    columns: usize,
    entries: Vec<Sequence>,
}

impl Msa {
    /// Creates an empty alignment with the given column count.
    #[must_use]
    pub fn new(columns: usize) -> Self {
        Self { columns, entries: Vec::new() }
    }

    /// Number of columns.
    #[must_use]
    pub fn columns(&self) -> usize {
        self.columns
    }

    /// Number of aligned entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if no entries have been added.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Appends one entry in arrival order.
    ///
    /// # Panics
    /// Panics if the entry length does not match the column count.
    pub fn push(&mut self, entry: Sequence) {
        assert_eq!(
            entry.len(),
            self.columns,
            "alignment entry '{}' does not span the columns",
            entry.name
        );
        self.entries.push(entry);
    }

    /// The aligned entries, in arrival order.
    #[must_use]
    pub fn entries(&self) -> &[Sequence] {
        &self.entries
    }

    /// Writes the alignment as FASTA, one record per entry.
    pub fn write_fasta<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        for entry in &self.entries {
            writeln!(writer, ">{}", entry.name)?;
            writer.write_all(&entry.residues)?;
            writeln!(writer)?;
        }
        Ok(())
    }
}
