//! Fragment library types and the on-disk library format.
//!
//! A structure fragment library drives classification during ingestion; the
//! sequence fragment libraries are what the build commands produce. All
//! three kinds share one tagged JSON file format so a single `load` can
//! dispatch on what it finds.

pub mod sequence;
pub mod structure;

use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use crate::errors::{FlibError, Result};
use crate::structure::Coords;

pub use sequence::{SeqHmmLibrary, SeqProfileLibrary};
pub use structure::CoordLibrary;

/// A read-only structure fragment library exposing the classification
/// oracle.
///
/// Implementations must be safely shareable across worker threads; the
/// pipeline holds one instance for the whole run and calls `classify` from
/// many workers concurrently.
pub trait StructureLibrary: Send + Sync {
    /// Number of bins (fragments) in the library.
    fn size(&self) -> usize;

    /// Window length in residues.
    fn fragment_size(&self) -> usize;

    /// Returns the bin whose fragment best matches the window.
    ///
    /// The window always has exactly `fragment_size` coordinates. The
    /// returned index must be in `[0, size)`; the pipeline aborts the run
    /// if an implementation breaks that contract.
    fn classify(&self, window: &[Coords]) -> usize;
}

/// On-disk envelope for every library kind.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum LibraryFile {
    /// Coordinate fragments with classification support.
    Structure(CoordLibrary),
    /// Negative log-odds profiles, one per bin.
    SequenceProfile(SeqProfileLibrary),
    /// Trained profile HMMs, one per bin.
    SequenceHmm(SeqHmmLibrary),
}

impl LibraryFile {
    /// Human-readable kind tag.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            LibraryFile::Structure(_) => "structure",
            LibraryFile::SequenceProfile(_) => "sequence-profile",
            LibraryFile::SequenceHmm(_) => "sequence-hmm",
        }
    }

    /// The library's name.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            LibraryFile::Structure(lib) => lib.name(),
            LibraryFile::SequenceProfile(lib) => lib.name(),
            LibraryFile::SequenceHmm(lib) => lib.name(),
        }
    }

    /// Number of bins.
    #[must_use]
    pub fn size(&self) -> usize {
        match self {
            LibraryFile::Structure(lib) => lib.size(),
            LibraryFile::SequenceProfile(lib) => lib.size(),
            LibraryFile::SequenceHmm(lib) => lib.size(),
        }
    }

    /// Fragment size in residues.
    #[must_use]
    pub fn fragment_size(&self) -> usize {
        match self {
            LibraryFile::Structure(lib) => lib.fragment_size(),
            LibraryFile::SequenceProfile(lib) => lib.fragment_size(),
            LibraryFile::SequenceHmm(lib) => lib.fragment_size(),
        }
    }
}

/// Writes a library to `path` as JSON.
///
/// # Errors
/// Returns [`FlibError::InvalidFileFormat`] if the file cannot be created
/// or serialized.
pub fn save(path: &Path, library: &LibraryFile) -> Result<()> {
    let file = File::create(path).map_err(|e| library_error(path, e.to_string()))?;
    serde_json::to_writer(BufWriter::new(file), library)
        .map_err(|e| library_error(path, e.to_string()))
}

/// Reads any library kind from `path`.
///
/// # Errors
/// Returns [`FlibError::InvalidFileFormat`] if the file cannot be opened or
/// parsed.
pub fn load(path: &Path) -> Result<LibraryFile> {
    let file = File::open(path).map_err(|e| library_error(path, e.to_string()))?;
    serde_json::from_reader(BufReader::new(file)).map_err(|e| library_error(path, e.to_string()))
}

/// Reads a structure fragment library, rejecting other kinds.
///
/// # Errors
/// Returns [`FlibError::InvalidFileFormat`] if the file does not hold a
/// valid structure library.
pub fn load_structure(path: &Path) -> Result<CoordLibrary> {
    match load(path)? {
        LibraryFile::Structure(lib) => {
            lib.validate().map_err(|reason| library_error(path, reason))?;
            Ok(lib)
        }
        other => Err(library_error(
            path,
            format!("expected a structure library, found kind '{}'", other.kind()),
        )),
    }
}

fn library_error(path: &Path, reason: String) -> FlibError {
    FlibError::InvalidFileFormat {
        file_type: "library".to_string(),
        path: path.display().to_string(),
        reason,
    }
}
