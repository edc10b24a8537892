//! Build a sequence fragment library of frequency profiles.
//!
//! For every window in every input chain, the best matching structure
//! fragment is found and the corresponding region of sequence is added to
//! that fragment's frequency profile. A null model accumulated over all
//! chain sequences converts each profile into negative log-odds scores.
//! The resulting library has the same number of bins and the same fragment
//! size as the structure library it was built from.

use anyhow::Result;
use clap::Parser;
use log::{info, warn};
use std::path::PathBuf;
use std::sync::Arc;

use flib_lib::library::{self, LibraryFile, SeqProfileLibrary, StructureLibrary};
use flib_lib::logging::{format_count, OperationTimer};
use flib_lib::metrics::write_ingest_metrics;
use flib_lib::pipeline::{self, PipelineOptions};
use flib_lib::seq::frequency::FrequencyProfile;
use flib_lib::structure::pdb::PdbReader;
use flib_lib::structure::ChainSource;
use flib_lib::validation::{validate_file_exists, validate_overwritable};

use crate::commands::command::Command;
use crate::commands::common::BuildOptions;

/// Build a sequence fragment library with frequency profiles.
#[derive(Debug, Parser)]
#[command(
    name = "seq-profile",
    about = "Build a sequence fragment library of log-odds frequency profiles",
    long_about = r#"
Build a sequence fragment library from a structure fragment library and a
set of PDB structures to train on. The resulting library is a collection of
fragments represented as frequency profiles expressed as negative log-odds
scores. The null model is built from the residue composition over all
chains given.

For every window in every chain, the best matching structure fragment is
found and the corresponding region of sequence is added to that fragment's
frequency profile. Windows covering disordered residues are skipped, and
chains shorter than the fragment size contribute nothing.

The library produced always has the same number of fragments and the same
fragment size as the structure fragment library given.

Example usage:
  flib seq-profile structure.lib seq.lib pdb/*.pdb
  flib seq-profile structure.lib seq.lib --cpu 8 --overwrite pdb/*.pdb
"#
)]
pub struct SeqProfile {
    /// Structure fragment library to classify windows against
    pub structure_lib: PathBuf,

    /// Output path for the sequence fragment library
    pub output: PathBuf,

    /// PDB entry files to train on
    #[arg(required = true)]
    pub entries: Vec<PathBuf>,

    #[command(flatten)]
    pub build: BuildOptions,
}

impl Command for SeqProfile {
    fn execute(&self) -> Result<()> {
        self.build.apply_verbosity();
        validate_file_exists(&self.structure_lib, "Structure library")?;
        validate_overwritable(&self.output, self.build.overwrite)?;

        let structure_lib = library::load_structure(&self.structure_lib)?;
        let name = structure_lib.name().to_string();
        let bins = structure_lib.size();
        let fragment_size = structure_lib.fragment_size();
        info!("Structure library '{name}': {bins} bins, fragment size {fragment_size}");

        let threads = self.build.threads();
        let timer = OperationTimer::new("Building sequence profile library");

        let oracle: Arc<dyn StructureLibrary> = Arc::new(structure_lib);
        let source: Arc<dyn ChainSource> = Arc::new(PdbReader);
        let options = PipelineOptions { workers: threads, ..PipelineOptions::default() };
        let outcome = pipeline::ingest(&oracle, &source, &self.entries, &options, true, |_, size| {
            FrequencyProfile::new(size)
        })?;

        let profiles = pipeline::build_profiles(&outcome.bins, outcome.null_model.as_ref(), threads)?;
        let seq_lib = SeqProfileLibrary::new(name, fragment_size, profiles)?;
        library::save(&self.output, &LibraryFile::SequenceProfile(seq_lib))?;

        let metrics = &outcome.metrics;
        info!(
            "Classified {} windows across {} chains ({} chains too short, {} windows gapped)",
            format_count(metrics.windows),
            format_count(metrics.chains),
            format_count(metrics.short_chains),
            format_count(metrics.gapped_windows)
        );
        if metrics.failed_entries > 0 {
            info!(
                "Skipped {} of {} entries",
                format_count(metrics.failed_entries),
                format_count(metrics.entries)
            );
        }
        if metrics.windows == 0 {
            warn!("No valid windows found; the library's profiles hold only background scores");
        }
        if let Some(stats_path) = &self.build.stats {
            write_ingest_metrics(stats_path, metrics)?;
        }
        timer.log_completion("entries", metrics.entries);
        Ok(())
    }
}
