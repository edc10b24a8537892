//! Build a sequence fragment library of profile HMMs.
//!
//! Shares the ingestion pipeline with `seq-profile`, but accumulates a
//! multiple sequence alignment per bin and hands each alignment to an
//! external trainer. No null model is accumulated; the trainer applies its
//! own background statistics.

use anyhow::Result;
use clap::Parser;
use log::{info, warn};
use std::path::PathBuf;
use std::sync::Arc;

use flib_lib::library::{self, LibraryFile, SeqHmmLibrary, StructureLibrary};
use flib_lib::logging::{format_count, OperationTimer};
use flib_lib::metrics::write_ingest_metrics;
use flib_lib::pipeline::{self, PipelineOptions};
use flib_lib::seq::msa::Msa;
use flib_lib::structure::pdb::PdbReader;
use flib_lib::structure::ChainSource;
use flib_lib::train::HhMake;
use flib_lib::validation::{validate_file_exists, validate_overwritable};

use crate::commands::command::Command;
use crate::commands::common::BuildOptions;

/// Build a sequence fragment library with profile HMMs.
#[derive(Debug, Parser)]
#[command(
    name = "seq-hmm",
    about = "Build a sequence fragment library of profile HMMs",
    long_about = r#"
Build a sequence fragment library from a structure fragment library and a
set of PDB structures to train on. The resulting library is a collection of
fragments represented as profile HMMs trained with hhsuite's hhmake.

For every window in every chain, the best matching structure fragment is
found and the corresponding region of sequence is added to that fragment's
multiple sequence alignment. After all chains are processed, one model is
trained per alignment; trainer invocations run at most --cpu at a time. A
failure to train any single fragment aborts the whole run.

The library produced always has the same number of fragments and the same
fragment size as the structure fragment library given.

Example usage:
  flib seq-hmm structure.lib seq.lib pdb/*.pdb
  flib seq-hmm structure.lib seq.lib --hhmake /opt/hhsuite/bin/hhmake pdb/*.pdb
"#
)]
pub struct SeqHmm {
    /// Structure fragment library to classify windows against
    pub structure_lib: PathBuf,

    /// Output path for the sequence fragment library
    pub output: PathBuf,

    /// PDB entry files to train on
    #[arg(required = true)]
    pub entries: Vec<PathBuf>,

    /// Path to the hhmake executable
    #[arg(long = "hhmake", value_name = "EXE", default_value = "hhmake")]
    pub hhmake: PathBuf,

    #[command(flatten)]
    pub build: BuildOptions,
}

impl Command for SeqHmm {
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
        let timer = OperationTimer::new("Building sequence HMM library");

        let oracle: Arc<dyn StructureLibrary> = Arc::new(structure_lib);
        let source: Arc<dyn ChainSource> = Arc::new(PdbReader);
        let options = PipelineOptions { workers: threads, ..PipelineOptions::default() };
        let outcome = pipeline::ingest(&oracle, &source, &self.entries, &options, false, |_, size| {
            Msa::new(size)
        })?;

        let metrics = &outcome.metrics;
        info!(
            "Classified {} windows across {} chains ({} chains too short, {} windows gapped)",
            format_count(metrics.windows),
            format_count(metrics.chains),
            format_count(metrics.short_chains),
            format_count(metrics.gapped_windows)
        );
        if metrics.windows == 0 {
            warn!("No valid windows found; training will see empty alignments");
        }

        info!("Training profile HMMs from alignments ...");
        let trainer = HhMake::new(&self.hhmake)?;
        let hmms = pipeline::train_models(&outcome.bins, &trainer, threads)?;

        let seq_lib = SeqHmmLibrary::new(name, fragment_size, hmms)?;
        library::save(&self.output, &LibraryFile::SequenceHmm(seq_lib))?;

        if let Some(stats_path) = &self.build.stats {
            write_ingest_metrics(stats_path, metrics)?;
        }
        timer.log_completion("entries", metrics.entries);
        Ok(())
    }
}
