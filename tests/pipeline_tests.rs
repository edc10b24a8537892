//! Integration tests for the fragment assignment pipeline.
//!
//! Run with: `cargo test --test pipeline_tests`
//!
//! These tests drive the whole ingestion pipeline against deterministic
//! stub oracles and chain sources, checking the contribution accounting,
//! shutdown sequencing, and output shape end to end.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use flib_lib::errors::FlibError;
use flib_lib::library::{self, LibraryFile, SeqProfileLibrary, StructureLibrary};
use flib_lib::library::structure::{CoordFragment, CoordLibrary};
use flib_lib::pipeline::{self, PipelineOptions, SliceAccumulator};
use flib_lib::seq::frequency::FrequencyProfile;
use flib_lib::seq::msa::Msa;
use flib_lib::structure::{Chain, ChainResidue, ChainSource, Coords};

/// A deterministic oracle that recovers the window's start offset from its
/// first coordinate. Chains built by [`full_chain`] place residue `i` at
/// x = i, so `window[0][0]` is the offset.
struct OffsetOracle {
    bins: usize,
    fragment_size: usize,
    map: fn(usize) -> usize,
}

impl StructureLibrary for OffsetOracle {
    fn size(&self) -> usize {
        self.bins
    }

    fn fragment_size(&self) -> usize {
        self.fragment_size
    }

    fn classify(&self, window: &[Coords]) -> usize {
        (self.map)(window[0][0] as usize)
    }
}

/// Serves fabricated chains from memory; listed paths fail to parse.
#[derive(Default)]
struct StaticSource {
    chains: HashMap<PathBuf, Vec<Chain>>,
    failing: HashSet<PathBuf>,
}

impl StaticSource {
    fn with_entry(mut self, path: &str, chains: Vec<Chain>) -> Self {
        self.chains.insert(PathBuf::from(path), chains);
        self
    }

    fn with_failing(mut self, path: &str) -> Self {
        self.failing.insert(PathBuf::from(path));
        self
    }

    fn entries(&self) -> Vec<PathBuf> {
        let mut entries: Vec<PathBuf> =
            self.chains.keys().chain(self.failing.iter()).cloned().collect();
        entries.sort();
        entries.dedup();
        entries
    }
}

impl ChainSource for StaticSource {
    fn read_chains(&self, path: &Path) -> flib_lib::errors::Result<Vec<Chain>> {
        if self.failing.contains(path) {
            return Err(FlibError::EntryRead {
                path: path.display().to_string(),
                reason: "corrupt test entry".to_string(),
            });
        }
        Ok(self.chains.get(path).cloned().unwrap_or_default())
    }
}

/// A chain of `len` residues with residue `i` at x = i, all ordered.
fn full_chain(name: &str, len: usize) -> Chain {
    Chain::new(name, (0..len).map(|i| residue(i, true)).collect())
}

/// Like [`full_chain`] but with the listed residues disordered.
fn gapped_chain(name: &str, len: usize, disordered: &[usize]) -> Chain {
    Chain::new(
        name,
        (0..len).map(|i| residue(i, !disordered.contains(&i))).collect(),
    )
}

fn residue(i: usize, ordered: bool) -> ChainResidue {
    ChainResidue {
        code: b"ACDEFGHIKLMNPQRSTVWY"[i % 20],
        ca: ordered.then_some([i as f64, 0.0, 0.0]),
    }
}

fn run<A: SliceAccumulator>(
    oracle: OffsetOracle,
    source: StaticSource,
    workers: usize,
    mailbox_capacity: usize,
    with_null_model: bool,
    new_accumulator: fn(usize, usize) -> A,
) -> flib_lib::errors::Result<pipeline::IngestOutcome<A>> {
    let entries = source.entries();
    let oracle: Arc<dyn StructureLibrary> = Arc::new(oracle);
    let source: Arc<dyn ChainSource> = Arc::new(source);
    let options = PipelineOptions {
        workers,
        mailbox_capacity,
        ..PipelineOptions::default()
    };
    pipeline::ingest(&oracle, &source, &entries, &options, with_null_model, new_accumulator)
}

#[test]
fn test_scenario_one_chain_three_windows() {
    // One chain of length 5 with full coordinates and fragment size 3
    // yields exactly the windows at offsets 0, 1, and 2.
    let oracle = OffsetOracle {
        bins: 2,
        fragment_size: 3,
        map: |offset| usize::from(offset == 1),
    };
    let source = StaticSource::default().with_entry("a.pdb", vec![full_chain("a_A", 5)]);

    let outcome = run(oracle, source, 2, 8, false, |_, size| Msa::new(size)).unwrap();

    assert_eq!(outcome.bins.len(), 2);
    assert_eq!(outcome.bins[0].len(), 2); // offsets 0 and 2
    assert_eq!(outcome.bins[1].len(), 1); // offset 1
    assert_eq!(outcome.metrics.windows, 3);
    assert_eq!(outcome.metrics.routed_slices, 3);
    assert_eq!(outcome.metrics.gapped_windows, 0);
}

#[test]
fn test_scenario_short_chain_contributes_nothing() {
    let oracle = OffsetOracle { bins: 2, fragment_size: 3, map: |_| 0 };
    let source = StaticSource::default().with_entry("short.pdb", vec![full_chain("s_A", 2)]);

    let outcome = run(oracle, source, 2, 8, false, |_, size| Msa::new(size)).unwrap();

    assert_eq!(outcome.bins.len(), 2);
    assert!(outcome.bins.iter().all(Msa::is_empty));
    assert_eq!(outcome.metrics.chains, 1);
    assert_eq!(outcome.metrics.short_chains, 1);
    assert_eq!(outcome.metrics.windows, 0);
    assert_eq!(outcome.metrics.routed_slices, 0);
}

#[test]
fn test_scenario_disordered_residue_skips_covering_offsets_only() {
    // Residue 2 of 6 is disordered; windows of size 3 at offsets 0-2 cover
    // it, so only offset 3 survives.
    let oracle = OffsetOracle { bins: 4, fragment_size: 3, map: |offset| offset % 4 };
    let source =
        StaticSource::default().with_entry("g.pdb", vec![gapped_chain("g_A", 6, &[2])]);

    let outcome = run(oracle, source, 2, 8, false, |_, size| Msa::new(size)).unwrap();

    assert_eq!(outcome.metrics.windows, 1);
    assert_eq!(outcome.metrics.gapped_windows, 3);
    assert_eq!(outcome.bins[3].len(), 1);
    let survivor = &outcome.bins[3].entries()[0];
    assert_eq!(survivor.name, "g_A:3-6");
}

#[test]
fn test_conservation_under_stress() {
    // Many entries, several workers, and single-slot mailboxes: every valid
    // window must still arrive exactly once, with no shutdown fault.
    let oracle = OffsetOracle { bins: 5, fragment_size: 4, map: |offset| offset % 5 };
    let mut source = StaticSource::default();
    for entry in 0..40 {
        source = source.with_entry(
            &format!("e{entry:02}.pdb"),
            vec![
                full_chain(&format!("e{entry:02}_A"), 30),
                gapped_chain(&format!("e{entry:02}_B"), 20, &[5, 11]),
            ],
        );
    }

    let outcome = run(oracle, source, 8, 1, true, |_, size| Msa::new(size)).unwrap();

    // Per entry: chain A gives 27 windows; chain B has offsets 0..=16 minus
    // the 8 covering a disordered residue.
    let expected_windows = 40 * (27 + 9);
    assert_eq!(outcome.metrics.windows, expected_windows);
    assert_eq!(outcome.metrics.routed_slices, expected_windows);
    let accumulated: usize = outcome.bins.iter().map(Msa::len).sum();
    assert_eq!(accumulated as u64, expected_windows);
    assert_eq!(outcome.metrics.gapped_windows, 40 * 8);
}

#[test]
fn test_frequency_output_is_identical_across_worker_counts() {
    let build = |workers: usize| {
        let oracle = OffsetOracle { bins: 3, fragment_size: 3, map: |offset| offset % 3 };
        let mut source = StaticSource::default();
        for entry in 0..12 {
            source = source
                .with_entry(&format!("e{entry}.pdb"), vec![full_chain(&format!("c{entry}"), 25)]);
        }
        let outcome = run(oracle, source, workers, 4, true, |_, size| {
            FrequencyProfile::new(size)
        })
        .unwrap();
        let profiles =
            pipeline::build_profiles(&outcome.bins, outcome.null_model.as_ref(), workers).unwrap();
        let lib = SeqProfileLibrary::new("determinism", 3, profiles).unwrap();
        serde_json::to_string(&lib).unwrap()
    };

    let sequential = build(1);
    let concurrent = build(8);
    assert_eq!(sequential, concurrent);
}

#[test]
fn test_alignment_bins_hold_the_same_multiset_across_runs() {
    let build = |workers: usize| -> Vec<Vec<String>> {
        let oracle = OffsetOracle { bins: 4, fragment_size: 3, map: |offset| offset % 4 };
        let mut source = StaticSource::default();
        for entry in 0..10 {
            source = source
                .with_entry(&format!("e{entry}.pdb"), vec![full_chain(&format!("c{entry}"), 19)]);
        }
        let outcome = run(oracle, source, workers, 4, false, |_, size| Msa::new(size)).unwrap();
        outcome
            .bins
            .iter()
            .map(|msa| {
                let mut names: Vec<String> =
                    msa.entries().iter().map(|e| e.name.clone()).collect();
                names.sort();
                names
            })
            .collect()
    };

    // Arrival order within a bin is a race outcome, but membership is not.
    assert_eq!(build(4), build(4));
}

#[test]
fn test_failed_entries_are_counted_not_fatal() {
    let oracle = OffsetOracle { bins: 2, fragment_size: 3, map: |_| 0 };
    let source = StaticSource::default()
        .with_entry("good.pdb", vec![full_chain("good_A", 5)])
        .with_failing("bad.pdb");

    let outcome = run(oracle, source, 2, 8, false, |_, size| Msa::new(size)).unwrap();

    assert_eq!(outcome.metrics.entries, 2);
    assert_eq!(outcome.metrics.failed_entries, 1);
    assert_eq!(outcome.metrics.windows, 3);
}

#[test]
fn test_oracle_contract_violation_aborts_the_run() {
    let oracle = OffsetOracle { bins: 2, fragment_size: 3, map: |_| 99 };
    let source = StaticSource::default().with_entry("a.pdb", vec![full_chain("a_A", 10)]);

    let err = run(oracle, source, 4, 8, false, |_, size: usize| Msa::new(size)).unwrap_err();
    assert!(matches!(err, FlibError::OracleContractViolation { bin: 99, bins: 2 }));
}

#[test]
fn test_output_shape_is_library_shape_even_for_empty_corpus() {
    let oracle = OffsetOracle { bins: 7, fragment_size: 3, map: |_| 0 };
    let outcome =
        run(oracle, StaticSource::default(), 3, 8, true, |_, size| FrequencyProfile::new(size))
            .unwrap();

    assert_eq!(outcome.bins.len(), 7);
    assert_eq!(outcome.metrics.entries, 0);
    assert_eq!(outcome.metrics.windows, 0);
    assert_eq!(outcome.null_model.unwrap().total(), 0);

    let profiles = pipeline::build_profiles(&outcome.bins, None, 2).unwrap();
    assert_eq!(profiles.len(), 7);
}

#[test]
fn test_null_model_sees_every_non_short_chain_once() {
    let oracle = OffsetOracle { bins: 2, fragment_size: 3, map: |_| 0 };
    let source = StaticSource::default()
        .with_entry("a.pdb", vec![full_chain("a_A", 10), full_chain("a_B", 2)])
        .with_entry("b.pdb", vec![gapped_chain("b_A", 6, &[0, 1, 2, 3, 4, 5])]);

    let outcome =
        run(oracle, source, 2, 8, true, |_, size| FrequencyProfile::new(size)).unwrap();

    // Chain a_B is too short and contributes nothing; b_A is entirely
    // disordered yet still feeds the null model with its 6 residues.
    assert_eq!(outcome.null_model.unwrap().total(), 10 + 6);
    assert_eq!(outcome.metrics.windows, 8);
}

#[test]
fn test_end_to_end_profile_library_from_pdb_files() {
    let dir = tempfile::tempdir().unwrap();

    // Two fragments: a straight strand along x and a right-angle bend.
    let structure_lib = CoordLibrary::new(
        "shapes",
        vec![
            CoordFragment {
                coords: vec![[0.0, 0.0, 0.0], [3.8, 0.0, 0.0], [7.6, 0.0, 0.0]],
            },
            CoordFragment {
                coords: vec![[0.0, 0.0, 0.0], [3.8, 0.0, 0.0], [3.8, 3.8, 0.0]],
            },
        ],
    )
    .unwrap();
    let lib_path = dir.path().join("shapes.lib");
    library::save(&lib_path, &LibraryFile::Structure(structure_lib)).unwrap();
    let loaded = library::load_structure(&lib_path).unwrap();

    // A 5-residue straight chain: every window matches the strand fragment.
    let pdb_path = dir.path().join("straight.pdb");
    let mut pdb = String::new();
    for i in 0..5 {
        let x = i as f64 * 3.8;
        pdb.push_str(&format!(
            "ATOM  {:>5}  CA  ALA A{:>4}    {x:8.3}{:8.3}{:8.3}\n",
            i + 1,
            i + 1,
            0.0,
            0.0
        ));
    }
    std::fs::write(&pdb_path, pdb).unwrap();

    let oracle: Arc<dyn StructureLibrary> = Arc::new(loaded);
    let source: Arc<dyn ChainSource> =
        Arc::new(flib_lib::structure::pdb::PdbReader);
    let entries = vec![pdb_path];
    let options = PipelineOptions { workers: 2, ..PipelineOptions::default() };

    let outcome =
        pipeline::ingest(&oracle, &source, &entries, &options, true, |_, size| {
            FrequencyProfile::new(size)
        })
        .unwrap();

    assert_eq!(outcome.metrics.chains, 1);
    assert_eq!(outcome.metrics.windows, 3);
    assert_eq!(outcome.bins[0].total(0), 3);
    assert_eq!(outcome.bins[1].total(0), 0);

    // Finalize and round-trip the output library; its shape must mirror the
    // structure library's.
    let profiles =
        pipeline::build_profiles(&outcome.bins, outcome.null_model.as_ref(), 2).unwrap();
    let seq_lib = SeqProfileLibrary::new("shapes", 3, profiles).unwrap();
    let out_path = dir.path().join("shapes-seq.lib");
    library::save(&out_path, &LibraryFile::SequenceProfile(seq_lib)).unwrap();

    let reloaded = library::load(&out_path).unwrap();
    assert_eq!(reloaded.kind(), "sequence-profile");
    assert_eq!(reloaded.size(), 2);
    assert_eq!(reloaded.fragment_size(), 3);
}
