//! The concurrent fragment assignment and aggregation pipeline.
//!
//! This is the machinery behind the `seq-profile` and `seq-hmm` commands:
//! it classifies every gap-free window of every input chain against a
//! structure fragment library and aggregates the corresponding sequence
//! slices per bin.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐    ┌──────────────┐    ┌───────────────────┐
//! │ Entry Feeder │───>│ Worker Pool  │───>│ Bin Accumulators  │
//! │  (1 thread)  │    │ (P threads)  │    │ (N + 1 threads)   │
//! └──────────────┘    └──────────────┘    └───────────────────┘
//!        │                   │                     │
//!        ▼                   ▼                     ▼
//!    Stream entry      Parse, window,        Single-owner
//!    paths             classify, route       aggregation
//! ```
//!
//! Workers parse entries into chains, walk each chain's gap-free windows,
//! ask the library which bin each window belongs to, and route the paired
//! sequence slice to that bin's mailbox. Every bin's accumulator runs on
//! its own thread as the sole owner of its state, so aggregation needs no
//! locks; bounded mailboxes propagate backpressure from slow accumulators
//! to the producing workers.
//!
//! Shutdown is two sequential barriers, sequenced by the
//! [`ShutdownCoordinator`]: first every worker is joined, then the
//! mailboxes are closed and every accumulator is joined as it finalizes.
//! Closing before the first barrier would race in-flight producers, which
//! the coordinator treats as a fatal protocol violation.
//!
//! Post-processing is a second bounded-parallel stage over the N finalized
//! states; see [`build_profiles`] and [`train_models`].

mod accumulator;
mod builder;
mod coordinator;
mod feeder;
mod router;
mod windower;

pub use accumulator::{AccumulatorSet, SliceAccumulator};
pub use builder::{build_profiles, train_models};
pub use coordinator::{Phase, ShutdownCoordinator};
pub use router::BinRouter;
pub use windower::ChainWindower;

use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::errors::Result;
use crate::library::StructureLibrary;
use crate::metrics::IngestMetrics;
use crate::progress::ProgressTracker;
use crate::seq::frequency::NullModel;
use crate::structure::ChainSource;
use crate::validation::effective_parallelism;

/// Tuning knobs for one pipeline run.
#[derive(Debug, Clone)]
pub struct PipelineOptions {
    /// Worker pool size. Values below 1 are treated as 1.
    pub workers: usize,
    /// Capacity of each bin's mailbox.
    pub mailbox_capacity: usize,
    /// Entries between progress log lines.
    pub progress_interval: u64,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            workers: effective_parallelism(None),
            mailbox_capacity: 64,
            progress_interval: ProgressTracker::DEFAULT_INTERVAL,
        }
    }
}

/// Shared counters updated by workers during ingestion.
///
/// All fields are atomics: the stats object and the progress tracker are
/// the only mutable values shared across the worker pool.
#[derive(Debug, Default)]
pub struct IngestStats {
    entries: AtomicU64,
    failed_entries: AtomicU64,
    chains: AtomicU64,
    short_chains: AtomicU64,
    windows: AtomicU64,
    gapped_windows: AtomicU64,
    routed_slices: AtomicU64,
}

impl IngestStats {
    pub(crate) fn record_entry(&self, ok: bool) {
        self.entries.fetch_add(1, Ordering::Relaxed);
        if !ok {
            self.failed_entries.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub(crate) fn record_chain(&self) {
        self.chains.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_short_chain(&self) {
        self.short_chains.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_window(&self) {
        self.windows.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_routed(&self) {
        self.routed_slices.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_gapped_windows(&self, count: u64) {
        self.gapped_windows.fetch_add(count, Ordering::Relaxed);
    }

    /// A point-in-time copy of the counters.
    #[must_use]
    pub fn snapshot(&self) -> IngestMetrics {
        IngestMetrics {
            entries: self.entries.load(Ordering::Relaxed),
            failed_entries: self.failed_entries.load(Ordering::Relaxed),
            chains: self.chains.load(Ordering::Relaxed),
            short_chains: self.short_chains.load(Ordering::Relaxed),
            windows: self.windows.load(Ordering::Relaxed),
            gapped_windows: self.gapped_windows.load(Ordering::Relaxed),
            routed_slices: self.routed_slices.load(Ordering::Relaxed),
        }
    }
}

/// Everything the ingestion phase produced: one finalized accumulator per
/// bin in bin order, the null model when one was attached, and the run's
/// counters.
#[derive(Debug)]
pub struct IngestOutcome<A> {
    /// Finalized per-bin states, indexed by bin.
    pub bins: Vec<A>,
    /// Background model, present when requested.
    pub null_model: Option<NullModel>,
    /// Counters collected during the run.
    pub metrics: IngestMetrics,
}

/// Runs the full ingestion phase: feeds every entry through the worker
/// pool, aggregates routed slices per bin, and shuts the accumulators down
/// through the two-phase barrier.
///
/// `new_accumulator` is called once per bin with the bin index and the
/// library's fragment size. The outcome always has exactly
/// `library.size()` bins regardless of corpus content.
///
/// Per-entry parse failures are counted and skipped. An error that
/// compromises the output (oracle contract breach, mailbox fault, panicked
/// task) aborts the run, but only after every worker and accumulator has
/// been joined, so nothing is left running behind the error.
///
/// # Errors
/// Returns the first fatal error encountered by any worker or accumulator.
pub fn ingest<A, F>(
    library: &Arc<dyn StructureLibrary>,
    source: &Arc<dyn ChainSource>,
    entries: &[PathBuf],
    options: &PipelineOptions,
    with_null_model: bool,
    new_accumulator: F,
) -> Result<IngestOutcome<A>>
where
    A: SliceAccumulator,
    F: Fn(usize, usize) -> A,
{
    let (router, accumulators) = accumulator::spawn(
        library.size(),
        library.fragment_size(),
        options.mailbox_capacity.max(1),
        with_null_model,
        new_accumulator,
    );
    let mut shutdown = ShutdownCoordinator::new(router, accumulators);

    let stats = Arc::new(IngestStats::default());
    let progress = Arc::new(
        ProgressTracker::new("Processed entries", entries.len() as u64)
            .with_interval(options.progress_interval),
    );

    let worker_result = feeder::dispatch_entries(
        entries,
        options.workers,
        library,
        source,
        shutdown.router()?,
        &stats,
        &progress,
    );
    progress.log_final();

    // The workers are all joined; closing the mailboxes is now safe, and
    // the accumulators finalize even when a worker failed, so a fatal
    // error never leaves tasks running.
    shutdown.drain()?;
    let (bins, null_model) = shutdown.finish()?;
    worker_result?;

    Ok(IngestOutcome { bins, null_model, metrics: stats.snapshot() })
}
