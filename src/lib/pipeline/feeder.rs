//! Entry feeding and the bounded worker pool.

use crossbeam_channel::bounded;
use log::warn;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

use crate::errors::{FlibError, Result};
use crate::library::StructureLibrary;
use crate::progress::ProgressTracker;
use crate::structure::ChainSource;

use super::router::BinRouter;
use super::windower::process_chain;
use super::IngestStats;

/// Cooperative stop signal shared by the feeder and every worker.
///
/// Raised when a worker hits a fatal error; observed at each entry
/// boundary, so the rest of the pool winds down promptly instead of
/// finishing the corpus behind an abort.
#[derive(Clone, Default)]
struct StopFlag(Arc<AtomicBool>);

impl StopFlag {
    fn raise(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    fn is_raised(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Streams the entry list into `workers` concurrent workers and blocks
/// until every worker has finished every assigned entry.
///
/// Each entry is consumed by exactly one worker; processing order across
/// entries is unspecified. An entry that fails to parse is logged, counted,
/// and skipped. Errors that compromise the run (routing faults, oracle
/// contract breaches) raise the stop flag and halt the pool; the first such
/// error is returned after all workers have been joined, so no producer is
/// left running when the caller moves on to close the mailboxes.
pub(crate) fn dispatch_entries(
    entries: &[PathBuf],
    workers: usize,
    library: &Arc<dyn StructureLibrary>,
    source: &Arc<dyn ChainSource>,
    router: &BinRouter,
    stats: &Arc<IngestStats>,
    progress: &Arc<ProgressTracker>,
) -> Result<()> {
    let workers = workers.max(1);
    let (entry_tx, entry_rx) = bounded::<PathBuf>(workers * 2);
    let stop = StopFlag::default();

    let feeder = {
        let entries = entries.to_vec();
        let stop = stop.clone();
        thread::spawn(move || {
            for path in entries {
                // A send fails only when every worker has already exited;
                // there is nobody left to feed.
                if stop.is_raised() || entry_tx.send(path).is_err() {
                    break;
                }
            }
        })
    };

    let mut handles = Vec::with_capacity(workers);
    for _ in 0..workers {
        let entry_rx = entry_rx.clone();
        let library = Arc::clone(library);
        let source = Arc::clone(source);
        let router = router.clone();
        let stats = Arc::clone(stats);
        let progress = Arc::clone(progress);
        let stop = stop.clone();
        handles.push(thread::spawn(move || -> Result<()> {
            for path in entry_rx.iter() {
                if stop.is_raised() {
                    break;
                }
                match source.read_chains(&path) {
                    Ok(chains) => {
                        stats.record_entry(true);
                        progress.entry_done(true);
                        for chain in &chains {
                            if let Err(err) = process_chain(library.as_ref(), chain, &router, &stats)
                            {
                                stop.raise();
                                return Err(err);
                            }
                        }
                    }
                    Err(err) => {
                        warn!("Skipping entry: {err}");
                        stats.record_entry(false);
                        progress.entry_done(false);
                    }
                }
            }
            Ok(())
        }));
    }
    drop(entry_rx);

    // The worker barrier: every worker joined before this returns, fatal or
    // not, so the caller may safely begin draining.
    let mut first_error = None;
    for handle in handles {
        match handle.join() {
            Ok(Ok(())) => {}
            Ok(Err(err)) => {
                if first_error.is_none() {
                    first_error = Some(err);
                }
            }
            Err(_) => {
                if first_error.is_none() {
                    first_error =
                        Some(FlibError::ProtocolViolation("an ingest worker panicked".to_string()));
                }
            }
        }
    }
    feeder
        .join()
        .map_err(|_| FlibError::ProtocolViolation("the entry feeder panicked".to_string()))?;

    match first_error {
        Some(err) => Err(err),
        None => Ok(()),
    }
}
