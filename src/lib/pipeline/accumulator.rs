//! Single-owner accumulator tasks, one per bin plus the null model.
//!
//! Each bin's state is owned by exactly one thread for the whole ingestion
//! phase. Producers reach it only through its bounded mailbox, so no lock
//! ever guards accumulator state even with many concurrent workers routing
//! into the same bin. A task exits its consume loop when its mailbox
//! disconnects and hands the finalized state back through its join handle.

use crossbeam_channel::bounded;
use std::thread::{self, JoinHandle};

use crate::errors::{FlibError, Result};
use crate::seq::frequency::{FrequencyProfile, NullModel};
use crate::seq::msa::Msa;
use crate::seq::Sequence;

use super::router::BinRouter;

/// Capacity of the null model's mailbox. Whole chain sequences arrive at a
/// much lower rate than window slices, so a moderate buffer suffices.
const NULL_MAILBOX_CAPACITY: usize = 100;

/// Per-bin aggregation state fed by routed sequence slices.
pub trait SliceAccumulator: Send + 'static {
    /// Consumes one slice. Called only from the owning accumulator task.
    fn accept(&mut self, slice: Sequence);
}

impl SliceAccumulator for FrequencyProfile {
    fn accept(&mut self, slice: Sequence) {
        self.add(&slice);
    }
}

impl SliceAccumulator for Msa {
    fn accept(&mut self, slice: Sequence) {
        self.push(slice);
    }
}

/// The running accumulator tasks for one pipeline instance.
pub struct AccumulatorSet<A> {
    handles: Vec<JoinHandle<A>>,
    null_handle: Option<JoinHandle<NullModel>>,
}

impl<A: SliceAccumulator> AccumulatorSet<A> {
    /// Number of bin accumulators.
    #[must_use]
    pub fn bin_count(&self) -> usize {
        self.handles.len()
    }

    /// Waits for every accumulator task to finalize and collects the per-bin
    /// states in bin order.
    ///
    /// Blocks until each task has observed its mailbox closure, so callers
    /// must close the mailboxes first.
    ///
    /// # Errors
    /// Returns [`FlibError::ProtocolViolation`] if an accumulator task
    /// panicked.
    pub(crate) fn join(self) -> Result<(Vec<A>, Option<NullModel>)> {
        let mut states = Vec::with_capacity(self.handles.len());
        for (bin, handle) in self.handles.into_iter().enumerate() {
            states.push(handle.join().map_err(|_| {
                FlibError::ProtocolViolation(format!("accumulator task for bin {bin} panicked"))
            })?);
        }
        let null = match self.null_handle {
            Some(handle) => Some(handle.join().map_err(|_| {
                FlibError::ProtocolViolation("null model accumulator task panicked".to_string())
            })?),
            None => None,
        };
        Ok((states, null))
    }
}

/// Spawns one accumulator task per bin, plus the null model task when
/// requested, and returns the router that producers use to reach them.
pub(crate) fn spawn<A, F>(
    bins: usize,
    fragment_size: usize,
    mailbox_capacity: usize,
    with_null_model: bool,
    new_accumulator: F,
) -> (BinRouter, AccumulatorSet<A>)
where
    A: SliceAccumulator,
    F: Fn(usize, usize) -> A,
{
    let mut senders = Vec::with_capacity(bins);
    let mut handles = Vec::with_capacity(bins);
    for bin in 0..bins {
        let (tx, rx) = bounded::<Sequence>(mailbox_capacity);
        let mut state = new_accumulator(bin, fragment_size);
        handles.push(thread::spawn(move || {
            while let Ok(slice) = rx.recv() {
                state.accept(slice);
            }
            state
        }));
        senders.push(tx);
    }

    let (null_sender, null_handle) = if with_null_model {
        let (tx, rx) = bounded::<Sequence>(NULL_MAILBOX_CAPACITY);
        let handle = thread::spawn(move || {
            let mut model = NullModel::new();
            while let Ok(sequence) = rx.recv() {
                model.add_sequence(&sequence);
            }
            model
        });
        (Some(tx), Some(handle))
    } else {
        (None, None)
    };

    (BinRouter::new(null_sender, senders), AccumulatorSet { handles, null_handle })
}
