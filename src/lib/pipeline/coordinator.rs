//! Two-phase shutdown sequencing for the ingestion pipeline.
//!
//! The coordinator owns the router's original senders and the accumulator
//! join handles, and walks an explicit state machine:
//!
//! ```text
//! Ingesting ──drain()──> Draining ──finish()──> Done
//! ```
//!
//! `drain` may only run after the worker barrier: once every producer clone
//! of the router has been dropped, dropping the originals is the single
//! signal that closes each mailbox. `finish` then waits on the second
//! barrier, joining every accumulator task as it finalizes. Calling either
//! method out of order is a protocol violation, never a silent no-op.

use crate::errors::{FlibError, Result};
use crate::seq::frequency::NullModel;

use super::accumulator::{AccumulatorSet, SliceAccumulator};
use super::router::BinRouter;

/// Lifecycle phase of one pipeline run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Workers are producing; accumulators are consuming.
    Ingesting,
    /// Mailboxes are closed; accumulators are finalizing.
    Draining,
    /// Every accumulator has finalized and handed back its state.
    Done,
}

/// Sequences ingestion completion before accumulator finalization.
pub struct ShutdownCoordinator<A> {
    phase: Phase,
    router: Option<BinRouter>,
    accumulators: Option<AccumulatorSet<A>>,
}

impl<A: SliceAccumulator> ShutdownCoordinator<A> {
    pub(crate) fn new(router: BinRouter, accumulators: AccumulatorSet<A>) -> Self {
        Self { phase: Phase::Ingesting, router: Some(router), accumulators: Some(accumulators) }
    }

    /// The current phase.
    #[must_use]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// The router producers clone from. Available only while ingesting.
    ///
    /// # Errors
    /// Returns [`FlibError::ProtocolViolation`] once draining has begun.
    pub fn router(&self) -> Result<&BinRouter> {
        self.router.as_ref().ok_or_else(|| {
            FlibError::ProtocolViolation("router requested after draining began".to_string())
        })
    }

    /// Closes every mailbox: the null model's first, then each bin's in
    /// index order.
    ///
    /// Callers must have joined every producer first; closing a mailbox
    /// while a worker might still route into it would fault that worker's
    /// next send.
    ///
    /// # Errors
    /// Returns [`FlibError::ProtocolViolation`] unless the pipeline is
    /// ingesting.
    pub fn drain(&mut self) -> Result<()> {
        if self.phase != Phase::Ingesting {
            return Err(FlibError::ProtocolViolation(format!(
                "drain requested in phase {:?}",
                self.phase
            )));
        }
        // Sender drop order inside the router closes null-first.
        drop(self.router.take());
        self.phase = Phase::Draining;
        Ok(())
    }

    /// Waits for every accumulator to finalize and returns the per-bin
    /// states in bin order, plus the null model when one was attached.
    ///
    /// # Errors
    /// Returns [`FlibError::ProtocolViolation`] unless draining has begun,
    /// or if an accumulator task panicked.
    pub fn finish(&mut self) -> Result<(Vec<A>, Option<NullModel>)> {
        if self.phase != Phase::Draining {
            return Err(FlibError::ProtocolViolation(format!(
                "finish requested in phase {:?}",
                self.phase
            )));
        }
        let accumulators = self.accumulators.take().ok_or_else(|| {
            FlibError::ProtocolViolation("accumulators already collected".to_string())
        })?;
        let result = accumulators.join()?;
        self.phase = Phase::Done;
        Ok(result)
    }
}
