//! Delivery of classified sequence slices to per-bin mailboxes.

use crossbeam_channel::Sender;

use crate::errors::{FlibError, Result};
use crate::seq::Sequence;

/// Routes each classified slice to the mailbox owned by its bin's
/// accumulator, and whole chain sequences to the null model's mailbox.
///
/// Every worker holds a clone; a send blocks the producing worker while the
/// destination mailbox is full, which is how accumulator backpressure
/// reaches the producers. The mailboxes close when the last clone and the
/// coordinator's original are dropped, so a successful send can never race
/// with closure. A send that does observe a closed mailbox is reported as a
/// protocol violation rather than dropped.
#[derive(Clone)]
pub struct BinRouter {
    // Declared before the bins so closure runs null-first on drop.
    null: Option<Sender<Sequence>>,
    bins: Vec<Sender<Sequence>>,
}

impl BinRouter {
    pub(crate) fn new(null: Option<Sender<Sequence>>, bins: Vec<Sender<Sequence>>) -> Self {
        Self { null, bins }
    }

    /// Number of bin mailboxes.
    #[must_use]
    pub fn bin_count(&self) -> usize {
        self.bins.len()
    }

    /// True if a null model accumulator is attached.
    #[must_use]
    pub fn has_null_model(&self) -> bool {
        self.null.is_some()
    }

    /// Delivers a slice to its bin, blocking until the accumulator is ready
    /// to receive.
    ///
    /// # Errors
    /// Returns [`FlibError::OracleContractViolation`] for an out-of-range
    /// bin and [`FlibError::ProtocolViolation`] when the mailbox has already
    /// been closed. Both are fatal to the run.
    pub fn route(&self, bin: usize, slice: Sequence) -> Result<()> {
        let mailbox = self.bins.get(bin).ok_or(FlibError::OracleContractViolation {
            bin,
            bins: self.bins.len(),
        })?;
        mailbox.send(slice).map_err(|_| {
            FlibError::ProtocolViolation(format!("slice routed to bin {bin} after mailbox closure"))
        })
    }

    /// Delivers a whole chain sequence to the null model, if one is
    /// attached; a no-op otherwise.
    ///
    /// # Errors
    /// Returns [`FlibError::ProtocolViolation`] when the null mailbox has
    /// already been closed.
    pub fn send_null(&self, sequence: Sequence) -> Result<()> {
        match &self.null {
            Some(mailbox) => mailbox.send(sequence).map_err(|_| {
                FlibError::ProtocolViolation(
                    "sequence sent to the null model after mailbox closure".to_string(),
                )
            }),
            None => Ok(()),
        }
    }
}
