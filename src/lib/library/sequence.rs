//! Sequence fragment libraries, the output of the build commands.
//!
//! Both kinds enforce the shape contract at construction: the entry list is
//! indexed by bin and every entry spans exactly the fragment size, so a
//! library built from a structure library always mirrors its shape.

use serde::{Deserialize, Serialize};

use crate::errors::{FlibError, Result};
use crate::seq::frequency::Profile;
use crate::seq::hmm::Hmm;

/// A sequence fragment library of negative log-odds profiles.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeqProfileLibrary {
    name: String,
    fragment_size: usize,
    profiles: Vec<Profile>,
}

impl SeqProfileLibrary {
    /// Creates a profile library, checking every profile's column count.
    ///
    /// # Errors
    /// Returns [`FlibError::PostProcessing`] if a profile does not span the
    /// fragment size.
    pub fn new(name: impl Into<String>, fragment_size: usize, profiles: Vec<Profile>) -> Result<Self> {
        for (bin, profile) in profiles.iter().enumerate() {
            if profile.len() != fragment_size {
                return Err(FlibError::PostProcessing {
                    detail: format!(
                        "bin {bin}: profile spans {} columns, expected {fragment_size}",
                        profile.len()
                    ),
                });
            }
        }
        Ok(Self { name: name.into(), fragment_size, profiles })
    }

    /// The library's name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of bins.
    #[must_use]
    pub fn size(&self) -> usize {
        self.profiles.len()
    }

    /// Fragment size in residues.
    #[must_use]
    pub fn fragment_size(&self) -> usize {
        self.fragment_size
    }

    /// The profiles, indexed by bin.
    #[must_use]
    pub fn profiles(&self) -> &[Profile] {
        &self.profiles
    }
}

/// A sequence fragment library of trained profile HMMs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeqHmmLibrary {
    name: String,
    fragment_size: usize,
    hmms: Vec<Hmm>,
}

impl SeqHmmLibrary {
    /// Creates an HMM library, checking every model's column count.
    ///
    /// # Errors
    /// Returns [`FlibError::PostProcessing`] if a model does not span the
    /// fragment size.
    pub fn new(name: impl Into<String>, fragment_size: usize, hmms: Vec<Hmm>) -> Result<Self> {
        for (bin, hmm) in hmms.iter().enumerate() {
            if hmm.columns != fragment_size {
                return Err(FlibError::PostProcessing {
                    detail: format!(
                        "bin {bin}: model spans {} columns, expected {fragment_size}",
                        hmm.columns
                    ),
                });
            }
        }
        Ok(Self { name: name.into(), fragment_size, hmms })
    }

    /// The library's name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of bins.
    #[must_use]
    pub fn size(&self) -> usize {
        self.hmms.len()
    }

    /// Fragment size in residues.
    #[must_use]
    pub fn fragment_size(&self) -> usize {
        self.fragment_size
    }

    /// The trained models, indexed by bin.
    #[must_use]
    pub fn hmms(&self) -> &[Hmm] {
        &self.hmms
    }
}
