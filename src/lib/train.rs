//! External profile HMM training.
//!
//! The numeric model construction is delegated to an external trainer
//! behind the [`ModelTrainer`] trait, so the pipeline's post-processing
//! stage can be exercised in tests with a deterministic stub while
//! production runs shell out to hhsuite's `hhmake`.

use std::fs::{self, File};
use std::io::BufWriter;
use std::path::PathBuf;
use std::process::Command;

use tempfile::TempDir;

use crate::errors::{FlibError, Result};
use crate::seq::hmm::Hmm;
use crate::seq::msa::Msa;

/// Trains one profile HMM from one bin's alignment.
///
/// Implementations may be called from several threads at once; the
/// post-processing stage bounds how many calls are in flight to respect
/// external resource limits such as subprocess concurrency.
pub trait ModelTrainer: Send + Sync {
    /// Trains a model for the given bin.
    ///
    /// # Errors
    /// Any error here is fatal to the whole run; there is no partial-output
    /// mode.
    fn train(&self, bin: usize, msa: &Msa) -> Result<Hmm>;
}

/// Trains profile HMMs by invoking hhsuite's `hhmake` once per bin.
///
/// Each invocation writes the bin's alignment as FASTA into a run-scoped
/// temporary directory, runs the trainer on it, and reads the emitted model
/// back. The directory is removed when the trainer is dropped.
pub struct HhMake {
    executable: PathBuf,
    work_dir: TempDir,
}

impl HhMake {
    /// Creates a trainer using the given `hhmake` executable.
    ///
    /// # Errors
    /// Returns an error if the temporary work directory cannot be created.
    pub fn new(executable: impl Into<PathBuf>) -> Result<Self> {
        let work_dir = TempDir::with_prefix("flib-seq-hmm-").map_err(|e| {
            FlibError::PostProcessing { detail: format!("could not create work directory: {e}") }
        })?;
        Ok(Self { executable: executable.into(), work_dir })
    }

    fn failure(bin: usize, detail: impl std::fmt::Display) -> FlibError {
        FlibError::PostProcessing { detail: format!("bin {bin}: {detail}") }
    }
}

impl ModelTrainer for HhMake {
    fn train(&self, bin: usize, msa: &Msa) -> Result<Hmm> {
        let fasta_path = self.work_dir.path().join(format!("{bin}.fasta"));
        let model_path = self.work_dir.path().join(format!("{bin}.hhm"));

        let fasta = File::create(&fasta_path).map_err(|e| Self::failure(bin, e))?;
        let mut writer = BufWriter::new(fasta);
        msa.write_fasta(&mut writer).map_err(|e| Self::failure(bin, e))?;
        drop(writer);

        let output = Command::new(&self.executable)
            .arg("-i")
            .arg(&fasta_path)
            .arg("-o")
            .arg(&model_path)
            .arg("-v")
            .arg("0")
            .output()
            .map_err(|e| Self::failure(bin, format!("failed to run hhmake: {e}")))?;
        if !output.status.success() {
            return Err(Self::failure(
                bin,
                format!(
                    "hhmake exited with {}: {}",
                    output.status,
                    String::from_utf8_lossy(&output.stderr).trim()
                ),
            ));
        }

        let model = fs::read_to_string(&model_path).map_err(|e| Self::failure(bin, e))?;
        Ok(Hmm::new(msa.columns(), model))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seq::Sequence;

    #[test]
    fn test_missing_executable_is_post_processing_failure() {
        let trainer = HhMake::new("/nonexistent/hhmake").unwrap();
        let mut msa = Msa::new(3);
        msa.push(Sequence::new("s:0-3", b"MKV".to_vec()));

        let err = trainer.train(7, &msa).unwrap_err();
        match err {
            FlibError::PostProcessing { detail } => assert!(detail.starts_with("bin 7")),
            other => panic!("unexpected error: {other}"),
        }
    }
}
