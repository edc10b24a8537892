//! Bounded-parallel post-processing of finalized accumulator states.
//!
//! Both flavors run on a dedicated rayon pool sized by the configured
//! parallelism, which is what bounds external resource use when training
//! shells out to a subprocess per bin. Results come back through indexed
//! parallel iterators, so the output vector is ordered by bin number no
//! matter which bin finishes first.

use rayon::prelude::*;

use crate::errors::{FlibError, Result};
use crate::seq::frequency::{FrequencyProfile, NullModel, Profile};
use crate::seq::hmm::Hmm;
use crate::seq::msa::Msa;
use crate::train::ModelTrainer;

/// Turns each bin's count matrix into a negative log-odds profile.
///
/// Purely computational, so the only failure mode is not being able to
/// start the pool.
///
/// # Errors
/// Returns [`FlibError::PostProcessing`] if the worker pool cannot start.
pub fn build_profiles(
    bins: &[FrequencyProfile],
    null: Option<&NullModel>,
    parallelism: usize,
) -> Result<Vec<Profile>> {
    let pool = thread_pool(parallelism)?;
    Ok(pool.install(|| bins.par_iter().map(|counts| counts.to_profile(null)).collect()))
}

/// Trains one model per bin with the injected trainer, at most
/// `parallelism` invocations in flight at once.
///
/// # Errors
/// Any single bin's training failure aborts the whole stage; there is no
/// partial-output mode.
pub fn train_models(
    bins: &[Msa],
    trainer: &dyn ModelTrainer,
    parallelism: usize,
) -> Result<Vec<Hmm>> {
    let pool = thread_pool(parallelism)?;
    pool.install(|| {
        bins.par_iter().enumerate().map(|(bin, msa)| trainer.train(bin, msa)).collect()
    })
}

fn thread_pool(parallelism: usize) -> Result<rayon::ThreadPool> {
    rayon::ThreadPoolBuilder::new().num_threads(parallelism.max(1)).build().map_err(|e| {
        FlibError::PostProcessing { detail: format!("could not start post-processing pool: {e}") }
    })
}
