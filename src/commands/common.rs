//! Common CLI options shared across commands.
//!
//! This module provides shared argument structures that are composed into
//! command structs using `#[command(flatten)]`.

use std::path::PathBuf;

use clap::Args;
use log::LevelFilter;

use flib_lib::validation::effective_parallelism;

/// Options common to the library-building commands.
#[derive(Debug, Clone, Default, Args)]
pub struct BuildOptions {
    /// Overwrite the output library if it already exists
    #[arg(long = "overwrite")]
    pub overwrite: bool,

    /// Number of worker threads (defaults to all available processing units)
    #[arg(long = "cpu", value_name = "N")]
    pub cpu: Option<usize>,

    /// Suppress progress output
    #[arg(long = "quiet")]
    pub quiet: bool,

    /// Optional TSV file for ingestion statistics
    #[arg(long = "stats", value_name = "FILE")]
    pub stats: Option<PathBuf>,
}

impl BuildOptions {
    /// The worker pool size after defaulting and coercion to at least 1.
    #[must_use]
    pub fn threads(&self) -> usize {
        effective_parallelism(self.cpu)
    }

    /// Caps logging at warnings when `--quiet` was passed. The cap applies
    /// on top of whatever filter the logger was initialized with.
    pub fn apply_verbosity(&self) {
        if self.quiet {
            log::set_max_level(LevelFilter::Warn);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_threads_coercion() {
        let options = BuildOptions { cpu: Some(0), ..Default::default() };
        assert_eq!(options.threads(), 1);

        let options = BuildOptions { cpu: Some(6), ..Default::default() };
        assert_eq!(options.threads(), 6);

        let options = BuildOptions::default();
        assert!(options.threads() >= 1);
    }
}
