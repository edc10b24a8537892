//! Custom error types for flib operations.

use thiserror::Error;

/// Result type alias for flib operations
pub type Result<T> = std::result::Result<T, FlibError>;

/// Error type for flib operations
#[derive(Error, Debug)]
pub enum FlibError {
    /// Invalid parameter value provided
    #[error("Invalid parameter '{parameter}': {reason}")]
    InvalidParameter {
        /// The parameter name
        parameter: String,
        /// Explanation of why it's invalid
        reason: String,
    },

    /// Parse or I/O failure on one input entry
    #[error("Failed to read entry '{path}': {reason}")]
    EntryRead {
        /// Path to the entry file
        path: String,
        /// Explanation of the failure
        reason: String,
    },

    /// File format error
    #[error("Invalid {file_type} file '{path}': {reason}")]
    InvalidFileFormat {
        /// Type of file (e.g., "library", "PDB")
        file_type: String,
        /// Path to the file
        path: String,
        /// Explanation of the problem
        reason: String,
    },

    /// Output destination already exists and overwriting was not requested
    #[error("Output path '{path}' already exists (pass --overwrite to replace it)")]
    OutputExists {
        /// The output path
        path: String,
    },

    /// The classification oracle produced an index outside the library
    #[error("Classification returned bin {bin} outside the library's {bins} bins")]
    OracleContractViolation {
        /// The offending bin index
        bin: usize,
        /// Number of bins in the library
        bins: usize,
    },

    /// A bin's profile construction or model training failed
    #[error("Post-processing failed: {detail}")]
    PostProcessing {
        /// What failed and for which bin
        detail: String,
    },

    /// The two-phase shutdown sequencing was violated
    #[error("Pipeline protocol violation: {0}")]
    ProtocolViolation(String),
}
