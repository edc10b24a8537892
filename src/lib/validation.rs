//! Input validation utilities.
//!
//! Common checks for command-line parameters and file paths with consistent
//! error messages, using the structured error types from [`crate::errors`].

use std::path::Path;

use crate::errors::{FlibError, Result};

/// Validate that a file exists.
///
/// # Arguments
/// * `path` - Path to validate
/// * `description` - Human-readable description (e.g., "Structure library")
///
/// # Errors
/// Returns an error if the file does not exist.
///
/// # Example
/// ```
/// use flib_lib::validation::validate_file_exists;
///
/// assert!(validate_file_exists("/nonexistent/file.lib", "Structure library").is_err());
/// ```
pub fn validate_file_exists<P: AsRef<Path>>(path: P, description: &str) -> Result<()> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(FlibError::InvalidFileFormat {
            file_type: description.to_string(),
            path: path.display().to_string(),
            reason: "File does not exist".to_string(),
        });
    }
    Ok(())
}

/// Validate that an output destination may be written.
///
/// # Errors
/// Returns [`FlibError::OutputExists`] when the path exists and `overwrite`
/// is false.
///
/// # Example
/// ```
/// use flib_lib::validation::validate_overwritable;
///
/// assert!(validate_overwritable("/nonexistent/out.lib", false).is_ok());
/// ```
pub fn validate_overwritable<P: AsRef<Path>>(path: P, overwrite: bool) -> Result<()> {
    let path = path.as_ref();
    if path.exists() && !overwrite {
        return Err(FlibError::OutputExists { path: path.display().to_string() });
    }
    Ok(())
}

/// Coerce a requested parallelism degree into a usable thread count:
/// `None` means all available processing units, and anything below 1
/// becomes 1.
#[must_use]
pub fn effective_parallelism(requested: Option<usize>) -> usize {
    requested
        .unwrap_or_else(|| std::thread::available_parallelism().map_or(1, |n| n.get()))
        .max(1)
}
