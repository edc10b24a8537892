//! Formatting helpers for log output.

use std::time::{Duration, Instant};

/// Formats a count with thousands separators.
///
/// # Example
/// ```
/// use flib_lib::logging::format_count;
///
/// assert_eq!(format_count(1234567), "1,234,567");
/// assert_eq!(format_count(42), "42");
/// ```
#[must_use]
pub fn format_count(count: u64) -> String {
    let digits = count.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// Formats a duration in human-readable form, e.g. "45s" or "2m 15s".
#[must_use]
pub fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs();
    if secs < 60 {
        format!("{secs}s")
    } else if secs < 3600 {
        let mins = secs / 60;
        let rest = secs % 60;
        if rest == 0 { format!("{mins}m") } else { format!("{mins}m {rest}s") }
    } else {
        let hours = secs / 3600;
        let mins = (secs % 3600) / 60;
        if mins == 0 { format!("{hours}h") } else { format!("{hours}h {mins}m") }
    }
}

/// Operation timing helper: logs on creation, and logs the elapsed time
/// with a throughput figure on completion.
///
/// # Example
/// ```no_run
/// use flib_lib::logging::OperationTimer;
///
/// let timer = OperationTimer::new("Building sequence profile library");
/// // ... work ...
/// timer.log_completion("entries", 1_500);
/// ```
pub struct OperationTimer {
    operation: String,
    start: Instant,
}

impl OperationTimer {
    /// Starts timing and logs the operation name.
    #[must_use]
    pub fn new(operation: &str) -> Self {
        log::info!("{operation} ...");
        Self { operation: operation.to_string(), start: Instant::now() }
    }

    /// Logs completion with an item count and rate.
    pub fn log_completion(&self, unit: &str, count: u64) {
        let elapsed = self.start.elapsed();
        let secs = elapsed.as_secs_f64();
        let rate = if secs > 0.001 { count as f64 / secs } else { count as f64 };
        log::info!(
            "{} completed: {} {unit} in {} ({:.0} {unit}/s)",
            self.operation,
            format_count(count),
            format_duration(elapsed),
            rate
        );
    }
}
