//! Entry-level progress tracking.
//!
//! Workers report each finished entry to a shared tracker, which logs a
//! line whenever the completed count crosses an interval boundary. The
//! tracker is the one mutable value shared across the whole worker pool, so
//! it keeps its counts in atomics rather than behind a lock.

use log::info;
use std::sync::atomic::{AtomicU64, Ordering};

/// Thread-safe tracker for completed and failed entries.
///
/// # Example
/// ```
/// use flib_lib::progress::ProgressTracker;
///
/// let tracker = ProgressTracker::new("Processed entries", 200).with_interval(2);
/// tracker.entry_done(true);
/// tracker.entry_done(false); // logs "Processed entries 2/200 (1 failed)"
/// tracker.log_final();
/// assert_eq!(tracker.completed(), 2);
/// assert_eq!(tracker.failed(), 1);
/// ```
pub struct ProgressTracker {
    message: String,
    total: u64,
    interval: u64,
    completed: AtomicU64,
    failed: AtomicU64,
}

impl ProgressTracker {
    /// Default number of entries between progress lines.
    pub const DEFAULT_INTERVAL: u64 = 100;

    /// Creates a tracker expecting `total` entries.
    #[must_use]
    pub fn new(message: impl Into<String>, total: u64) -> Self {
        Self {
            message: message.into(),
            total,
            interval: Self::DEFAULT_INTERVAL,
            completed: AtomicU64::new(0),
            failed: AtomicU64::new(0),
        }
    }

    /// Sets the logging interval (minimum 1).
    #[must_use]
    pub fn with_interval(mut self, interval: u64) -> Self {
        self.interval = interval.max(1);
        self
    }

    /// Records one finished entry and logs when an interval boundary is
    /// crossed. Safe to call from any worker thread.
    pub fn entry_done(&self, ok: bool) {
        if !ok {
            self.failed.fetch_add(1, Ordering::Relaxed);
        }
        let done = self.completed.fetch_add(1, Ordering::Relaxed) + 1;
        if done % self.interval == 0 {
            self.log_line(done);
        }
    }

    /// Logs the final count unless the last `entry_done` already did.
    pub fn log_final(&self) {
        let done = self.completed.load(Ordering::Relaxed);
        if done > 0 && done % self.interval != 0 {
            self.log_line(done);
        }
    }

    /// Entries finished so far, including failures.
    #[must_use]
    pub fn completed(&self) -> u64 {
        self.completed.load(Ordering::Relaxed)
    }

    /// Entries that failed to parse.
    #[must_use]
    pub fn failed(&self) -> u64 {
        self.failed.load(Ordering::Relaxed)
    }

    fn log_line(&self, done: u64) {
        let failed = self.failed.load(Ordering::Relaxed);
        if failed == 0 {
            info!("{} {}/{}", self.message, done, self.total);
        } else {
            info!("{} {}/{} ({} failed)", self.message, done, self.total, failed);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts() {
        let tracker = ProgressTracker::new("Entries", 10);
        tracker.entry_done(true);
        tracker.entry_done(false);
        tracker.entry_done(true);
        assert_eq!(tracker.completed(), 3);
        assert_eq!(tracker.failed(), 1);
    }

    #[test]
    fn test_interval_floor() {
        let tracker = ProgressTracker::new("Entries", 10).with_interval(0);
        tracker.entry_done(true);
        assert_eq!(tracker.completed(), 1);
    }

    #[test]
    fn test_log_final_without_entries() {
        let tracker = ProgressTracker::new("Entries", 0);
        tracker.log_final();
        assert_eq!(tracker.completed(), 0);
    }

    #[test]
    fn test_thread_safety() {
        use std::sync::Arc;
        use std::thread;

        let tracker = Arc::new(ProgressTracker::new("Entries", 800).with_interval(50));
        let mut handles = Vec::new();
        for _ in 0..8 {
            let tracker = Arc::clone(&tracker);
            handles.push(thread::spawn(move || {
                for i in 0..100 {
                    tracker.entry_done(i % 10 != 0);
                }
            }));
        }
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(tracker.completed(), 800);
        assert_eq!(tracker.failed(), 80);
    }
}
