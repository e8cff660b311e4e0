//! Progress reporting for batch runs.
//!
//! The orchestrator reports through a [`ProgressSink`] handed in at
//! construction rather than printing directly, so the CLI, tests and any
//! embedding code choose their own presentation. One report is emitted after
//! every image, success or skip.

use std::io::Write;

pub trait ProgressSink {
    /// Report state after one image: `current` of `total` are done,
    /// `elapsed_secs` since the batch started, `suffix` names the image or
    /// the skip reason.
    fn report(&mut self, label: &str, elapsed_secs: f64, current: usize, total: usize, suffix: &str);
}

/// Single-line console bar, redrawn in place on stderr.
pub struct ConsoleProgress {
    width: usize,
}

impl Default for ConsoleProgress {
    fn default() -> Self {
        Self { width: 30 }
    }
}

impl ProgressSink for ConsoleProgress {
    fn report(&mut self, label: &str, elapsed_secs: f64, current: usize, total: usize, suffix: &str) {
        let filled = if total == 0 {
            self.width
        } else {
            self.width * current / total
        };
        // Trailing spaces wipe leftovers from a longer previous suffix
        eprint!(
            "\r{label} [{}{}] {current}/{total} ({elapsed_secs:.0}s) {suffix}    ",
            "#".repeat(filled),
            ".".repeat(self.width - filled),
        );
        if current == total {
            eprintln!();
        }
        let _ = std::io::stderr().flush();
    }
}

/// Sink that discards everything.
#[derive(Default)]
pub struct SilentProgress;

impl ProgressSink for SilentProgress {
    fn report(&mut self, _: &str, _: f64, _: usize, _: usize, _: &str) {}
}
