//! Progress reporting for the preparation stage.
//!
//! [`ProgressCallback`] keeps the pipeline crates free of any terminal
//! rendering; the CLI plugs in `indicatif` bars, tests and library callers
//! use [`NullProgress`].

use std::sync::Arc;

/// Receives progress updates while records are processed.
pub trait ProgressCallback: Send + Sync {
    /// Set the total number of records (enables percentage/ETA).
    fn set_total(&self, total: u64);

    /// Advance by `delta` records.
    fn inc(&self, delta: u64);

    /// Replace the message shown next to the indicator.
    fn set_message(&self, msg: String);

    /// Mark the work as complete with a final message.
    fn finish(&self, msg: String);
}

/// Discards every update.
pub struct NullProgress;

impl ProgressCallback for NullProgress {
    fn set_total(&self, _total: u64) {}
    fn inc(&self, _delta: u64) {}
    fn set_message(&self, _msg: String) {}
    fn finish(&self, _msg: String) {}
}

/// Returns a shared [`NullProgress`] instance.
#[must_use]
pub fn null_progress() -> Arc<dyn ProgressCallback> {
    Arc::new(NullProgress)
}
