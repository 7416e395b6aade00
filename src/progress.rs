//! Progress reporting
//!
//! Operations report an integer percentage through a [`ProgressSink`]. Reporting is
//! fire-and-forget: the sink never acknowledges and intermediate values may be
//! overwritten before anyone observes them.

use tokio::sync::watch;

/// One-way progress channel from an operation to its caller
pub trait ProgressSink: Send + Sync {
    /// Reports the current completion percentage (0-100)
    fn report(&self, percent: u8);
}

impl<F> ProgressSink for F
where
    F: Fn(u8) + Send + Sync,
{
    fn report(&self, percent: u8) {
        self(percent.min(100))
    }
}

/// Only the latest value is kept
impl ProgressSink for watch::Sender<u8> {
    fn report(&self, percent: u8) {
        self.send_replace(percent.min(100));
    }
}

/// Sink that discards every update
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn report(&self, _percent: u8) {}
}

/// Computes `done / total` as an integer percentage, saturating at 100
///
/// An empty batch counts as complete.
pub fn percent_of(done: usize, total: usize) -> u8 {
    if total == 0 {
        return 100;
    }
    ((done.min(total) * 100) / total) as u8
}
