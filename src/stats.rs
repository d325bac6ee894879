use std::sync::atomic::{AtomicU64, Ordering};

/// Counters for everything the soak loop does, including every error path it
/// swallows. Shared between the loop, the heartbeat and the final summary;
/// counting never changes control flow.
#[derive(Default)]
pub struct SoakStats {
    pub passes: AtomicU64,
    pub files_processed: AtomicU64,
    pub packets_read: AtomicU64,
    pub decodes: AtomicU64,
    pub decode_errors: AtomicU64,
    pub open_failures: AtomicU64,
    pub malformed_captures: AtomicU64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatsSnapshot {
    pub passes: u64,
    pub files_processed: u64,
    pub packets_read: u64,
    pub decodes: u64,
    pub decode_errors: u64,
    pub open_failures: u64,
    pub malformed_captures: u64,
}

impl SoakStats {
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            passes: self.passes.load(Ordering::Relaxed),
            files_processed: self.files_processed.load(Ordering::Relaxed),
            packets_read: self.packets_read.load(Ordering::Relaxed),
            decodes: self.decodes.load(Ordering::Relaxed),
            decode_errors: self.decode_errors.load(Ordering::Relaxed),
            open_failures: self.open_failures.load(Ordering::Relaxed),
            malformed_captures: self.malformed_captures.load(Ordering::Relaxed),
        }
    }
}
