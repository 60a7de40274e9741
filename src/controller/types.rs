//! Types describing the monitor loop's progress.

/// Phase of the monitor loop. The loop cycles through these forever:
/// `Idle → Polling → Parsing → Reconciling → Evicting → Sleeping → Idle`.
///
/// A failed poll jumps straight from `Polling` to `Sleeping`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonitorState {
    Idle,
    Polling,
    Parsing,
    Reconciling,
    Evicting,
    Sleeping,
}

/// Outcome of a single cycle.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CycleReport {
    /// The enumerator could not produce a listing; nothing else ran.
    pub enumerator_failed: bool,
    /// Established records parsed, duplicates included.
    pub observed: usize,
    /// Distinct identities among the observed records.
    pub unique: usize,
    /// Established lines skipped as malformed.
    pub skipped_lines: usize,
    /// Registry size after reconciliation.
    pub tracked: usize,
    /// Connections over the age limit.
    pub expired: usize,
    /// Expired connections the terminator reported as severed.
    pub evicted: usize,
    /// Expired connections the terminator failed to sever.
    pub failed_terminations: usize,
}

/// Counters accumulated over the lifetime of the monitor.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct MonitorStats {
    pub cycles: u64,
    pub failed_cycles: u64,
    pub evictions: u64,
    pub failed_terminations: u64,
    pub skipped_lines: u64,
}

impl MonitorStats {
    pub fn record(&mut self, report: &CycleReport) {
        self.cycles += 1;
        if report.enumerator_failed {
            self.failed_cycles += 1;
        }
        self.evictions += report.evicted as u64;
        self.failed_terminations += report.failed_terminations as u64;
        self.skipped_lines += report.skipped_lines as u64;
    }
}
