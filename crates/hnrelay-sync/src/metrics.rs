//! Per-cycle reports and accumulated metrics

use std::time::Duration;

/// What happened to one candidate during a poll cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemOutcome {
    /// First message sent and tracked
    Created,
    /// Tracked message edited
    Updated,
    /// Untracked and rejected by the filter
    Excluded,
    /// Source no longer knows the item
    Missing,
    /// Fetch, sink or store failure; retried next cycle
    Failed,
}

/// What happened to one expired item during a cleanup cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    /// Message deleted and record removed
    Deleted,
    /// Message was already gone; record removed
    AlreadyGone,
    /// Delete or store failure; record kept
    Failed,
}

/// Result of one poll cycle
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PollReport {
    /// Ids returned by the source
    pub candidates: usize,
    /// Items sent for the first time
    pub created: usize,
    /// Tracked items edited
    pub updated: usize,
    /// Untracked items rejected by the filter
    pub excluded: usize,
    /// Items the source could not find
    pub missing: usize,
    /// Items whose processing failed
    pub failed: usize,
    /// Wall time of the cycle
    pub elapsed: Duration,
}

impl PollReport {
    /// Count one item outcome
    pub fn record(&mut self, outcome: ItemOutcome) {
        match outcome {
            ItemOutcome::Created => self.created += 1,
            ItemOutcome::Updated => self.updated += 1,
            ItemOutcome::Excluded => self.excluded += 1,
            ItemOutcome::Missing => self.missing += 1,
            ItemOutcome::Failed => self.failed += 1,
        }
    }
}

/// Result of one cleanup cycle
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SweepReport {
    /// Records past the retention window
    pub expired: usize,
    /// Messages deleted
    pub deleted: usize,
    /// Messages that were already gone
    pub already_gone: usize,
    /// Deletes that failed and stay tracked
    pub failed: usize,
    /// Wall time of the cycle
    pub elapsed: Duration,
}

impl SweepReport {
    /// Count one delete outcome
    pub fn record(&mut self, outcome: DeleteOutcome) {
        match outcome {
            DeleteOutcome::Deleted => self.deleted += 1,
            DeleteOutcome::AlreadyGone => self.already_gone += 1,
            DeleteOutcome::Failed => self.failed += 1,
        }
    }

    /// Records removed from the store
    pub fn removed(&self) -> usize {
        self.deleted + self.already_gone
    }
}

/// Metrics accumulated across cycles
#[derive(Debug, Clone, Default)]
pub struct SyncMetrics {
    /// Poll cycles completed
    pub poll_cycles: usize,
    /// Poll cycles aborted before fan-out
    pub poll_errors: usize,
    /// Cleanup cycles completed
    pub cleanup_cycles: usize,
    /// Cleanup cycles aborted before fan-out
    pub cleanup_errors: usize,
    /// Totals over all poll reports
    pub polls: PollReport,
    /// Totals over all sweep reports
    pub sweeps: SweepReport,
}

impl SyncMetrics {
    /// Create new empty metrics
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold in a finished poll cycle
    pub fn record_poll(&mut self, report: &PollReport) {
        self.poll_cycles += 1;
        self.polls.candidates += report.candidates;
        self.polls.created += report.created;
        self.polls.updated += report.updated;
        self.polls.excluded += report.excluded;
        self.polls.missing += report.missing;
        self.polls.failed += report.failed;
        self.polls.elapsed += report.elapsed;
    }

    /// Fold in a finished cleanup cycle
    pub fn record_sweep(&mut self, report: &SweepReport) {
        self.cleanup_cycles += 1;
        self.sweeps.expired += report.expired;
        self.sweeps.deleted += report.deleted;
        self.sweeps.already_gone += report.already_gone;
        self.sweeps.failed += report.failed;
        self.sweeps.elapsed += report.elapsed;
    }

    /// Count a poll cycle that failed before any item was processed
    pub fn record_poll_error(&mut self) {
        self.poll_errors += 1;
    }

    /// Count a cleanup cycle that failed before any item was processed
    pub fn record_cleanup_error(&mut self) {
        self.cleanup_errors += 1;
    }

    /// Reset all metrics
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Generate a summary report of metrics
    pub fn summary(&self) -> String {
        let lines = [
            "Sync Metrics Summary".to_string(),
            "====================".to_string(),
            format!(
                "Poll cycles: {} ({} aborted), {:.1}s total",
                self.poll_cycles,
                self.poll_errors,
                self.polls.elapsed.as_secs_f64()
            ),
            format!("  Created: {}", self.polls.created),
            format!("  Updated: {}", self.polls.updated),
            format!("  Excluded: {}", self.polls.excluded),
            format!("  Missing: {}", self.polls.missing),
            format!("  Failed: {}", self.polls.failed),
            format!(
                "Cleanup cycles: {} ({} aborted), {:.1}s total",
                self.cleanup_cycles,
                self.cleanup_errors,
                self.sweeps.elapsed.as_secs_f64()
            ),
            format!("  Deleted: {}", self.sweeps.deleted),
            format!("  Already gone: {}", self.sweeps.already_gone),
            format!("  Failed: {}", self.sweeps.failed),
        ];

        lines.join("\n")
    }
}
