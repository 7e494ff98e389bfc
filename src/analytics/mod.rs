// src/analytics/mod.rs
//! Batch statistics for summaries, the index page and the status snapshot.

use crate::model::{LessonOutcome, OutcomeStatus};
use serde::Serialize;

/// Count of lessons per status label.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BatchStats {
    pub total: usize,
    pub completed: usize,
    pub failed: usize,
    pub throttled: usize,
    pub timeout: usize,
    pub rejected: usize,
}

impl BatchStats {
    /// Tallies the outcomes of a batch.
    pub fn measure<'a>(outcomes: impl IntoIterator<Item = &'a LessonOutcome>) -> Self {
        outcomes
            .into_iter()
            .fold(Self::default(), |stats, outcome| stats.record(outcome.status))
    }

    fn record(mut self, status: OutcomeStatus) -> Self {
        self.total += 1;
        match status {
            OutcomeStatus::Completed => self.completed += 1,
            OutcomeStatus::Failed => self.failed += 1,
            OutcomeStatus::Throttled => self.throttled += 1,
            OutcomeStatus::TimedOut => self.timeout += 1,
            OutcomeStatus::Rejected => self.rejected += 1,
        }
        self
    }

    /// Lessons that did not end with a deck.
    pub fn unsuccessful(&self) -> usize {
        self.total - self.completed
    }

    /// Whether every lesson produced a deck.
    pub fn all_completed(&self) -> bool {
        self.completed == self.total
    }
}

/// Lessons that produced a deck but are missing the export they asked for.
pub fn missing_exports<'a>(
    outcomes: impl IntoIterator<Item = &'a LessonOutcome>,
    export_requested: bool,
) -> usize {
    if !export_requested {
        return 0;
    }
    outcomes
        .into_iter()
        .filter(|o| o.status.is_success() && o.file_url.is_none())
        .count()
}
