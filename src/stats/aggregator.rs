//! Running totals across both direction pipelines.

use crate::classifier::Observation;
use crate::domain::{ClassificationCounts, Stats};

/// Accumulates frame and opcode totals.
///
/// The opcode counts are only recomputed when a classifier reports a
/// structural change; the frame counter moves on every packet.
#[derive(Debug, Default)]
pub struct StatsAggregator {
    stats: Stats,
}

impl StatsAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Account for one decoded packet.
    ///
    /// `counts` is only evaluated for `Observation::ClassificationChanged`
    /// and must return the totals over both directions.
    pub fn record<F>(&mut self, observation: Observation, counts: F) -> Stats
    where
        F: FnOnce() -> ClassificationCounts,
    {
        self.stats.frames_processed += 1;

        if observation.is_change() {
            let counts = counts();
            self.stats.unique_opcodes = counts.fixed + counts.variable;
            self.stats.variable_opcodes = counts.variable;
        }

        self.stats
    }

    pub fn stats(&self) -> Stats {
        self.stats
    }

    pub fn reset(&mut self) {
        self.stats = Stats::default();
    }
}
