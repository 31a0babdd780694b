//! Session-wide statistics.

mod aggregator;

pub use aggregator::StatsAggregator;
