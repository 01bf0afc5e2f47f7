//! Visit statistics
//!
//! Turns a code's visit log into the rolling day/week/total windows
//! reported by the stats endpoint.

pub mod aggregator;

pub use aggregator::StatsAggregator;
