//! Segment analytics for ad event logs — per-segment performance metrics and
//! revenue-per-click advertiser recommendations.

pub mod aggregator;
pub mod pipeline;
pub mod recommendations;

pub use aggregator::MetricsAggregator;
pub use pipeline::{BatchJob, BatchSummary};
pub use recommendations::{RecommendationEngine, MAX_RECOMMENDED_ADVERTISERS};
