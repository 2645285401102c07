use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// One ad impression served inside an application.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImpressionEvent {
    pub id: Uuid,
    pub app_id: i32,
    pub country_code: String,
    pub advertiser_id: i32,
}

impl ImpressionEvent {
    pub fn segment(&self) -> SegmentKey {
        SegmentKey::new(self.app_id, self.country_code.clone())
    }
}

/// A click attributed to an impression. The impression may not exist in the
/// impression log, in which case the click is ignored by every aggregate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClickEvent {
    pub impression_id: Uuid,
    pub revenue: f64,
}

/// Grouping key for all aggregation: (application, country).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SegmentKey {
    pub app_id: i32,
    pub country_code: String,
}

impl SegmentKey {
    pub fn new(app_id: i32, country_code: impl Into<String>) -> Self {
        Self {
            app_id,
            country_code: country_code.into(),
        }
    }
}

impl fmt::Display for SegmentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.app_id, self.country_code)
    }
}

/// Aggregated performance of one segment, written to `metrics.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricResult {
    pub app_id: i32,
    pub country_code: String,
    pub impressions: u64,
    pub clicks: u64,
    pub revenue: f64,
}

impl MetricResult {
    pub fn segment(&self) -> SegmentKey {
        SegmentKey::new(self.app_id, self.country_code.clone())
    }
}

/// Ranked advertisers for one segment, written to `recommendations.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendationResult {
    pub app_id: i32,
    pub country_code: String,
    pub recommended_advertiser_ids: Vec<i32>,
}

/// Score of a single advertiser inside a segment. The score is the
/// advertiser's revenue divided by the segment's total click count, so scores
/// within a segment sum to the segment's revenue per click.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AdvertiserScore {
    pub advertiser_id: i32,
    pub revenue: f64,
    pub score: f64,
}
