//! Segment metrics — impressions, clicks and revenue per (app, country).

use adviser_core::types::{ClickEvent, ImpressionEvent, MetricResult, SegmentKey};
use std::collections::HashMap;
use tracing::debug;
use uuid::Uuid;

struct SegmentTotals {
    key: SegmentKey,
    impressions: u64,
    clicks: u64,
    revenue: f64,
}

pub struct MetricsAggregator;

impl MetricsAggregator {
    /// Produce one result per distinct segment among `impressions`, in order
    /// of first appearance. A click counts toward every segment holding an
    /// impression with its id; clicks with no such impression count nowhere.
    pub fn aggregate(
        impressions: &[ImpressionEvent],
        clicks: &[ClickEvent],
    ) -> Vec<MetricResult> {
        let mut segments: Vec<SegmentTotals> = Vec::new();
        let mut segment_index: HashMap<SegmentKey, usize> = HashMap::new();
        // impression id -> segments containing it, without repeats
        let mut id_segments: HashMap<Uuid, Vec<usize>> = HashMap::with_capacity(impressions.len());

        for impression in impressions {
            let key = impression.segment();
            let idx = match segment_index.get(&key) {
                Some(&idx) => idx,
                None => {
                    let idx = segments.len();
                    segment_index.insert(key.clone(), idx);
                    segments.push(SegmentTotals {
                        key,
                        impressions: 0,
                        clicks: 0,
                        revenue: 0.0,
                    });
                    idx
                }
            };
            segments[idx].impressions += 1;

            let owners = id_segments.entry(impression.id).or_default();
            if !owners.contains(&idx) {
                owners.push(idx);
            }
        }

        let mut unmatched = 0usize;
        for click in clicks {
            match id_segments.get(&click.impression_id) {
                Some(owners) => {
                    for &idx in owners {
                        segments[idx].clicks += 1;
                        segments[idx].revenue += click.revenue;
                    }
                }
                None => unmatched += 1,
            }
        }

        debug!(
            segments = segments.len(),
            unmatched_clicks = unmatched,
            "Segment metrics aggregated"
        );

        segments
            .into_iter()
            .map(|s| MetricResult {
                app_id: s.key.app_id,
                country_code: s.key.country_code,
                impressions: s.impressions,
                clicks: s.clicks,
                revenue: s.revenue,
            })
            .collect()
    }
}
