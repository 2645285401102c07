//! Advertiser recommendations — ranks advertisers inside each segment by the
//! share of the segment's revenue per click they account for.

use adviser_core::types::{
    AdvertiserScore, ClickEvent, ImpressionEvent, MetricResult, RecommendationResult, SegmentKey,
};
use std::collections::HashMap;
use tracing::debug;
use uuid::Uuid;

/// Upper bound on advertisers recommended per segment.
pub const MAX_RECOMMENDED_ADVERTISERS: usize = 5;

/// A click joined to the impression it was attributed to.
#[derive(Debug, Clone, PartialEq)]
pub struct JoinedClick {
    pub segment: SegmentKey,
    pub advertiser_id: i32,
    pub revenue: f64,
}

pub struct RecommendationEngine {
    limit: usize,
}

impl RecommendationEngine {
    pub fn new() -> Self {
        Self {
            limit: MAX_RECOMMENDED_ADVERTISERS,
        }
    }

    /// Recommend advertisers for every segment in `metrics` that had clicks.
    /// Output follows the order of `metrics`; segments without any joined
    /// click are left out.
    pub fn recommend(
        &self,
        metrics: &[MetricResult],
        impressions: &[ImpressionEvent],
        clicks: &[ClickEvent],
    ) -> Vec<RecommendationResult> {
        let mut by_segment: HashMap<SegmentKey, Vec<JoinedClick>> = HashMap::new();
        for joined in join_clicks(impressions, clicks) {
            by_segment.entry(joined.segment.clone()).or_default().push(joined);
        }

        metrics
            .iter()
            .filter(|m| m.clicks > 0)
            .filter_map(|metric| {
                let joined = by_segment.get(&metric.segment())?;
                let ids: Vec<i32> = self
                    .rank(joined, metric.clicks)
                    .into_iter()
                    .map(|s| s.advertiser_id)
                    .collect();
                if ids.is_empty() {
                    return None;
                }
                Some(RecommendationResult {
                    app_id: metric.app_id,
                    country_code: metric.country_code.clone(),
                    recommended_advertiser_ids: ids,
                })
            })
            .collect()
    }

    /// Score and rank the advertisers of one segment. Scores divide each
    /// advertiser's revenue by the segment's total click count. Ties are
    /// broken by ascending advertiser id.
    pub fn rank(&self, joined: &[JoinedClick], segment_clicks: u64) -> Vec<AdvertiserScore> {
        if segment_clicks == 0 {
            return Vec::new();
        }

        let mut scores: Vec<AdvertiserScore> = Vec::new();
        let mut positions: HashMap<i32, usize> = HashMap::new();
        for click in joined {
            let pos = *positions.entry(click.advertiser_id).or_insert_with(|| {
                scores.push(AdvertiserScore {
                    advertiser_id: click.advertiser_id,
                    revenue: 0.0,
                    score: 0.0,
                });
                scores.len() - 1
            });
            scores[pos].revenue += click.revenue;
        }

        let denominator = segment_clicks as f64;
        for score in &mut scores {
            score.score = score.revenue / denominator;
        }

        scores.sort_by(|a, b| {
            b.score
                .total_cmp(&a.score)
                .then_with(|| a.advertiser_id.cmp(&b.advertiser_id))
        });
        scores.truncate(self.limit);

        debug!(
            advertisers = scores.len(),
            top_score = scores.first().map(|s| s.score),
            "Segment advertisers ranked"
        );
        scores
    }
}

impl Default for RecommendationEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// Inner join of clicks to impressions on impression id, in click order.
/// A click whose id matches several impressions yields one row per match.
pub fn join_clicks(impressions: &[ImpressionEvent], clicks: &[ClickEvent]) -> Vec<JoinedClick> {
    let mut by_id: HashMap<Uuid, Vec<&ImpressionEvent>> =
        HashMap::with_capacity(impressions.len());
    for impression in impressions {
        by_id.entry(impression.id).or_default().push(impression);
    }

    clicks
        .iter()
        .flat_map(|click| {
            by_id
                .get(&click.impression_id)
                .into_iter()
                .flatten()
                .map(move |imp| JoinedClick {
                    segment: imp.segment(),
                    advertiser_id: imp.advertiser_id,
                    revenue: click.revenue,
                })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregator::MetricsAggregator;

    fn imp(id: u128, app_id: i32, country: &str, advertiser_id: i32) -> ImpressionEvent {
        ImpressionEvent {
            id: Uuid::from_u128(id),
            app_id,
            country_code: country.to_string(),
            advertiser_id,
        }
    }

    fn click(id: u128, revenue: f64) -> ClickEvent {
        ClickEvent {
            impression_id: Uuid::from_u128(id),
            revenue,
        }
    }

    fn run(impressions: &[ImpressionEvent], clicks: &[ClickEvent]) -> Vec<RecommendationResult> {
        let metrics = MetricsAggregator::aggregate(impressions, clicks);
        RecommendationEngine::new().recommend(&metrics, impressions, clicks)
    }

    #[test]
    fn test_click_through_scenario() {
        let impressions = vec![imp(1, 1, "US", 10), imp(2, 1, "US", 20)];
        let clicks = vec![click(1, 5.0), click(1, 3.0), click(2, 1.0)];

        let recs = run(&impressions, &clicks);
        assert_eq!(
            recs,
            vec![RecommendationResult {
                app_id: 1,
                country_code: "US".into(),
                recommended_advertiser_ids: vec![10, 20],
            }]
        );
    }

    #[test]
    fn test_scores_use_segment_click_count() {
        let impressions = vec![imp(1, 1, "US", 10), imp(2, 1, "US", 20)];
        let clicks = vec![click(1, 5.0), click(1, 3.0), click(2, 1.0)];
        let joined = join_clicks(&impressions, &clicks);

        let scores = RecommendationEngine::new().rank(&joined, 3);
        assert_eq!(scores.len(), 2);
        assert_eq!(scores[0].advertiser_id, 10);
        assert!((scores[0].score - 8.0 / 3.0).abs() < 1e-12);
        assert!((scores[1].score - 1.0 / 3.0).abs() < 1e-12);
        let total: f64 = scores.iter().map(|s| s.score).sum();
        assert!((total - 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_per_advertiser_click_count_does_not_affect_ranking() {
        // advertiser 20 has the higher revenue per own click but less revenue overall
        let impressions = vec![imp(1, 1, "US", 10), imp(2, 1, "US", 20)];
        let clicks = vec![click(1, 2.0), click(1, 2.0), click(1, 2.0), click(2, 5.0)];

        let recs = run(&impressions, &clicks);
        assert_eq!(recs[0].recommended_advertiser_ids, vec![10, 20]);
    }

    #[test]
    fn test_top_five_only() {
        let impressions: Vec<_> = (1..=8).map(|i| imp(i, 3, "GB", i as i32)).collect();
        let clicks: Vec<_> = (1..=8).map(|i| click(i, i as f64)).collect();

        let recs = run(&impressions, &clicks);
        assert_eq!(recs.len(), 1);
        assert_eq!(recs[0].recommended_advertiser_ids, vec![8, 7, 6, 5, 4]);
    }

    #[test]
    fn test_ties_break_on_ascending_advertiser_id() {
        let impressions = vec![imp(1, 1, "US", 30), imp(2, 1, "US", 10), imp(3, 1, "US", 20)];
        let clicks = vec![click(1, 1.0), click(2, 1.0), click(3, 1.0)];

        let recs = run(&impressions, &clicks);
        assert_eq!(recs[0].recommended_advertiser_ids, vec![10, 20, 30]);
    }

    #[test]
    fn test_segment_without_clicks_is_omitted() {
        let impressions = vec![imp(1, 1, "US", 10), imp(2, 2, "NL", 20)];
        let clicks = vec![click(1, 1.0)];

        let recs = run(&impressions, &clicks);
        assert_eq!(recs.len(), 1);
        assert_eq!(recs[0].country_code, "US");
    }

    #[test]
    fn test_zero_revenue_clicks_still_recommend() {
        let impressions = vec![imp(1, 1, "US", 10)];
        let clicks = vec![click(1, 0.0)];

        let recs = run(&impressions, &clicks);
        assert_eq!(recs[0].recommended_advertiser_ids, vec![10]);
    }

    #[test]
    fn test_unjoinable_segment_is_skipped() {
        // metrics claim clicks the join cannot resolve
        let metrics = vec![MetricResult {
            app_id: 1,
            country_code: "US".into(),
            impressions: 1,
            clicks: 4,
            revenue: 4.0,
        }];
        let recs = RecommendationEngine::new().recommend(&metrics, &[], &[click(1, 1.0)]);
        assert!(recs.is_empty());
    }

    #[test]
    fn test_join_drops_unmatched_and_fans_out_duplicates() {
        let impressions = vec![imp(1, 1, "US", 10), imp(1, 2, "CA", 20)];
        let clicks = vec![click(7, 9.0), click(1, 2.0)];

        let joined = join_clicks(&impressions, &clicks);
        assert_eq!(joined.len(), 2);
        assert_eq!(joined[0].segment, SegmentKey::new(1, "US"));
        assert_eq!(joined[1].advertiser_id, 20);
        assert!(joined.iter().all(|j| j.revenue == 2.0));
    }

    #[test]
    fn test_output_follows_metric_order_and_is_sorted() {
        let impressions = vec![
            imp(1, 5, "JP", 1),
            imp(2, 5, "JP", 2),
            imp(3, 4, "KR", 3),
            imp(4, 5, "JP", 3),
        ];
        let clicks = vec![click(3, 2.0), click(1, 0.5), click(2, 4.0), click(4, 1.0)];

        let recs = run(&impressions, &clicks);
        let keys: Vec<_> = recs.iter().map(|r| r.app_id).collect();
        assert_eq!(keys, vec![5, 4]);
        assert_eq!(recs[0].recommended_advertiser_ids, vec![2, 3, 1]);
        assert!(recs.iter().all(|r| (1..=MAX_RECOMMENDED_ADVERTISERS)
            .contains(&r.recommended_advertiser_ids.len())));
    }
}
