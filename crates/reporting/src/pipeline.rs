//! Batch job — read both event logs, aggregate, recommend, write results.

use crate::aggregator::MetricsAggregator;
use crate::recommendations::RecommendationEngine;
use adviser_core::config::AppConfig;
use adviser_core::records::{read_records, write_records};
use adviser_core::types::{ClickEvent, ImpressionEvent};
use adviser_core::AdviserResult;
use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Outcome of one batch run.
#[derive(Debug, Clone)]
pub struct BatchSummary {
    pub impressions: usize,
    pub clicks: usize,
    pub skipped_impressions: usize,
    pub skipped_clicks: usize,
    pub segments: usize,
    pub recommended_segments: usize,
    pub metrics_path: PathBuf,
    pub recommendations_path: PathBuf,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

pub struct BatchJob {
    config: AppConfig,
    engine: RecommendationEngine,
}

impl BatchJob {
    pub fn new(config: AppConfig) -> Self {
        Self {
            config,
            engine: RecommendationEngine::new(),
        }
    }

    pub fn run(
        &self,
        impressions_path: impl AsRef<Path>,
        clicks_path: impl AsRef<Path>,
    ) -> AdviserResult<BatchSummary> {
        let started_at = Utc::now();
        let output = &self.config.output;

        let impressions = read_records::<ImpressionEvent>(impressions_path.as_ref())?;
        let clicks = read_records::<ClickEvent>(clicks_path.as_ref())?;
        if !impressions.skipped.is_empty() || !clicks.skipped.is_empty() {
            warn!(
                skipped_impressions = impressions.skipped.len(),
                skipped_clicks = clicks.skipped.len(),
                "Malformed input records were ignored"
            );
        }
        info!(
            impressions = impressions.records.len(),
            clicks = clicks.records.len(),
            "Event logs loaded"
        );

        let metrics = MetricsAggregator::aggregate(&impressions.records, &clicks.records);
        let metrics_path = output.metrics_path();
        write_records(&metrics_path, &metrics, output.pretty)?;

        let recommendations = self
            .engine
            .recommend(&metrics, &impressions.records, &clicks.records);
        let recommendations_path = output.recommendations_path();
        write_records(&recommendations_path, &recommendations, output.pretty)?;

        let summary = BatchSummary {
            impressions: impressions.records.len(),
            clicks: clicks.records.len(),
            skipped_impressions: impressions.skipped.len(),
            skipped_clicks: clicks.skipped.len(),
            segments: metrics.len(),
            recommended_segments: recommendations.len(),
            metrics_path,
            recommendations_path,
            started_at,
            finished_at: Utc::now(),
        };

        info!(
            segments = summary.segments,
            recommended_segments = summary.recommended_segments,
            metrics_path = %summary.metrics_path.display(),
            recommendations_path = %summary.recommendations_path.display(),
            "Batch completed"
        );
        Ok(summary)
    }
}
