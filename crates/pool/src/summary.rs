//! JSON summaries of generated pools.

use serde::Serialize;
use verity_timeseries::{DURATION_MAX, DURATION_MIN, INSTANT_MAX, INSTANT_MIN, TimeWindow};

use crate::error::PoolError;
use crate::pool::Pool;

/// Bounds of a time window. Unbounded sides are `null`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WindowSummary {
    pub earliest_reference_time: Option<String>,
    pub latest_reference_time: Option<String>,
    pub earliest_valid_time: Option<String>,
    pub latest_valid_time: Option<String>,
    pub earliest_lead_seconds: Option<i64>,
    pub latest_lead_seconds: Option<i64>,
}

impl From<&TimeWindow> for WindowSummary {
    fn from(w: &TimeWindow) -> Self {
        let instant = |t: chrono::DateTime<chrono::Utc>| {
            (t != INSTANT_MIN && t != INSTANT_MAX).then(|| t.to_rfc3339())
        };
        let lead = |d: chrono::TimeDelta| {
            (d != DURATION_MIN && d != DURATION_MAX).then(|| d.num_seconds())
        };
        Self {
            earliest_reference_time: instant(w.earliest_reference_time()),
            latest_reference_time: instant(w.latest_reference_time()),
            earliest_valid_time: instant(w.earliest_valid_time()),
            latest_valid_time: instant(w.latest_valid_time()),
            earliest_lead_seconds: lead(w.earliest_lead_duration()),
            latest_lead_seconds: lead(w.latest_lead_duration()),
        }
    }
}

/// Summary of one pool.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PoolSummary {
    pub pool_id: u64,
    pub evaluation: String,
    pub feature_group: String,
    pub window: WindowSummary,
    pub time_scale: Option<String>,
    pub series: usize,
    pub pairs: usize,
    pub baseline_pairs: Option<usize>,
    pub climatology_size: Option<usize>,
}

impl PoolSummary {
    /// Summarises `pool`.
    pub fn from_pool<R>(pool: &Pool<R>) -> Self {
        let meta = pool.metadata();
        Self {
            pool_id: meta.pool_id(),
            evaluation: meta.evaluation().to_string(),
            feature_group: meta.feature_group().name().to_string(),
            window: WindowSummary::from(meta.time_window()),
            time_scale: meta.time_scale().map(|s| s.to_string()),
            series: pool.series().len(),
            pairs: pool.pair_count(),
            baseline_pairs: pool.baseline().map(Pool::pair_count),
            climatology_size: pool.climatology().map(|c| c.len()),
        }
    }
}

/// Serialize pool summaries to a JSON string.
pub fn to_json(summaries: &[PoolSummary]) -> Result<String, PoolError> {
    serde_json::to_string_pretty(summaries).map_err(|e| PoolError::Serialization {
        reason: e.to_string(),
    })
}
