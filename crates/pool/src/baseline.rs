//! Generated baselines.

use chrono::{DateTime, Utc};
use tracing::debug;
use verity_timeseries::{Event, Feature, TimeSeries};

/// Builds a persistence series shaped like `template`.
///
/// The persisted value is the `lag`-th most recent finite left value at or
/// before the template's first reference time. Without reference times, the
/// value must precede the template's first valid time. The value is repeated
/// at each template valid time. Returns `None` when there is no such value.
pub(crate) fn persistence<R, T>(
    left: &[&TimeSeries<f64>],
    template: &TimeSeries<T>,
    lag: usize,
    feature: &Feature,
) -> Option<TimeSeries<R>>
where
    R: From<f64>,
{
    let (anchor, inclusive) = match template.metadata().first_reference_time() {
        Some(reference) => (reference, true),
        None => (template.first_time()?, false),
    };
    let value = lagged_value(left, anchor, inclusive, lag)?;

    let events = template
        .valid_times()
        .map(|t| Event::new(t, R::from(value)))
        .collect();
    let metadata = template.metadata().clone().with_feature(feature.clone());
    match TimeSeries::new(metadata, events) {
        Ok(series) => Some(series),
        Err(e) => {
            debug!(error = %e, "skipping persistence series");
            None
        }
    }
}

fn lagged_value(
    left: &[&TimeSeries<f64>],
    anchor: DateTime<Utc>,
    inclusive: bool,
    lag: usize,
) -> Option<f64> {
    let mut candidates: Vec<(DateTime<Utc>, f64)> = left
        .iter()
        .flat_map(|s| s.events().iter())
        .filter(|e| e.value().is_finite())
        .filter(|e| {
            if inclusive {
                e.time() <= anchor
            } else {
                e.time() < anchor
            }
        })
        .map(|e| (e.time(), *e.value()))
        .collect();
    candidates.sort_by(|a, b| b.0.cmp(&a.0));
    candidates.dedup_by_key(|c| c.0);
    candidates.get(lag.checked_sub(1)?).map(|&(_, v)| v)
}
