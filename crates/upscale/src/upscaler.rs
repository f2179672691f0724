//! Aggregation of time-series to a coarser time scale.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use tracing::{debug, trace};
use verity_timeseries::slice::group_events_by_interval;
use verity_timeseries::{Ensemble, Event, MISSING_DOUBLE, TimeScale, TimeScaleFunction, TimeSeries};

use crate::config::{Lenience, UpscaleConfig};
use crate::error::UpscalingError;
use crate::validate::{Action, periods_per_interval, plan};

// ---------------------------------------------------------------------------
// Upscalable
// ---------------------------------------------------------------------------

/// Values that can be aggregated over an interval.
pub trait Upscalable: Clone + Sized {
    /// Aggregates the events of one interval ending at `ends_at`.
    ///
    /// Returns `Ok(None)` when nothing can be produced for the interval.
    fn aggregate(
        events: &[Event<Self>],
        function: TimeScaleFunction,
        ends_at: DateTime<Utc>,
        config: &UpscaleConfig,
    ) -> Result<Option<Self>, UpscalingError>;
}

impl Upscalable for f64 {
    fn aggregate(
        events: &[Event<Self>],
        function: TimeScaleFunction,
        _ends_at: DateTime<Utc>,
        config: &UpscaleConfig,
    ) -> Result<Option<Self>, UpscalingError> {
        let values: Vec<f64> = events.iter().map(|e| *e.value()).collect();
        Ok(accumulate(&values, function, config))
    }
}

impl Upscalable for Ensemble {
    fn aggregate(
        events: &[Event<Self>],
        function: TimeScaleFunction,
        ends_at: DateTime<Utc>,
        config: &UpscaleConfig,
    ) -> Result<Option<Self>, UpscalingError> {
        let Some(first) = events.first().map(Event::value) else {
            return Ok(None);
        };
        if let Some(odd) = events.iter().find(|e| !first.same_shape(e.value())) {
            return Err(UpscalingError::EnsembleShapeMismatch {
                ends_at,
                expected: first.len(),
                found: odd.value().len(),
            });
        }

        let mut members = Vec::with_capacity(first.len());
        for i in 0..first.len() {
            let column: Vec<f64> = events.iter().map(|e| e.value().members()[i]).collect();
            members.push(accumulate(&column, function, config).unwrap_or(MISSING_DOUBLE));
        }
        if members.iter().all(|m| !m.is_finite()) && config.lenience() == Lenience::Lenient {
            return Ok(None);
        }
        Ok(Some(first.with_members(members)?))
    }
}

/// Applies `function` to `values` under the configured lenience.
fn accumulate(values: &[f64], function: TimeScaleFunction, config: &UpscaleConfig) -> Option<f64> {
    let kept: Vec<f64> = match config.lenience() {
        Lenience::Strict => values.to_vec(),
        Lenience::Lenient => values.iter().copied().filter(|v| v.is_finite()).collect(),
    };
    if kept.is_empty() {
        return None;
    }
    if config.lenience() == Lenience::Lenient && kept.len() < config.min_events() {
        return None;
    }
    if kept.iter().any(|v| !v.is_finite()) {
        return Some(MISSING_DOUBLE);
    }

    let result = match function {
        TimeScaleFunction::Mean => kept.iter().sum::<f64>() / kept.len() as f64,
        TimeScaleFunction::Total => kept.iter().sum(),
        TimeScaleFunction::Minimum => kept.iter().copied().fold(f64::INFINITY, f64::min),
        TimeScaleFunction::Maximum => kept.iter().copied().fold(f64::NEG_INFINITY, f64::max),
        TimeScaleFunction::Unknown => MISSING_DOUBLE,
    };
    Some(if result.is_finite() { result } else { MISSING_DOUBLE })
}

// ---------------------------------------------------------------------------
// Upscaler
// ---------------------------------------------------------------------------

/// Upscales time-series of [`Upscalable`] values.
///
/// The upscaler holds no state between calls and may be shared across
/// threads.
#[derive(Debug, Clone, Default)]
pub struct Upscaler {
    config: UpscaleConfig,
}

impl Upscaler {
    /// Creates an upscaler.
    ///
    /// # Errors
    ///
    /// Returns [`UpscalingError::InvalidConfig`] if `config` is invalid.
    pub fn new(config: UpscaleConfig) -> Result<Self, UpscalingError> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Returns the configuration.
    pub fn config(&self) -> &UpscaleConfig {
        &self.config
    }

    /// Upscales `series` to `desired`, emitting one event per end time.
    ///
    /// Each output event at `t` aggregates the input events in
    /// `(t - period, t]`. When `end_times` is empty they are derived from the
    /// series itself.
    ///
    /// # Errors
    ///
    /// Returns an [`UpscalingError`] when the rescaling rules forbid the
    /// change of scale, or when ensembles in one interval differ in shape.
    pub fn upscale<T: Upscalable>(
        &self,
        series: &TimeSeries<T>,
        desired: TimeScale,
        end_times: &BTreeSet<DateTime<Utc>>,
    ) -> Result<TimeSeries<T>, UpscalingError> {
        let existing = series.time_scale();
        match plan(existing, desired)? {
            Action::Unchanged => return Ok(series.clone()),
            Action::Relabel => return Ok(series.clone().with_time_scale(Some(desired))),
            Action::Aggregate => {}
        }

        let period = desired.period();
        let derived;
        let end_times = if end_times.is_empty() {
            derived = derive_end_times(series, desired);
            &derived
        } else {
            end_times
        };

        let per_interval = periods_per_interval(existing, period);
        let groups = group_events_by_interval(series.events(), end_times.iter().copied(), period);
        let mut events = Vec::with_capacity(groups.len());
        for (end, group) in groups {
            if group.is_empty() {
                trace!(%end, "no events in interval");
                continue;
            }
            if self.config.lenience() == Lenience::Strict
                && !is_covered(group, end, desired, per_interval)
            {
                debug!(
                    %end,
                    events = group.len(),
                    series = %series.metadata(),
                    "skipping interval: incomplete coverage"
                );
                continue;
            }
            if let Some(value) = T::aggregate(group, desired.function(), end, &self.config)? {
                events.push(Event::new(end, value));
            }
        }

        let metadata = series.metadata().clone().with_time_scale(Some(desired));
        Ok(TimeSeries::new(metadata, events)?)
    }
}

/// Derives end times from the series: starting one timestep before the
/// first event, step by the desired period while before the last event.
fn derive_end_times<T>(series: &TimeSeries<T>, desired: TimeScale) -> BTreeSet<DateTime<Utc>> {
    let mut ends = BTreeSet::new();
    let events = series.events();
    let (Some(first), Some(last)) = (series.first_time(), series.last_time()) else {
        return ends;
    };
    let step = match events.get(1) {
        Some(second) => second.time().signed_duration_since(first),
        None => chrono::TimeDelta::zero(),
    };
    let Some(mut cursor) = first.checked_sub_signed(step) else {
        return ends;
    };
    while cursor < last {
        match cursor.checked_add_signed(desired.period()) {
            Some(next) => {
                ends.insert(next);
                cursor = next;
            }
            None => break,
        }
    }
    ends
}

/// Returns `true` when the interval ending at `end` is covered exactly.
fn is_covered<T>(
    group: &[Event<T>],
    end: DateTime<Utc>,
    desired: TimeScale,
    per_interval: Option<i64>,
) -> bool {
    let Some(last) = group.last() else {
        return false;
    };
    if last.time() != end {
        return false;
    }
    match per_interval {
        Some(n) if group.len() as i64 != n => return false,
        None if group.len() < 2 => return false,
        _ => {}
    }

    let Some(lower) = end.checked_sub_signed(desired.period()) else {
        return false;
    };
    let gap = group[0].time().signed_duration_since(lower);
    let mut previous = lower;
    for event in group {
        if event.time().signed_duration_since(previous) != gap {
            return false;
        }
        previous = event.time();
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::{TimeDelta, TimeZone};
    use verity_timeseries::{Feature, TimeSeriesMetadata};

    fn t(h: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap() + TimeDelta::hours(h)
    }

    fn hourly(values: &[f64]) -> TimeSeries<f64> {
        let meta = TimeSeriesMetadata::new("QINE", Feature::new("DRRC2"), "CMS")
            .with_time_scale(Some(TimeScale::instantaneous()));
        let events = values
            .iter()
            .enumerate()
            .map(|(i, &v)| Event::new(t(i as i64 + 1), v))
            .collect();
        TimeSeries::new(meta, events).unwrap()
    }

    fn six_hours(function: TimeScaleFunction) -> TimeScale {
        TimeScale::new(TimeDelta::hours(6), function).unwrap()
    }

    #[test]
    fn accumulate_functions() {
        let c = UpscaleConfig::new();
        let v = [1.0, 2.0, 6.0];
        assert_relative_eq!(accumulate(&v, TimeScaleFunction::Mean, &c).unwrap(), 3.0);
        assert_relative_eq!(accumulate(&v, TimeScaleFunction::Total, &c).unwrap(), 9.0);
        assert_relative_eq!(accumulate(&v, TimeScaleFunction::Minimum, &c).unwrap(), 1.0);
        assert_relative_eq!(accumulate(&v, TimeScaleFunction::Maximum, &c).unwrap(), 6.0);
    }

    #[test]
    fn accumulate_strict_nan_is_missing() {
        let c = UpscaleConfig::new();
        let v = [1.0, f64::NAN];
        assert!(accumulate(&v, TimeScaleFunction::Maximum, &c).unwrap().is_nan());
    }

    #[test]
    fn accumulate_lenient_drops_nan() {
        let c = UpscaleConfig::new().with_lenience(Lenience::Lenient);
        let v = [1.0, f64::NAN, 3.0];
        assert_relative_eq!(accumulate(&v, TimeScaleFunction::Mean, &c).unwrap(), 2.0);
        assert!(accumulate(&[f64::NAN], TimeScaleFunction::Mean, &c).is_none());
    }

    #[test]
    fn derived_end_times() {
        let series = hourly(&[0.0; 12]);
        let ends = derive_end_times(&series, six_hours(TimeScaleFunction::Mean));
        assert_eq!(ends.into_iter().collect::<Vec<_>>(), vec![t(6), t(12)]);
    }

    #[test]
    fn upscale_with_derived_end_times() {
        let series = hourly(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0, 10.0, 11.0, 12.0]);
        let up = Upscaler::default()
            .upscale(&series, six_hours(TimeScaleFunction::Mean), &BTreeSet::new())
            .unwrap();
        assert_eq!(up.len(), 2);
        assert_relative_eq!(*up.events()[0].value(), 3.5);
        assert_relative_eq!(*up.events()[1].value(), 9.5);
        assert_eq!(up.time_scale(), Some(six_hours(TimeScaleFunction::Mean)));
    }

    #[test]
    fn coverage_requires_event_at_end() {
        let series = hourly(&[1.0, 2.0, 3.0, 4.0, 5.0]);
        let desired = six_hours(TimeScaleFunction::Mean);
        assert!(!is_covered(series.events(), t(6), desired, None));
        let five = TimeScale::new(TimeDelta::hours(5), TimeScaleFunction::Mean).unwrap();
        assert!(is_covered(series.events(), t(5), five, None));
    }

    #[test]
    fn ensemble_member_aggregation() {
        let meta = TimeSeriesMetadata::new("QINE", Feature::new("DRRC2"), "CMS")
            .with_time_scale(Some(TimeScale::instantaneous()));
        let events = (1..=6)
            .map(|h| Event::new(t(h), Ensemble::new(vec![h as f64, 10.0 * h as f64])))
            .collect();
        let series = TimeSeries::new(meta, events).unwrap();
        let ends: BTreeSet<_> = [t(6)].into_iter().collect();
        // instantaneous values cannot be accumulated
        let total = Upscaler::default().upscale(&series, six_hours(TimeScaleFunction::Total), &ends);
        assert!(total.is_err());

        let up = Upscaler::default()
            .upscale(&series, six_hours(TimeScaleFunction::Maximum), &ends)
            .unwrap();
        assert_eq!(up.events()[0].value().members(), &[6.0, 60.0]);
    }
}
