//! Generation of pooling windows along each axis and across axes.

use chrono::{DateTime, TimeDelta, Utc};
use tracing::debug;
use verity_timeseries::{DURATION_MAX, DURATION_MIN, INSTANT_MAX, INSTANT_MIN, TimeWindow};

use crate::config::{Axis, PoolingConfig, WindowSpec};
use crate::error::WindowError;

/// Slides windows `(lower, upper]` of `spec.period()` across
/// `[minimum, maximum]`.
///
/// Forward windows start at the minimum and are kept while the upper bound
/// is within the maximum. Reverse windows end at the maximum and are kept
/// while the lower bound is within the minimum. A zero frequency yields a
/// single window.
fn slide<T>(
    minimum: T,
    maximum: T,
    spec: &WindowSpec,
    shift: impl Fn(T, TimeDelta) -> Option<T>,
) -> Vec<(T, T)>
where
    T: Copy + Ord,
{
    let period = spec.period();
    let frequency = spec.frequency();
    let single = frequency.is_zero();
    let mut windows = Vec::new();

    if spec.is_reverse() {
        let mut upper = maximum;
        while let Some(lower) = shift(upper, -period) {
            if lower < minimum && !(single && windows.is_empty()) {
                break;
            }
            windows.push((lower, upper));
            if single {
                break;
            }
            match shift(upper, -frequency) {
                Some(next) => upper = next,
                None => break,
            }
        }
    } else {
        let mut lower = minimum;
        while let Some(upper) = shift(lower, period) {
            if upper > maximum && !(single && windows.is_empty()) {
                break;
            }
            windows.push((lower, upper));
            if single {
                break;
            }
            match shift(lower, frequency) {
                Some(next) => lower = next,
                None => break,
            }
        }
    }
    windows
}

fn shift_duration(d: TimeDelta, by: TimeDelta) -> Option<TimeDelta> {
    d.checked_add(&by)
}

fn shift_instant(t: DateTime<Utc>, by: TimeDelta) -> Option<DateTime<Utc>> {
    t.checked_add_signed(by)
}

fn check_axis<T: PartialOrd>(
    axis: Axis,
    minimum: T,
    maximum: T,
    spec: &WindowSpec,
) -> Result<(), WindowError> {
    spec.validate()?;
    if maximum < minimum {
        return Err(WindowError::InvalidConfig {
            reason: format!("{axis} maximum is before minimum"),
        });
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Single-axis generators
// ---------------------------------------------------------------------------

/// Generates windows along the lead duration axis. Other axes are unbounded.
///
/// # Errors
///
/// Returns [`WindowError::InvalidConfig`] for a negative period or
/// frequency, or when `maximum < minimum`.
pub fn lead_duration_windows(
    minimum: TimeDelta,
    maximum: TimeDelta,
    spec: &WindowSpec,
) -> Result<Vec<TimeWindow>, WindowError> {
    check_axis(Axis::LeadDuration, minimum, maximum, spec)?;
    let windows: Vec<_> = slide(minimum, maximum, spec, shift_duration)
        .into_iter()
        .map(|(lo, hi)| TimeWindow::unbounded().with_lead_durations(lo, hi))
        .collect();
    debug!(axis = %Axis::LeadDuration, count = windows.len(), "generated windows");
    Ok(windows)
}

/// Generates windows along the reference time axis. Other axes are unbounded.
///
/// # Errors
///
/// Returns [`WindowError::InvalidConfig`] for a negative period or
/// frequency, or when `maximum < minimum`.
pub fn reference_time_windows(
    minimum: DateTime<Utc>,
    maximum: DateTime<Utc>,
    spec: &WindowSpec,
) -> Result<Vec<TimeWindow>, WindowError> {
    check_axis(Axis::ReferenceTime, minimum, maximum, spec)?;
    let windows: Vec<_> = slide(minimum, maximum, spec, shift_instant)
        .into_iter()
        .map(|(lo, hi)| TimeWindow::unbounded().with_reference_times(lo, hi))
        .collect();
    debug!(axis = %Axis::ReferenceTime, count = windows.len(), "generated windows");
    Ok(windows)
}

/// Generates windows along the valid time axis. Other axes are unbounded.
///
/// # Errors
///
/// Returns [`WindowError::InvalidConfig`] for a negative period or
/// frequency, or when `maximum < minimum`.
pub fn valid_time_windows(
    minimum: DateTime<Utc>,
    maximum: DateTime<Utc>,
    spec: &WindowSpec,
) -> Result<Vec<TimeWindow>, WindowError> {
    check_axis(Axis::ValidTime, minimum, maximum, spec)?;
    let windows: Vec<_> = slide(minimum, maximum, spec, shift_instant)
        .into_iter()
        .map(|(lo, hi)| TimeWindow::unbounded().with_valid_times(lo, hi))
        .collect();
    debug!(axis = %Axis::ValidTime, count = windows.len(), "generated windows");
    Ok(windows)
}

// ---------------------------------------------------------------------------
// Cross-product
// ---------------------------------------------------------------------------

/// Bounds contributed by one axis: its pools, its declared bounds, or
/// everything.
fn axis_bounds<T>(
    axis: Axis,
    bounds: Option<(T, T)>,
    pools: Option<WindowSpec>,
    unbounded: (T, T),
    shift: impl Fn(T, TimeDelta) -> Option<T>,
) -> Result<Vec<(T, T)>, WindowError>
where
    T: Copy + Ord,
{
    match (pools, bounds) {
        (Some(spec), Some((lo, hi))) => {
            check_axis(axis, lo, hi, &spec)?;
            Ok(slide(lo, hi, &spec, shift))
        }
        (Some(_), None) => Err(WindowError::MissingBounds { axis }),
        (None, Some(bounds)) => Ok(vec![bounds]),
        (None, None) => Ok(vec![unbounded]),
    }
}

/// Generates every pooling window declared by `config`.
///
/// Each lead window is combined with each reference window and each valid
/// window. The result is sorted and free of duplicates.
///
/// # Errors
///
/// Returns [`WindowError::Validation`] when `config` is invalid.
pub fn time_windows(config: &PoolingConfig) -> Result<Vec<TimeWindow>, WindowError> {
    config.validate()?;

    let leads = axis_bounds(
        Axis::LeadDuration,
        config.lead_durations(),
        config.lead_pools(),
        (DURATION_MIN, DURATION_MAX),
        shift_duration,
    )?;
    let references = axis_bounds(
        Axis::ReferenceTime,
        config.reference_times(),
        config.reference_pools(),
        (INSTANT_MIN, INSTANT_MAX),
        shift_instant,
    )?;
    let valids = axis_bounds(
        Axis::ValidTime,
        config.valid_times(),
        config.valid_pools(),
        (INSTANT_MIN, INSTANT_MAX),
        shift_instant,
    )?;

    let mut windows = Vec::with_capacity(leads.len() * references.len() * valids.len());
    for &(lead_lo, lead_hi) in &leads {
        for &(ref_lo, ref_hi) in &references {
            for &(valid_lo, valid_hi) in &valids {
                windows.push(
                    TimeWindow::unbounded()
                        .with_reference_times(ref_lo, ref_hi)
                        .with_valid_times(valid_lo, valid_hi)
                        .with_lead_durations(lead_lo, lead_hi),
                );
            }
        }
    }
    windows.sort();
    windows.dedup();

    debug!(
        lead = leads.len(),
        reference = references.len(),
        valid = valids.len(),
        total = windows.len(),
        "generated time windows"
    );
    Ok(windows)
}

/// Number of pools: one per window and feature group.
pub fn pool_count(windows: &[TimeWindow], feature_groups: usize) -> usize {
    windows.len() * feature_groups
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hours(pairs: &[(i64, i64)]) -> Vec<(TimeDelta, TimeDelta)> {
        pairs
            .iter()
            .map(|&(lo, hi)| (TimeDelta::hours(lo), TimeDelta::hours(hi)))
            .collect()
    }

    fn slide_hours(min: i64, max: i64, spec: WindowSpec) -> Vec<(TimeDelta, TimeDelta)> {
        slide(
            TimeDelta::hours(min),
            TimeDelta::hours(max),
            &spec,
            shift_duration,
        )
    }

    #[test]
    fn forward_contiguous() {
        let got = slide_hours(0, 12, WindowSpec::new(TimeDelta::hours(4)));
        assert_eq!(got, hours(&[(0, 4), (4, 8), (8, 12)]));
    }

    #[test]
    fn forward_drops_partial_trailing_window() {
        let spec = WindowSpec::new(TimeDelta::hours(23)).with_frequency(TimeDelta::hours(17));
        assert_eq!(slide_hours(0, 40, spec), hours(&[(0, 23), (17, 40)]));
    }

    #[test]
    fn reverse_walks_back_from_maximum() {
        let spec = WindowSpec::new(TimeDelta::hours(7)).with_reverse(true);
        assert_eq!(
            slide_hours(0, 24, spec),
            hours(&[(17, 24), (10, 17), (3, 10)])
        );
    }

    #[test]
    fn zero_period_is_single_degenerate_window() {
        let got = slide_hours(43, 43, WindowSpec::new(TimeDelta::zero()));
        assert_eq!(got, hours(&[(43, 43)]));
    }

    #[test]
    fn zero_frequency_is_single_window() {
        let spec = WindowSpec::new(TimeDelta::hours(6)).with_frequency(TimeDelta::zero());
        assert_eq!(slide_hours(0, 24, spec), hours(&[(0, 6)]));
    }

    #[test]
    fn period_longer_than_range_yields_nothing() {
        assert!(slide_hours(0, 5, WindowSpec::new(TimeDelta::hours(6))).is_empty());
    }

    #[test]
    fn inverted_bounds_are_rejected() {
        let err = lead_duration_windows(
            TimeDelta::hours(5),
            TimeDelta::hours(1),
            &WindowSpec::new(TimeDelta::hours(1)),
        )
        .unwrap_err();
        assert!(matches!(err, WindowError::InvalidConfig { .. }));
    }
}
