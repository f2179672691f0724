//! Time windows: the temporal bounds of a pool.
//!
//! A window bounds three axes: reference time, valid time and lead duration.
//! Every axis is right-closed, so a value `x` lies in `(lo, hi]` when
//! `x == hi` or `lo < x < hi`. A zero-width bound `(x, x]` therefore selects
//! exactly one value.

use std::fmt;

use chrono::{DateTime, TimeDelta, Utc};

use crate::error::TimeSeriesError;
use crate::scale::{TimeScale, format_duration};

/// Earliest representable instant, used for unbounded lower time bounds.
pub const INSTANT_MIN: DateTime<Utc> = DateTime::<Utc>::MIN_UTC;
/// Latest representable instant, used for unbounded upper time bounds.
pub const INSTANT_MAX: DateTime<Utc> = DateTime::<Utc>::MAX_UTC;
/// Smallest lead duration, used for unbounded lower lead bounds.
pub const DURATION_MIN: TimeDelta = TimeDelta::MIN;
/// Largest lead duration, used for unbounded upper lead bounds.
pub const DURATION_MAX: TimeDelta = TimeDelta::MAX;

/// Immutable six-bound time window.
///
/// Ordering compares reference bounds, then valid bounds, then lead bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimeWindow {
    earliest_reference_time: DateTime<Utc>,
    latest_reference_time: DateTime<Utc>,
    earliest_valid_time: DateTime<Utc>,
    latest_valid_time: DateTime<Utc>,
    earliest_lead_duration: TimeDelta,
    latest_lead_duration: TimeDelta,
}

impl Default for TimeWindow {
    fn default() -> Self {
        Self::unbounded()
    }
}

impl TimeWindow {
    /// A window that is unbounded on every axis.
    pub fn unbounded() -> Self {
        Self {
            earliest_reference_time: INSTANT_MIN,
            latest_reference_time: INSTANT_MAX,
            earliest_valid_time: INSTANT_MIN,
            latest_valid_time: INSTANT_MAX,
            earliest_lead_duration: DURATION_MIN,
            latest_lead_duration: DURATION_MAX,
        }
    }

    /// Sets the reference time bounds.
    pub fn with_reference_times(mut self, earliest: DateTime<Utc>, latest: DateTime<Utc>) -> Self {
        self.earliest_reference_time = earliest;
        self.latest_reference_time = latest;
        self
    }

    /// Sets the valid time bounds.
    pub fn with_valid_times(mut self, earliest: DateTime<Utc>, latest: DateTime<Utc>) -> Self {
        self.earliest_valid_time = earliest;
        self.latest_valid_time = latest;
        self
    }

    /// Sets the lead duration bounds.
    pub fn with_lead_durations(mut self, earliest: TimeDelta, latest: TimeDelta) -> Self {
        self.earliest_lead_duration = earliest;
        self.latest_lead_duration = latest;
        self
    }

    pub fn earliest_reference_time(&self) -> DateTime<Utc> {
        self.earliest_reference_time
    }

    pub fn latest_reference_time(&self) -> DateTime<Utc> {
        self.latest_reference_time
    }

    pub fn earliest_valid_time(&self) -> DateTime<Utc> {
        self.earliest_valid_time
    }

    pub fn latest_valid_time(&self) -> DateTime<Utc> {
        self.latest_valid_time
    }

    pub fn earliest_lead_duration(&self) -> TimeDelta {
        self.earliest_lead_duration
    }

    pub fn latest_lead_duration(&self) -> TimeDelta {
        self.latest_lead_duration
    }

    /// Returns `true` if both reference bounds are unbounded.
    pub fn has_unbounded_reference_times(&self) -> bool {
        self.earliest_reference_time == INSTANT_MIN && self.latest_reference_time == INSTANT_MAX
    }

    /// Returns `true` if both valid bounds are unbounded.
    pub fn has_unbounded_valid_times(&self) -> bool {
        self.earliest_valid_time == INSTANT_MIN && self.latest_valid_time == INSTANT_MAX
    }

    /// Returns `true` if both lead bounds are unbounded.
    pub fn has_unbounded_lead_durations(&self) -> bool {
        self.earliest_lead_duration == DURATION_MIN && self.latest_lead_duration == DURATION_MAX
    }

    /// Returns `true` if `time` lies within the reference bounds.
    pub fn contains_reference_time(&self, time: DateTime<Utc>) -> bool {
        self.has_unbounded_reference_times()
            || right_closed(time, self.earliest_reference_time, self.latest_reference_time)
    }

    /// Returns `true` if `time` lies within the valid bounds.
    pub fn contains_valid_time(&self, time: DateTime<Utc>) -> bool {
        self.has_unbounded_valid_times()
            || right_closed(time, self.earliest_valid_time, self.latest_valid_time)
    }

    /// Returns `true` if `lead` lies within the lead bounds.
    pub fn contains_lead_duration(&self, lead: TimeDelta) -> bool {
        self.has_unbounded_lead_durations()
            || right_closed(lead, self.earliest_lead_duration, self.latest_lead_duration)
    }

    /// Returns `true` if this window overlaps `other` on every axis.
    pub fn intersects(&self, other: &TimeWindow) -> bool {
        overlaps(
            (self.earliest_reference_time, self.latest_reference_time),
            (other.earliest_reference_time, other.latest_reference_time),
        ) && overlaps(
            (self.earliest_valid_time, self.latest_valid_time),
            (other.earliest_valid_time, other.latest_valid_time),
        ) && overlaps(
            (self.earliest_lead_duration, self.latest_lead_duration),
            (other.earliest_lead_duration, other.latest_lead_duration),
        )
    }

    /// Returns the smallest window that encloses every window in `windows`.
    ///
    /// # Errors
    ///
    /// Returns [`TimeSeriesError::EmptyUnion`] if `windows` is empty.
    pub fn union<'a>(
        windows: impl IntoIterator<Item = &'a TimeWindow>,
    ) -> Result<TimeWindow, TimeSeriesError> {
        let mut iter = windows.into_iter();
        let first = *iter.next().ok_or(TimeSeriesError::EmptyUnion)?;
        Ok(iter.fold(first, |acc, w| TimeWindow {
            earliest_reference_time: acc.earliest_reference_time.min(w.earliest_reference_time),
            latest_reference_time: acc.latest_reference_time.max(w.latest_reference_time),
            earliest_valid_time: acc.earliest_valid_time.min(w.earliest_valid_time),
            latest_valid_time: acc.latest_valid_time.max(w.latest_valid_time),
            earliest_lead_duration: acc.earliest_lead_duration.min(w.earliest_lead_duration),
            latest_lead_duration: acc.latest_lead_duration.max(w.latest_lead_duration),
        }))
    }

    /// Widens the window so that it selects enough data to rescale to `scale`.
    ///
    /// For non-instantaneous scales the bounded earliest lead duration and the
    /// bounded earliest valid time are lowered by the scale period.
    pub fn adjust_for_time_scale(&self, scale: Option<TimeScale>) -> TimeWindow {
        let Some(scale) = scale.filter(|s| !s.is_instantaneous()) else {
            return *self;
        };
        let period = scale.period();
        let mut adjusted = *self;
        if self.earliest_lead_duration != DURATION_MIN {
            adjusted.earliest_lead_duration = self
                .earliest_lead_duration
                .checked_sub(&period)
                .unwrap_or(DURATION_MIN);
        }
        if self.earliest_valid_time != INSTANT_MIN {
            adjusted.earliest_valid_time = self
                .earliest_valid_time
                .checked_sub_signed(period)
                .unwrap_or(INSTANT_MIN);
        }
        adjusted
    }
}

fn right_closed<T: PartialOrd>(x: T, lower_exclusive: T, upper_inclusive: T) -> bool {
    x == upper_inclusive || (x > lower_exclusive && x < upper_inclusive)
}

fn overlaps<T: PartialOrd>(a: (T, T), b: (T, T)) -> bool {
    a.0 <= b.1 && b.0 <= a.1
}

fn fmt_instant(t: DateTime<Utc>) -> String {
    if t == INSTANT_MIN {
        "-INF".to_string()
    } else if t == INSTANT_MAX {
        "+INF".to_string()
    } else {
        t.to_rfc3339()
    }
}

fn fmt_duration(d: TimeDelta) -> String {
    if d == DURATION_MIN {
        "-INF".to_string()
    } else if d == DURATION_MAX {
        "+INF".to_string()
    } else {
        format_duration(d)
    }
}

impl fmt::Display for TimeWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[reference=({}, {}], valid=({}, {}], lead=({}, {}]]",
            fmt_instant(self.earliest_reference_time),
            fmt_instant(self.latest_reference_time),
            fmt_instant(self.earliest_valid_time),
            fmt_instant(self.latest_valid_time),
            fmt_duration(self.earliest_lead_duration),
            fmt_duration(self.latest_lead_duration),
        )
    }
}
