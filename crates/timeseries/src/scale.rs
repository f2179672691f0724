//! Time scales: the support of a measurement in time.

use std::fmt;
use std::str::FromStr;

use chrono::TimeDelta;

use crate::error::TimeSeriesError;

/// Periods at or below this many seconds are treated as instantaneous.
const INSTANTANEOUS_SECONDS: i64 = 60;

/// Formats a duration as an ISO 8601 duration in seconds, e.g. `PT3600S`.
pub fn format_duration(duration: TimeDelta) -> String {
    let seconds = duration.num_milliseconds() as f64 / 1000.0;
    format!("PT{seconds}S")
}

/// Function used to aggregate values over a time scale period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TimeScaleFunction {
    /// Arithmetic mean.
    Mean,
    /// Accumulation (sum).
    Total,
    /// Minimum value.
    Minimum,
    /// Maximum value.
    Maximum,
    /// Undeclared aggregation.
    Unknown,
}

impl fmt::Display for TimeScaleFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Mean => "MEAN",
            Self::Total => "TOTAL",
            Self::Minimum => "MINIMUM",
            Self::Maximum => "MAXIMUM",
            Self::Unknown => "UNKNOWN",
        };
        f.write_str(name)
    }
}

impl FromStr for TimeScaleFunction {
    type Err = TimeSeriesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "mean" => Ok(Self::Mean),
            "total" | "sum" | "accumulation" => Ok(Self::Total),
            "minimum" | "min" => Ok(Self::Minimum),
            "maximum" | "max" => Ok(Self::Maximum),
            "unknown" => Ok(Self::Unknown),
            other => Err(TimeSeriesError::InvalidTimeScale {
                reason: format!("unknown time scale function: {other:?}"),
            }),
        }
    }
}

/// A `(period, function)` pair describing the support of a measurement.
///
/// # Example
///
/// ```
/// use chrono::TimeDelta;
/// use verity_timeseries::{TimeScale, TimeScaleFunction};
///
/// let six_hour_mean = TimeScale::new(TimeDelta::hours(6), TimeScaleFunction::Mean).unwrap();
/// assert!(!six_hour_mean.is_instantaneous());
/// assert!(TimeScale::instantaneous().is_instantaneous());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimeScale {
    period: TimeDelta,
    function: TimeScaleFunction,
}

impl TimeScale {
    /// Creates a time scale.
    ///
    /// # Errors
    ///
    /// Returns [`TimeSeriesError::InvalidTimeScale`] if `period` is negative.
    pub fn new(period: TimeDelta, function: TimeScaleFunction) -> Result<Self, TimeSeriesError> {
        if period < TimeDelta::zero() {
            return Err(TimeSeriesError::InvalidTimeScale {
                reason: format!("period must not be negative, got {period}"),
            });
        }
        Ok(Self { period, function })
    }

    /// An instantaneous scale: a one-second period with unknown function.
    pub fn instantaneous() -> Self {
        Self {
            period: TimeDelta::seconds(1),
            function: TimeScaleFunction::Unknown,
        }
    }

    /// Returns the period.
    pub fn period(&self) -> TimeDelta {
        self.period
    }

    /// Returns the aggregation function.
    pub fn function(&self) -> TimeScaleFunction {
        self.function
    }

    /// Returns `true` when the period is at most one minute.
    pub fn is_instantaneous(&self) -> bool {
        self.period.num_seconds() <= INSTANTANEOUS_SECONDS
    }
}

impl fmt::Display for TimeScale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_instantaneous() {
            write!(f, "[INSTANTANEOUS]")
        } else {
            write!(f, "[{},{}]", format_duration(self.period), self.function)
        }
    }
}
