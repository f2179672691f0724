//! Substitution of declared missing-value sentinels.

use tracing::debug;
use verity_timeseries::{Ensemble, MISSING_DOUBLE, MissingValue, TimeSeries};

use crate::error::IngestError;

/// Largest difference at which a value matches a sentinel.
pub const MISSING_EPSILON: f64 = 1e-7;

/// The missing-value sentinels declared for one source.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MissingValues {
    sentinels: Vec<f64>,
}

impl MissingValues {
    /// Creates the sentinel set. NaN sentinels are dropped.
    pub fn new(sentinels: impl IntoIterator<Item = f64>) -> Self {
        Self {
            sentinels: sentinels.into_iter().filter(|s| !s.is_nan()).collect(),
        }
    }

    /// Returns the sentinels.
    pub fn sentinels(&self) -> &[f64] {
        &self.sentinels
    }

    /// Returns `true` if no sentinel is declared.
    pub fn is_empty(&self) -> bool {
        self.sentinels.is_empty()
    }

    /// Returns `true` if `value` matches a sentinel.
    pub fn is_sentinel(&self, value: f64) -> bool {
        self.sentinels
            .iter()
            .any(|s| (value - s).abs() <= MISSING_EPSILON)
    }

    /// Returns `MISSING_DOUBLE` for a sentinel, otherwise `value`.
    pub fn replace(&self, value: f64) -> f64 {
        if self.is_sentinel(value) {
            MISSING_DOUBLE
        } else {
            value
        }
    }

    /// Replaces every sentinel in `series` with `MISSING_DOUBLE`.
    pub fn apply<T>(&self, series: TimeSeries<T>) -> TimeSeries<T>
    where
        T: ReplaceMissing + MissingValue,
    {
        if self.is_empty() {
            return series;
        }
        let before = missing_count(&series);
        let series = series.map_values(|v| v.replace_missing(self));
        let replaced = missing_count(&series) - before;
        if replaced > 0 {
            debug!(series = %series.metadata(), replaced, "substituted missing values");
        }
        series
    }
}

fn missing_count<T: MissingValue>(series: &TimeSeries<T>) -> usize {
    series
        .events()
        .iter()
        .filter(|e| e.value().is_missing())
        .count()
}

/// Values whose sentinels can be replaced.
pub trait ReplaceMissing: Sized {
    /// Returns the value with every sentinel replaced by `MISSING_DOUBLE`.
    fn replace_missing(self, missing: &MissingValues) -> Self;
}

impl ReplaceMissing for f64 {
    fn replace_missing(self, missing: &MissingValues) -> Self {
        missing.replace(self)
    }
}

impl ReplaceMissing for Ensemble {
    fn replace_missing(self, missing: &MissingValues) -> Self {
        self.map_members(|m| missing.replace(m))
    }
}

/// Parses a declared missing value.
///
/// `"null"` in any case, or blank text, means NaN.
///
/// # Errors
///
/// Returns [`IngestError::InvalidMissingValue`] if `text` is not a number.
pub fn parse_missing_value(text: &str) -> Result<f64, IngestError> {
    let trimmed = text.trim();
    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("null") {
        return Ok(MISSING_DOUBLE);
    }
    trimmed
        .parse::<f64>()
        .map_err(|_| IngestError::InvalidMissingValue {
            value: text.to_string(),
        })
}
