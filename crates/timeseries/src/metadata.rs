//! Time-series metadata.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};

use crate::feature::Feature;
use crate::scale::TimeScale;

/// Kinds of reference time a series may carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ReferenceTimeType {
    /// Forecast initialisation time.
    T0,
    /// Time at which the forecast was issued.
    IssuedTime,
    /// Start of an analysis period.
    AnalysisStartTime,
    /// Time of the most recent observation used.
    LatestObservation,
    /// Unclassified reference time.
    Unknown,
}

impl fmt::Display for ReferenceTimeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::T0 => "T0",
            Self::IssuedTime => "ISSUED TIME",
            Self::AnalysisStartTime => "ANALYSIS START TIME",
            Self::LatestObservation => "LATEST OBSERVATION",
            Self::Unknown => "UNKNOWN",
        };
        f.write_str(name)
    }
}

/// Immutable descriptor attached to every time-series.
///
/// Series with different metadata are never merged into one trace.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TimeSeriesMetadata {
    reference_times: BTreeMap<ReferenceTimeType, DateTime<Utc>>,
    time_scale: Option<TimeScale>,
    variable: String,
    feature: Feature,
    unit: String,
}

impl TimeSeriesMetadata {
    /// Creates metadata with no reference times and an undeclared time scale.
    pub fn new(variable: impl Into<String>, feature: Feature, unit: impl Into<String>) -> Self {
        Self {
            reference_times: BTreeMap::new(),
            time_scale: None,
            variable: variable.into(),
            feature,
            unit: unit.into(),
        }
    }

    /// Adds or replaces a reference time.
    pub fn with_reference_time(mut self, kind: ReferenceTimeType, time: DateTime<Utc>) -> Self {
        self.reference_times.insert(kind, time);
        self
    }

    /// Replaces all reference times.
    pub fn with_reference_times(
        mut self,
        reference_times: BTreeMap<ReferenceTimeType, DateTime<Utc>>,
    ) -> Self {
        self.reference_times = reference_times;
        self
    }

    /// Sets the time scale. `None` means undeclared.
    pub fn with_time_scale(mut self, time_scale: Option<TimeScale>) -> Self {
        self.time_scale = time_scale;
        self
    }

    /// Sets the feature.
    pub fn with_feature(mut self, feature: Feature) -> Self {
        self.feature = feature;
        self
    }

    /// Sets the variable name.
    pub fn with_variable(mut self, variable: impl Into<String>) -> Self {
        self.variable = variable.into();
        self
    }

    /// Sets the measurement unit.
    pub fn with_unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = unit.into();
        self
    }

    /// Returns the reference times by type.
    pub fn reference_times(&self) -> &BTreeMap<ReferenceTimeType, DateTime<Utc>> {
        &self.reference_times
    }

    /// Returns the `T0` reference time, if present.
    pub fn t0(&self) -> Option<DateTime<Utc>> {
        self.reference_times.get(&ReferenceTimeType::T0).copied()
    }

    /// Returns the first reference time, preferring `T0`.
    pub fn first_reference_time(&self) -> Option<DateTime<Utc>> {
        self.t0()
            .or_else(|| self.reference_times.values().next().copied())
    }

    /// Returns the declared time scale, if any.
    pub fn time_scale(&self) -> Option<TimeScale> {
        self.time_scale
    }

    /// Returns the variable name.
    pub fn variable(&self) -> &str {
        &self.variable
    }

    /// Returns the feature.
    pub fn feature(&self) -> &Feature {
        &self.feature
    }

    /// Returns the measurement unit.
    pub fn unit(&self) -> &str {
        &self.unit
    }
}

impl fmt::Display for TimeSeriesMetadata {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.feature, self.variable, self.unit)?;
        for (kind, time) in &self.reference_times {
            write!(f, " {kind}={}", time.to_rfc3339())?;
        }
        if let Some(scale) = &self.time_scale {
            write!(f, " {scale}")?;
        }
        Ok(())
    }
}
