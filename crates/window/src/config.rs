//! Pooling declarations: per-axis bounds and window specifications.

use std::fmt;

use chrono::{DateTime, TimeDelta, Utc};
use verity_timeseries::format_duration;

use crate::error::WindowError;
use crate::validate::ValidationCollector;

/// One of the three time axes of a [`TimeWindow`](verity_timeseries::TimeWindow).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    /// Lead duration relative to the forecast reference time.
    LeadDuration,
    /// Forecast reference (issued) time.
    ReferenceTime,
    /// Valid time.
    ValidTime,
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LeadDuration => f.write_str("lead duration"),
            Self::ReferenceTime => f.write_str("reference time"),
            Self::ValidTime => f.write_str("valid time"),
        }
    }
}

// ---------------------------------------------------------------------------
// WindowSpec
// ---------------------------------------------------------------------------

/// Sequence of pools along one axis.
///
/// # Example
///
/// ```
/// use chrono::TimeDelta;
/// use verity_window::WindowSpec;
///
/// let spec = WindowSpec::new(TimeDelta::hours(23)).with_frequency(TimeDelta::hours(17));
/// assert_eq!(spec.frequency(), TimeDelta::hours(17));
/// assert!(spec.validate().is_ok());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowSpec {
    period: TimeDelta,
    frequency: Option<TimeDelta>,
    reverse: bool,
}

impl WindowSpec {
    /// Creates a specification with the given period.
    ///
    /// Defaults: frequency equal to the period, forward direction.
    pub fn new(period: TimeDelta) -> Self {
        Self {
            period,
            frequency: None,
            reverse: false,
        }
    }

    /// Sets the stride between consecutive windows.
    pub fn with_frequency(mut self, frequency: TimeDelta) -> Self {
        self.frequency = Some(frequency);
        self
    }

    /// Walk backward from the maximum bound.
    pub fn with_reverse(mut self, reverse: bool) -> Self {
        self.reverse = reverse;
        self
    }

    /// Returns the window period.
    pub fn period(&self) -> TimeDelta {
        self.period
    }

    /// Returns the effective frequency: the declared one, or the period.
    pub fn frequency(&self) -> TimeDelta {
        self.frequency.unwrap_or(self.period)
    }

    /// Returns `true` if windows walk backward from the maximum.
    pub fn is_reverse(&self) -> bool {
        self.reverse
    }

    /// Validates the specification.
    ///
    /// # Errors
    ///
    /// Returns [`WindowError::InvalidConfig`] if the period or frequency is
    /// negative.
    pub fn validate(&self) -> Result<(), WindowError> {
        if self.period < TimeDelta::zero() {
            return Err(WindowError::InvalidConfig {
                reason: format!("period must be >= 0, got {}", format_duration(self.period)),
            });
        }
        if self.frequency() < TimeDelta::zero() {
            return Err(WindowError::InvalidConfig {
                reason: format!(
                    "frequency must be >= 0, got {}",
                    format_duration(self.frequency())
                ),
            });
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// PoolingConfig
// ---------------------------------------------------------------------------

/// Bounds and pool specifications for all three axes.
///
/// # Example
///
/// ```
/// use chrono::TimeDelta;
/// use verity_window::{PoolingConfig, WindowSpec};
///
/// let config = PoolingConfig::new()
///     .with_lead_durations(TimeDelta::zero(), TimeDelta::hours(24))
///     .with_lead_pools(WindowSpec::new(TimeDelta::hours(6)));
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PoolingConfig {
    lead_durations: Option<(TimeDelta, TimeDelta)>,
    reference_times: Option<(DateTime<Utc>, DateTime<Utc>)>,
    valid_times: Option<(DateTime<Utc>, DateTime<Utc>)>,
    lead_pools: Option<WindowSpec>,
    reference_pools: Option<WindowSpec>,
    valid_pools: Option<WindowSpec>,
}

impl PoolingConfig {
    /// Creates an empty declaration: every axis unbounded and unpooled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the lead duration bounds.
    pub fn with_lead_durations(mut self, minimum: TimeDelta, maximum: TimeDelta) -> Self {
        self.lead_durations = Some((minimum, maximum));
        self
    }

    /// Sets the reference time bounds.
    pub fn with_reference_times(mut self, minimum: DateTime<Utc>, maximum: DateTime<Utc>) -> Self {
        self.reference_times = Some((minimum, maximum));
        self
    }

    /// Sets the valid time bounds.
    pub fn with_valid_times(mut self, minimum: DateTime<Utc>, maximum: DateTime<Utc>) -> Self {
        self.valid_times = Some((minimum, maximum));
        self
    }

    /// Declares pools along the lead duration axis.
    pub fn with_lead_pools(mut self, spec: WindowSpec) -> Self {
        self.lead_pools = Some(spec);
        self
    }

    /// Declares pools along the reference time axis.
    pub fn with_reference_pools(mut self, spec: WindowSpec) -> Self {
        self.reference_pools = Some(spec);
        self
    }

    /// Declares pools along the valid time axis.
    pub fn with_valid_pools(mut self, spec: WindowSpec) -> Self {
        self.valid_pools = Some(spec);
        self
    }

    /// Returns the lead duration bounds.
    pub fn lead_durations(&self) -> Option<(TimeDelta, TimeDelta)> {
        self.lead_durations
    }

    /// Returns the reference time bounds.
    pub fn reference_times(&self) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
        self.reference_times
    }

    /// Returns the valid time bounds.
    pub fn valid_times(&self) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
        self.valid_times
    }

    /// Returns the lead duration pools.
    pub fn lead_pools(&self) -> Option<WindowSpec> {
        self.lead_pools
    }

    /// Returns the reference time pools.
    pub fn reference_pools(&self) -> Option<WindowSpec> {
        self.reference_pools
    }

    /// Returns the valid time pools.
    pub fn valid_pools(&self) -> Option<WindowSpec> {
        self.valid_pools
    }

    /// Validates the declaration, reporting every problem at once.
    ///
    /// # Errors
    ///
    /// Returns [`WindowError::Validation`] listing every inverted bound,
    /// negative period or frequency, and pool declaration without bounds.
    pub fn validate(&self) -> Result<(), WindowError> {
        let mut c = ValidationCollector::new();

        if let Some((lo, hi)) = self.lead_durations
            && hi < lo
        {
            c.push(format!(
                "lead duration maximum {} is before minimum {}",
                format_duration(hi),
                format_duration(lo)
            ));
        }
        if let Some((lo, hi)) = self.reference_times
            && hi < lo
        {
            c.push(format!("reference time maximum {hi} is before minimum {lo}"));
        }
        if let Some((lo, hi)) = self.valid_times
            && hi < lo
        {
            c.push(format!("valid time maximum {hi} is before minimum {lo}"));
        }

        let axes = [
            (Axis::LeadDuration, self.lead_pools, self.lead_durations.is_some()),
            (Axis::ReferenceTime, self.reference_pools, self.reference_times.is_some()),
            (Axis::ValidTime, self.valid_pools, self.valid_times.is_some()),
        ];
        for (axis, spec, bounded) in axes {
            let Some(spec) = spec else { continue };
            if !bounded {
                c.check(Err(WindowError::MissingBounds { axis }));
            }
            if let Err(WindowError::InvalidConfig { reason }) = spec.validate() {
                c.push(format!("{axis} pools: {reason}"));
            }
        }

        c.finish()
    }
}
