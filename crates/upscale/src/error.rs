//! Error types for the verity-upscale crate.

use chrono::{DateTime, Utc};
use verity_timeseries::TimeScale;

/// Error type for all fallible operations in the verity-upscale crate.
#[derive(Debug, Clone, thiserror::Error)]
pub enum UpscalingError {
    /// Returned when the existing time scale is undeclared and the desired
    /// scale is not instantaneous.
    #[error(
        "cannot upscale to {desired}: the existing time scale is undeclared and the desired \
         time scale is not instantaneous"
    )]
    UndeclaredTimeScale {
        /// The desired time scale.
        desired: TimeScale,
    },

    /// Returned when the existing period is longer than the desired period.
    #[error("cannot downscale from {existing} to {desired}")]
    Downscaling {
        /// The existing time scale.
        existing: TimeScale,
        /// The desired time scale.
        desired: TimeScale,
    },

    /// One or more rescaling rules were violated.
    #[error("{count} rescaling error(s): {details}")]
    Invalid { count: usize, details: String },

    /// Returned when the ensembles in one interval differ in shape.
    #[error(
        "ensemble shape mismatch in the interval ending at {ends_at}: expected {expected} \
         members, found {found} (or different labels)"
    )]
    EnsembleShapeMismatch {
        /// End of the interval being aggregated.
        ends_at: DateTime<Utc>,
        /// Member count of the first ensemble in the interval.
        expected: usize,
        /// Member count of the offending ensemble.
        found: usize,
    },

    /// Returned when configuration is invalid.
    #[error("invalid configuration: {reason}")]
    InvalidConfig {
        /// Description of the problem.
        reason: String,
    },

    /// Time-series model error.
    #[error(transparent)]
    TimeSeries(#[from] verity_timeseries::TimeSeriesError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeDelta, TimeZone};
    use verity_timeseries::TimeScaleFunction;

    fn scale(hours: i64) -> TimeScale {
        TimeScale::new(TimeDelta::hours(hours), TimeScaleFunction::Mean).unwrap()
    }

    #[test]
    fn display_undeclared() {
        let e = UpscalingError::UndeclaredTimeScale { desired: scale(6) };
        assert!(e.to_string().contains("existing time scale is undeclared"));
        assert!(e.to_string().contains("[PT21600S,MEAN]"));
    }

    #[test]
    fn display_downscaling() {
        let e = UpscalingError::Downscaling {
            existing: scale(24),
            desired: scale(6),
        };
        assert_eq!(
            e.to_string(),
            "cannot downscale from [PT86400S,MEAN] to [PT21600S,MEAN]"
        );
    }

    #[test]
    fn display_invalid() {
        let e = UpscalingError::Invalid {
            count: 2,
            details: "a; b".to_string(),
        };
        assert_eq!(e.to_string(), "2 rescaling error(s): a; b");
    }

    #[test]
    fn display_shape_mismatch() {
        let e = UpscalingError::EnsembleShapeMismatch {
            ends_at: Utc.with_ymd_and_hms(2020, 1, 1, 6, 0, 0).unwrap(),
            expected: 3,
            found: 2,
        };
        assert!(e.to_string().contains("expected 3 members, found 2"));
    }

    #[test]
    fn from_timeseries_error() {
        let te = verity_timeseries::TimeSeriesError::EmptyUnion;
        let ue: UpscalingError = te.into();
        assert!(matches!(ue, UpscalingError::TimeSeries(_)));
    }

    #[test]
    fn error_is_send_and_sync() {
        fn assert_impl<T: Send + Sync>() {}
        assert_impl::<UpscalingError>();
    }
}
