//! Error types for the verity-pair crate.

use verity_timeseries::TimeScale;

/// Error type for all fallible operations in the verity-pair crate.
#[derive(Debug, Clone, thiserror::Error)]
pub enum PairingError {
    /// Returned when both series declare time scales and they differ.
    #[error(
        "Cannot pair two datasets with different time scales. The left time-series has a \
         time-scale of {left} and the right time-series has a time-scale of {right}."
    )]
    TimeScaleMismatch {
        /// Time scale of the left series.
        left: TimeScale,
        /// Time scale of the right series.
        right: TimeScale,
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
