//! Error types for the verity-timeseries crate.

use chrono::{DateTime, Utc};

/// Error type for all fallible operations in the verity-timeseries crate.
#[derive(Debug, Clone, thiserror::Error)]
pub enum TimeSeriesError {
    /// Returned when two events share a valid time within one series.
    #[error("duplicate event at {time}: events must be unique per valid time")]
    DuplicateEvent {
        /// The repeated valid time.
        time: DateTime<Utc>,
    },

    /// Returned when ensemble labels do not match the member count.
    #[error("ensemble has {members} members but {labels} labels")]
    LabelMismatch {
        /// Number of members.
        members: usize,
        /// Number of labels.
        labels: usize,
    },

    /// Returned when a time scale is malformed.
    #[error("invalid time scale: {reason}")]
    InvalidTimeScale {
        /// Description of the problem.
        reason: String,
    },

    /// Returned when a union is requested over no windows.
    #[error("cannot form the union of an empty collection of time windows")]
    EmptyUnion,

    /// Returned when feature group construction fails.
    #[error("invalid feature group '{name}': {reason}")]
    InvalidFeatureGroup {
        /// Group name.
        name: String,
        /// Description of the problem.
        reason: String,
    },
}
