//! Error types for the verity-pool crate.

use verity_pair::PairingError;
use verity_timeseries::{TimeSeriesError, TimeWindow};
use verity_upscale::UpscalingError;

/// Failure reported by a [`DataSource`](crate::DataSource).
#[derive(Debug, Clone, thiserror::Error)]
#[error("failed to retrieve {side} data: {reason}")]
pub struct RetrievalError {
    side: String,
    reason: String,
}

impl RetrievalError {
    /// Creates a retrieval error for the named data side.
    pub fn new(side: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            side: side.into(),
            reason: reason.into(),
        }
    }

    /// Returns the data side, e.g. `left`.
    pub fn side(&self) -> &str {
        &self.side
    }

    /// Returns the description of the failure.
    pub fn reason(&self) -> &str {
        &self.reason
    }
}

/// Underlying cause of a [`PoolCreationError`].
#[derive(Debug, Clone, thiserror::Error)]
pub enum PoolCreationCause {
    /// Upscaling a left, right or baseline series failed.
    #[error(transparent)]
    Upscaling(#[from] UpscalingError),

    /// Pairing failed.
    #[error(transparent)]
    Pairing(#[from] PairingError),

    /// A data source failed.
    #[error(transparent)]
    Retrieval(#[from] RetrievalError),

    /// Time-series model error.
    #[error(transparent)]
    TimeSeries(#[from] TimeSeriesError),

    /// The supplier has already produced its pool.
    #[error("the pool has already been supplied")]
    AlreadySupplied,
}

/// Failure to create one pool, naming its feature group and time window.
#[derive(Debug, Clone, thiserror::Error)]
#[error("failed to create the pool for feature group '{feature_group}' and window {time_window}: {cause}")]
pub struct PoolCreationError {
    /// Name of the feature group.
    pub feature_group: String,
    /// The pool's time window.
    pub time_window: TimeWindow,
    /// What went wrong.
    #[source]
    pub cause: PoolCreationCause,
}

/// Error type for pool generation.
#[derive(Debug, Clone, thiserror::Error)]
pub enum PoolError {
    /// One or more pools failed. Every failure is kept.
    #[error("{count} pool(s) failed: {details}")]
    FeatureGroups {
        /// Number of failed pools.
        count: usize,
        /// Failure messages joined by `"; "`.
        details: String,
        /// The individual failures, in supplier order.
        failures: Vec<PoolCreationError>,
    },

    /// Returned when configuration is invalid.
    #[error("invalid configuration: {reason}")]
    InvalidConfig {
        /// Description of the problem.
        reason: String,
    },

    /// The worker pool could not be built.
    #[error("failed to build the worker pool: {reason}")]
    ThreadPool {
        /// Description of the problem.
        reason: String,
    },

    /// JSON serialization failed.
    #[error("serialization error: {reason}")]
    Serialization {
        /// Description of the problem.
        reason: String,
    },
}

impl PoolError {
    /// Aggregates pool failures into one error.
    pub(crate) fn from_failures(failures: Vec<PoolCreationError>) -> Self {
        let details = failures
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("; ");
        Self::FeatureGroups {
            count: failures.len(),
            details,
            failures,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeDelta;

    fn failure(group: &str) -> PoolCreationError {
        PoolCreationError {
            feature_group: group.to_string(),
            time_window: TimeWindow::unbounded()
                .with_lead_durations(TimeDelta::zero(), TimeDelta::hours(1)),
            cause: PoolCreationCause::Retrieval(RetrievalError::new("right", "no such file")),
        }
    }

    #[test]
    fn display_retrieval() {
        let e = RetrievalError::new("left", "connection refused");
        assert_eq!(e.to_string(), "failed to retrieve left data: connection refused");
        assert_eq!(e.side(), "left");
        assert_eq!(e.reason(), "connection refused");
    }

    #[test]
    fn display_creation_error_names_group_and_window() {
        let msg = failure("DRRC2").to_string();
        assert!(msg.contains("feature group 'DRRC2'"));
        assert!(msg.contains("lead=(PT0S, PT3600S]"));
        assert!(msg.ends_with("failed to retrieve right data: no such file"));
    }

    #[test]
    fn aggregate_keeps_every_failure() {
        let e = PoolError::from_failures(vec![failure("A"), failure("B")]);
        match &e {
            PoolError::FeatureGroups {
                count, failures, ..
            } => {
                assert_eq!(*count, 2);
                assert_eq!(failures[1].feature_group, "B");
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(e.to_string().starts_with("2 pool(s) failed: "));
        assert!(e.to_string().contains("'A'"));
        assert!(e.to_string().contains("'B'"));
    }

    #[test]
    fn already_supplied_display() {
        assert_eq!(
            PoolCreationCause::AlreadySupplied.to_string(),
            "the pool has already been supplied"
        );
    }

    #[test]
    fn error_is_send_and_sync() {
        fn assert_impl<T: Send + Sync>() {}
        assert_impl::<PoolError>();
        assert_impl::<PoolCreationError>();
    }
}
