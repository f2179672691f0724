//! Error types for the verity-window crate.

use crate::config::Axis;

/// Error type for all fallible operations in the verity-window crate.
#[derive(Debug, Clone, thiserror::Error)]
pub enum WindowError {
    /// Returned when configuration is invalid.
    #[error("invalid configuration: {reason}")]
    InvalidConfig {
        /// Description of the problem.
        reason: String,
    },

    /// Accumulated validation failures.
    #[error("{count} validation error(s): {details}")]
    Validation { count: usize, details: String },

    /// Returned when pools are declared on an axis without bounds.
    #[error("pools are declared on the {axis} axis but the {axis} bounds are missing")]
    MissingBounds {
        /// The offending axis.
        axis: Axis,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_invalid_config() {
        let e = WindowError::InvalidConfig {
            reason: "period must be >= 0".to_string(),
        };
        assert_eq!(e.to_string(), "invalid configuration: period must be >= 0");
    }

    #[test]
    fn display_validation() {
        let e = WindowError::Validation {
            count: 2,
            details: "a; b".to_string(),
        };
        assert_eq!(e.to_string(), "2 validation error(s): a; b");
    }

    #[test]
    fn display_missing_bounds() {
        let e = WindowError::MissingBounds {
            axis: Axis::LeadDuration,
        };
        assert_eq!(
            e.to_string(),
            "pools are declared on the lead duration axis but the lead duration bounds are missing"
        );
    }

    #[test]
    fn error_is_send_and_sync() {
        fn assert_impl<T: Send + Sync>() {}
        assert_impl::<WindowError>();
    }
}
