//! Configuration for pairing.

use std::fmt;

use chrono::TimeDelta;
use verity_timeseries::format_duration;

use crate::error::PairingError;

/// How a right event finds its left partner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PairingMode {
    /// Only a left event at exactly the same valid time.
    Exact,
    /// The nearest left event within `tolerance` either side, inclusive.
    /// Ties go to the earlier left event.
    Nearest {
        /// Largest admissible offset between left and right valid times.
        tolerance: TimeDelta,
    },
}

impl PairingMode {
    /// Returns the largest admissible offset.
    pub fn tolerance(&self) -> TimeDelta {
        match self {
            Self::Exact => TimeDelta::zero(),
            Self::Nearest { tolerance } => *tolerance,
        }
    }
}

impl fmt::Display for PairingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exact => f.write_str("exact"),
            Self::Nearest { tolerance } => write!(f, "nearest({})", format_duration(*tolerance)),
        }
    }
}

/// Configuration for the [`Pairer`](crate::Pairer).
///
/// # Example
///
/// ```
/// use chrono::TimeDelta;
/// use verity_pair::{PairConfig, PairingMode};
///
/// let config = PairConfig::new().with_mode(PairingMode::Nearest {
///     tolerance: TimeDelta::hours(1),
/// });
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone)]
pub struct PairConfig {
    mode: PairingMode,
}

impl PairConfig {
    /// Creates a new configuration with defaults.
    ///
    /// Defaults: `mode = Exact`.
    pub fn new() -> Self {
        Self {
            mode: PairingMode::Exact,
        }
    }

    /// Sets the pairing mode.
    pub fn with_mode(mut self, mode: PairingMode) -> Self {
        self.mode = mode;
        self
    }

    /// Returns the pairing mode.
    pub fn mode(&self) -> PairingMode {
        self.mode
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`PairingError::InvalidConfig`] if the tolerance is negative.
    pub fn validate(&self) -> Result<(), PairingError> {
        if self.mode.tolerance() < TimeDelta::zero() {
            return Err(PairingError::InvalidConfig {
                reason: format!(
                    "tolerance must be >= 0, got {}",
                    format_duration(self.mode.tolerance())
                ),
            });
        }
        Ok(())
    }
}

impl Default for PairConfig {
    fn default() -> Self {
        Self::new()
    }
}
