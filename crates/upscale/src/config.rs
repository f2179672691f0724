//! Configuration for upscaling.

use std::fmt;
use std::str::FromStr;

use crate::error::UpscalingError;

/// Policy for intervals that are not fully covered by events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Lenience {
    /// Only aggregate intervals that are covered exactly.
    #[default]
    Strict,
    /// Aggregate whatever finite values are present, if any.
    Lenient,
}

impl fmt::Display for Lenience {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Strict => f.write_str("strict"),
            Self::Lenient => f.write_str("lenient"),
        }
    }
}

impl FromStr for Lenience {
    type Err = UpscalingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "strict" | "none" => Ok(Self::Strict),
            "lenient" | "all" => Ok(Self::Lenient),
            other => Err(UpscalingError::InvalidConfig {
                reason: format!("unknown lenience: {other:?}"),
            }),
        }
    }
}

/// Configuration for the [`Upscaler`](crate::Upscaler).
///
/// # Example
///
/// ```
/// use verity_upscale::{Lenience, UpscaleConfig};
///
/// let config = UpscaleConfig::new().with_lenience(Lenience::Lenient);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone)]
pub struct UpscaleConfig {
    lenience: Lenience,
    min_events: usize,
}

impl UpscaleConfig {
    /// Creates a new configuration with defaults.
    ///
    /// Defaults: `lenience = Strict`, `min_events = 1`.
    pub fn new() -> Self {
        Self {
            lenience: Lenience::Strict,
            min_events: 1,
        }
    }

    /// Sets the lenience policy.
    pub fn with_lenience(mut self, lenience: Lenience) -> Self {
        self.lenience = lenience;
        self
    }

    /// Sets the minimum number of finite events a lenient interval needs.
    pub fn with_min_events(mut self, n: usize) -> Self {
        self.min_events = n;
        self
    }

    /// Returns the lenience policy.
    pub fn lenience(&self) -> Lenience {
        self.lenience
    }

    /// Returns the minimum number of finite events for lenient aggregation.
    pub fn min_events(&self) -> usize {
        self.min_events
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`UpscalingError::InvalidConfig`] if `min_events` is zero.
    pub fn validate(&self) -> Result<(), UpscalingError> {
        if self.min_events == 0 {
            return Err(UpscalingError::InvalidConfig {
                reason: "min_events must be >= 1".to_string(),
            });
        }
        Ok(())
    }
}

impl Default for UpscaleConfig {
    fn default() -> Self {
        Self::new()
    }
}
