//! Configuration for pool assembly.

use verity_pair::PairConfig;
use verity_timeseries::TimeScale;
use verity_upscale::UpscaleConfig;

use crate::error::PoolError;

/// How the baseline is produced when no baseline source is given.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BaselineGenerator {
    /// No generated baseline.
    #[default]
    None,
    /// Persistence of the `lag`-th most recent left value before the
    /// forecast is issued.
    Persistence {
        /// Which past value persists; 1 is the most recent.
        lag: usize,
    },
}

/// Configuration for the [`PoolFactory`](crate::PoolFactory).
///
/// # Example
///
/// ```
/// use verity_pool::{BaselineGenerator, PoolConfig};
///
/// let config = PoolConfig::new("streamflow")
///     .with_baseline(BaselineGenerator::Persistence { lag: 1 })
///     .with_climatology(true);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone)]
pub struct PoolConfig {
    evaluation: String,
    desired_scale: Option<TimeScale>,
    upscale: UpscaleConfig,
    pair: PairConfig,
    baseline: BaselineGenerator,
    climatology: bool,
}

impl PoolConfig {
    /// Creates a new configuration with defaults.
    ///
    /// Defaults: no desired time scale, default upscaling and exact pairing,
    /// no generated baseline, no climatology.
    pub fn new(evaluation: impl Into<String>) -> Self {
        Self {
            evaluation: evaluation.into(),
            desired_scale: None,
            upscale: UpscaleConfig::new(),
            pair: PairConfig::new(),
            baseline: BaselineGenerator::None,
            climatology: false,
        }
    }

    /// Sets the time scale every pool is evaluated at.
    pub fn with_desired_scale(mut self, scale: Option<TimeScale>) -> Self {
        self.desired_scale = scale;
        self
    }

    /// Sets the upscaling configuration.
    pub fn with_upscale(mut self, upscale: UpscaleConfig) -> Self {
        self.upscale = upscale;
        self
    }

    /// Sets the pairing configuration.
    pub fn with_pair(mut self, pair: PairConfig) -> Self {
        self.pair = pair;
        self
    }

    /// Sets the generated baseline.
    pub fn with_baseline(mut self, baseline: BaselineGenerator) -> Self {
        self.baseline = baseline;
        self
    }

    /// Attach a climatology to every pool.
    pub fn with_climatology(mut self, climatology: bool) -> Self {
        self.climatology = climatology;
        self
    }

    /// Returns the evaluation name.
    pub fn evaluation(&self) -> &str {
        &self.evaluation
    }

    /// Returns the desired time scale.
    pub fn desired_scale(&self) -> Option<TimeScale> {
        self.desired_scale
    }

    /// Returns the upscaling configuration.
    pub fn upscale(&self) -> &UpscaleConfig {
        &self.upscale
    }

    /// Returns the pairing configuration.
    pub fn pair(&self) -> &PairConfig {
        &self.pair
    }

    /// Returns the generated baseline.
    pub fn baseline(&self) -> BaselineGenerator {
        self.baseline
    }

    /// Returns `true` if pools carry a climatology.
    pub fn climatology(&self) -> bool {
        self.climatology
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`PoolError::InvalidConfig`] for an empty evaluation name, a
    /// persistence lag of zero, or an invalid upscale or pair configuration.
    pub fn validate(&self) -> Result<(), PoolError> {
        if self.evaluation.trim().is_empty() {
            return Err(PoolError::InvalidConfig {
                reason: "evaluation name must not be empty".to_string(),
            });
        }
        if let BaselineGenerator::Persistence { lag: 0 } = self.baseline {
            return Err(PoolError::InvalidConfig {
                reason: "persistence lag must be >= 1".to_string(),
            });
        }
        self.upscale
            .validate()
            .map_err(|e| PoolError::InvalidConfig {
                reason: e.to_string(),
            })?;
        self.pair.validate().map_err(|e| PoolError::InvalidConfig {
            reason: e.to_string(),
        })?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeDelta;
    use verity_pair::PairingMode;

    #[test]
    fn defaults() {
        let c = PoolConfig::new("eval");
        assert_eq!(c.evaluation(), "eval");
        assert!(c.desired_scale().is_none());
        assert_eq!(c.baseline(), BaselineGenerator::None);
        assert!(!c.climatology());
        assert!(c.validate().is_ok());
    }

    #[test]
    fn empty_name_is_invalid() {
        assert!(PoolConfig::new("  ").validate().is_err());
    }

    #[test]
    fn zero_lag_is_invalid() {
        let c = PoolConfig::new("eval").with_baseline(BaselineGenerator::Persistence { lag: 0 });
        let err = c.validate().unwrap_err();
        assert!(err.to_string().contains("lag must be >= 1"));
    }

    #[test]
    fn nested_configs_are_validated() {
        let c = PoolConfig::new("eval").with_pair(PairConfig::new().with_mode(
            PairingMode::Nearest {
                tolerance: TimeDelta::hours(-1),
            },
        ));
        assert!(matches!(
            c.validate().unwrap_err(),
            PoolError::InvalidConfig { .. }
        ));
    }
}
