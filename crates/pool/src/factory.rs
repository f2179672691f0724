//! Creation of pool suppliers for every feature group and time window.

use std::sync::{Arc, OnceLock};

use tracing::info;
use verity_pair::Pairer;
use verity_timeseries::{FeatureGroup, TimeWindow};
use verity_upscale::Upscaler;

use crate::config::PoolConfig;
use crate::error::PoolError;
use crate::id::PoolIdGenerator;
use crate::source::{CachingSupplier, DataSource, SeriesSupplier};
use crate::supplier::{Engine, GroupContext, PoolSupplier, RightValue};

/// Builds [`PoolSupplier`]s from a configuration and injected data sources.
///
/// Left data is read once per feature group and shared by every window of
/// that group.
pub struct PoolFactory<R> {
    config: PoolConfig,
    left: Arc<dyn DataSource<f64>>,
    right: Arc<dyn DataSource<R>>,
    baseline: Option<Arc<dyn DataSource<R>>>,
    ids: Arc<PoolIdGenerator>,
}

impl<R: RightValue> PoolFactory<R> {
    /// Creates a factory.
    ///
    /// # Errors
    ///
    /// Returns [`PoolError::InvalidConfig`] if `config` is invalid.
    pub fn new(
        config: PoolConfig,
        left: Arc<dyn DataSource<f64>>,
        right: Arc<dyn DataSource<R>>,
        ids: Arc<PoolIdGenerator>,
    ) -> Result<Self, PoolError> {
        config.validate()?;
        Ok(Self {
            config,
            left,
            right,
            baseline: None,
            ids,
        })
    }

    /// Sets the source of baseline series. A baseline source takes
    /// precedence over a generated baseline.
    pub fn with_baseline_source(mut self, baseline: Arc<dyn DataSource<R>>) -> Self {
        self.baseline = Some(baseline);
        self
    }

    /// Returns the configuration.
    pub fn config(&self) -> &PoolConfig {
        &self.config
    }

    /// Returns one supplier per feature group and window, feature groups
    /// outer and windows inner.
    ///
    /// # Errors
    ///
    /// Returns [`PoolError::InvalidConfig`] if the upscaler or pairer cannot
    /// be built from the configuration.
    pub fn suppliers(
        &self,
        groups: &[FeatureGroup],
        windows: &[TimeWindow],
    ) -> Result<Vec<PoolSupplier<R>>, PoolError> {
        let invalid = |reason: String| PoolError::InvalidConfig { reason };
        let engine = Arc::new(Engine {
            config: self.config.clone(),
            evaluation: Arc::from(self.config.evaluation()),
            upscaler: Upscaler::new(self.config.upscale().clone())
                .map_err(|e| invalid(e.to_string()))?,
            pairer: Pairer::new(self.config.pair().clone()).map_err(|e| invalid(e.to_string()))?,
            right: Arc::clone(&self.right),
            baseline: self.baseline.clone(),
            ids: Arc::clone(&self.ids),
        });

        let left_window = TimeWindow::union(windows)
            .unwrap_or_default()
            .adjust_for_time_scale(self.config.desired_scale());

        let mut suppliers = Vec::with_capacity(groups.len() * windows.len());
        for group in groups {
            let source = Arc::clone(&self.left);
            let owned = group.clone();
            let inner: SeriesSupplier<f64> =
                Arc::new(move || source.retrieve(&owned, &left_window));
            let context = Arc::new(GroupContext {
                group: group.clone(),
                left: CachingSupplier::new(inner),
                climatology: OnceLock::new(),
            });
            for window in windows {
                suppliers.push(PoolSupplier::new(
                    Arc::clone(&engine),
                    Arc::clone(&context),
                    *window,
                ));
            }
        }

        info!(
            evaluation = self.config.evaluation(),
            groups = groups.len(),
            windows = windows.len(),
            pools = suppliers.len(),
            "created pool suppliers"
        );
        Ok(suppliers)
    }
}
