//! One-shot construction of a single pool.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};

use chrono::TimeDelta;
use tracing::{debug, warn};
use verity_pair::Pairer;
use verity_timeseries::slice::{snip_to_series, snip_to_window, sort_in_time_order};
use verity_timeseries::{
    Feature, FeatureGroup, FeatureTuple, MissingValue, Pair, TimeSeries, TimeWindow,
};
use verity_upscale::{Upscalable, Upscaler};

use crate::baseline::persistence;
use crate::config::{BaselineGenerator, PoolConfig};
use crate::error::{PoolCreationCause, PoolCreationError};
use crate::id::PoolIdGenerator;
use crate::pool::{Climatology, Orientation, Pool, SampleMetadata};
use crate::source::{CachingSupplier, DataSource};

/// Values a pool can hold on its right side.
pub trait RightValue:
    Upscalable + MissingValue + From<f64> + Clone + Send + Sync + 'static
{
}

impl<T> RightValue for T where
    T: Upscalable + MissingValue + From<f64> + Clone + Send + Sync + 'static
{
}

/// Everything a supplier needs that is shared across the whole evaluation.
pub(crate) struct Engine<R> {
    pub(crate) config: PoolConfig,
    pub(crate) evaluation: Arc<str>,
    pub(crate) upscaler: Upscaler,
    pub(crate) pairer: Pairer<f64, R>,
    pub(crate) right: Arc<dyn DataSource<R>>,
    pub(crate) baseline: Option<Arc<dyn DataSource<R>>>,
    pub(crate) ids: Arc<PoolIdGenerator>,
}

/// State shared by every pool of one feature group.
pub(crate) struct GroupContext {
    pub(crate) group: FeatureGroup,
    pub(crate) left: CachingSupplier<f64>,
    pub(crate) climatology: OnceLock<Arc<Climatology>>,
}

type LeftByFeature<'a> = BTreeMap<&'a Feature, Vec<&'a TimeSeries<f64>>>;

/// Lazily builds the pool of one feature group and time window.
///
/// A supplier yields its pool once. Later calls to [`get`](Self::get) fail.
pub struct PoolSupplier<R> {
    engine: Arc<Engine<R>>,
    context: Arc<GroupContext>,
    window: TimeWindow,
    supplied: AtomicBool,
}

impl<R: RightValue> PoolSupplier<R> {
    pub(crate) fn new(
        engine: Arc<Engine<R>>,
        context: Arc<GroupContext>,
        window: TimeWindow,
    ) -> Self {
        Self {
            engine,
            context,
            window,
            supplied: AtomicBool::new(false),
        }
    }

    /// Returns the feature group.
    pub fn feature_group(&self) -> &FeatureGroup {
        &self.context.group
    }

    /// Returns the time window.
    pub fn time_window(&self) -> &TimeWindow {
        &self.window
    }

    /// Builds the pool.
    ///
    /// # Errors
    ///
    /// Returns [`PoolCreationError`] when retrieval, upscaling or pairing
    /// fails, or when the pool was already supplied.
    pub fn get(&self) -> Result<Pool<R>, PoolCreationError> {
        let result = if self.supplied.swap(true, Ordering::SeqCst) {
            Err(PoolCreationCause::AlreadySupplied)
        } else {
            self.create()
        };
        result.map_err(|cause| PoolCreationError {
            feature_group: self.context.group.name().to_string(),
            time_window: self.window,
            cause,
        })
    }

    #[tracing::instrument(skip_all, fields(group = %self.context.group, window = %self.window))]
    fn create(&self) -> Result<Pool<R>, PoolCreationCause> {
        let engine = &self.engine;
        let group = &self.context.group;
        let id = engine.ids.next_id();
        let desired = engine.config.desired_scale();

        let left = self.context.left.get()?;
        let mut left_by_feature: LeftByFeature<'_> = BTreeMap::new();
        for series in left.iter() {
            left_by_feature
                .entry(series.metadata().feature())
                .or_default()
                .push(series);
        }

        let adjusted = self.window.adjust_for_time_scale(desired);
        let rights = self.rescale(engine.right.retrieve(group, &adjusted)?)?;
        let pairs = self.pair_all(&left_by_feature, &rights, Orientation::Right)?;

        let baselines = match (&engine.baseline, engine.config.baseline()) {
            (Some(source), _) => Some(self.rescale(source.retrieve(group, &adjusted)?)?),
            (None, BaselineGenerator::Persistence { lag }) => {
                Some(self.persistence_all(&left_by_feature, &rights, lag))
            }
            (None, BaselineGenerator::None) => None,
        };

        let metadata = SampleMetadata::new(
            id,
            Arc::clone(&engine.evaluation),
            group.clone(),
            self.window,
            desired,
        );
        let baseline = match baselines {
            Some(series) => {
                let paired = self.pair_all(&left_by_feature, &series, Orientation::Baseline)?;
                Some(Pool::new(
                    metadata.clone().with_orientation(Orientation::Baseline),
                    paired,
                ))
            }
            None => None,
        };
        let climatology = engine.config.climatology().then(|| {
            Arc::clone(
                self.context
                    .climatology
                    .get_or_init(|| Arc::new(Climatology::from_series(&left))),
            )
        });

        let pool = Pool::new(metadata, pairs)
            .with_baseline(baseline)
            .with_climatology(climatology);
        debug!(
            pool = id,
            group = %group,
            window = %self.window,
            pairs = pool.pair_count(),
            "created pool"
        );
        Ok(pool)
    }

    /// Upscales right or baseline series to the desired time scale.
    fn rescale(
        &self,
        series: Vec<TimeSeries<R>>,
    ) -> Result<Vec<TimeSeries<R>>, PoolCreationCause> {
        let Some(desired) = self.engine.config.desired_scale() else {
            return Ok(series);
        };
        series
            .iter()
            .map(|s| {
                self.engine
                    .upscaler
                    .upscale(s, desired, &BTreeSet::new())
                    .map_err(PoolCreationCause::from)
            })
            .collect()
    }

    fn tuples_for<'a>(&'a self, feature: &'a Feature, side: Orientation) -> Vec<&'a FeatureTuple> {
        let group = &self.context.group;
        match side {
            Orientation::Right => group.tuples_for_right(feature).collect(),
            Orientation::Baseline => group.tuples_for_baseline(feature).collect(),
        }
    }

    /// Pairs each right-side series with the left series of its mapped
    /// feature, then snips the pairs to the pool window.
    fn pair_all(
        &self,
        left_by_feature: &LeftByFeature<'_>,
        rights: &[TimeSeries<R>],
        side: Orientation,
    ) -> Result<Vec<TimeSeries<Pair<f64, R>>>, PoolCreationCause> {
        let desired = self.engine.config.desired_scale();
        let lower_buffer = desired.map_or(TimeDelta::zero(), |d| d.period());
        let mut paired = Vec::new();
        let mut counts: BTreeMap<&FeatureTuple, usize> = BTreeMap::new();

        for right in rights {
            let tuples = self.tuples_for(right.metadata().feature(), side);
            if tuples.is_empty() {
                debug!(series = %right.metadata(), "no feature tuple for series");
                continue;
            }
            let end_times: BTreeSet<_> = right.valid_times().collect();
            for tuple in tuples {
                let Some(lefts) = left_by_feature.get(tuple.left()) else {
                    continue;
                };
                for left in lefts {
                    let snipped =
                        snip_to_series((*left).clone(), right, lower_buffer, TimeDelta::zero());
                    let scaled = match desired {
                        Some(d) => self.engine.upscaler.upscale(&snipped, d, &end_times)?,
                        None => snipped,
                    };
                    let pairs = self.engine.pairer.pair(&scaled, right)?;
                    let pairs = snip_to_window(pairs, &self.window);
                    *counts.entry(tuple).or_default() += pairs.len();
                    if !pairs.is_empty() {
                        paired.push(pairs);
                    }
                }
            }
        }

        for tuple in self.context.group.features() {
            if counts.get(tuple).copied().unwrap_or(0) == 0 {
                warn!(
                    feature = %tuple,
                    orientation = %side,
                    window = %self.window,
                    "no pairs for feature"
                );
            }
        }

        sort_in_time_order(&mut paired);
        Ok(paired)
    }

    /// Generates one persistence series per right series and mapped tuple.
    fn persistence_all(
        &self,
        left_by_feature: &LeftByFeature<'_>,
        rights: &[TimeSeries<R>],
        lag: usize,
    ) -> Vec<TimeSeries<R>> {
        let mut generated = Vec::new();
        for right in rights {
            for tuple in self.tuples_for(right.metadata().feature(), Orientation::Right) {
                let Some(lefts) = left_by_feature.get(tuple.left()) else {
                    continue;
                };
                if let Some(series) = persistence(lefts, right, lag, tuple.baseline()) {
                    generated.push(series);
                }
            }
        }
        generated
    }
}
