//! The pool: paired series for one feature group and time window.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use verity_timeseries::{Feature, FeatureGroup, Pair, TimeScale, TimeSeries, TimeWindow};

/// Which side of the evaluation a pool's right values come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Orientation {
    /// Right values are the predictions being verified.
    Right,
    /// Right values are the baseline predictions.
    Baseline,
}

impl fmt::Display for Orientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Right => f.write_str("RIGHT"),
            Self::Baseline => f.write_str("BASELINE"),
        }
    }
}

/// Describes one pool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SampleMetadata {
    pool_id: u64,
    evaluation: Arc<str>,
    feature_group: FeatureGroup,
    time_window: TimeWindow,
    time_scale: Option<TimeScale>,
    orientation: Orientation,
}

impl SampleMetadata {
    pub(crate) fn new(
        pool_id: u64,
        evaluation: Arc<str>,
        feature_group: FeatureGroup,
        time_window: TimeWindow,
        time_scale: Option<TimeScale>,
    ) -> Self {
        Self {
            pool_id,
            evaluation,
            feature_group,
            time_window,
            time_scale,
            orientation: Orientation::Right,
        }
    }

    pub(crate) fn with_orientation(mut self, orientation: Orientation) -> Self {
        self.orientation = orientation;
        self
    }

    /// Returns the pool identifier.
    pub fn pool_id(&self) -> u64 {
        self.pool_id
    }

    /// Returns the evaluation name.
    pub fn evaluation(&self) -> &str {
        &self.evaluation
    }

    /// Returns the feature group.
    pub fn feature_group(&self) -> &FeatureGroup {
        &self.feature_group
    }

    /// Returns the time window.
    pub fn time_window(&self) -> &TimeWindow {
        &self.time_window
    }

    /// Returns the time scale of the paired values.
    pub fn time_scale(&self) -> Option<TimeScale> {
        self.time_scale
    }

    /// Returns the orientation.
    pub fn orientation(&self) -> Orientation {
        self.orientation
    }
}

impl fmt::Display for SampleMetadata {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "pool {} ({}) of '{}' for {} {}",
            self.pool_id, self.orientation, self.evaluation, self.feature_group, self.time_window
        )
    }
}

// ---------------------------------------------------------------------------
// Climatology
// ---------------------------------------------------------------------------

/// Finite left values per feature, for the whole evaluation period.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Climatology {
    values: BTreeMap<Feature, Vec<f64>>,
}

impl Climatology {
    /// Collects the finite values of every series, grouped by feature.
    pub fn from_series(series: &[TimeSeries<f64>]) -> Self {
        let mut values: BTreeMap<Feature, Vec<f64>> = BTreeMap::new();
        for s in series {
            let finite = s
                .events()
                .iter()
                .map(|e| *e.value())
                .filter(|v| v.is_finite());
            values
                .entry(s.metadata().feature().clone())
                .or_default()
                .extend(finite);
        }
        Self { values }
    }

    /// Returns the values of `feature`.
    pub fn get(&self, feature: &Feature) -> Option<&[f64]> {
        self.values.get(feature).map(Vec::as_slice)
    }

    /// Returns the features with values.
    pub fn features(&self) -> impl Iterator<Item = &Feature> {
        self.values.keys()
    }

    /// Returns the total number of values.
    pub fn len(&self) -> usize {
        self.values.values().map(Vec::len).sum()
    }

    /// Returns `true` if there are no values.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// ---------------------------------------------------------------------------
// Pool
// ---------------------------------------------------------------------------

/// Paired series of one feature group and time window, with an optional
/// nested baseline pool and climatology.
#[derive(Debug, Clone)]
pub struct Pool<R> {
    metadata: SampleMetadata,
    series: Vec<TimeSeries<Pair<f64, R>>>,
    baseline: Option<Box<Pool<R>>>,
    climatology: Option<Arc<Climatology>>,
}

impl<R> Pool<R> {
    pub(crate) fn new(metadata: SampleMetadata, series: Vec<TimeSeries<Pair<f64, R>>>) -> Self {
        Self {
            metadata,
            series,
            baseline: None,
            climatology: None,
        }
    }

    pub(crate) fn with_baseline(mut self, baseline: Option<Pool<R>>) -> Self {
        self.baseline = baseline.map(Box::new);
        self
    }

    pub(crate) fn with_climatology(mut self, climatology: Option<Arc<Climatology>>) -> Self {
        self.climatology = climatology;
        self
    }

    /// Returns the pool description.
    pub fn metadata(&self) -> &SampleMetadata {
        &self.metadata
    }

    /// Returns the paired series in time order.
    pub fn series(&self) -> &[TimeSeries<Pair<f64, R>>] {
        &self.series
    }

    /// Returns the number of pairs across all series.
    pub fn pair_count(&self) -> usize {
        self.series.iter().map(TimeSeries::len).sum()
    }

    /// Returns the paired series of `feature`.
    pub fn series_for<'a>(
        &'a self,
        feature: &'a Feature,
    ) -> impl Iterator<Item = &'a TimeSeries<Pair<f64, R>>> + 'a {
        self.series
            .iter()
            .filter(move |s| s.metadata().feature() == feature)
    }

    /// Returns `true` if the pool has a baseline pool.
    pub fn has_baseline(&self) -> bool {
        self.baseline.is_some()
    }

    /// Returns the baseline pool.
    pub fn baseline(&self) -> Option<&Pool<R>> {
        self.baseline.as_deref()
    }

    /// Returns the climatology.
    pub fn climatology(&self) -> Option<&Arc<Climatology>> {
        self.climatology.as_ref()
    }
}
