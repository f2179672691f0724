//! Injected data sources and the memoizing supplier.

use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use tracing::debug;
use verity_timeseries::{FeatureGroup, TimeSeries, TimeWindow};

use crate::error::RetrievalError;

/// Retrieves the time-series of one feature group within a window.
pub trait DataSource<T>: Send + Sync {
    /// Returns every series for `group` that may fall within `window`.
    ///
    /// # Errors
    ///
    /// Returns [`RetrievalError`] if the data cannot be read.
    fn retrieve(
        &self,
        group: &FeatureGroup,
        window: &TimeWindow,
    ) -> Result<Vec<TimeSeries<T>>, RetrievalError>;
}

impl<T, F> DataSource<T> for F
where
    F: Fn(&FeatureGroup, &TimeWindow) -> Result<Vec<TimeSeries<T>>, RetrievalError> + Send + Sync,
{
    fn retrieve(
        &self,
        group: &FeatureGroup,
        window: &TimeWindow,
    ) -> Result<Vec<TimeSeries<T>>, RetrievalError> {
        self(group, window)
    }
}

/// Deferred retrieval of a fixed set of series.
pub type SeriesSupplier<T> =
    Arc<dyn Fn() -> Result<Vec<TimeSeries<T>>, RetrievalError> + Send + Sync>;

// ---------------------------------------------------------------------------
// CachingSupplier
// ---------------------------------------------------------------------------

/// Runs the inner supplier once and replays its series afterwards.
///
/// Concurrent first calls block on one materialization. A failed call is
/// not cached, so the next call tries again.
pub struct CachingSupplier<T> {
    inner: SeriesSupplier<T>,
    cache: Mutex<Option<Arc<[TimeSeries<T>]>>>,
    calls: AtomicUsize,
}

impl<T> CachingSupplier<T> {
    /// Wraps `inner`.
    pub fn new(inner: SeriesSupplier<T>) -> Self {
        Self {
            inner,
            cache: Mutex::new(None),
            calls: AtomicUsize::new(0),
        }
    }

    /// Returns the buffered series, materializing them on first use.
    ///
    /// # Errors
    ///
    /// Returns the inner supplier's [`RetrievalError`]. The failure is not
    /// cached.
    pub fn get(&self) -> Result<Arc<[TimeSeries<T>]>, RetrievalError> {
        let mut cache = self
            .cache
            .lock()
            .map_err(|_| RetrievalError::new("cached", "supplier lock poisoned"))?;
        if let Some(series) = cache.as_ref() {
            return Ok(Arc::clone(series));
        }
        self.calls.fetch_add(1, Ordering::SeqCst);
        let series: Arc<[TimeSeries<T>]> = (self.inner)()?.into();
        debug!(count = series.len(), "materialized cached series");
        *cache = Some(Arc::clone(&series));
        Ok(series)
    }

    /// Returns how often the inner supplier has run.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl<T> fmt::Debug for CachingSupplier<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CachingSupplier")
            .field("calls", &self.calls())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use std::sync::atomic::AtomicBool;
    use verity_timeseries::{Event, Feature, TimeSeriesMetadata};

    fn one_series() -> Vec<TimeSeries<f64>> {
        let meta = TimeSeriesMetadata::new("QINE", Feature::new("DRRC2"), "CMS");
        let t = Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap();
        vec![TimeSeries::new(meta, vec![Event::new(t, 1.0)]).unwrap()]
    }

    #[test]
    fn materializes_once() {
        let supplier = CachingSupplier::new(Arc::new(|| Ok::<_, RetrievalError>(one_series())));
        let a = supplier.get().unwrap();
        let b = supplier.get().unwrap();
        assert_eq!(supplier.calls(), 1);
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn failure_is_not_cached() {
        let failed = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&failed);
        let supplier = CachingSupplier::new(Arc::new(move || {
            if flag.swap(true, Ordering::SeqCst) {
                Ok(one_series())
            } else {
                Err(RetrievalError::new("left", "transient"))
            }
        }));
        assert!(supplier.get().is_err());
        assert_eq!(supplier.get().unwrap().len(), 1);
        assert_eq!(supplier.calls(), 2);
        assert!(failed.load(Ordering::SeqCst));
    }

    #[test]
    fn closures_are_data_sources() {
        let source = |_: &FeatureGroup, _: &TimeWindow| Ok::<_, RetrievalError>(one_series());
        let group = verity_timeseries::FeatureGroup::singleton(
            verity_timeseries::FeatureTuple::of(Feature::new("DRRC2")),
        );
        let got = DataSource::<f64>::retrieve(&source, &group, &TimeWindow::unbounded()).unwrap();
        assert_eq!(got.len(), 1);
    }
}
