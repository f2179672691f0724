//! Per-source tracking of the time-series read during ingest.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::{Mutex, PoisonError};

use tracing::debug;
use verity_timeseries::{Ensemble, TimeSeries, TimeSeriesMetadata};

use crate::error::IngestError;

/// Kind of data held by a source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DataType {
    /// Single-valued series without reference times.
    Observations,
    /// Single-valued series with reference times.
    SingleValuedForecasts,
    /// Ensemble series.
    EnsembleForecasts,
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Observations => "observations",
            Self::SingleValuedForecasts => "single-valued forecasts",
            Self::EnsembleForecasts => "ensemble forecasts",
        };
        f.write_str(name)
    }
}

/// Event types whose series have a [`DataType`].
pub trait DataTyped {
    /// Returns the data type of a series with `metadata`.
    fn data_type(metadata: &TimeSeriesMetadata) -> DataType;
}

impl DataTyped for f64 {
    fn data_type(metadata: &TimeSeriesMetadata) -> DataType {
        if metadata.reference_times().is_empty() {
            DataType::Observations
        } else {
            DataType::SingleValuedForecasts
        }
    }
}

impl DataTyped for Ensemble {
    fn data_type(_: &TimeSeriesMetadata) -> DataType {
        DataType::EnsembleForecasts
    }
}

/// What has been read from one source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceRecord {
    data_type: DataType,
    series: usize,
    events: usize,
}

impl SourceRecord {
    /// Returns the data type of the source.
    pub fn data_type(&self) -> DataType {
        self.data_type
    }

    /// Returns the number of series read.
    pub fn series(&self) -> usize {
        self.series
    }

    /// Returns the number of events read.
    pub fn events(&self) -> usize {
        self.events
    }
}

/// Records the data type and volume of every source. Safe to share
/// between concurrent readers.
#[derive(Debug, Default)]
pub struct SourceTracker {
    sources: Mutex<BTreeMap<String, SourceRecord>>,
}

impl SourceTracker {
    /// Creates an empty tracker.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `series` as read from `source` and returns its data type.
    ///
    /// # Errors
    ///
    /// Returns [`IngestError::MixedDataTypes`] if `source` already yielded
    /// series of another data type.
    pub fn track<T: DataTyped>(
        &self,
        source: &str,
        series: &TimeSeries<T>,
    ) -> Result<DataType, IngestError> {
        let data_type = T::data_type(series.metadata());
        let mut sources = self.sources.lock().unwrap_or_else(PoisonError::into_inner);
        let record = sources.entry(source.to_string()).or_insert(SourceRecord {
            data_type,
            series: 0,
            events: 0,
        });
        if record.data_type != data_type {
            return Err(IngestError::MixedDataTypes {
                source_name: source.to_string(),
                existing: record.data_type,
                found: data_type,
            });
        }
        record.series += 1;
        record.events += series.len();
        debug!(source, %data_type, events = series.len(), "tracked series");
        Ok(data_type)
    }

    /// Returns the record of `source`.
    pub fn record(&self, source: &str) -> Option<SourceRecord> {
        self.sources
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(source)
            .copied()
    }

    /// Returns every data type seen.
    pub fn data_types(&self) -> BTreeSet<DataType> {
        self.sources
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .map(SourceRecord::data_type)
            .collect()
    }

    /// Returns the names of the tracked sources, sorted.
    pub fn sources(&self) -> Vec<String> {
        self.sources
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect()
    }
}
