//! Reading time-series from JSON documents.
//!
//! ```json
//! {
//!   "series": [
//!     {
//!       "feature": "DRRC2",
//!       "variable": "STREAMFLOW",
//!       "unit": "CMS",
//!       "reference_time": "2551-03-17T00:00:00Z",
//!       "time_scale": { "period_seconds": 3600, "function": "mean" },
//!       "missing_values": [-999.0],
//!       "events": [{ "time": "2551-03-17T01:00:00Z", "value": 1.5 }]
//!     }
//!   ]
//! }
//! ```
//!
//! Ensemble series carry `{"time", "members"}` events and optional
//! `labels`. A `null` value is missing.

use std::path::Path;
use std::sync::Arc;

use chrono::{DateTime, TimeDelta, Utc};
use serde::Deserialize;
use tracing::{debug, info};
use verity_timeseries::{
    Ensemble, Event, Feature, MISSING_DOUBLE, ReferenceTimeType, TimeScale, TimeScaleFunction,
    TimeSeries, TimeSeriesMetadata,
};

use crate::error::IngestError;
use crate::missing::MissingValues;

// ---------------------------------------------------------------------------
// Document model
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct Document {
    series: Vec<SeriesRecord>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct SeriesRecord {
    feature: String,
    variable: String,
    unit: String,
    #[serde(default)]
    reference_time: Option<DateTime<Utc>>,
    #[serde(default)]
    time_scale: Option<TimeScaleRecord>,
    #[serde(default)]
    missing_values: Vec<f64>,
    #[serde(default)]
    labels: Option<Vec<String>>,
    events: Vec<EventRecord>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct TimeScaleRecord {
    period_seconds: i64,
    function: String,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum EventRecord {
    Ensemble {
        time: DateTime<Utc>,
        members: Vec<Option<f64>>,
    },
    Single {
        time: DateTime<Utc>,
        value: Option<f64>,
    },
}

// ---------------------------------------------------------------------------
// SeriesSet
// ---------------------------------------------------------------------------

/// The series read from one document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SeriesSet {
    /// Single-valued series, in document order.
    pub single_valued: Vec<TimeSeries<f64>>,
    /// Ensemble series, in document order.
    pub ensemble: Vec<TimeSeries<Ensemble>>,
}

impl SeriesSet {
    /// Returns the number of series.
    pub fn len(&self) -> usize {
        self.single_valued.len() + self.ensemble.len()
    }

    /// Returns `true` if there are no series.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// ---------------------------------------------------------------------------
// Reading
// ---------------------------------------------------------------------------

/// Reads a JSON time-series document from `path`.
///
/// # Errors
///
/// Returns [`IngestError::FileNotFound`] or [`IngestError::Io`] if the
/// file cannot be read, and the errors of [`parse_json`] otherwise.
pub fn read_json(path: &Path) -> Result<SeriesSet, IngestError> {
    if !path.exists() {
        return Err(IngestError::FileNotFound {
            path: path.to_path_buf(),
        });
    }
    let text = std::fs::read_to_string(path).map_err(|e| IngestError::Io {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    let set = parse_json(&text)?;
    info!(
        path = %path.display(),
        single_valued = set.single_valued.len(),
        ensemble = set.ensemble.len(),
        "read time-series document"
    );
    Ok(set)
}

/// Parses a JSON time-series document.
///
/// # Errors
///
/// Returns [`IngestError::Json`] if the text is not a valid document, or
/// [`IngestError::InvalidSeries`] if a series is malformed.
pub fn parse_json(text: &str) -> Result<SeriesSet, IngestError> {
    let document: Document = serde_json::from_str(text).map_err(|e| IngestError::Json {
        reason: e.to_string(),
    })?;

    let mut set = SeriesSet::default();
    for (index, record) in document.series.into_iter().enumerate() {
        let invalid = |reason: String| IngestError::InvalidSeries { index, reason };
        let metadata = metadata(&record).map_err(invalid)?;
        let missing = MissingValues::new(record.missing_values.iter().copied());

        let is_ensemble = record
            .events
            .first()
            .is_some_and(|e| matches!(e, EventRecord::Ensemble { .. }));
        if is_ensemble {
            let series = ensemble_series(metadata, record.events, record.labels)
                .map_err(|e| invalid(e.to_string()))?;
            set.ensemble.push(missing.apply(series));
        } else {
            let series =
                single_series(metadata, record.events).map_err(|e| invalid(e.to_string()))?;
            set.single_valued.push(missing.apply(series));
        }
    }
    debug!(series = set.len(), "parsed time-series document");
    Ok(set)
}

fn metadata(record: &SeriesRecord) -> Result<TimeSeriesMetadata, String> {
    let mut metadata = TimeSeriesMetadata::new(
        &record.variable,
        Feature::new(&record.feature),
        &record.unit,
    );
    if let Some(reference) = record.reference_time {
        metadata = metadata.with_reference_time(ReferenceTimeType::T0, reference);
    }
    if let Some(scale) = &record.time_scale {
        metadata = metadata.with_time_scale(Some(time_scale(scale)?));
    }
    Ok(metadata)
}

fn time_scale(record: &TimeScaleRecord) -> Result<TimeScale, String> {
    if record.period_seconds == 0 {
        return Ok(TimeScale::instantaneous());
    }
    let function: TimeScaleFunction = record.function.parse::<TimeScaleFunction>().map_err(|e| e.to_string())?;
    TimeScale::new(TimeDelta::seconds(record.period_seconds), function).map_err(|e| e.to_string())
}

fn single_series(
    metadata: TimeSeriesMetadata,
    events: Vec<EventRecord>,
) -> Result<TimeSeries<f64>, IngestError> {
    let events = events
        .into_iter()
        .map(|e| match e {
            EventRecord::Single { time, value } => {
                Ok(Event::new(time, value.unwrap_or(MISSING_DOUBLE)))
            }
            EventRecord::Ensemble { time, .. } => Err(mixed_events(time)),
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(TimeSeries::new(metadata, events)?)
}

fn ensemble_series(
    metadata: TimeSeriesMetadata,
    events: Vec<EventRecord>,
    labels: Option<Vec<String>>,
) -> Result<TimeSeries<Ensemble>, IngestError> {
    let labels: Option<Arc<[String]>> = labels.map(Into::into);
    let events = events
        .into_iter()
        .map(|e| -> Result<Event<Ensemble>, IngestError> {
            match e {
                EventRecord::Ensemble { time, members } => {
                    let members = members
                        .into_iter()
                        .map(|m| m.unwrap_or(MISSING_DOUBLE))
                        .collect();
                    let ensemble = match &labels {
                        Some(labels) => Ensemble::with_labels(members, Arc::clone(labels))?,
                        None => Ensemble::new(members),
                    };
                    Ok(Event::new(time, ensemble))
                }
                EventRecord::Single { time, .. } => Err(mixed_events(time)),
            }
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(TimeSeries::new(metadata, events)?)
}

fn mixed_events(time: DateTime<Utc>) -> IngestError {
    IngestError::Json {
        reason: format!("event at {time} mixes single-valued and ensemble values"),
    }
}
