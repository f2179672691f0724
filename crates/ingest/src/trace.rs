//! Decomposition of ensemble series into member traces and back.

use std::sync::Arc;

use verity_timeseries::{Ensemble, Event, TimeSeries, TimeSeriesMetadata};

use crate::error::IngestError;

/// A labelled single-valued trace of one ensemble member.
pub type Trace = (String, TimeSeries<f64>);

/// Splits `series` into one trace per member.
///
/// Traces are labelled with the ensemble labels, or with the member index
/// when the ensemble is unlabelled.
///
/// # Errors
///
/// Returns [`IngestError::RaggedEnsemble`] if events differ in member count.
pub fn decompose(series: &TimeSeries<Ensemble>) -> Result<Vec<Trace>, IngestError> {
    let Some(first) = series.events().first() else {
        return Ok(Vec::new());
    };
    let width = first.value().len();
    for event in series.events() {
        if event.value().len() != width {
            return Err(IngestError::RaggedEnsemble {
                time: event.time(),
                expected: width,
                found: event.value().len(),
            });
        }
    }

    let labels: Vec<String> = match first.value().labels() {
        Some(labels) => labels.iter().cloned().collect(),
        None => (0..width).map(|i| i.to_string()).collect(),
    };
    labels
        .into_iter()
        .enumerate()
        .map(|(i, label)| -> Result<Trace, IngestError> {
            let events = series
                .events()
                .iter()
                .map(|e| Event::new(e.time(), e.value().members()[i]))
                .collect();
            Ok((label, TimeSeries::new(series.metadata().clone(), events)?))
        })
        .collect()
}

/// Rebuilds an ensemble series from member traces, in trace order.
///
/// # Errors
///
/// Returns [`IngestError::TraceMismatch`] if a trace does not have the
/// valid times of the first trace.
pub fn compose(
    metadata: TimeSeriesMetadata,
    traces: &[Trace],
) -> Result<TimeSeries<Ensemble>, IngestError> {
    let Some((_, first)) = traces.first() else {
        return Ok(TimeSeries::empty(metadata));
    };
    for (label, trace) in traces {
        if !trace.valid_times().eq(first.valid_times()) {
            return Err(IngestError::TraceMismatch {
                label: label.clone(),
                expected: first.len(),
                found: trace.len(),
            });
        }
    }

    let labels: Arc<[String]> = traces.iter().map(|(label, _)| label.clone()).collect();
    let mut builder = TimeSeries::builder(metadata);
    for (i, event) in first.events().iter().enumerate() {
        let members = traces
            .iter()
            .map(|(_, trace)| *trace.events()[i].value())
            .collect();
        builder.add(event.time(), Ensemble::with_labels(members, Arc::clone(&labels))?);
    }
    Ok(builder.build()?)
}
