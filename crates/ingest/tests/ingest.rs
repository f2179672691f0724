use std::io::Write;
use std::sync::Arc;

use chrono::{DateTime, TimeDelta, TimeZone, Utc};
use verity_ingest::{
    DataType, IngestError, MissingValues, SourceTracker, compose, decompose, parse_json,
    parse_missing_value, read_json,
};
use verity_timeseries::{
    Ensemble, Event, Feature, MISSING_DOUBLE, ReferenceTimeType, TimeScale, TimeScaleFunction,
    TimeSeries, TimeSeriesMetadata,
};

const SENTINEL: f64 = -999.0;

fn t(h: i64) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(1985, 6, 1, 0, 0, 0).unwrap() + TimeDelta::hours(h)
}

fn meta() -> TimeSeriesMetadata {
    TimeSeriesMetadata::new("STREAMFLOW", Feature::new("DRRC2"), "CMS")
        .with_time_scale(Some(TimeScale::instantaneous()))
}

/// Asserts equal times and bit-identical values, so that NaN equals NaN.
fn assert_same_bits(actual: &TimeSeries<f64>, expected: &TimeSeries<f64>) {
    assert_eq!(actual.metadata(), expected.metadata());
    assert_eq!(actual.len(), expected.len());
    for (a, e) in actual.events().iter().zip(expected.events()) {
        assert_eq!(a.time(), e.time());
        assert_eq!(a.value().to_bits(), e.value().to_bits(), "at {}", a.time());
    }
}

// ---------------------------------------------------------------------------
// Missing-value substitution
// ---------------------------------------------------------------------------

#[test]
fn sentinels_become_missing_in_six_hourly_events() {
    let raw = [3.0, SENTINEL, 5.0, 7.0, SENTINEL, 11.0];
    let canonical = [3.0, MISSING_DOUBLE, 5.0, 7.0, MISSING_DOUBLE, 11.0];
    let series = |values: &[f64]| {
        let events = values
            .iter()
            .enumerate()
            .map(|(i, &v)| Event::new(t(i as i64 + 1), v))
            .collect();
        TimeSeries::new(meta(), events).unwrap()
    };

    let missing = MissingValues::new([parse_missing_value("-999.0").unwrap()]);
    let actual = missing.apply(series(&raw[..]));
    assert_same_bits(&actual, &series(&canonical[..]));
}

#[test]
fn sentinels_become_missing_in_six_hourly_ensemble_events() {
    let labels: Arc<[String]> = vec!["1985".to_string(), "1986".to_string()].into();
    let raw = [
        [3.0, 4.0],
        [SENTINEL, 2.0],
        [5.0, 6.0],
        [7.0, SENTINEL],
        [9.0, 10.0],
        [11.0, 12.0],
    ];
    let events = raw
        .iter()
        .enumerate()
        .map(|(i, m)| {
            let ens = Ensemble::with_labels(m.to_vec(), Arc::clone(&labels)).unwrap();
            Event::new(t(i as i64 + 1), ens)
        })
        .collect();
    let series = TimeSeries::new(meta(), events).unwrap();

    let actual = MissingValues::new([SENTINEL]).apply(series);

    // Compare each trace against the canonical single-valued trace.
    let traces = decompose(&actual).unwrap();
    assert_eq!(traces.len(), 2);
    assert_eq!(traces[0].0, "1985");
    let canonical = |values: [f64; 6]| {
        let events = values
            .iter()
            .enumerate()
            .map(|(i, &v)| Event::new(t(i as i64 + 1), v))
            .collect();
        TimeSeries::new(meta(), events).unwrap()
    };
    assert_same_bits(
        &traces[0].1,
        &canonical([3.0, MISSING_DOUBLE, 5.0, 7.0, 9.0, 11.0]),
    );
    assert_same_bits(
        &traces[1].1,
        &canonical([4.0, 2.0, 6.0, MISSING_DOUBLE, 10.0, 12.0]),
    );
    assert_eq!(actual.events()[1].value().labels(), Some(&labels));
}

#[test]
fn no_sentinels_leave_series_untouched() {
    let series = TimeSeries::new(meta(), vec![Event::new(t(1), SENTINEL)]).unwrap();
    let out = MissingValues::default().apply(series.clone());
    assert_eq!(out, series);
}

// ---------------------------------------------------------------------------
// Ensemble traces
// ---------------------------------------------------------------------------

#[test]
fn decompose_then_compose_restores_ensemble() {
    let labels: Arc<[String]> = vec!["a".to_string(), "b".to_string(), "c".to_string()].into();
    let events = (1..=4)
        .map(|h| {
            let members = vec![h as f64, 10.0 * h as f64, 100.0 * h as f64];
            Event::new(t(h), Ensemble::with_labels(members, Arc::clone(&labels)).unwrap())
        })
        .collect();
    let series = TimeSeries::new(meta(), events).unwrap();

    let traces = decompose(&series).unwrap();
    assert_eq!(traces.len(), 3);
    assert_eq!(*traces[2].1.events()[3].value(), 400.0);

    let rebuilt = compose(meta(), &traces).unwrap();
    assert_eq!(rebuilt, series);
}

// ---------------------------------------------------------------------------
// Source tracking
// ---------------------------------------------------------------------------

#[test]
fn tracker_rejects_mixed_data_types() {
    let tracker = SourceTracker::new();
    let observed = TimeSeries::new(meta(), vec![Event::new(t(1), 1.0)]).unwrap();
    let forecast = TimeSeries::new(
        meta().with_reference_time(ReferenceTimeType::T0, t(0)),
        vec![Event::new(t(1), 1.0)],
    )
    .unwrap();
    let ensemble =
        TimeSeries::new(meta(), vec![Event::new(t(1), Ensemble::new(vec![1.0]))]).unwrap();

    assert_eq!(tracker.track("obs", &observed).unwrap(), DataType::Observations);
    assert_eq!(
        tracker.track("nwm", &forecast).unwrap(),
        DataType::SingleValuedForecasts
    );
    assert_eq!(tracker.track("hefs", &ensemble).unwrap(), DataType::EnsembleForecasts);

    let err = tracker.track("obs", &forecast).unwrap_err();
    assert!(matches!(
        err,
        IngestError::MixedDataTypes {
            existing: DataType::Observations,
            found: DataType::SingleValuedForecasts,
            ..
        }
    ));
    assert_eq!(tracker.data_types().len(), 3);
    assert_eq!(tracker.sources(), vec!["hefs", "nwm", "obs"]);
    assert_eq!(tracker.record("obs").unwrap().series(), 1);
}

#[test]
fn tracker_is_shared_between_threads() {
    let tracker = SourceTracker::new();
    let events = vec![Event::new(t(1), 1.0), Event::new(t(2), 2.0)];
    let series = TimeSeries::new(meta(), events).unwrap();
    std::thread::scope(|scope| {
        for _ in 0..4 {
            scope.spawn(|| {
                for _ in 0..25 {
                    tracker.track("obs", &series).unwrap();
                }
            });
        }
    });
    let record = tracker.record("obs").unwrap();
    assert_eq!(record.series(), 100);
    assert_eq!(record.events(), 200);
}

// ---------------------------------------------------------------------------
// JSON reader
// ---------------------------------------------------------------------------

const DOCUMENT: &str = r#"{
  "series": [
    {
      "feature": "DRRC2",
      "variable": "STREAMFLOW",
      "unit": "CMS",
      "time_scale": { "period_seconds": 3600, "function": "mean" },
      "missing_values": [-999.0],
      "events": [
        { "time": "1985-06-01T01:00:00Z", "value": 1.5 },
        { "time": "1985-06-01T02:00:00Z", "value": -999.0 },
        { "time": "1985-06-01T03:00:00Z", "value": null }
      ]
    },
    {
      "feature": "DRRC2",
      "variable": "STREAMFLOW",
      "unit": "CMS",
      "reference_time": "1985-06-01T00:00:00Z",
      "labels": ["1985", "1986"],
      "events": [
        { "time": "1985-06-01T01:00:00Z", "members": [1.0, 2.0] },
        { "time": "1985-06-01T02:00:00Z", "members": [3.0, null] }
      ]
    }
  ]
}"#;

#[test]
fn read_json_document() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(DOCUMENT.as_bytes()).unwrap();

    let set = read_json(file.path()).unwrap();
    assert_eq!(set.len(), 2);

    let observed = &set.single_valued[0];
    let hourly_mean = TimeScale::new(TimeDelta::hours(1), TimeScaleFunction::Mean).unwrap();
    assert_eq!(observed.time_scale(), Some(hourly_mean));
    assert_eq!(observed.len(), 3);
    assert_eq!(*observed.events()[0].value(), 1.5);
    assert!(observed.events()[1].value().is_nan());
    assert!(observed.events()[2].value().is_nan());
    assert!(observed.metadata().reference_times().is_empty());

    let forecast = &set.ensemble[0];
    assert_eq!(forecast.metadata().t0(), Some(t(0)));
    assert_eq!(forecast.events()[1].value().member("1985"), Some(3.0));
    assert!(forecast.events()[1].value().members()[1].is_nan());
}

#[test]
fn read_json_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let err = read_json(&dir.path().join("absent.json")).unwrap_err();
    assert!(matches!(err, IngestError::FileNotFound { .. }));
}

#[test]
fn unknown_fields_are_rejected() {
    let err = parse_json(r#"{"series": [], "extra": 1}"#).unwrap_err();
    assert!(matches!(err, IngestError::Json { .. }));
}

#[test]
fn duplicate_times_name_the_series() {
    let text = r#"{"series": [{"feature": "A", "variable": "Q", "unit": "CMS", "events": [
        {"time": "1985-06-01T01:00:00Z", "value": 1.0},
        {"time": "1985-06-01T01:00:00Z", "value": 2.0}]}]}"#;
    let err = parse_json(text).unwrap_err();
    assert!(matches!(err, IngestError::InvalidSeries { index: 0, .. }));
}

#[test]
fn mixed_events_are_rejected() {
    let text = r#"{"series": [{"feature": "A", "variable": "Q", "unit": "CMS", "events": [
        {"time": "1985-06-01T01:00:00Z", "members": [1.0]},
        {"time": "1985-06-01T02:00:00Z", "value": 2.0}]}]}"#;
    let err = parse_json(text).unwrap_err();
    assert!(err.to_string().contains("mixes single-valued and ensemble values"));
}
