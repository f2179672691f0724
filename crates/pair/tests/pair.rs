use std::sync::Arc;

use approx::assert_relative_eq;
use chrono::{DateTime, TimeDelta, TimeZone, Utc};
use verity_pair::{PairConfig, Pairer, PairingError, PairingMode, unzip};
use verity_timeseries::{
    Ensemble, Event, Feature, ReferenceTimeType, TimeScale, TimeScaleFunction, TimeSeries,
    TimeSeriesMetadata,
};

fn t(h: i64) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(1985, 1, 1, 0, 0, 0).unwrap() + TimeDelta::hours(h)
}

fn left_meta() -> TimeSeriesMetadata {
    TimeSeriesMetadata::new("STREAMFLOW", Feature::new("DRRC2"), "CMS")
}

fn right_meta() -> TimeSeriesMetadata {
    TimeSeriesMetadata::new("QINE", Feature::new("DRRC2HSF"), "CFS")
        .with_reference_time(ReferenceTimeType::T0, t(0))
}

fn series(meta: TimeSeriesMetadata, values: &[(i64, f64)]) -> TimeSeries<f64> {
    let events = values.iter().map(|&(h, v)| Event::new(t(h), v)).collect();
    TimeSeries::new(meta, events).unwrap()
}

fn exact() -> Pairer<f64, f64> {
    Pairer::new(PairConfig::new()).unwrap()
}

fn nearest(hours: i64) -> Pairer<f64, f64> {
    Pairer::new(PairConfig::new().with_mode(PairingMode::Nearest {
        tolerance: TimeDelta::hours(hours),
    }))
    .unwrap()
}

fn fixture() -> (TimeSeries<f64>, TimeSeries<f64>) {
    let left = series(
        left_meta(),
        &[
            (0, 1.0),
            (3, 2.0),
            (7, 3.0),
            (8, 4.0),
            (10, 5.0),
            (11, 6.0),
            (18, 7.0),
        ],
    );
    let right = series(
        right_meta(),
        &[
            (0, 11.0),
            (3, 12.0),
            (6, 13.0),
            (8, 14.0),
            (10, 15.0),
            (11, 16.0),
            (19, 17.0),
        ],
    );
    (left, right)
}

#[test]
fn exact_pairing_keeps_shared_times() {
    let (left, right) = fixture();
    let pairs = exact().pair(&left, &right).unwrap();
    let times: Vec<_> = pairs.valid_times().collect();
    assert_eq!(times, vec![t(0), t(3), t(8), t(10), t(11)]);
    let first = pairs.events()[0].value();
    assert_relative_eq!(*first.left(), 1.0);
    assert_relative_eq!(*first.right(), 11.0);
}

#[test]
fn pairs_carry_right_metadata() {
    let (left, right) = fixture();
    let pairs = exact().pair(&left, &right).unwrap();
    assert_eq!(pairs.metadata(), right.metadata());
}

#[test]
fn pairing_is_deterministic() {
    let (left, right) = fixture();
    let pairer = nearest(1);
    let first = pairer.pair(&left, &right).unwrap();
    for _ in 0..10 {
        assert_eq!(pairer.pair(&left, &right).unwrap(), first);
    }
}

#[test]
fn nearest_pairing_respects_tolerance() {
    let (left, right) = fixture();
    let pairs = nearest(1).pair(&left, &right).unwrap();
    // 06 pairs with 07 and 19 with 18
    assert_eq!(pairs.len(), 7);
    for event in pairs.events() {
        let partner = left
            .events()
            .iter()
            .find(|l| l.value() == event.value().left())
            .unwrap();
        let offset = (partner.time() - event.time()).abs();
        assert!(offset <= TimeDelta::hours(1));
    }
    let at_six = pairs.event_at(t(6)).unwrap();
    assert_relative_eq!(*at_six.value().left(), 3.0);
}

#[test]
fn nearest_tie_prefers_earlier_left_event() {
    let left = series(left_meta(), &[(2, 2.0), (4, 4.0)]);
    let right = series(right_meta(), &[(3, 30.0)]);
    let pairs = nearest(1).pair(&left, &right).unwrap();
    assert_relative_eq!(*pairs.events()[0].value().left(), 2.0);
}

#[test]
fn empty_inputs_give_empty_pairs() {
    let (left, right) = fixture();
    let empty_left = TimeSeries::<f64>::empty(left_meta());
    let empty_right = TimeSeries::<f64>::empty(right_meta());
    assert!(exact().pair(&empty_left, &right).unwrap().is_empty());
    assert!(exact().pair(&left, &empty_right).unwrap().is_empty());
}

#[test]
fn missing_values_are_not_paired() {
    let left = series(left_meta(), &[(0, f64::NAN), (1, 1.0)]);
    let right = series(right_meta(), &[(0, 10.0), (1, f64::INFINITY)]);
    assert!(exact().pair(&left, &right).unwrap().is_empty());
}

#[test]
fn missing_left_value_falls_back_to_nearest_admissible() {
    let left = series(left_meta(), &[(0, f64::NAN), (1, 1.0)]);
    let right = series(right_meta(), &[(0, 10.0)]);
    let pairs = nearest(1).pair(&left, &right).unwrap();
    assert_relative_eq!(*pairs.events()[0].value().left(), 1.0);
}

#[test]
fn custom_admissibility() {
    let (left, right) = fixture();
    let pairer: Pairer<f64, f64> = Pairer::with_admissibility(
        PairConfig::new(),
        Arc::new(|v: &f64| *v > 2.0),
        Arc::new(|_: &f64| true),
    )
    .unwrap();
    let pairs = pairer.pair(&left, &right).unwrap();
    assert_eq!(pairs.len(), 3);
}

#[test]
fn ensemble_pairs_whole_member_vector() {
    let left = series(left_meta(), &[(0, 1.0), (1, 2.0)]);
    let labels: Arc<[String]> = vec!["1985".to_string(), "1986".to_string()].into();
    let members = Ensemble::with_labels(vec![5.0, 6.0], labels).unwrap();
    let right = TimeSeries::new(right_meta(), vec![Event::new(t(1), members.clone())]).unwrap();
    let pairer: Pairer<f64, Ensemble> = Pairer::new(PairConfig::new()).unwrap();
    let pairs = pairer.pair(&left, &right).unwrap();
    assert_eq!(pairs.len(), 1);
    assert_relative_eq!(*pairs.events()[0].value().left(), 2.0);
    assert_eq!(pairs.events()[0].value().right(), &members);
    assert_eq!(pairs.events()[0].value().right().member("1986"), Some(6.0));
}

#[test]
fn different_time_scales_cannot_be_paired() {
    let (left, right) = fixture();
    let six = TimeScale::new(TimeDelta::hours(6), TimeScaleFunction::Mean).unwrap();
    let left = left.with_time_scale(Some(TimeScale::instantaneous()));
    let right = right.with_time_scale(Some(six));
    let err = exact().pair(&left, &right).unwrap_err();
    assert!(matches!(err, PairingError::TimeScaleMismatch { .. }));
    assert!(err.to_string().starts_with("Cannot pair two datasets"));
}

#[test]
fn negative_tolerance_is_rejected() {
    let config = PairConfig::new().with_mode(PairingMode::Nearest {
        tolerance: TimeDelta::hours(-1),
    });
    assert!(Pairer::<f64, f64>::new(config).is_err());
}

#[test]
fn unzip_recovers_paired_values() {
    let (left, right) = fixture();
    let pairs = exact().pair(&left, &right).unwrap();
    let (l, r) = unzip(&pairs);
    assert_eq!(l.len(), pairs.len());
    assert_eq!(r.len(), pairs.len());
    for (event, (le, re)) in pairs.events().iter().zip(l.events().iter().zip(r.events())) {
        assert_eq!(le.time(), event.time());
        assert_eq!(re.time(), event.time());
        assert_eq!(left.event_at(le.time()).map(|e| *e.value()), Some(*le.value()));
        assert_eq!(right.event_at(re.time()).map(|e| *e.value()), Some(*re.value()));
    }
    assert_eq!(l.metadata(), pairs.metadata());
}
