//! Events, ensembles and pairs.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::error::TimeSeriesError;

/// Canonical missing value for doubles.
pub const MISSING_DOUBLE: f64 = f64::NAN;

/// An immutable `(valid time, value)` pair.
#[derive(Debug, Clone, PartialEq)]
pub struct Event<T> {
    time: DateTime<Utc>,
    value: T,
}

impl<T> Event<T> {
    /// Creates an event.
    pub fn new(time: DateTime<Utc>, value: T) -> Self {
        Self { time, value }
    }

    /// Returns the valid time.
    pub fn time(&self) -> DateTime<Utc> {
        self.time
    }

    /// Returns the value.
    pub fn value(&self) -> &T {
        &self.value
    }

    /// Consumes the event, returning the value.
    pub fn into_value(self) -> T {
        self.value
    }

    /// Maps the value, keeping the valid time.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Event<U> {
        Event {
            time: self.time,
            value: f(self.value),
        }
    }
}

// ---------------------------------------------------------------------------
// Ensemble
// ---------------------------------------------------------------------------

/// An ordered set of ensemble members with optional per-member labels.
///
/// Labels are shared between events of one trace set, so cloning an ensemble
/// does not copy them.
#[derive(Debug, Clone, PartialEq)]
pub struct Ensemble {
    members: Vec<f64>,
    labels: Option<Arc<[String]>>,
}

impl Ensemble {
    /// Creates an unlabelled ensemble.
    pub fn new(members: Vec<f64>) -> Self {
        Self {
            members,
            labels: None,
        }
    }

    /// Creates a labelled ensemble.
    ///
    /// # Errors
    ///
    /// Returns [`TimeSeriesError::LabelMismatch`] if `labels` and `members`
    /// differ in length.
    pub fn with_labels(
        members: Vec<f64>,
        labels: Arc<[String]>,
    ) -> Result<Self, TimeSeriesError> {
        if members.len() != labels.len() {
            return Err(TimeSeriesError::LabelMismatch {
                members: members.len(),
                labels: labels.len(),
            });
        }
        Ok(Self {
            members,
            labels: Some(labels),
        })
    }

    /// Returns the member values in order.
    pub fn members(&self) -> &[f64] {
        &self.members
    }

    /// Returns the labels, if any.
    pub fn labels(&self) -> Option<&Arc<[String]>> {
        self.labels.as_ref()
    }

    /// Returns the number of members.
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Returns `true` if the ensemble has no members.
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Returns the value of the member with the given label.
    pub fn member(&self, label: &str) -> Option<f64> {
        let labels = self.labels.as_ref()?;
        let idx = labels.iter().position(|l| l == label)?;
        self.members.get(idx).copied()
    }

    /// Returns `true` if `other` has the same member count and labels.
    pub fn same_shape(&self, other: &Ensemble) -> bool {
        self.members.len() == other.members.len() && self.labels == other.labels
    }

    /// Returns a copy with new member values and the same labels.
    ///
    /// # Errors
    ///
    /// Returns [`TimeSeriesError::LabelMismatch`] if this ensemble is labelled
    /// and `members` has a different length.
    pub fn with_members(&self, members: Vec<f64>) -> Result<Self, TimeSeriesError> {
        match &self.labels {
            Some(labels) => Self::with_labels(members, Arc::clone(labels)),
            None => Ok(Self::new(members)),
        }
    }

    /// Applies `f` to every member, keeping labels.
    pub fn map_members(&self, f: impl Fn(f64) -> f64) -> Self {
        Self {
            members: self.members.iter().map(|&m| f(m)).collect(),
            labels: self.labels.clone(),
        }
    }
}

impl From<f64> for Ensemble {
    fn from(value: f64) -> Self {
        Ensemble::new(vec![value])
    }
}

// ---------------------------------------------------------------------------
// Pair
// ---------------------------------------------------------------------------

/// A left and right value at one valid time.
#[derive(Debug, Clone, PartialEq)]
pub struct Pair<L, R> {
    left: L,
    right: R,
}

impl<L, R> Pair<L, R> {
    /// Creates a pair.
    pub fn new(left: L, right: R) -> Self {
        Self { left, right }
    }

    /// Returns the left value.
    pub fn left(&self) -> &L {
        &self.left
    }

    /// Returns the right value.
    pub fn right(&self) -> &R {
        &self.right
    }

    /// Splits the pair.
    pub fn into_parts(self) -> (L, R) {
        (self.left, self.right)
    }
}

// ---------------------------------------------------------------------------
// Missing values
// ---------------------------------------------------------------------------

/// Values that can be recognised as missing.
pub trait MissingValue {
    /// Returns `true` if the value carries no usable data.
    fn is_missing(&self) -> bool;
}

impl MissingValue for f64 {
    fn is_missing(&self) -> bool {
        !self.is_finite()
    }
}

impl MissingValue for Ensemble {
    fn is_missing(&self) -> bool {
        self.members.iter().all(|m| !m.is_finite())
    }
}

impl<L: MissingValue, R: MissingValue> MissingValue for Pair<L, R> {
    fn is_missing(&self) -> bool {
        self.left.is_missing() || self.right.is_missing()
    }
}

/// Returns `true` if `value` is not missing. Usable as a predicate.
pub fn is_not_missing<T: MissingValue>(value: &T) -> bool {
    !value.is_missing()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn labels(names: &[&str]) -> Arc<[String]> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn event_map_keeps_time() {
        let t = Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap();
        let e = Event::new(t, 2.0).map(|v| v * 3.0);
        assert_eq!(e.time(), t);
        assert_eq!(*e.value(), 6.0);
    }

    #[test]
    fn labelled_ensemble_lookup() {
        let ens = Ensemble::with_labels(vec![1.0, 2.0, 3.0], labels(&["a", "b", "c"])).unwrap();
        assert_eq!(ens.member("b"), Some(2.0));
        assert_eq!(ens.member("z"), None);
        assert_eq!(ens.len(), 3);
    }

    #[test]
    fn labelled_ensemble_rejects_length_mismatch() {
        let err = Ensemble::with_labels(vec![1.0, 2.0], labels(&["a"])).unwrap_err();
        assert!(matches!(
            err,
            TimeSeriesError::LabelMismatch {
                members: 2,
                labels: 1
            }
        ));
    }

    #[test]
    fn same_shape_compares_labels() {
        let a = Ensemble::with_labels(vec![1.0, 2.0], labels(&["a", "b"])).unwrap();
        let b = Ensemble::with_labels(vec![5.0, 6.0], labels(&["a", "b"])).unwrap();
        let c = Ensemble::with_labels(vec![5.0, 6.0], labels(&["a", "c"])).unwrap();
        let d = Ensemble::new(vec![5.0, 6.0]);
        assert!(a.same_shape(&b));
        assert!(!a.same_shape(&c));
        assert!(!a.same_shape(&d));
    }

    #[test]
    fn missing_values() {
        assert!(f64::NAN.is_missing());
        assert!(f64::INFINITY.is_missing());
        assert!(!1.0_f64.is_missing());
        assert!(Ensemble::new(vec![f64::NAN, f64::NAN]).is_missing());
        assert!(!Ensemble::new(vec![f64::NAN, 1.0]).is_missing());
        assert!(Pair::new(1.0, f64::NAN).is_missing());
        assert!(is_not_missing(&Pair::new(1.0, 2.0)));
    }

    #[test]
    fn map_members_keeps_labels() {
        let ens = Ensemble::with_labels(vec![1.0, 2.0], labels(&["x", "y"])).unwrap();
        let doubled = ens.map_members(|m| m * 2.0);
        assert_eq!(doubled.members(), &[2.0, 4.0]);
        assert_eq!(doubled.labels(), ens.labels());
    }
}
