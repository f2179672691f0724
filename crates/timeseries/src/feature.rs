//! Geographic features and feature groups.

use std::fmt;
use std::sync::Arc;

use crate::error::TimeSeriesError;

/// A named geographic feature, such as a gauging location.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Feature {
    name: Arc<str>,
}

impl Feature {
    /// Creates a feature.
    pub fn new(name: impl AsRef<str>) -> Self {
        Self {
            name: Arc::from(name.as_ref()),
        }
    }

    /// Returns the feature name.
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// The left, right and optional baseline features that are evaluated together.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FeatureTuple {
    left: Feature,
    right: Feature,
    baseline: Option<Feature>,
}

impl FeatureTuple {
    /// Creates a tuple without a baseline feature.
    pub fn new(left: Feature, right: Feature) -> Self {
        Self {
            left,
            right,
            baseline: None,
        }
    }

    /// Creates a tuple whose three sides share one feature.
    pub fn of(feature: Feature) -> Self {
        Self {
            left: feature.clone(),
            right: feature.clone(),
            baseline: Some(feature),
        }
    }

    /// Sets the baseline feature.
    pub fn with_baseline(mut self, baseline: Feature) -> Self {
        self.baseline = Some(baseline);
        self
    }

    /// Returns the left feature.
    pub fn left(&self) -> &Feature {
        &self.left
    }

    /// Returns the right feature.
    pub fn right(&self) -> &Feature {
        &self.right
    }

    /// Returns the baseline feature, falling back to the right feature.
    pub fn baseline(&self) -> &Feature {
        self.baseline.as_ref().unwrap_or(&self.right)
    }
}

impl fmt::Display for FeatureTuple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.left, self.right)?;
        if let Some(b) = &self.baseline {
            write!(f, "-{b}")?;
        }
        Ok(())
    }
}

/// A named collection of feature tuples evaluated as one spatial unit.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FeatureGroup {
    name: String,
    features: Vec<FeatureTuple>,
}

impl FeatureGroup {
    /// Creates a feature group.
    ///
    /// # Errors
    ///
    /// Returns [`TimeSeriesError::InvalidFeatureGroup`] if `features` is empty
    /// or contains the same tuple twice.
    pub fn new(
        name: impl Into<String>,
        mut features: Vec<FeatureTuple>,
    ) -> Result<Self, TimeSeriesError> {
        let name = name.into();
        if features.is_empty() {
            return Err(TimeSeriesError::InvalidFeatureGroup {
                name,
                reason: "a feature group needs at least one feature".to_string(),
            });
        }
        features.sort();
        let before = features.len();
        features.dedup();
        if features.len() != before {
            return Err(TimeSeriesError::InvalidFeatureGroup {
                name,
                reason: "duplicate feature tuples".to_string(),
            });
        }
        Ok(Self { name, features })
    }

    /// Creates a group holding one tuple, named after its right feature.
    pub fn singleton(tuple: FeatureTuple) -> Self {
        Self {
            name: tuple.right().name().to_string(),
            features: vec![tuple],
        }
    }

    /// Returns the group name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the feature tuples, sorted.
    pub fn features(&self) -> &[FeatureTuple] {
        &self.features
    }

    /// Returns the tuples whose right feature is `right`.
    pub fn tuples_for_right<'a>(
        &'a self,
        right: &'a Feature,
    ) -> impl Iterator<Item = &'a FeatureTuple> + 'a {
        self.features.iter().filter(move |t| t.right() == right)
    }

    /// Returns the tuples whose baseline feature is `baseline`.
    pub fn tuples_for_baseline<'a>(
        &'a self,
        baseline: &'a Feature,
    ) -> impl Iterator<Item = &'a FeatureTuple> + 'a {
        self.features.iter().filter(move |t| t.baseline() == baseline)
    }
}

impl fmt::Display for FeatureGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}
