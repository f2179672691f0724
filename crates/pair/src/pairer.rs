//! Time-based pairing of a left series with a right series.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, TimeDelta, Utc};
use tracing::debug;
use verity_timeseries::{Event, MissingValue, Pair, TimeSeries, is_not_missing};

use crate::config::PairConfig;
use crate::error::PairingError;

/// Predicate deciding whether a value may take part in pairing.
pub type Admissible<T> = Arc<dyn Fn(&T) -> bool + Send + Sync>;

/// Pairs left values with right values by valid time.
///
/// Inadmissible events are skipped before matching. The default
/// admissibility rejects missing values on both sides.
pub struct Pairer<L, R> {
    config: PairConfig,
    left_admissible: Admissible<L>,
    right_admissible: Admissible<R>,
}

impl<L, R> Pairer<L, R>
where
    L: MissingValue + 'static,
    R: MissingValue + 'static,
{
    /// Creates a pairer that rejects missing values.
    ///
    /// # Errors
    ///
    /// Returns [`PairingError::InvalidConfig`] if `config` is invalid.
    pub fn new(config: PairConfig) -> Result<Self, PairingError> {
        Self::with_admissibility(
            config,
            Arc::new(|v: &L| is_not_missing(v)),
            Arc::new(|v: &R| is_not_missing(v)),
        )
    }
}

impl<L, R> Pairer<L, R> {
    /// Creates a pairer with custom admissibility predicates.
    ///
    /// # Errors
    ///
    /// Returns [`PairingError::InvalidConfig`] if `config` is invalid.
    pub fn with_admissibility(
        config: PairConfig,
        left_admissible: Admissible<L>,
        right_admissible: Admissible<R>,
    ) -> Result<Self, PairingError> {
        config.validate()?;
        Ok(Self {
            config,
            left_admissible,
            right_admissible,
        })
    }

    /// Returns the configuration.
    pub fn config(&self) -> &PairConfig {
        &self.config
    }
}

impl<L: Clone, R: Clone> Pairer<L, R> {
    /// Pairs every admissible right event with the matching left event.
    ///
    /// The paired series carries the right series' metadata and the right
    /// valid times. Right events without a partner are dropped.
    ///
    /// # Errors
    ///
    /// Returns [`PairingError::TimeScaleMismatch`] if both series declare
    /// different time scales.
    pub fn pair(
        &self,
        left: &TimeSeries<L>,
        right: &TimeSeries<R>,
    ) -> Result<TimeSeries<Pair<L, R>>, PairingError> {
        if let (Some(l), Some(r)) = (left.time_scale(), right.time_scale())
            && l != r
            && !(l.is_instantaneous() && r.is_instantaneous())
        {
            return Err(PairingError::TimeScaleMismatch { left: l, right: r });
        }

        let candidates: Vec<&Event<L>> = left
            .events()
            .iter()
            .filter(|e| (self.left_admissible)(e.value()))
            .collect();
        let tolerance = self.config.mode().tolerance();

        let mut paired = Vec::new();
        if !candidates.is_empty() {
            for event in right.events() {
                if !(self.right_admissible)(event.value()) {
                    continue;
                }
                if let Some(partner) = nearest(&candidates, event.time(), tolerance) {
                    paired.push(Event::new(
                        event.time(),
                        Pair::new(partner.value().clone(), event.value().clone()),
                    ));
                }
            }
        }

        debug!(
            left = left.len(),
            right = right.len(),
            pairs = paired.len(),
            series = %right.metadata(),
            "paired"
        );
        Ok(TimeSeries::new(right.metadata().clone(), paired)?)
    }
}

impl<L, R> fmt::Debug for Pairer<L, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pairer")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl<L, R> Clone for Pairer<L, R> {
    fn clone(&self) -> Self {
        Self {
            config: self.config.clone(),
            left_admissible: Arc::clone(&self.left_admissible),
            right_admissible: Arc::clone(&self.right_admissible),
        }
    }
}

/// Finds the candidate nearest to `time` within `tolerance`, inclusive.
/// Ties go to the earlier candidate.
fn nearest<'a, L>(
    candidates: &[&'a Event<L>],
    time: DateTime<Utc>,
    tolerance: TimeDelta,
) -> Option<&'a Event<L>> {
    let idx = candidates.partition_point(|e| e.time() < time);
    let after = candidates.get(idx).copied();
    let before = idx.checked_sub(1).and_then(|i| candidates.get(i)).copied();

    let offset = |e: &Event<L>| e.time().signed_duration_since(time).abs();
    let best = match (before, after) {
        (Some(b), Some(a)) if offset(a) < offset(b) => a,
        (Some(b), _) => b,
        (None, Some(a)) => a,
        (None, None) => return None,
    };
    (offset(best) <= tolerance).then_some(best)
}

/// Splits a paired series into its left and right series.
///
/// Both outputs carry the metadata of `pairs`.
pub fn unzip<L: Clone, R: Clone>(
    pairs: &TimeSeries<Pair<L, R>>,
) -> (TimeSeries<L>, TimeSeries<R>) {
    let left = pairs.clone().map_values(|p| p.into_parts().0);
    let right = pairs.clone().map_values(|p| p.into_parts().1);
    (left, right)
}
