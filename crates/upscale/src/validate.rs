//! Rescaling rules checked before any aggregation.
//!
//! Provides [`ValidationCollector`] for gathering every violated rule into a
//! single [`UpscalingError::Invalid`], plus the individual rule checks.

use chrono::TimeDelta;
use verity_timeseries::{TimeScale, TimeScaleFunction};

use crate::error::UpscalingError;

// ---------------------------------------------------------------------------
// ValidationCollector
// ---------------------------------------------------------------------------

/// Accumulates rule violations and converts them into one error.
pub(crate) struct ValidationCollector {
    errors: Vec<String>,
}

impl ValidationCollector {
    /// Create an empty collector.
    pub(crate) fn new() -> Self {
        Self { errors: Vec::new() }
    }

    /// Record one violation, if present.
    pub(crate) fn push_if(&mut self, msg: Option<String>) {
        if let Some(msg) = msg {
            self.errors.push(msg);
        }
    }

    /// Returns the number of recorded violations.
    pub(crate) fn len(&self) -> usize {
        self.errors.len()
    }

    /// Consume the collector and return `Ok(())` if nothing was recorded, or
    /// `Err(UpscalingError::Invalid { count, details })` otherwise.
    pub(crate) fn finish(self) -> Result<(), UpscalingError> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(UpscalingError::Invalid {
                count: self.errors.len(),
                details: self.errors.join("; "),
            })
        }
    }
}

// ---------------------------------------------------------------------------
// Rules
// ---------------------------------------------------------------------------

/// What the upscaler must do for a given pair of scales.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Action {
    /// Return the series unchanged.
    Unchanged,
    /// Return the same events labelled with the desired scale.
    Relabel,
    /// Aggregate to the desired scale.
    Aggregate,
}

/// Decides what to do and validates the request.
pub(crate) fn plan(
    existing: Option<TimeScale>,
    desired: TimeScale,
) -> Result<Action, UpscalingError> {
    let Some(existing) = existing else {
        if desired.is_instantaneous() {
            return Ok(Action::Relabel);
        }
        return Err(UpscalingError::UndeclaredTimeScale { desired });
    };

    if existing.is_instantaneous() && desired.is_instantaneous() {
        return Ok(Action::Unchanged);
    }

    if existing.period() == desired.period() {
        let mut c = ValidationCollector::new();
        c.push_if(functions_differ(existing, desired));
        c.finish()?;
        return Ok(Action::Relabel);
    }

    let mut c = ValidationCollector::new();
    c.push_if(desired_function_is_unknown(desired));
    let downscaling = downscaling_requested(existing, desired);
    let only_downscaling = downscaling.is_some();
    c.push_if(downscaling);
    c.push_if(period_does_not_commute(existing, desired));
    c.push_if(accumulating_instantaneous(existing, desired));
    c.push_if(accumulating_non_accumulation(existing, desired));

    if only_downscaling && c.len() == 1 {
        return Err(UpscalingError::Downscaling { existing, desired });
    }
    c.finish()?;
    Ok(Action::Aggregate)
}

fn desired_function_is_unknown(desired: TimeScale) -> Option<String> {
    (desired.function() == TimeScaleFunction::Unknown).then(|| {
        format!("the desired time scale {desired} has an unknown function and cannot be produced")
    })
}

/// Equal periods only relabel an unknown function or one that already
/// matches.
fn functions_differ(existing: TimeScale, desired: TimeScale) -> Option<String> {
    let relabels = existing.function() == desired.function()
        || existing.function() == TimeScaleFunction::Unknown;
    (!relabels).then(|| {
        format!("the periods of {existing} and {desired} match but their functions differ")
    })
}

fn downscaling_requested(existing: TimeScale, desired: TimeScale) -> Option<String> {
    (existing.period() > desired.period()).then(|| {
        format!("cannot downscale from {existing} to {desired}")
    })
}

fn period_does_not_commute(existing: TimeScale, desired: TimeScale) -> Option<String> {
    if existing.is_instantaneous() || existing.period() > desired.period() {
        return None;
    }
    let existing_ms = existing.period().num_milliseconds();
    let desired_ms = desired.period().num_milliseconds();
    if existing_ms == 0 || desired_ms % existing_ms != 0 {
        return Some(format!(
            "the desired period {} is not an integer multiple of the existing period {}",
            verity_timeseries::format_duration(desired.period()),
            verity_timeseries::format_duration(existing.period()),
        ));
    }
    None
}

fn accumulating_instantaneous(existing: TimeScale, desired: TimeScale) -> Option<String> {
    (existing.is_instantaneous() && desired.function() == TimeScaleFunction::Total).then(|| {
        format!("cannot accumulate instantaneous values to {desired}")
    })
}

fn accumulating_non_accumulation(existing: TimeScale, desired: TimeScale) -> Option<String> {
    (!existing.is_instantaneous()
        && desired.function() == TimeScaleFunction::Total
        && existing.function() != TimeScaleFunction::Total)
        .then(|| {
            format!(
                "cannot produce an accumulation {desired} from a non-accumulation {existing}"
            )
        })
}

/// Number of existing periods that make up one desired period, when the
/// existing scale is not instantaneous.
pub(crate) fn periods_per_interval(existing: Option<TimeScale>, desired: TimeDelta) -> Option<i64> {
    let existing = existing.filter(|s| !s.is_instantaneous())?;
    let existing_ms = existing.period().num_milliseconds();
    (existing_ms > 0).then(|| desired.num_milliseconds() / existing_ms)
}
