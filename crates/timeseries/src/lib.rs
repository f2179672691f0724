//! Time-series value model for the verity pooling engine.
//!
//! Every higher component builds on the types here: events and ensembles,
//! metadata with reference times and time scales, ordered time-series, and
//! the six-bound [`TimeWindow`] that defines a pool.
//!
//! # Model
//!
//! ```text
//!  TimeSeries<T> ──┬── TimeSeriesMetadata (reference times, TimeScale, variable, Feature, unit)
//!                  └── [Event<T>]  strictly ascending by valid time
//!
//!  T = f64 | Ensemble | Pair<L, R>
//! ```
//!
//! # Quick start
//!
//! ```ignore
//! use verity_timeseries::{Event, Feature, TimeSeries, TimeSeriesMetadata};
//!
//! let meta = TimeSeriesMetadata::new("QINE", Feature::new("DRRC2"), "CMS");
//! let series = TimeSeries::new(meta, vec![Event::new(t0, 1.0), Event::new(t1, 2.0)])?;
//! let snipped = verity_timeseries::slice::snip_to_window(series, &window);
//! ```

mod error;
mod event;
mod feature;
mod metadata;
mod scale;
mod series;
pub mod slice;
mod window;

pub use error::TimeSeriesError;
pub use event::{Ensemble, Event, MISSING_DOUBLE, MissingValue, Pair, is_not_missing};
pub use feature::{Feature, FeatureGroup, FeatureTuple};
pub use metadata::{ReferenceTimeType, TimeSeriesMetadata};
pub use scale::{TimeScale, TimeScaleFunction, format_duration};
pub use series::{TimeSeries, TimeSeriesBuilder};
pub use window::{DURATION_MAX, DURATION_MIN, INSTANT_MAX, INSTANT_MIN, TimeWindow};
