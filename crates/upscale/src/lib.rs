//! Temporal upscaling of time-series for the verity pooling engine.
//!
//! Aggregates single-valued and ensemble time-series to a coarser
//! [`TimeScale`](verity_timeseries::TimeScale) over right-closed intervals
//! `(t - period, t]`, after checking the rescaling rules.
//!
//! # Pipeline
//!
//! ```text
//!  ┌──────────────┐     ┌──────────────────┐     ┌──────────────────┐
//!  │  plan scale   │────▶│ group by interval │────▶│ coverage + apply │
//!  │  (validate)   │     │  (t - period, t]  │     │ mean/sum/min/max │
//!  └──────────────┘     └──────────────────┘     └──────────────────┘
//! ```
//!
//! # Quick start
//!
//! ```ignore
//! use verity_upscale::{Lenience, UpscaleConfig, Upscaler};
//!
//! let upscaler = Upscaler::new(UpscaleConfig::new().with_lenience(Lenience::Strict))?;
//! let daily = upscaler.upscale(&hourly, desired, &end_times)?;
//! ```

mod config;
mod error;
mod upscaler;
mod validate;

pub use config::{Lenience, UpscaleConfig};
pub use error::UpscalingError;
pub use upscaler::{Upscalable, Upscaler};
