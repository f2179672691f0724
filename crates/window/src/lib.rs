//! Pooling window generation for the verity pooling engine.
//!
//! Windows slide along three axes (lead duration, reference time and valid
//! time) and are combined by cross-product into the final set of
//! [`TimeWindow`](verity_timeseries::TimeWindow)s, one pool per window and
//! feature group.
//!
//! ```text
//!  minimum                                         maximum
//!     |(-----period-----]                              |
//!     |<-freq->(-----period-----]                      |
//!     |        <-freq->(-----period-----]              |   forward
//!     |                              (-----period-----]|   reverse
//! ```
//!
//! # Quick start
//!
//! ```ignore
//! use chrono::TimeDelta;
//! use verity_window::{PoolingConfig, WindowSpec, time_windows};
//!
//! let config = PoolingConfig::new()
//!     .with_lead_durations(TimeDelta::zero(), TimeDelta::hours(40))
//!     .with_lead_pools(WindowSpec::new(TimeDelta::hours(23)).with_frequency(TimeDelta::hours(17)));
//! let windows = time_windows(&config)?;
//! ```

mod config;
mod error;
mod generator;
mod validate;

pub use config::{Axis, PoolingConfig, WindowSpec};
pub use error::WindowError;
pub use generator::{
    lead_duration_windows, pool_count, reference_time_windows, time_windows, valid_time_windows,
};
