//! # verity-ingest
//!
//! Helpers applied while preparing time-series for pooling: substitution of
//! declared missing-value sentinels, per-source tracking of data types,
//! ensemble decomposition and a JSON time-series reader.
//!
//! # Quick start
//!
//! ```ignore
//! use std::path::Path;
//! use verity_ingest::{SourceTracker, read_json};
//!
//! let tracker = SourceTracker::new();
//! let set = read_json(Path::new("observed.json"))?;
//! for series in &set.single_valued {
//!     tracker.track("observed.json", series)?;
//! }
//! ```

mod error;
mod json;
mod missing;
mod trace;
mod tracker;

pub use error::IngestError;
pub use json::{SeriesSet, parse_json, read_json};
pub use missing::{MISSING_EPSILON, MissingValues, ReplaceMissing, parse_missing_value};
pub use trace::{Trace, compose, decompose};
pub use tracker::{DataType, DataTyped, SourceRecord, SourceTracker};
