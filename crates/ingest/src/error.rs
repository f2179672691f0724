//! Error types for the verity-ingest crate.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use verity_timeseries::TimeSeriesError;

use crate::tracker::DataType;

/// Error type for all fallible operations in the verity-ingest crate.
#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    /// Returned when a required file does not exist on disk.
    #[error("file not found: {}", path.display())]
    FileNotFound {
        /// Path that could not be found.
        path: PathBuf,
    },

    /// Returned when a file cannot be read.
    #[error("failed to read {}: {reason}", path.display())]
    Io {
        /// Path that failed.
        path: PathBuf,
        /// Description of the underlying failure.
        reason: String,
    },

    /// Returned when a JSON document cannot be parsed.
    #[error("invalid JSON time-series document: {reason}")]
    Json {
        /// Description of the parse failure.
        reason: String,
    },

    /// Returned when one series of a document is malformed.
    #[error("series {index} is invalid: {reason}")]
    InvalidSeries {
        /// Position of the series in the document.
        index: usize,
        /// Description of the problem.
        reason: String,
    },

    /// Returned when a declared missing value is not a number.
    #[error("the missing value {value:?} is not a valid number")]
    InvalidMissingValue {
        /// The offending text.
        value: String,
    },

    /// Returned when one source yields time-series of two data types.
    #[error("source '{source_name}' mixes {existing} with {found}")]
    MixedDataTypes {
        /// Name of the source.
        source_name: String,
        /// Data type recorded first.
        existing: DataType,
        /// Conflicting data type.
        found: DataType,
    },

    /// Returned when ensemble members differ in count between events.
    #[error("ensemble at {time} has {found} members, expected {expected}")]
    RaggedEnsemble {
        /// Valid time of the offending event.
        time: DateTime<Utc>,
        /// Member count of the first event.
        expected: usize,
        /// Member count found.
        found: usize,
    },

    /// Returned when a trace does not share the valid times of the first.
    #[error("trace '{label}' has {found} valid times, expected the {expected} of the first trace")]
    TraceMismatch {
        /// Label of the offending trace.
        label: String,
        /// Number of valid times of the first trace.
        expected: usize,
        /// Number of valid times of the offending trace.
        found: usize,
    },

    /// Wraps an error from the time-series model.
    #[error(transparent)]
    TimeSeries(#[from] TimeSeriesError),
}
