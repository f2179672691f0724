//! Pairing of left (observed) and right (predicted) time-series.
//!
//! A right event at valid time `t` is paired with a left event at `t`, or
//! with the nearest left event within a tolerance. Ensembles pair one left
//! value against the full member vector.
//!
//! ```text
//!  left:   ●───●───────●───●───●
//!  right:  ○───○───○───○───○───○
//!  pairs:  ◆───◆───────◆───◆───◆    (right times, right metadata)
//! ```
//!
//! # Quick start
//!
//! ```ignore
//! use verity_pair::{PairConfig, Pairer, unzip};
//!
//! let pairer: Pairer<f64, f64> = Pairer::new(PairConfig::new())?;
//! let pairs = pairer.pair(&observed, &predicted)?;
//! let (left, right) = unzip(&pairs);
//! ```

mod config;
mod error;
mod pairer;

pub use config::{PairConfig, PairingMode};
pub use error::PairingError;
pub use pairer::{Admissible, Pairer, unzip};
