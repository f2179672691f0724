//! Pool assembly for the verity pooling engine.
//!
//! For each feature group and time window, a [`PoolSupplier`] retrieves the
//! left, right and baseline series through injected [`DataSource`]s,
//! upscales them to the desired time scale, pairs them and snips the pairs
//! to the window.
//!
//! # Pipeline
//!
//! ```text
//!  ┌──────────────┐     ┌──────────────┐     ┌──────────────┐     ┌──────────────┐
//!  │   retrieve    │────▶│   upscale     │────▶│     pair      │────▶│  snip + sort  │
//!  │ (left cached) │     │ (left @ right │     │ (exact or     │     │  (window)     │
//!  │               │     │  valid times) │     │  nearest)     │     │               │
//!  └──────────────┘     └──────────────┘     └──────────────┘     └──────────────┘
//! ```
//!
//! Suppliers run in parallel on a fixed-size worker pool; failures are
//! collected and reported together.
//!
//! # Quick start
//!
//! ```ignore
//! use std::sync::Arc;
//! use verity_pool::{PoolConfig, PoolFactory, PoolIdGenerator, generate_pools};
//!
//! let ids = Arc::new(PoolIdGenerator::new());
//! let factory = PoolFactory::<f64>::new(PoolConfig::new("eval"), left, right, ids)?;
//! let suppliers = factory.suppliers(&groups, &windows)?;
//! let pools = generate_pools(&suppliers, 0)?;
//! ```

mod baseline;
mod config;
mod error;
mod factory;
mod generate;
mod id;
mod pool;
mod source;
mod summary;
mod supplier;

pub use config::{BaselineGenerator, PoolConfig};
pub use error::{PoolCreationCause, PoolCreationError, PoolError, RetrievalError};
pub use factory::PoolFactory;
pub use generate::{PoolOutcome, generate_pools, run_suppliers};
pub use id::PoolIdGenerator;
pub use pool::{Climatology, Orientation, Pool, SampleMetadata};
pub use source::{CachingSupplier, DataSource, SeriesSupplier};
pub use summary::{PoolSummary, WindowSummary, to_json};
pub use supplier::{PoolSupplier, RightValue};
