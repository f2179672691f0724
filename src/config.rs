use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Deserialize;

/// Top-level verity configuration.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct VerityConfig {
    /// Evaluation settings.
    pub evaluation: EvaluationToml,

    /// Data sources.
    pub data: DataToml,

    /// Desired time scale of the pairs. Absent means the existing scale.
    #[serde(default)]
    pub scale: Option<ScaleToml>,

    /// Pairing settings.
    #[serde(default)]
    pub pairing: PairingToml,

    /// Generated baseline settings.
    #[serde(default)]
    pub baseline: BaselineToml,

    /// Time window settings.
    #[serde(default)]
    pub pools: PoolsToml,

    /// Feature groups to pool.
    #[serde(default)]
    pub feature_groups: Vec<FeatureGroupToml>,
}

/// Reads and parses the TOML settings file at `path`.
pub fn load(path: &Path) -> Result<VerityConfig> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config file: {}", path.display()))?;
    toml::from_str(&text).context("failed to parse TOML config")
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EvaluationToml {
    pub name: String,
    /// Worker threads; 0 uses the available parallelism.
    #[serde(default)]
    pub threads: usize,
    #[serde(default)]
    pub climatology: bool,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DataToml {
    pub left: PathBuf,
    pub right: PathBuf,
    #[serde(default)]
    pub baseline: Option<PathBuf>,
    /// Sentinels replaced by the missing value in every source, e.g. `"-999"`.
    #[serde(default)]
    pub missing_values: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScaleToml {
    pub period: i64,
    #[serde(default = "default_unit")]
    pub unit: String,
    pub function: String,
    #[serde(default = "default_lenience")]
    pub lenience: String,
    #[serde(default = "default_min_events")]
    pub min_events: usize,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PairingToml {
    #[serde(default = "default_mode")]
    pub mode: String,
    #[serde(default)]
    pub tolerance: i64,
    #[serde(default = "default_unit")]
    pub unit: String,
}

impl Default for PairingToml {
    fn default() -> Self {
        Self {
            mode: default_mode(),
            tolerance: 0,
            unit: default_unit(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BaselineToml {
    #[serde(default = "default_generator")]
    pub generator: String,
    #[serde(default = "default_lag")]
    pub lag: usize,
}

impl Default for BaselineToml {
    fn default() -> Self {
        Self {
            generator: default_generator(),
            lag: default_lag(),
        }
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct PoolsToml {
    #[serde(default)]
    pub lead: Option<LeadPoolsToml>,
    #[serde(default)]
    pub reference: Option<DatePoolsToml>,
    #[serde(default)]
    pub valid: Option<DatePoolsToml>,
}

/// Lead duration bounds and optional pools, in `unit`.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LeadPoolsToml {
    pub minimum: i64,
    pub maximum: i64,
    #[serde(default)]
    pub period: Option<i64>,
    #[serde(default)]
    pub frequency: Option<i64>,
    #[serde(default)]
    pub reverse: bool,
    #[serde(default = "default_unit")]
    pub unit: String,
}

/// Date bounds as RFC 3339 strings and optional pools, in `unit`.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DatePoolsToml {
    pub minimum: DateTime<Utc>,
    pub maximum: DateTime<Utc>,
    #[serde(default)]
    pub period: Option<i64>,
    #[serde(default)]
    pub frequency: Option<i64>,
    #[serde(default)]
    pub reverse: bool,
    #[serde(default = "default_unit")]
    pub unit: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FeatureGroupToml {
    /// Required when the group holds more than one feature.
    #[serde(default)]
    pub name: Option<String>,
    pub features: Vec<FeatureToml>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FeatureToml {
    pub left: String,
    /// Defaults to `left`.
    #[serde(default)]
    pub right: Option<String>,
    /// Defaults to `right`.
    #[serde(default)]
    pub baseline: Option<String>,
}

fn default_unit() -> String {
    "hours".to_string()
}
fn default_lenience() -> String {
    "strict".to_string()
}
fn default_min_events() -> usize {
    1
}
fn default_mode() -> String {
    "exact".to_string()
}
fn default_generator() -> String {
    "none".to_string()
}
fn default_lag() -> usize {
    1
}
