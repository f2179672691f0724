//! Pure conversion functions: TOML config structs -> crate API config types.

use anyhow::{Context, Result, bail};
use chrono::TimeDelta;

use crate::config::*;

use verity_ingest::{MissingValues, parse_missing_value};
use verity_pair::{PairConfig, PairingMode};
use verity_pool::{BaselineGenerator, PoolConfig};
use verity_timeseries::{Feature, FeatureGroup, FeatureTuple, TimeScale, TimeScaleFunction};
use verity_upscale::{Lenience, UpscaleConfig};
use verity_window::{PoolingConfig, WindowSpec};

/// Converts `amount` of a duration unit name into a `TimeDelta`.
pub fn parse_duration(amount: i64, unit: &str) -> Result<TimeDelta> {
    let delta = match unit.to_lowercase().as_str() {
        "seconds" | "second" | "s" => TimeDelta::try_seconds(amount),
        "minutes" | "minute" | "min" => TimeDelta::try_minutes(amount),
        "hours" | "hour" | "h" => TimeDelta::try_hours(amount),
        "days" | "day" | "d" => TimeDelta::try_days(amount),
        other => bail!("unknown duration unit: {other:?}"),
    };
    delta.with_context(|| format!("duration of {amount} {unit} is out of range"))
}

/// Parses a pairing mode name into the corresponding enum variant.
pub fn parse_pairing_mode(t: &PairingToml) -> Result<PairingMode> {
    match t.mode.to_lowercase().as_str() {
        "exact" => Ok(PairingMode::Exact),
        "nearest" => Ok(PairingMode::Nearest {
            tolerance: parse_duration(t.tolerance, &t.unit)?,
        }),
        other => bail!("unknown pairing mode: {other:?}"),
    }
}

/// Parses a baseline generator name into the corresponding enum variant.
pub fn parse_baseline_generator(t: &BaselineToml) -> Result<BaselineGenerator> {
    match t.generator.to_lowercase().as_str() {
        "none" => Ok(BaselineGenerator::None),
        "persistence" => Ok(BaselineGenerator::Persistence { lag: t.lag }),
        other => bail!("unknown baseline generator: {other:?}"),
    }
}

/// Converts the `[scale]` table into a desired time scale.
pub fn build_time_scale(t: &ScaleToml) -> Result<TimeScale> {
    let function: TimeScaleFunction = t.function.parse()?;
    let scale = TimeScale::new(parse_duration(t.period, &t.unit)?, function)?;
    Ok(scale)
}

/// Converts the `[scale]` table into an `UpscaleConfig`.
pub fn build_upscale_config(t: Option<&ScaleToml>) -> Result<UpscaleConfig> {
    let Some(t) = t else {
        return Ok(UpscaleConfig::new());
    };
    let lenience: Lenience = t.lenience.parse()?;
    let config = UpscaleConfig::new()
        .with_lenience(lenience)
        .with_min_events(t.min_events);
    config.validate()?;
    Ok(config)
}

/// Converts the `[pairing]` table into a `PairConfig`.
pub fn build_pair_config(t: &PairingToml) -> Result<PairConfig> {
    let config = PairConfig::new().with_mode(parse_pairing_mode(t)?);
    config.validate()?;
    Ok(config)
}

/// Builds the `PoolConfig` from the evaluation, scale, pairing and baseline
/// tables.
pub fn build_pool_config(config: &VerityConfig) -> Result<PoolConfig> {
    let desired_scale = config.scale.as_ref().map(build_time_scale).transpose()?;
    let pool = PoolConfig::new(&config.evaluation.name)
        .with_desired_scale(desired_scale)
        .with_upscale(build_upscale_config(config.scale.as_ref())?)
        .with_pair(build_pair_config(&config.pairing)?)
        .with_baseline(parse_baseline_generator(&config.baseline)?)
        .with_climatology(config.evaluation.climatology);
    pool.validate()?;
    Ok(pool)
}

fn window_spec(
    period: Option<i64>,
    frequency: Option<i64>,
    reverse: bool,
    unit: &str,
) -> Result<Option<WindowSpec>> {
    let Some(period) = period else {
        if frequency.is_some() {
            bail!("pool frequency given without a period");
        }
        return Ok(None);
    };
    let mut spec = WindowSpec::new(parse_duration(period, unit)?).with_reverse(reverse);
    if let Some(frequency) = frequency {
        spec = spec.with_frequency(parse_duration(frequency, unit)?);
    }
    Ok(Some(spec))
}

/// Converts the `[pools.*]` tables into a `PoolingConfig`.
pub fn build_pooling_config(t: &PoolsToml) -> Result<PoolingConfig> {
    let mut config = PoolingConfig::new();

    if let Some(lead) = &t.lead {
        config = config.with_lead_durations(
            parse_duration(lead.minimum, &lead.unit)?,
            parse_duration(lead.maximum, &lead.unit)?,
        );
        if let Some(spec) = window_spec(lead.period, lead.frequency, lead.reverse, &lead.unit)
            .context("invalid [pools.lead]")?
        {
            config = config.with_lead_pools(spec);
        }
    }

    if let Some(reference) = &t.reference {
        config = config.with_reference_times(reference.minimum, reference.maximum);
        if let Some(spec) = window_spec(
            reference.period,
            reference.frequency,
            reference.reverse,
            &reference.unit,
        )
        .context("invalid [pools.reference]")?
        {
            config = config.with_reference_pools(spec);
        }
    }

    if let Some(valid) = &t.valid {
        config = config.with_valid_times(valid.minimum, valid.maximum);
        if let Some(spec) = window_spec(valid.period, valid.frequency, valid.reverse, &valid.unit)
            .context("invalid [pools.valid]")?
        {
            config = config.with_valid_pools(spec);
        }
    }

    config.validate()?;
    Ok(config)
}

/// Converts a feature table into a `FeatureTuple`.
pub fn build_feature_tuple(t: &FeatureToml) -> FeatureTuple {
    let right = t.right.as_deref().unwrap_or(&t.left);
    let tuple = FeatureTuple::new(Feature::new(&t.left), Feature::new(right));
    match &t.baseline {
        Some(baseline) => tuple.with_baseline(Feature::new(baseline)),
        None => tuple,
    }
}

/// Converts the `[[feature_groups]]` tables into `FeatureGroup`s.
///
/// An unnamed group must hold exactly one feature and is named after its
/// right feature.
pub fn build_feature_groups(groups: &[FeatureGroupToml]) -> Result<Vec<FeatureGroup>> {
    if groups.is_empty() {
        bail!("at least one [[feature_groups]] entry is required");
    }
    groups
        .iter()
        .enumerate()
        .map(|(i, g)| {
            let mut tuples: Vec<FeatureTuple> =
                g.features.iter().map(build_feature_tuple).collect();
            match &g.name {
                Some(name) => FeatureGroup::new(name, tuples)
                    .with_context(|| format!("invalid feature group {name:?}")),
                None if tuples.len() == 1 => Ok(FeatureGroup::singleton(tuples.swap_remove(0))),
                None => bail!(
                    "feature group {i} holds {} features and needs a name",
                    tuples.len()
                ),
            }
        })
        .collect()
}

/// Converts the `[data]` sentinels into `MissingValues`.
pub fn build_missing_values(t: &DataToml) -> Result<MissingValues> {
    let sentinels = t
        .missing_values
        .iter()
        .map(|s| parse_missing_value(s))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(MissingValues::new(sentinels))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SETTINGS: &str = r#"
[evaluation]
name = "streamflow"
climatology = true

[data]
left = "observed.json"
right = "forecasts.json"
missing_values = ["-999", "null"]

[scale]
period = 6
function = "mean"

[pairing]
mode = "nearest"
tolerance = 30
unit = "minutes"

[baseline]
generator = "persistence"
lag = 2

[pools.lead]
minimum = 0
maximum = 24
period = 6
frequency = 6

[pools.reference]
minimum = "2551-03-17T00:00:00Z"
maximum = "2551-03-20T00:00:00Z"

[[feature_groups]]
features = [{ left = "DRRC2", right = "DRRC2HSF" }]

[[feature_groups]]
name = "upper"
features = [{ left = "DOLC2" }, { left = "DRRC2" }]
"#;

    fn settings() -> VerityConfig {
        toml::from_str(SETTINGS).unwrap()
    }

    #[test]
    fn durations_in_every_unit() {
        assert_eq!(parse_duration(90, "seconds").unwrap(), TimeDelta::seconds(90));
        assert_eq!(parse_duration(2, "Minutes").unwrap(), TimeDelta::minutes(2));
        assert_eq!(parse_duration(6, "hours").unwrap(), TimeDelta::hours(6));
        assert_eq!(parse_duration(1, "d").unwrap(), TimeDelta::days(1));
        assert!(parse_duration(1, "fortnights").is_err());
        assert!(parse_duration(i64::MAX, "days").is_err());
    }

    #[test]
    fn pool_config_from_settings() {
        let config = build_pool_config(&settings()).unwrap();
        assert_eq!(config.evaluation(), "streamflow");
        assert_eq!(
            config.desired_scale(),
            Some(TimeScale::new(TimeDelta::hours(6), TimeScaleFunction::Mean).unwrap())
        );
        assert_eq!(
            config.pair().mode(),
            PairingMode::Nearest {
                tolerance: TimeDelta::minutes(30)
            }
        );
        assert_eq!(config.baseline(), BaselineGenerator::Persistence { lag: 2 });
        assert!(config.climatology());
    }

    #[test]
    fn pooling_config_from_settings() {
        let config = build_pooling_config(&settings().pools).unwrap();
        assert_eq!(
            config.lead_durations(),
            Some((TimeDelta::zero(), TimeDelta::hours(24)))
        );
        assert_eq!(config.lead_pools().unwrap().period(), TimeDelta::hours(6));
        assert!(config.reference_times().is_some());
        assert!(config.reference_pools().is_none());
        assert!(config.valid_times().is_none());
    }

    #[test]
    fn frequency_without_period_is_rejected() {
        let pools = PoolsToml {
            lead: Some(LeadPoolsToml {
                minimum: 0,
                maximum: 24,
                period: None,
                frequency: Some(6),
                reverse: false,
                unit: "hours".to_string(),
            }),
            ..PoolsToml::default()
        };
        assert!(build_pooling_config(&pools).is_err());
    }

    #[test]
    fn feature_groups_from_settings() {
        let groups = build_feature_groups(&settings().feature_groups).unwrap();
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].name(), "DRRC2HSF");
        assert_eq!(groups[0].features()[0].left().name(), "DRRC2");
        assert_eq!(groups[0].features()[0].baseline().name(), "DRRC2HSF");
        assert_eq!(groups[1].name(), "upper");
        assert_eq!(groups[1].features().len(), 2);
    }

    #[test]
    fn unnamed_multi_feature_group_is_rejected() {
        let groups = [FeatureGroupToml {
            name: None,
            features: vec![
                FeatureToml {
                    left: "A".to_string(),
                    right: None,
                    baseline: None,
                },
                FeatureToml {
                    left: "B".to_string(),
                    right: None,
                    baseline: None,
                },
            ],
        }];
        let err = build_feature_groups(&groups).unwrap_err();
        assert!(err.to_string().contains("needs a name"));
        assert!(build_feature_groups(&[]).is_err());
    }

    #[test]
    fn missing_values_from_settings() {
        let missing = build_missing_values(&settings().data).unwrap();
        assert!(missing.is_sentinel(-999.0));
        assert_eq!(missing.sentinels().len(), 1);
    }

    #[test]
    fn unknown_names_are_rejected() {
        let pairing = PairingToml {
            mode: "closest".to_string(),
            ..PairingToml::default()
        };
        assert!(build_pair_config(&pairing).is_err());
        let baseline = BaselineToml {
            generator: "climatology".to_string(),
            lag: 1,
        };
        assert!(parse_baseline_generator(&baseline).is_err());
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let text = format!("{SETTINGS}\n[extra]\nkey = 1\n");
        assert!(toml::from_str::<VerityConfig>(&text).is_err());
    }
}
