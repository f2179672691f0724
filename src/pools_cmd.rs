use std::collections::BTreeSet;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use tracing::{info, info_span};
use verity_ingest::{MissingValues, SeriesSet, SourceTracker, read_json};
use verity_pool::{
    DataSource, PoolConfig, PoolFactory, PoolIdGenerator, PoolSummary, RetrievalError,
    RightValue, generate_pools, to_json,
};
use verity_timeseries::slice::snip_to_window;
use verity_timeseries::{Feature, FeatureGroup, FeatureTuple, TimeSeries, TimeWindow};
use verity_window::time_windows;

use crate::cli::PoolsArgs;
use crate::{config, convert};

/// Everything pool assembly needs besides the data.
struct Plan {
    config: PoolConfig,
    groups: Vec<FeatureGroup>,
    windows: Vec<TimeWindow>,
    threads: usize,
}

/// Reads the data sources, assembles every pool and writes their summaries.
pub fn run(args: PoolsArgs) -> Result<()> {
    let _cmd = info_span!("pools").entered();

    let config = config::load(&args.config)?;
    info!(
        path = %args.config.display(),
        evaluation = %config.evaluation.name,
        "loaded config"
    );

    let pooling = convert::build_pooling_config(&config.pools)?;
    let plan = Plan {
        config: convert::build_pool_config(&config)?,
        groups: convert::build_feature_groups(&config.feature_groups)?,
        windows: time_windows(&pooling).context("failed to generate time windows")?,
        threads: args.threads.unwrap_or(config.evaluation.threads),
    };
    let missing = convert::build_missing_values(&config.data)?;

    let tracker = SourceTracker::new();
    let left = read_source(&config.data.left, &missing, &tracker)?;
    let right = read_source(&config.data.right, &missing, &tracker)?;
    let baseline = config
        .data
        .baseline
        .as_deref()
        .map(|path| read_source(path, &missing, &tracker))
        .transpose()?;
    info!(
        sources = ?tracker.sources(),
        data_types = ?tracker.data_types(),
        "read data sources"
    );

    if !left.ensemble.is_empty() {
        bail!(
            "left data must be single-valued: {}",
            config.data.left.display()
        );
    }

    let summaries = if right.ensemble.is_empty() {
        let baseline = match baseline {
            Some(b) if !b.ensemble.is_empty() => {
                bail!("baseline data must be single-valued like the right data")
            }
            b => b.map(|b| b.single_valued),
        };
        assemble(&plan, left.single_valued, right.single_valued, baseline)?
    } else {
        let baseline = match baseline {
            Some(b) if !b.single_valued.is_empty() => {
                bail!("baseline data must be ensembles like the right data")
            }
            b => b.map(|b| b.ensemble),
        };
        assemble(&plan, left.single_valued, right.ensemble, baseline)?
    };

    let json = to_json(&summaries)?;
    match &args.output {
        Some(path) => {
            std::fs::write(path, &json)
                .with_context(|| format!("failed to write pool summaries: {}", path.display()))?;
            info!(path = %path.display(), pools = summaries.len(), "wrote pool summaries");
        }
        None => println!("{json}"),
    }
    Ok(())
}

/// Reads one JSON source, substitutes the missing-value sentinels and
/// tracks its data type.
fn read_source(path: &Path, missing: &MissingValues, tracker: &SourceTracker) -> Result<SeriesSet> {
    let set = read_json(path)
        .with_context(|| format!("failed to read time-series: {}", path.display()))?;
    let name = path.display().to_string();

    let single_valued: Vec<_> = set
        .single_valued
        .into_iter()
        .map(|s| missing.apply(s))
        .collect();
    let ensemble: Vec<_> = set.ensemble.into_iter().map(|s| missing.apply(s)).collect();
    for series in &single_valued {
        tracker.track(&name, series)?;
    }
    for series in &ensemble {
        tracker.track(&name, series)?;
    }
    Ok(SeriesSet {
        single_valued,
        ensemble,
    })
}

fn assemble<R: RightValue>(
    plan: &Plan,
    left: Vec<TimeSeries<f64>>,
    right: Vec<TimeSeries<R>>,
    baseline: Option<Vec<TimeSeries<R>>>,
) -> Result<Vec<PoolSummary>> {
    let ids = Arc::new(PoolIdGenerator::new());
    let mut factory = PoolFactory::new(
        plan.config.clone(),
        in_memory(left, FeatureTuple::left),
        in_memory(right, FeatureTuple::right),
        Arc::clone(&ids),
    )?;
    if let Some(baseline) = baseline {
        factory = factory.with_baseline_source(in_memory(baseline, FeatureTuple::baseline));
    }

    let suppliers = factory.suppliers(&plan.groups, &plan.windows)?;
    let pools = generate_pools(&suppliers, plan.threads).context("failed to generate pools")?;
    info!(pools = pools.len(), ids = ids.issued(), "generated pools");
    Ok(pools.iter().map(PoolSummary::from_pool).collect())
}

/// Serves the series of one side of the group's feature tuples, snipped to
/// the requested window.
fn in_memory<T>(
    series: Vec<TimeSeries<T>>,
    side: fn(&FeatureTuple) -> &Feature,
) -> Arc<dyn DataSource<T>>
where
    T: Clone + Send + Sync + 'static,
{
    let series: Arc<[TimeSeries<T>]> = series.into();
    Arc::new(
        move |group: &FeatureGroup,
              window: &TimeWindow|
              -> Result<Vec<TimeSeries<T>>, RetrievalError> {
            let features: BTreeSet<&Feature> = group.features().iter().map(side).collect();
            Ok(series
                .iter()
                .filter(|s| features.contains(s.metadata().feature()))
                .map(|s| snip_to_window(s.clone(), window))
                .filter(|s| !s.is_empty())
                .collect())
        },
    )
}
