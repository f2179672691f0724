use std::io::Write;

use anyhow::{Context, Result};
use tracing::{info, info_span};
use verity_window::{pool_count, time_windows};

use crate::cli::WindowsArgs;
use crate::{config, convert};

/// Prints one time window per line, in pool order.
pub fn run(args: WindowsArgs) -> Result<()> {
    let _cmd = info_span!("windows").entered();

    let config = config::load(&args.config)?;
    let pooling = convert::build_pooling_config(&config.pools)?;
    let windows = time_windows(&pooling).context("failed to generate time windows")?;
    info!(
        windows = windows.len(),
        pools = pool_count(&windows, config.feature_groups.len()),
        "generated time windows"
    );

    let mut out = std::io::stdout().lock();
    for window in &windows {
        writeln!(out, "{window}").context("failed to write time windows")?;
    }
    Ok(())
}
