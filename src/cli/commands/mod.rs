//! Handlers behind the two entry points.
//!
//! Each handler reads one protocol file, runs the batch and writes one
//! protocol file. Nothing is written when the batch fails.

use anyhow::{Context, Result};

use crate::analysis::{analyze_targets, AnalysisTargets};
use crate::cli::args::{AnalyzeCli, InstrumentCli};
use crate::cli::config_builder::{
    apply_instrument_overrides, apply_oracle_overrides, base_config, finish,
};
use crate::cli::setup::{configure_thread_pool, init_logging};
use crate::instrument::{instrument_package, InstrumentationTarget};
use crate::io::{read_json, write_json};
use crate::oracle;

pub fn handle_analyze_command(cli: AnalyzeCli) -> Result<()> {
    init_logging(cli.common.verbosity);
    configure_thread_pool(cli.common.jobs);

    let mut config = base_config(&cli.common)?;
    apply_oracle_overrides(&mut config, &cli.oracle);
    let config = finish(config)?;

    let targets: AnalysisTargets = read_json(&cli.targets)
        .with_context(|| format!("Failed to read targets from {}", cli.targets.display()))?;
    let oracle = oracle::from_config(&config.oracle).context("Failed to set up the oracle")?;

    let results = analyze_targets(oracle.as_ref(), &targets).context("Analysis failed")?;
    write_json(&cli.results, &results)
        .with_context(|| format!("Failed to write results to {}", cli.results.display()))?;
    Ok(())
}

pub fn handle_instrument_command(cli: InstrumentCli) -> Result<()> {
    init_logging(cli.common.verbosity);
    configure_thread_pool(cli.common.jobs);

    let mut config = base_config(&cli.common)?;
    apply_oracle_overrides(&mut config, &cli.oracle);
    apply_instrument_overrides(&mut config, &cli);
    let config = finish(config)?;

    let target: InstrumentationTarget = read_json(&cli.targets)
        .with_context(|| format!("Failed to read target from {}", cli.targets.display()))?;
    let oracle = oracle::from_config(&config.oracle).context("Failed to set up the oracle")?;

    let result = instrument_package(oracle.as_ref(), &target, &config.instrument)
        .with_context(|| {
            format!(
                "Failed to instrument {}",
                target.target_module_path.display()
            )
        })?;
    write_json(&cli.results, &result)
        .with_context(|| format!("Failed to write result to {}", cli.results.display()))?;
    Ok(())
}
