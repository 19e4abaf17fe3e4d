//! Merging command-line overrides into the file configuration.

use anyhow::{Context, Result};

use crate::cli::args::{CommonArgs, InstrumentCli, OracleArgs};
use crate::config::{load_config, load_config_from, OracleKind, SeedprobeConfig};

/// Load the configuration named by `--config`, or discover one.
pub fn base_config(common: &CommonArgs) -> Result<SeedprobeConfig> {
    match &common.config {
        Some(path) => load_config_from(path)
            .with_context(|| format!("Failed to load configuration from {}", path.display())),
        None => Ok(load_config()),
    }
}

pub fn apply_oracle_overrides(config: &mut SeedprobeConfig, args: &OracleArgs) {
    if let Some(command) = &args.oracle_command {
        config.oracle.kind = OracleKind::Command;
        config.oracle.command = Some(command.clone());
    }
    if let Some(suffix) = &args.dump_suffix {
        config.oracle.dump_suffix = suffix.clone();
    }
}

pub fn apply_instrument_overrides(config: &mut SeedprobeConfig, cli: &InstrumentCli) {
    let instrument = &mut config.instrument;
    if let Some(backend) = cli.backend {
        instrument.backend = backend;
    }
    if let Some(policy) = cli.id_policy {
        instrument.id_policy = policy;
    }
    if let Some(max) = cli.max_trace_length {
        instrument.max_trace_length = max;
    }
    if let Some(root) = &cli.output_root {
        instrument.output_root = Some(root.clone());
    }
}

/// Re-check the merged configuration; flags can invalidate a valid file.
pub fn finish(config: SeedprobeConfig) -> Result<SeedprobeConfig> {
    config
        .validate()
        .map_err(|message| anyhow::anyhow!("Invalid configuration: {}", message))?;
    Ok(config)
}
