use clap::{Args, Parser};
use std::path::PathBuf;

use crate::config::{BackendKind, IdPolicyKind};

/// Flags shared by both entry points.
#[derive(Args, Debug, Clone, Default)]
pub struct CommonArgs {
    /// Configuration file (defaults to the nearest .seedprobe.toml)
    #[arg(long, env = "SEEDPROBE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Worker threads (0 = available parallelism)
    #[arg(short = 'j', long, default_value = "0", env = "SEEDPROBE_JOBS")]
    pub jobs: usize,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count)]
    pub verbosity: u8,
}

/// How resolved trees are obtained.
#[derive(Args, Debug, Clone, Default)]
pub struct OracleArgs {
    /// Run this resolver for every source file instead of reading dumps
    #[arg(long = "oracle-command", env = "SEEDPROBE_ORACLE_COMMAND")]
    pub oracle_command: Option<String>,

    /// Suffix of sidecar dump files
    #[arg(long = "dump-suffix")]
    pub dump_suffix: Option<String>,
}

#[derive(Parser, Debug)]
#[command(name = "seedprobe-analyze")]
#[command(about = "Analyze Go function signatures for test generation", long_about = None)]
#[command(version)]
pub struct AnalyzeCli {
    /// Input file listing the files and functions to analyze
    #[arg(long)]
    pub targets: PathBuf,

    /// Where to write the analysis results
    #[arg(long)]
    pub results: PathBuf,

    #[command(flatten)]
    pub oracle: OracleArgs,

    #[command(flatten)]
    pub common: CommonArgs,
}

#[derive(Parser, Debug)]
#[command(name = "seedprobe-instrument")]
#[command(about = "Instrument a Go package with branch coverage probes", long_about = None)]
#[command(version)]
pub struct InstrumentCli {
    /// Input file naming the package and the tracked functions
    #[arg(long)]
    pub targets: PathBuf,

    /// Where to write the instrumentation result
    #[arg(long)]
    pub results: PathBuf,

    /// Counter backend
    #[arg(long, value_enum, env = "SEEDPROBE_BACKEND")]
    pub backend: Option<BackendKind>,

    /// Probe id policy
    #[arg(long = "id-policy", value_enum)]
    pub id_policy: Option<IdPolicyKind>,

    /// Maximum number of ids recorded per traced call
    #[arg(long = "max-trace-length")]
    pub max_trace_length: Option<usize>,

    /// Directory receiving the instrumented module copy
    #[arg(long = "output-root")]
    pub output_root: Option<PathBuf>,

    #[command(flatten)]
    pub oracle: OracleArgs,

    #[command(flatten)]
    pub common: CommonArgs,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definitions_are_consistent() {
        AnalyzeCli::command().debug_assert();
        InstrumentCli::command().debug_assert();
    }

    #[test]
    fn test_instrument_flags_parse() {
        let cli = InstrumentCli::try_parse_from([
            "seedprobe-instrument",
            "--targets",
            "in.json",
            "--results",
            "out.json",
            "--backend",
            "trace",
            "--id-policy",
            "hashed",
            "-vv",
        ])
        .unwrap();
        assert_eq!(cli.backend, Some(BackendKind::Trace));
        assert_eq!(cli.id_policy, Some(IdPolicyKind::Hashed));
        assert_eq!(cli.common.verbosity, 2);
    }

    #[test]
    fn test_missing_results_flag_is_rejected() {
        assert!(AnalyzeCli::try_parse_from(["seedprobe-analyze", "--targets", "in.json"]).is_err());
    }
}
