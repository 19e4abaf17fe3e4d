use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure for seedprobe
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct SeedprobeConfig {
    /// How resolved syntax trees are obtained
    #[serde(default)]
    pub oracle: OracleConfig,

    /// Coverage instrumentation settings
    #[serde(default)]
    pub instrument: InstrumentConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum OracleKind {
    /// Sidecar JSON dumps next to each source file
    #[default]
    Dump,
    /// External resolver executable printing the dump on stdout
    Command,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OracleConfig {
    #[serde(default)]
    pub kind: OracleKind,

    #[serde(default = "default_dump_suffix")]
    pub dump_suffix: String,

    /// Resolver program, looked up on `PATH` when not a path
    #[serde(default)]
    pub command: Option<String>,

    /// Arguments placed before the source path
    #[serde(default)]
    pub args: Vec<String>,

    /// Native `int` width of the subject toolchain
    #[serde(default = "default_int_size")]
    pub int_size: u32,
}

impl Default for OracleConfig {
    fn default() -> Self {
        Self {
            kind: OracleKind::default(),
            dump_suffix: default_dump_suffix(),
            command: None,
            args: Vec::new(),
            int_size: default_int_size(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum BackendKind {
    /// Package-wide counter table
    #[default]
    Table,
    /// Per-invocation bounded trace through a shadow function
    Trace,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum IdPolicyKind {
    #[default]
    Sequential,
    /// Hash the sequence number into a bounded bucket range
    Hashed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstrumentConfig {
    #[serde(default)]
    pub backend: BackendKind,

    #[serde(default)]
    pub id_policy: IdPolicyKind,

    #[serde(default = "default_hash_bucket_bits")]
    pub hash_bucket_bits: u32,

    #[serde(default = "default_max_trace_length")]
    pub max_trace_length: usize,

    #[serde(default = "default_counter_table_name")]
    pub counter_table_name: String,

    #[serde(default = "default_trace_parameter_name")]
    pub trace_parameter_name: String,

    #[serde(default = "default_table_file_name")]
    pub table_file_name: String,

    /// Parent directory for instrumented module copies (system temp dir if unset)
    #[serde(default)]
    pub output_root: Option<PathBuf>,

    /// Glob patterns on file names left uninstrumented
    #[serde(default = "default_exclude_patterns")]
    pub exclude_patterns: Vec<String>,
}

impl Default for InstrumentConfig {
    fn default() -> Self {
        Self {
            backend: BackendKind::default(),
            id_policy: IdPolicyKind::default(),
            hash_bucket_bits: default_hash_bucket_bits(),
            max_trace_length: default_max_trace_length(),
            counter_table_name: default_counter_table_name(),
            trace_parameter_name: default_trace_parameter_name(),
            table_file_name: default_table_file_name(),
            output_root: None,
            exclude_patterns: default_exclude_patterns(),
        }
    }
}

impl SeedprobeConfig {
    /// Check cross-field constraints after parsing or CLI overrides.
    pub fn validate(&self) -> Result<(), String> {
        let oracle = &self.oracle;
        if oracle.int_size != 32 && oracle.int_size != 64 {
            return Err(format!(
                "oracle.int_size must be 32 or 64, got {}",
                oracle.int_size
            ));
        }
        if oracle.kind == OracleKind::Command && oracle.command.is_none() {
            return Err("oracle.command is required when oracle.kind = \"command\"".to_string());
        }
        if oracle.dump_suffix.is_empty() {
            return Err("oracle.dump_suffix must not be empty".to_string());
        }

        let instrument = &self.instrument;
        if !(1..=32).contains(&instrument.hash_bucket_bits) {
            return Err(format!(
                "instrument.hash_bucket_bits must be between 1 and 32, got {}",
                instrument.hash_bucket_bits
            ));
        }
        if instrument.backend == BackendKind::Trace
            && instrument.id_policy == IdPolicyKind::Hashed
            && instrument.hash_bucket_bits > 16
        {
            return Err(
                "instrument.hash_bucket_bits must be at most 16 for the trace backend".to_string(),
            );
        }
        if instrument.max_trace_length == 0 {
            return Err("instrument.max_trace_length must be positive".to_string());
        }
        validate_identifier(&instrument.counter_table_name, "instrument.counter_table_name")?;
        validate_identifier(
            &instrument.trace_parameter_name,
            "instrument.trace_parameter_name",
        )?;
        if !instrument.table_file_name.ends_with(".go")
            || instrument.table_file_name.ends_with("_test.go")
        {
            return Err(format!(
                "instrument.table_file_name must be a non-test .go file, got {:?}",
                instrument.table_file_name
            ));
        }
        for (i, pattern) in instrument.exclude_patterns.iter().enumerate() {
            if let Err(e) = glob::Pattern::new(pattern) {
                return Err(format!(
                    "Invalid exclude pattern #{}: '{}' - {}",
                    i + 1,
                    pattern,
                    e
                ));
            }
        }
        Ok(())
    }
}

/// Go identifiers: a letter or underscore, then letters, digits or underscores.
pub fn is_go_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first == '_' || first.is_alphabetic() => {
            chars.all(|c| c == '_' || c.is_alphanumeric())
        }
        _ => false,
    }
}

fn validate_identifier(name: &str, key: &str) -> Result<(), String> {
    if is_go_identifier(name) {
        Ok(())
    } else {
        Err(format!("{} is not a valid identifier: {:?}", key, name))
    }
}

pub fn default_dump_suffix() -> String {
    ".ast.json".to_string()
}

pub fn default_int_size() -> u32 {
    64
}

pub fn default_hash_bucket_bits() -> u32 {
    16
}

pub fn default_max_trace_length() -> usize {
    1024
}

pub fn default_counter_table_name() -> String {
    "__ut_cover_tab__".to_string()
}

pub fn default_trace_parameter_name() -> String {
    "__ut_trace__".to_string()
}

pub fn default_table_file_name() -> String {
    "ut_cover_table.go".to_string()
}

pub fn default_exclude_patterns() -> Vec<String> {
    vec!["*_test.go".to_string()]
}
