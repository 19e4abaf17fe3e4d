//! Configuration loaded from `.seedprobe.toml` and overridden from the CLI.

mod core;
mod loader;

pub use self::core::{
    default_counter_table_name, default_dump_suffix, default_exclude_patterns,
    default_hash_bucket_bits, default_int_size, default_max_trace_length,
    default_table_file_name, default_trace_parameter_name, is_go_identifier, BackendKind,
    IdPolicyKind, InstrumentConfig, OracleConfig, OracleKind, SeedprobeConfig,
};
pub use self::loader::{
    directory_ancestors, load_config, load_config_from, parse_and_validate_config,
    CONFIG_FILE_NAME,
};
