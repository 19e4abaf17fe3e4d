//! CLI module for seedprobe
//!
//! - Argument parsing (`args`)
//! - Command handlers (`commands`)
//! - Flag overrides on top of the file configuration (`config_builder`)
//! - Runtime setup (`setup`)

pub mod args;
pub mod commands;
pub mod config_builder;
pub mod setup;

pub use args::{AnalyzeCli, CommonArgs, InstrumentCli, OracleArgs};
pub use commands::{handle_analyze_command, handle_instrument_command};
pub use setup::{configure_thread_pool, init_logging};
