use anyhow::Result;
use clap::Parser;
use seedprobe::cli::{handle_analyze_command, AnalyzeCli};

fn main() -> Result<()> {
    handle_analyze_command(AnalyzeCli::parse())
}
