use anyhow::Result;
use clap::Parser;
use seedprobe::cli::{handle_instrument_command, InstrumentCli};

fn main() -> Result<()> {
    handle_instrument_command(InstrumentCli::parse())
}
