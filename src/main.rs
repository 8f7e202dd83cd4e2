use anyhow::Result;
use clap::Parser;
use rfid_blocks_core::cli::Args;

fn main() -> Result<()> {
    let args = Args::parse();
    rfid_blocks_core::run_cli(&args)
}
