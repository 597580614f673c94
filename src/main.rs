use anyhow::Result;
use clap::Parser;
use pytgen_rs_core::cli::Args;

fn main() -> Result<()> {
    let args = Args::parse();
    pytgen_rs_core::run_cli(&args)
}
