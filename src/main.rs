use clap::Parser;
use sketchlog::cli::Cli;

fn main() -> anyhow::Result<()> {
    sketchlog::run(Cli::parse())?;
    Ok(())
}
