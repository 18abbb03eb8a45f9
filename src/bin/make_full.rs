use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use kima_showresults::data::combine::{combine_files, write_full};

/// Combine per-instrument RV files into one time-sorted file whose fourth
/// column is the instrument index (1-based position on the command line).
#[derive(Parser)]
#[command(name = "kima-make-full", version, about)]
struct Cli {
    /// Output file
    #[arg(short, long)]
    output: PathBuf,

    /// Header lines to skip in every input file
    #[arg(long, default_value = "2")]
    skip: usize,

    /// One RV file per instrument (time, vrad, svrad)
    #[arg(required = true)]
    inputs: Vec<PathBuf>,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    for path in &cli.inputs {
        log::info!("{}", path.display());
    }
    let data = combine_files(cli.inputs, cli.skip)?;

    let file = File::create(&cli.output)
        .with_context(|| format!("creating {}", cli.output.display()))?;
    write_full(&data, BufWriter::new(file))
        .with_context(|| format!("writing {}", cli.output.display()))?;

    log::info!("Wrote {} rows to {}", data.len(), cli.output.display());
    Ok(())
}
