//! convert: mirror a tree of CSV exports into safetensors tables.
//!
//!   landing/<mouse>/<session>/events.csv
//!     → raw/<mouse>/<session>/events.safetensors
use anyhow::{bail, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use operant::{convert_csv_dir, CsvConfig};

#[derive(Parser, Debug)]
#[command(name = "convert", about = "Convert CSV session exports to safetensors tables")]
struct Args {
    /// Directory scanned recursively for CSV files (the landing area).
    #[arg(long, env = "LANDING_DIR")]
    input: PathBuf,

    /// Output root; relative paths are preserved.
    #[arg(long, env = "RAW_DIR")]
    output: PathBuf,

    /// Field delimiter.
    #[arg(long, default_value_t = ',')]
    delimiter: char,

    /// Log every converted file.
    #[arg(short, long)]
    verbose: bool,
}

fn delimiter_byte(c: char) -> Result<u8> {
    if !c.is_ascii() {
        bail!("delimiter must be a single ASCII character, got '{c}'");
    }
    Ok(c as u8)
}

fn main() -> Result<()> {
    let args = Args::parse();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(if args.verbose { Level::DEBUG } else { Level::WARN })
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let cfg = CsvConfig {
        delimiter: delimiter_byte(args.delimiter)?,
        ..CsvConfig::default()
    };
    let n = convert_csv_dir(&args.input, &args.output, &cfg)?;
    info!(files = n, "done");
    println!("Converted {n} files → {}", args.output.display());
    Ok(())
}
