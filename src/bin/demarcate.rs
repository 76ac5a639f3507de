//! demarcate: annotate one session recording with trial indices and,
//! optionally, the latency from each trial start.
//!
//! Output columns:
//!   time          sample timestamp (s)
//!   latency       seconds since the trial start   (with --latency)
//!   event_idx     index of that trial start       (with --latency)
//!   trial_idx     trial containing the sample, NaN in inter-trial gaps
//!   …             the recording's own columns
use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use operant::{
    demarcate_session, latency_from_event, load_events, write_table, AlignConfig, DataType,
    DemarcateConfig,
};

#[derive(Parser, Debug)]
#[command(name = "demarcate")]
struct Args {
    /// Root data directory (<data-dir>/<mouse>/<session>/…).
    #[arg(long, env = "DATA_DIR")]
    data_dir: PathBuf,

    #[arg(long)]
    mouse: String,

    #[arg(long)]
    session: String,

    /// Recording to demarcate: motion, deconv_calcium or raw_calcium.
    #[arg(long, default_value = "deconv_calcium")]
    data_type: DataType,

    /// Output safetensors path.
    #[arg(long)]
    output: PathBuf,

    /// Trial end column of the events table.
    #[arg(long, default_value = "reward_collection_time")]
    end_col: String,

    /// Also add latency from the trial start, keeping samples up to this many
    /// seconds after it.
    #[arg(long)]
    latency: Option<f64>,

    /// Seconds before each trial start included when --latency is set.
    #[arg(long, default_value_t = 0.0)]
    t_before: f64,

    /// Re-centre latencies on the sampling grid.
    #[arg(long)]
    backward_adjust: bool,

    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(if args.verbose { Level::DEBUG } else { Level::INFO })
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let cfg = DemarcateConfig {
        trials_end_col: args.end_col.clone(),
        ..DemarcateConfig::default()
    };
    let mut table = demarcate_session(&args.data_dir, &args.mouse, &args.session, args.data_type, &cfg)?;

    if let Some(t_after) = args.latency {
        let events = load_events(&args.data_dir, &args.mouse, &args.session, false)?;
        let starts = events.column(&cfg.trials_start_col)?.to_vec();
        let align = AlignConfig {
            time_col: cfg.ts_time_col.clone(),
            t_before: args.t_before,
            t_after,
            backward_adjust: args.backward_adjust,
            ..AlignConfig::default()
        };
        table = latency_from_event(&table, &starts, &align)?;
    }

    write_table(&table, &args.output)?;
    info!(rows = table.n_rows(), cols = table.n_cols(), path = %args.output.display(), "written");
    Ok(())
}
