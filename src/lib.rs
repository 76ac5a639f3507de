//! # operant — trial alignment for operant-conditioning recordings
//!
//! `operant` lines up behavioural trial tables with continuous recordings
//! (calcium imaging, motion tracking) and derives per-trial features for
//! encoding / decoding models.
//!
//! ## Pipeline overview
//!
//! ```text
//! landing/*.csv
//!   │
//!   ├─ convert::convert_csv_dir()        CSV → safetensors tables
//!   ├─ load::load_session_data()         <data>/<mouse>/<session>/<type>.safetensors
//!   │
//!   ├─ demarcate::demarcate_trials()     sample → trial index (NaN in ITIs)
//!   ├─ align::latency_from_event()       peri-event windows + latency column
//!   ├─ raster::events_to_time_series()   event times → 0/1 series (+ kernel, lags)
//!   ├─ features::*                       reward/shock history, ITI, delays
//!   └─ crossval::GroupTypeKFold          folds balanced over trial types
//! ```
//!
//! ## Quick start
//!
//! ```no_run
//! use operant::{demarcate_session, DemarcateConfig, DataType};
//! use std::path::Path;
//!
//! let table = demarcate_session(
//!     Path::new("data/raw"),
//!     "mouse01",
//!     "day1",
//!     DataType::DeconvCalcium,
//!     &DemarcateConfig::default(),
//! ).unwrap();
//! println!("{} samples, columns {:?}", table.n_rows(), table.names());
//! ```
//!
//! ## Running individual steps
//!
//! ```
//! use operant::{demarcate_trials, latency_from_event, AlignConfig, DemarcateConfig, Table};
//! use ndarray::array;
//!
//! let ts = Table::from_columns([
//!     ("time", array![0.0, 0.5, 1.0, 1.5, 2.0, 2.5]),
//!     ("neuron_0", array![0.1, 0.3, 0.2, 0.0, 0.4, 0.1]),
//! ]).unwrap();
//! let trials = Table::from_columns([
//!     ("trial_idx", array![0.0, 1.0]),
//!     ("start_time", array![0.0, 2.0]),
//!     ("reward_collection_time", array![1.0, 2.5]),
//! ]).unwrap();
//!
//! let demarcated = demarcate_trials(&ts, &trials, &DemarcateConfig::default()).unwrap();
//! assert!(demarcated.column("trial_idx").unwrap()[3].is_nan());
//!
//! let starts = trials.column("start_time").unwrap().to_vec();
//! let cfg = AlignConfig { t_after: 0.5, ..AlignConfig::default() };
//! let aligned = latency_from_event(&ts, &starts, &cfg).unwrap();
//! assert_eq!(aligned.names(), &["time", "latency", "event_idx", "neuron_0"]);
//! ```

pub mod align;
pub mod config;
pub mod convert;
pub mod convolve;
pub mod crossval;
pub mod demarcate;
pub mod error;
pub mod features;
pub mod io;
pub mod load;
pub mod raster;
pub mod table;

use anyhow::Result;
use std::path::Path;
use tracing::info;

// ── Crate-root re-exports ─────────────────────────────────────────────────

// config
pub use config::{AlignConfig, DemarcateConfig, Direction, LaggedConfig, RasterConfig};

// core transforms
pub use align::{align_to_events, latency_from_event};
pub use demarcate::{demarcate_trials, merge_asof_backward};
pub use raster::{event_time_series_time, events_to_time_series, events_to_time_series_table};

// numerics
pub use convolve::{convolve_full, convolve_same};

// features
pub use features::{
    cumulative_reward, cumulative_shock, event_delay, num_prev_trials, prev_iti_length,
    reward_collection_delay, reward_in_window, screen_touch_delay, shock_in_window,
    trial_duration, trial_start_delay, RewardConfig, ShockConfig, TrialColumns,
};

// cross-validation
pub use crossval::{Fold, GroupTypeKFold};

// storage
pub use convert::{convert_csv_dir, CsvConfig};
pub use error::{LoadError, SplitError};
pub use io::{read_table, write_table};
pub use load::{load_events, load_session_data, DataType};
pub use table::Table;

/// Load one recording of a session and annotate every sample with its trial.
///
/// Reads `<data_dir>/<mouse_name>/<session>/` for both `data_type` and the
/// events table, then runs [`demarcate_trials`].  The result carries
/// `mouse_name` and `session` in its metadata.
///
/// # Errors
///
/// Fails if either file is missing or unreadable, or if a configured column
/// is absent.
pub fn demarcate_session(
    data_dir: &Path,
    mouse_name: &str,
    session: &str,
    data_type: DataType,
    cfg: &DemarcateConfig,
) -> Result<Table> {
    let ts = load_session_data(data_dir, mouse_name, session, data_type, true)?;
    let events = load_events(data_dir, mouse_name, session, false)?;

    let out = demarcate_trials(&ts, &events, cfg)?;
    info!(
        mouse = mouse_name,
        session,
        %data_type,
        samples = out.n_rows(),
        trials = events.n_rows(),
        "demarcated session"
    );
    Ok(out)
}
