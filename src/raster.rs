//! Event rasterisation.
//!
//! Converts sparse event timestamps into a dense, uniformly sampled 0/1
//! indicator series, optionally smoothed by a kernel and circularly shifted.
//! A table of shifted copies gives a lagged design matrix for encoding
//! models.
//!
//! Event time `t` lands in sample `trunc(t / sampling_interval)`; several
//! events in one sample still give a single `1`.
use anyhow::{bail, Result};
use ndarray::Array1;
use tracing::debug;

use crate::config::{LaggedConfig, RasterConfig};
use crate::convolve::convolve_same;
use crate::table::Table;

fn check_duration(total_duration: f64) -> Result<()> {
    if !(total_duration.is_finite() && total_duration >= 0.0) {
        bail!("total duration must be finite and non-negative, got {total_duration}");
    }
    Ok(())
}

/// Number of samples covering `total_duration` at `sampling_interval`.
pub fn n_timesteps(total_duration: f64, sampling_interval: f64) -> usize {
    (total_duration / sampling_interval).ceil().max(0.0) as usize
}

/// Dense indicator series for `events`.
///
/// # Errors
///
/// Fails when the sampling interval is not positive, the kernel is empty,
/// the duration is negative or not finite, or when no duration is given and
/// there are no events to infer it from.
///
/// Without a duration the series ends at the latest event, which is always
/// kept.
///
/// # Examples
///
/// ```
/// use operant::{events_to_time_series, RasterConfig};
///
/// let cfg = RasterConfig { total_duration: Some(1.0), ..RasterConfig::default() };
/// let ts = events_to_time_series(&[0.5, 0.5], &cfg).unwrap();
/// assert_eq!(ts.len(), 10);
/// assert_eq!(ts[5], 1.0);
/// assert_eq!(ts.sum(), 1.0);
/// ```
pub fn events_to_time_series(events: &[f64], cfg: &RasterConfig) -> Result<Array1<f64>> {
    if !(cfg.sampling_interval > 0.0) {
        bail!("sampling interval must be positive, got {}", cfg.sampling_interval);
    }
    if cfg.kernel.as_ref().is_some_and(|k| k.is_empty()) {
        bail!("kernel must not be empty");
    }
    let n = match cfg.total_duration {
        Some(d) => {
            check_duration(d)?;
            n_timesteps(d, cfg.sampling_interval)
        }
        None => {
            let latest = events
                .iter()
                .copied()
                .filter(|v| !v.is_nan())
                .fold(f64::NEG_INFINITY, f64::max);
            if latest == f64::NEG_INFINITY {
                bail!("cannot infer a duration from an empty event list");
            }
            check_duration(latest)?;
            // an event on the grid lands one past ceil(d / dt)
            let last_idx = (latest / cfg.sampling_interval) as usize;
            n_timesteps(latest, cfg.sampling_interval).max(last_idx + 1)
        }
    };

    let mut series = vec![0.0_f64; n];
    let mut skipped = 0usize;
    for &t in events {
        // `as` truncates toward zero
        let idx = (t / cfg.sampling_interval) as i64;
        if t.is_nan() || idx < 0 || idx as usize >= n {
            skipped += 1;
            continue;
        }
        series[idx as usize] = 1.0;
    }
    if skipped > 0 {
        debug!(skipped, n, "events outside the raster");
    }

    if let Some(kernel) = &cfg.kernel {
        series = convolve_same(&series, kernel);
    }

    roll(&mut series, cfg.shift);
    Ok(Array1::from(series))
}

/// Circular shift: element `i` moves to `(i + shift) mod n`.
pub fn roll(x: &mut [f64], shift: isize) {
    if x.is_empty() {
        return;
    }
    let k = shift.rem_euclid(x.len() as isize) as usize;
    x.rotate_right(k);
}

/// Time axis paired with [`events_to_time_series`]:
/// `start_time + i * sampling_interval` for every sample `i`.
pub fn event_time_series_time(
    total_duration: f64,
    sampling_interval: f64,
    start_time: f64,
) -> Result<Array1<f64>> {
    if !(sampling_interval > 0.0) {
        bail!("sampling interval must be positive, got {sampling_interval}");
    }
    check_duration(total_duration)?;
    let n = n_timesteps(total_duration, sampling_interval);
    Ok(Array1::from_iter((0..n).map(|i| i as f64 * sampling_interval + start_time)))
}

/// Table of shifted indicator series for one event type.
///
/// One column per shift in `-num_shifts_backwards..=num_shifts_forwards`,
/// named `"{event_name}_at_{shift}"`, preceded by the time column.
pub fn events_to_time_series_table(
    events: &[f64],
    event_name: &str,
    total_duration: f64,
    cfg: &LaggedConfig,
) -> Result<Table> {
    let mut table = Table::new();
    table.push_column(
        cfg.created_time_col.as_str(),
        event_time_series_time(total_duration, cfg.sampling_interval, 0.0)?,
    )?;

    let base = RasterConfig {
        sampling_interval: cfg.sampling_interval,
        kernel: cfg.kernel.clone(),
        total_duration: Some(total_duration),
        shift: 0,
    };
    for shift in cfg.shifts() {
        let series = events_to_time_series(events, &RasterConfig { shift, ..base.clone() })?;
        table.push_column(format!("{event_name}_at_{shift}"), series)?;
    }
    Ok(table)
}
