//! Event-triggered windowing.
//!
//! [`align_to_events`] cuts a time-series table into peri-event windows:
//! every sample is attached to one anchor (see [`Direction`]) and kept only if
//! it lies in `[anchor - t_before, anchor + t_after]`.  Two columns are added:
//! the latency `t - anchor` and, optionally, the anchor's index in sorted
//! order.
//!
//! [`latency_from_event`] builds on it and can re-centre the latencies on the
//! sampling grid (`backward_adjust`).
use anyhow::{bail, Result};
use ndarray::Array1;
use tracing::debug;

use crate::config::{AlignConfig, Direction};
use crate::demarcate::merge_asof_backward;
use crate::table::{nan_median, round_to, Table};

/// Restrict `ts` to the samples inside an event window and label them.
///
/// Output rows are sorted by time; columns are
/// `[time, latency, event_idx?, <remaining ts columns…>]`.
///
/// `NaN` anchors are ignored.  With no anchors the result has no rows.
///
/// # Errors
///
/// Fails when the time column is missing or a window bound is negative.
pub fn align_to_events(ts: &Table, events: &[f64], cfg: &AlignConfig) -> Result<Table> {
    if !(cfg.t_before >= 0.0) || !(cfg.t_after >= 0.0) {
        bail!(
            "window bounds must be non-negative (t_before={}, t_after={})",
            cfg.t_before,
            cfg.t_after
        );
    }

    let mut anchors: Vec<f64> = events.iter().copied().filter(|v| !v.is_nan()).collect();
    anchors.sort_by(f64::total_cmp);

    let sorted = ts.sort_by(&cfg.time_col)?;
    let times = sorted.column(&cfg.time_col)?;

    let matched: Vec<Option<usize>> = match cfg.direction {
        Direction::Forward => {
            let window_starts: Vec<f64> = anchors.iter().map(|&a| a - cfg.t_before).collect();
            merge_asof_backward(&times.to_vec(), &window_starts)
                .into_iter()
                .zip(times.iter())
                .map(|(m, &t)| m.filter(|&j| t <= anchors[j] + cfg.t_after))
                .collect()
        }
        Direction::Backward => times
            .iter()
            .map(|&t| {
                if t.is_nan() {
                    return None;
                }
                let j = anchors.partition_point(|&a| a + cfg.t_after < t);
                (j < anchors.len() && t >= anchors[j] - cfg.t_before).then_some(j)
            })
            .collect(),
    };

    let mask: Vec<bool> = matched.iter().map(Option::is_some).collect();
    let kept: Vec<(f64, usize)> = matched
        .iter()
        .zip(times.iter())
        .filter_map(|(m, &t)| m.map(|j| (t, j)))
        .collect();

    let latency: Array1<f64> = kept
        .iter()
        .map(|&(t, j)| {
            let lat = t - anchors[j];
            cfg.precision.map_or(lat, |p| round_to(lat, p))
        })
        .collect();

    debug!(
        samples = times.len(),
        anchors = anchors.len(),
        in_window = kept.len(),
        "aligned to events"
    );

    let mut out = sorted.filter(&mask)?;
    let mut front = vec![cfg.time_col.as_str(), cfg.created_latency_col.as_str()];
    out.insert_column(1, cfg.created_latency_col.as_str(), latency)?;
    if let Some(idx_col) = cfg.created_event_idx_col.as_deref() {
        let event_idx: Array1<f64> = kept.iter().map(|&(_, j)| j as f64).collect();
        out.insert_column(2, idx_col, event_idx)?;
        front.push(idx_col);
    }
    out.move_to_front(&front)?;
    Ok(out)
}

/// Latency of every in-window sample from its anchor event.
///
/// Runs [`align_to_events`]; when [`AlignConfig::backward_adjust`] is set and
/// the direction is [`Direction::Forward`], the median of successive latency
/// differences is then subtracted from every latency and the result is
/// re-rounded to [`AlignConfig::precision`].
pub fn latency_from_event(ts: &Table, events: &[f64], cfg: &AlignConfig) -> Result<Table> {
    let mut out = align_to_events(ts, events, cfg)?;
    if !cfg.backward_adjust || cfg.direction == Direction::Backward || out.n_rows() < 2 {
        return Ok(out);
    }

    let latency = out.column(&cfg.created_latency_col)?;
    let Some(step) = nan_median(latency.windows(2).into_iter().map(|w| w[1] - w[0])) else {
        return Ok(out);
    };
    let adjusted = latency.mapv(|v| {
        let v = v - step;
        cfg.precision.map_or(v, |p| round_to(v, p))
    });
    debug!(step, "backward-adjusted latencies");
    out.set_column(cfg.created_latency_col.as_str(), adjusted)?;
    Ok(out)
}
