//! Trial demarcation for continuous recordings.
//!
//! Each time-series sample is assigned the index of the trial whose
//! `[start, end]` interval contains it.  Two one-sided as-of matches are made:
//!
//! 1. **forward**  — nearest trial *start* at or before the sample;
//! 2. **backward** — nearest trial *end* at or after the sample, computed as a
//!    second "at or before" match on the inverted axis `max_time - t`.
//!
//! A sample keeps a trial index only when both matches name the same trial.
//! Samples in an inter-trial gap match the previous trial going forward but
//! the next trial going backward, so they stay unassigned (`NaN`).
use anyhow::Result;
use ndarray::Array1;
use tracing::debug;

use crate::config::DemarcateConfig;
use crate::table::Table;

/// Backward as-of join on two ascending keys.
///
/// For every `left[i]` returns the index of the last `right[j] <= left[i]`,
/// or `None` when no such key exists.  `NaN` on the left never matches;
/// `NaN` keys on the right must sort last and are never matched.
pub fn merge_asof_backward(left: &[f64], right: &[f64]) -> Vec<Option<usize>> {
    let n_right = right.iter().take_while(|v| !v.is_nan()).count();
    let mut out = Vec::with_capacity(left.len());
    let mut j = 0usize;
    for &t in left {
        if t.is_nan() {
            out.push(None);
            continue;
        }
        while j < n_right && right[j] <= t {
            j += 1;
        }
        out.push(j.checked_sub(1));
    }
    out
}

/// Annotate `ts` with the index of the trial each sample falls in.
///
/// Both tables are sorted by their time columns first, so inputs may be in
/// any order.  The output is sorted by time and its columns are
/// `[time, trial_idx, <remaining ts columns…>]`.  A pre-existing column with
/// the created name is replaced, so demarcating twice gives the same result.
///
/// # Errors
///
/// Fails if any of the configured columns is missing.
///
/// # Examples
///
/// ```
/// use operant::{demarcate_trials, DemarcateConfig, Table};
/// use ndarray::array;
///
/// let ts = Table::from_columns([("time", array![0.5, 1.5, 2.5, 3.5])]).unwrap();
/// let trials = Table::from_columns([
///     ("trial_idx", array![0.0, 1.0]),
///     ("start_time", array![0.0, 3.0]),
///     ("reward_collection_time", array![2.0, 4.0]),
/// ]).unwrap();
///
/// let out = demarcate_trials(&ts, &trials, &DemarcateConfig::default()).unwrap();
/// let idx = out.column("trial_idx").unwrap();
/// assert_eq!(idx[0], 0.0);
/// assert!(idx[2].is_nan()); // inter-trial gap
/// assert_eq!(idx[3], 1.0);
/// ```
pub fn demarcate_trials(ts: &Table, trials: &Table, cfg: &DemarcateConfig) -> Result<Table> {
    let created = cfg.created_col();

    let mut out = ts.sort_by(&cfg.ts_time_col)?;
    if created != cfg.ts_time_col {
        out.drop_column(created);
    }
    let times = out.column(&cfg.ts_time_col)?.to_vec();

    let trial_idx = trials.column(&cfg.trials_idx_col)?;
    let starts = trials.column(&cfg.trials_start_col)?;
    let ends = trials.column(&cfg.trials_end_col)?;

    // Forward pass: nearest start at or before each sample.
    let by_start = crate::table::argsort(&starts.to_vec());
    let sorted_starts: Vec<f64> = by_start.iter().map(|&i| starts[i]).collect();
    let from_start: Vec<f64> = merge_asof_backward(&times, &sorted_starts)
        .into_iter()
        .map(|m| m.map_or(f64::NAN, |j| trial_idx[by_start[j]]))
        .collect();

    // Backward pass: nearest end at or after each sample, as an "at or
    // before" match on the inverted axis.
    let max_time = times
        .iter()
        .chain(ends.iter())
        .copied()
        .filter(|v| !v.is_nan())
        .fold(f64::NEG_INFINITY, f64::max);
    let max_time = if max_time.is_finite() { max_time } else { 0.0 };

    let inverted_ends: Vec<f64> = ends.iter().map(|&e| max_time - e).collect();
    let by_inv_end = crate::table::argsort(&inverted_ends);
    let sorted_inv_ends: Vec<f64> = by_inv_end.iter().map(|&i| inverted_ends[i]).collect();
    // NaN times sort last; keep them out of the reversed scan.
    let n_valid = times.iter().take_while(|t| !t.is_nan()).count();
    let inverted_times: Vec<f64> = times[..n_valid].iter().rev().map(|&t| max_time - t).collect();
    let mut from_end = vec![f64::NAN; times.len()];
    for (k, m) in merge_asof_backward(&inverted_times, &sorted_inv_ends)
        .into_iter()
        .enumerate()
    {
        if let Some(j) = m {
            from_end[n_valid - 1 - k] = trial_idx[by_inv_end[j]];
        }
    }

    let assigned: Array1<f64> = from_start
        .iter()
        .zip(from_end.iter())
        .map(|(&a, &b)| if a == b { a } else { f64::NAN })
        .collect();

    debug!(
        samples = times.len(),
        trials = trials.n_rows(),
        assigned = assigned.iter().filter(|v| !v.is_nan()).count(),
        "demarcated trials"
    );

    out.insert_column(1, created, assigned)?;
    out.move_to_front(&[cfg.ts_time_col.as_str(), created])?;
    Ok(out)
}
