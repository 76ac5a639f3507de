//! Per-event feature derivation.
//!
//! Every function here is a stateless column transform over a trial/event
//! table (one row per trial) and returns one value per row:
//!
//! - trial counters: [`num_prev_trials`]
//! - reward / shock history: [`cumulative_reward`], [`reward_in_window`],
//!   [`cumulative_shock`], [`shock_in_window`]
//! - timing: [`prev_iti_length`], [`event_delay`] and its named wrappers
//!
//! The first row has no history.  What it gets differs per feature and is
//! documented on each function.
use anyhow::{bail, Result};
use ndarray::Array1;
use std::collections::HashMap;

use crate::convolve::convolve_full;
use crate::table::{argsort, Table};

/// Column names of the standard trial table.
#[derive(Debug, Clone, PartialEq)]
pub struct TrialColumns {
    /// Default: `"trial_idx"`.
    pub trial_idx: String,
    /// Default: `"start_time"`.
    pub start_time: String,
    /// Default: `"mouse_init_time"`.
    pub mouse_init_time: String,
    /// Default: `"screen_touch_time"`.
    pub screen_touch_time: String,
    /// Trial end.  Default: `"reward_collection_time"`.
    pub reward_collection_time: String,
}

impl Default for TrialColumns {
    fn default() -> Self {
        Self {
            trial_idx: "trial_idx".into(),
            start_time: "start_time".into(),
            mouse_init_time: "mouse_init_time".into(),
            screen_touch_time: "screen_touch_time".into(),
            reward_collection_time: "reward_collection_time".into(),
        }
    }
}

/// Reward amounts per choice.
#[derive(Debug, Clone, PartialEq)]
pub struct RewardConfig {
    /// Boolean column, true when the large reward was chosen.
    ///
    /// Default: `"chose_large"`.
    pub large_choice_col: String,
    /// Default: `1.0`.
    pub large_reward_amt: f64,
    /// Default: `0.0`.
    pub small_reward_amt: f64,
}

impl Default for RewardConfig {
    fn default() -> Self {
        Self {
            large_choice_col: "chose_large".into(),
            large_reward_amt: 1.0,
            small_reward_amt: 0.0,
        }
    }
}

/// Shock amounts per trial.
#[derive(Debug, Clone, PartialEq)]
pub struct ShockConfig {
    /// Boolean column, true when the trial was shocked.
    ///
    /// Default: `"was_shocked"`.
    pub shock_col: String,
    /// Default: `1.0`.
    pub shock_amt: f64,
    /// Default: `0.0`.
    pub not_shocked_amt: f64,
}

impl Default for ShockConfig {
    fn default() -> Self {
        Self {
            shock_col: "was_shocked".into(),
            shock_amt: 1.0,
            not_shocked_amt: 0.0,
        }
    }
}

fn truthy(v: f64) -> bool {
    !v.is_nan() && v != 0.0
}

/// Shift `x` down by one row, filling the first with `fill`.
fn lag_one(x: &[f64], fill: f64) -> Vec<f64> {
    std::iter::once(fill)
        .chain(x.iter().copied())
        .take(x.len())
        .collect()
}

fn cumsum(x: impl IntoIterator<Item = f64>) -> Array1<f64> {
    x.into_iter()
        .scan(0.0, |acc, v| {
            *acc += v;
            Some(*acc)
        })
        .collect()
}

/// Trailing-window sum of `amounts` over the trials *before* each row.
///
/// Full convolution truncated to `n`, then moved forward one row with the
/// first value set to `0`.
fn in_window(amounts: &[f64], kernel: &[f64]) -> Result<Array1<f64>> {
    if kernel.is_empty() {
        bail!("kernel must not be empty");
    }
    let full = convolve_full(amounts, kernel);
    let mut out = vec![0.0; amounts.len()];
    for i in 1..amounts.len() {
        out[i] = full.get(i - 1).copied().unwrap_or(0.0);
    }
    Ok(Array1::from(out))
}

/// Number of trials before each row, optionally counted from the first row
/// of the row's block type.
///
/// Rows with a `NaN` block type keep their session-wide count.
pub fn num_prev_trials(events: &Table, in_block: bool, block_type_col: &str) -> Result<Array1<f64>> {
    let n = events.n_rows();
    let mut counts: Array1<f64> = Array1::from_iter((0..n).map(|i| i as f64));
    if in_block {
        let blocks = events.column(block_type_col)?;
        let mut first_row: HashMap<u64, usize> = HashMap::new();
        for (i, &b) in blocks.iter().enumerate() {
            if b.is_nan() {
                continue;
            }
            let first = *first_row.entry(b.to_bits()).or_insert(i);
            counts[i] = (i - first) as f64;
        }
    }
    Ok(counts)
}

/// Reward collected on all previous trials.
///
/// The choice column is lagged by one trial before mapping to amounts, so
/// the first row is always `0`.
///
/// ```
/// use operant::features::{cumulative_reward, RewardConfig};
/// use operant::Table;
/// use ndarray::array;
///
/// let events = Table::from_columns([("chose_large", array![1.0, 0.0, 1.0])]).unwrap();
/// let r = cumulative_reward(&events, &RewardConfig::default()).unwrap();
/// assert_eq!(r.to_vec(), vec![0.0, 1.0, 1.0]);
/// ```
pub fn cumulative_reward(events: &Table, cfg: &RewardConfig) -> Result<Array1<f64>> {
    let choice = events.column(&cfg.large_choice_col)?.to_vec();
    let amounts = lag_one(&choice, f64::NAN).into_iter().map(|c| {
        if c.is_nan() {
            0.0
        } else if truthy(c) {
            cfg.large_reward_amt
        } else {
            cfg.small_reward_amt
        }
    });
    Ok(cumsum(amounts))
}

/// Reward collected over the trailing `window_kernel.len()` trials.
///
/// The kernel weights the preceding trials (`kernel[0]` the most recent);
/// the first row is `0`.  A `NaN` choice counts as a small reward.
///
/// # Errors
///
/// Fails on an empty kernel or a missing choice column.
pub fn reward_in_window(
    events: &Table,
    window_kernel: &[f64],
    cfg: &RewardConfig,
) -> Result<Array1<f64>> {
    let amounts: Vec<f64> = events
        .column(&cfg.large_choice_col)?
        .iter()
        .map(|&c| if truthy(c) { cfg.large_reward_amt } else { cfg.small_reward_amt })
        .collect();
    in_window(&amounts, window_kernel)
}

/// Shock received on all previous trials.
///
/// The lagged first row counts as "not shocked", so it is
/// `not_shocked_amt` rather than `0`.
pub fn cumulative_shock(events: &Table, cfg: &ShockConfig) -> Result<Array1<f64>> {
    let shocked = events.column(&cfg.shock_col)?.to_vec();
    let amounts = lag_one(&shocked, 0.0)
        .into_iter()
        .map(|s| if truthy(s) { cfg.shock_amt } else { cfg.not_shocked_amt });
    Ok(cumsum(amounts))
}

/// Shock received over the trailing `window_kernel.len()` trials.  The first
/// row is `0`; an empty kernel is an error.
pub fn shock_in_window(
    events: &Table,
    window_kernel: &[f64],
    cfg: &ShockConfig,
) -> Result<Array1<f64>> {
    let amounts: Vec<f64> = events
        .column(&cfg.shock_col)?
        .iter()
        .map(|&s| if truthy(s) { cfg.shock_amt } else { cfg.not_shocked_amt })
        .collect();
    in_window(&amounts, window_kernel)
}

/// Duration of the inter-trial interval before each trial:
/// `start(k) - end(k - 1)`, taken from the first row of each trial.
///
/// Rows of the first trial, rows whose trial `k - 1` is absent from the
/// table and rows without a trial index are `NaN`.
pub fn prev_iti_length(events: &Table, cols: &TrialColumns) -> Result<Array1<f64>> {
    let trial_idx = events.column(&cols.trial_idx)?;
    let starts = events.column(&cols.start_time)?;
    let ends = events.column(&cols.reward_collection_time)?;

    // first row of each trial, in order of appearance
    let mut first_row: HashMap<u64, usize> = HashMap::new();
    let mut order: Vec<f64> = Vec::new();
    for (i, &k) in trial_idx.iter().enumerate() {
        if k.is_nan() {
            continue;
        }
        first_row.entry(k.to_bits()).or_insert_with(|| {
            order.push(k);
            i
        });
    }

    let mut iti = Array1::from_elem(events.n_rows(), f64::NAN);
    for &k in order.iter().skip(1) {
        let Some(&prev) = first_row.get(&(k - 1.0).to_bits()) else {
            continue;
        };
        let value = starts[first_row[&k.to_bits()]] - ends[prev];
        for (i, &t) in trial_idx.iter().enumerate() {
            if t == k {
                iti[i] = value;
            }
        }
    }
    Ok(iti)
}

/// Delay `second - first` between two event columns after sorting by trial
/// index and shifting by `shift` trials.
///
/// `shift = 0` gives the delay within each trial; `shift = 1` gives, on each
/// row, the delay observed on the previous trial (`NaN` on the first row).
/// The result follows the trial-sorted row order.
pub fn event_delay(
    events: &Table,
    first_event_col: &str,
    second_event_col: &str,
    trial_idx_col: &str,
    shift: isize,
) -> Result<Array1<f64>> {
    let order = argsort(&events.column(trial_idx_col)?.to_vec());
    let first = events.column(first_event_col)?;
    let second = events.column(second_event_col)?;
    let n = order.len() as isize;

    Ok((0..n)
        .map(|i| {
            let src = i - shift;
            if (0..n).contains(&src) {
                let row = order[src as usize];
                second[row] - first[row]
            } else {
                f64::NAN
            }
        })
        .collect())
}

/// Trial start → mouse initiation.
pub fn trial_start_delay(events: &Table, cols: &TrialColumns, shift: isize) -> Result<Array1<f64>> {
    event_delay(events, &cols.start_time, &cols.mouse_init_time, &cols.trial_idx, shift)
}

/// Mouse initiation → screen touch.
pub fn screen_touch_delay(events: &Table, cols: &TrialColumns, shift: isize) -> Result<Array1<f64>> {
    event_delay(events, &cols.mouse_init_time, &cols.screen_touch_time, &cols.trial_idx, shift)
}

/// Screen touch → reward collection.
pub fn reward_collection_delay(
    events: &Table,
    cols: &TrialColumns,
    shift: isize,
) -> Result<Array1<f64>> {
    event_delay(
        events,
        &cols.screen_touch_time,
        &cols.reward_collection_time,
        &cols.trial_idx,
        shift,
    )
}

/// Trial start → reward collection.
pub fn trial_duration(events: &Table, cols: &TrialColumns, shift: isize) -> Result<Array1<f64>> {
    event_delay(events, &cols.start_time, &cols.reward_collection_time, &cols.trial_idx, shift)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn same(a: &[f64], b: &[f64]) -> bool {
        a.len() == b.len()
            && a.iter().zip(b).all(|(x, y)| x == y || (x.is_nan() && y.is_nan()))
    }

    fn trials() -> Table {
        Table::from_columns([
            ("trial_idx", array![0.0, 1.0, 2.0]),
            ("start_time", array![0.0, 10.0, 25.0]),
            ("mouse_init_time", array![1.0, 12.0, 28.0]),
            ("screen_touch_time", array![2.0, 15.0, 29.0]),
            ("reward_collection_time", array![5.0, 20.0, 30.0]),
            ("chose_large", array![1.0, 0.0, 1.0]),
            ("was_shocked", array![0.0, 1.0, 1.0]),
            ("block_type", array![1.0, 2.0, 2.0]),
        ])
        .unwrap()
    }

    #[test]
    fn prev_trials_in_block() {
        let t = trials();
        assert_eq!(num_prev_trials(&t, false, "block_type").unwrap().to_vec(), vec![0.0, 1.0, 2.0]);
        assert_eq!(num_prev_trials(&t, true, "block_type").unwrap().to_vec(), vec![0.0, 0.0, 1.0]);
    }

    #[test]
    fn cumulative_reward_lags_one_trial() {
        let r = cumulative_reward(&trials(), &RewardConfig::default()).unwrap();
        assert_eq!(r.to_vec(), vec![0.0, 1.0, 1.0]);

        let cfg = RewardConfig { large_reward_amt: 4.0, small_reward_amt: 1.0, ..Default::default() };
        let r = cumulative_reward(&trials(), &cfg).unwrap();
        assert_eq!(r.to_vec(), vec![0.0, 4.0, 5.0]);
    }

    #[test]
    fn cumulative_shock_first_row_uses_not_shocked_amount() {
        let cfg = ShockConfig { not_shocked_amt: 0.5, ..Default::default() };
        let s = cumulative_shock(&trials(), &cfg).unwrap();
        // lagged: [F, F, T] → [0.5, 0.5, 1.0]
        assert_eq!(s.to_vec(), vec![0.5, 1.0, 2.0]);
    }

    #[test]
    fn windowed_history() {
        let events = Table::from_columns([("chose_large", array![1.0, 1.0, 0.0, 1.0, 1.0])]).unwrap();
        let r = reward_in_window(&events, &[1.0, 1.0], &RewardConfig::default()).unwrap();
        // sum of the two preceding trials
        assert_eq!(r.to_vec(), vec![0.0, 1.0, 2.0, 1.0, 1.0]);

        let s = shock_in_window(&trials(), &[1.0], &ShockConfig::default()).unwrap();
        assert_eq!(s.to_vec(), vec![0.0, 0.0, 1.0]);
    }

    #[test]
    fn windowed_history_needs_a_kernel() {
        let err = reward_in_window(&trials(), &[], &RewardConfig::default()).unwrap_err();
        assert!(err.to_string().contains("kernel must not be empty"));
        assert!(shock_in_window(&trials(), &[], &ShockConfig::default()).is_err());
    }

    #[test]
    fn nan_choice_counts_as_small_reward() {
        let events = Table::from_columns([("chose_large", array![f64::NAN, 1.0, 0.0])]).unwrap();
        let cfg = RewardConfig { small_reward_amt: 0.25, ..Default::default() };
        let r = reward_in_window(&events, &[1.0], &cfg).unwrap();
        assert_eq!(r.to_vec(), vec![0.0, 0.25, 1.0]);
    }

    #[test]
    fn iti_between_consecutive_trials() {
        let iti = prev_iti_length(&trials(), &TrialColumns::default()).unwrap();
        assert!(same(&iti.to_vec(), &[f64::NAN, 5.0, 5.0]));
    }

    #[test]
    fn iti_missing_previous_trial_is_nan() {
        let t = Table::from_columns([
            ("trial_idx", array![0.0, 2.0]),
            ("start_time", array![0.0, 25.0]),
            ("reward_collection_time", array![5.0, 30.0]),
        ])
        .unwrap();
        let iti = prev_iti_length(&t, &TrialColumns::default()).unwrap();
        assert!(iti.iter().all(|v| v.is_nan()));
    }

    #[test]
    fn delays_same_and_previous_trial() {
        let cols = TrialColumns::default();
        let t = trials().take(&[2, 0, 1]); // unsorted input
        assert_eq!(trial_start_delay(&t, &cols, 0).unwrap().to_vec(), vec![1.0, 2.0, 3.0]);
        assert!(same(
            &trial_start_delay(&t, &cols, 1).unwrap().to_vec(),
            &[f64::NAN, 1.0, 2.0]
        ));
        assert_eq!(screen_touch_delay(&t, &cols, 0).unwrap().to_vec(), vec![1.0, 3.0, 1.0]);
        assert_eq!(reward_collection_delay(&t, &cols, 0).unwrap().to_vec(), vec![3.0, 5.0, 1.0]);
        assert_eq!(trial_duration(&t, &cols, 0).unwrap().to_vec(), vec![5.0, 10.0, 5.0]);
    }
}
