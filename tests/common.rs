/// Shared helpers for building synthetic sessions.
use ndarray::Array1;
use operant::{write_table, DataType, Table};
use std::path::Path;

#[allow(unused)]
/// Trial table with `starts[i]`, `ends[i]` and `trial_idx = i`.
pub fn trial_table(starts: &[f64], ends: &[f64]) -> Table {
    Table::from_columns([
        ("trial_idx", Array1::from_iter((0..starts.len()).map(|i| i as f64))),
        ("start_time", Array1::from(starts.to_vec())),
        ("reward_collection_time", Array1::from(ends.to_vec())),
    ])
    .unwrap()
}

#[allow(unused)]
/// Uniformly sampled recording `[0, duration)` at `dt` with one activity
/// column equal to the sample index.
pub fn recording(duration: f64, dt: f64) -> Table {
    let n = (duration / dt).round() as usize;
    Table::from_columns([
        ("time", Array1::from_iter((0..n).map(|i| i as f64 * dt))),
        ("neuron_0", Array1::from_iter((0..n).map(|i| i as f64))),
    ])
    .unwrap()
}

#[allow(unused)]
/// Write `table` where the loaders expect it.
pub fn write_session(root: &Path, mouse: &str, session: &str, data_type: DataType, table: &Table) {
    let dir = root.join(mouse).join(session);
    std::fs::create_dir_all(&dir).unwrap();
    write_table(table, &dir.join(data_type.file_name())).unwrap();
}

#[allow(unused)]
/// Element-wise equality treating NaN == NaN.
pub fn same_with_nan(a: &[f64], b: &[f64]) -> bool {
    a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x == y || (x.is_nan() && y.is_nan()))
}
