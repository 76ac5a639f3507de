use operant::{
    event_time_series_time, events_to_time_series, events_to_time_series_table, LaggedConfig,
    RasterConfig,
};

#[test]
fn duplicate_timestamps_collapse_to_one_sample() {
    let cfg = RasterConfig { total_duration: Some(1.0), ..RasterConfig::default() };
    let ts = events_to_time_series(&[0.5, 0.5], &cfg).unwrap();
    assert_eq!(ts.len(), 10);
    for (i, &v) in ts.iter().enumerate() {
        assert_eq!(v, if i == 5 { 1.0 } else { 0.0 }, "sample {i}");
    }
}

#[test]
fn shift_by_one_rotates() {
    let events = [0.0, 0.2, 0.95];
    let base = RasterConfig { total_duration: Some(1.0), ..RasterConfig::default() };
    let plain = events_to_time_series(&events, &base).unwrap().to_vec();
    let shifted = events_to_time_series(&events, &RasterConfig { shift: 1, ..base }).unwrap();
    for i in 0..plain.len() {
        assert_eq!(shifted[(i + 1) % plain.len()], plain[i]);
    }
}

#[test]
fn smoothing_preserves_mass_away_from_edges() {
    let kernel = vec![0.25, 0.5, 0.25];
    let cfg = RasterConfig {
        kernel: Some(kernel),
        total_duration: Some(2.0),
        ..RasterConfig::default()
    };
    let ts = events_to_time_series(&[0.55, 1.25], &cfg).unwrap();
    approx::assert_abs_diff_eq!(ts.sum(), 2.0, epsilon = 1e-12);
    approx::assert_abs_diff_eq!(ts[5], 0.5, epsilon = 1e-12);
}

#[test]
fn time_axis_matches_series_length() {
    let cfg = RasterConfig { sampling_interval: 0.05, total_duration: Some(3.0), ..RasterConfig::default() };
    let series = events_to_time_series(&[1.0], &cfg).unwrap();
    let time = event_time_series_time(3.0, 0.05, 10.0).unwrap();
    assert_eq!(series.len(), time.len());
    approx::assert_abs_diff_eq!(time[1] - time[0], 0.05, epsilon = 1e-12);
    assert_eq!(time[0], 10.0);
}

#[test]
fn lagged_table_has_one_column_per_shift() {
    let table = events_to_time_series_table(&[0.5, 2.05], "reward", 3.0, &LaggedConfig::default()).unwrap();
    assert_eq!(table.n_cols(), 1 + 11);
    assert_eq!(table.names()[0], "time");
    assert_eq!(table.names()[1], "reward_at_-5");
    assert_eq!(table.names()[11], "reward_at_5");
    for (name, column) in table.iter().skip(1) {
        assert_eq!(column.sum(), 2.0, "{name}");
    }
}
