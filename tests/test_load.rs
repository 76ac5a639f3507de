mod common;
use common::{recording, trial_table, write_session};
use operant::load::load_session_data_by_tag;
use operant::{
    convert_csv_dir, demarcate_session, load_session_data, read_table, CsvConfig, DataType,
    DemarcateConfig, LoadError,
};

#[test]
fn demarcate_session_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    let trials = trial_table(&[1.0, 6.0], &[4.0, 9.0]);
    write_session(dir.path(), "m01", "day1", DataType::Events, &trials);
    write_session(dir.path(), "m01", "day1", DataType::DeconvCalcium, &recording(10.0, 0.5));

    let out = demarcate_session(
        dir.path(),
        "m01",
        "day1",
        DataType::DeconvCalcium,
        &DemarcateConfig::default(),
    )
    .unwrap();

    assert_eq!(out.names(), &["time", "trial_idx", "neuron_0"]);
    assert_eq!(out.metadata.get("mouse_name").map(String::as_str), Some("m01"));
    assert_eq!(out.metadata.get("session").map(String::as_str), Some("day1"));

    let time = out.column("time").unwrap();
    let trial = out.column("trial_idx").unwrap();
    for (t, k) in time.iter().zip(trial.iter()) {
        let expected = if (1.0..=4.0).contains(t) {
            0.0
        } else if (6.0..=9.0).contains(t) {
            1.0
        } else {
            f64::NAN
        };
        assert!(*k == expected || (k.is_nan() && expected.is_nan()), "t={t}: {k}");
    }
}

#[test]
fn missing_events_file_is_not_found() {
    let dir = tempfile::tempdir().unwrap();
    write_session(dir.path(), "m01", "day1", DataType::Motion, &recording(2.0, 0.5));

    let err = demarcate_session(dir.path(), "m01", "day1", DataType::Motion, &DemarcateConfig::default())
        .unwrap_err();
    match err.downcast_ref::<LoadError>() {
        Some(LoadError::NotFound(path)) => assert!(path.ends_with("m01/day1/events.safetensors")),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn unknown_tag_is_rejected_before_touching_disk() {
    let err = load_session_data_by_tag(std::path::Path::new("/nonexistent"), "m01", "day1", "spikes", true).unwrap_err();
    assert!(matches!(err, LoadError::UnknownDataType(ref t) if t == "spikes"));
}

#[test]
fn corrupt_file_is_a_read_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("m01").join("day1");
    std::fs::create_dir_all(&path).unwrap();
    std::fs::write(path.join("raw_calcium.safetensors"), b"nope").unwrap();

    let err = load_session_data(dir.path(), "m01", "day1", DataType::RawCalcium, false).unwrap_err();
    assert!(matches!(err, LoadError::Read { .. }));
}

#[test]
fn csv_tree_converts_and_loads() {
    let landing = tempfile::tempdir().unwrap();
    let raw = tempfile::tempdir().unwrap();
    let session = landing.path().join("m01").join("day1");
    std::fs::create_dir_all(&session).unwrap();
    std::fs::write(
        session.join("events.csv"),
        "trial_idx,start_time,reward_collection_time,chose_large,box\n\
         0,1.0,4.0,True,A\n\
         1,6.0,9.0,False,A\n",
    )
    .unwrap();
    std::fs::write(session.join("notes.txt"), "ignored").unwrap();

    let n = convert_csv_dir(landing.path(), raw.path(), &CsvConfig::default()).unwrap();
    assert_eq!(n, 1);

    let events = read_table(&raw.path().join("m01/day1/events.safetensors")).unwrap();
    assert_eq!(
        events.names(),
        &["trial_idx", "start_time", "reward_collection_time", "chose_large"]
    );
    assert_eq!(events.column("chose_large").unwrap().to_vec(), vec![1.0, 0.0]);

    let loaded = load_session_data(raw.path(), "m01", "day1", DataType::Events, true).unwrap();
    assert_eq!(loaded.n_rows(), 2);
}
