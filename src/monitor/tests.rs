//! Tests for log directory handling and record layout

use super::*;

#[test]
fn test_metric_tag_layout() {
    assert_eq!(metric_tag("rmse"), "metric/rmse");
    assert_eq!(TRAIN_LOSS_TAG, "Loss/train");
    assert_eq!(TEST_LOSS_TAG, "Loss/test");
}

#[test]
fn test_prepare_log_dir_clears_previous_run() {
    let temp_dir = tempfile::tempdir().unwrap();
    let run_dir = temp_dir.path().join("run");
    std::fs::create_dir_all(run_dir.join("nested")).unwrap();
    std::fs::write(run_dir.join("stale.txt"), "old").unwrap();

    prepare_log_dir(&run_dir).unwrap();

    assert!(run_dir.is_dir());
    assert_eq!(std::fs::read_dir(&run_dir).unwrap().count(), 0);
}

#[test]
fn test_prepare_log_dir_creates_missing_parents() {
    let temp_dir = tempfile::tempdir().unwrap();
    let run_dir = temp_dir.path().join("a").join("b");

    prepare_log_dir(&run_dir).unwrap();

    assert!(run_dir.is_dir());
}

#[test]
fn test_record_serializes_expected_fields() {
    let record = ScalarRecord::new("Loss/train", 3, 0.125);
    let json = serde_json::to_value(&record).unwrap();

    assert_eq!(json["tag"], "Loss/train");
    assert_eq!(json["step"], 3);
    assert_eq!(json["value"], 0.125);
    assert!(json["wall_time_ms"].as_u64().unwrap() > 0);
}
