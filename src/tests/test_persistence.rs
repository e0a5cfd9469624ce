use super::common::transition;
use crate::error::SnakeError;
use crate::persistence::{
    read_binary, read_json, reset_checkpoints, write_binary, write_json, CheckpointPaths, ResetOutcome,
    TrainingState, FORMAT_VERSION,
};
use crate::replay_buffer::ReplayBuffer;
use std::fs;
use tempfile::tempdir;

#[test]
fn test_missing_file_is_none() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("nothing.bin");
    assert!(read_binary::<Vec<u8>>(&path).unwrap().is_none());
    assert!(read_json::<TrainingState>(&dir.path().join("nothing.json")).unwrap().is_none());
}

#[test]
fn test_truncated_binary_is_corrupt() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("memory.bin");
    let mut buffer = ReplayBuffer::new(8);
    buffer.push(transition(1.0, 0, false));
    buffer.save(&path).unwrap();

    let bytes = fs::read(&path).unwrap();
    fs::write(&path, &bytes[..bytes.len() / 2]).unwrap();

    assert!(matches!(
        read_binary::<Vec<crate::replay_buffer::Transition>>(&path),
        Err(SnakeError::CorruptFile { .. })
    ));
}

#[test]
fn test_other_version_is_incompatible() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("future.bin");
    fs::write(&path, bincode::serialize(&(FORMAT_VERSION + 1, 5u32)).unwrap()).unwrap();

    match read_binary::<u32>(&path) {
        Err(SnakeError::IncompatibleVersion { found, expected, .. }) => {
            assert_eq!(found, FORMAT_VERSION + 1);
            assert_eq!(expected, FORMAT_VERSION);
        }
        other => panic!("expected IncompatibleVersion, got {:?}", other),
    }
}

#[test]
fn test_training_state_json_round_trip() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("nested").join("training_state.json");
    let state = TrainingState {
        epsilon: [0.5, 0.25],
        global_step: 1234,
        episode: 17,
    };

    write_json(&path, &state).unwrap();
    let text = fs::read_to_string(&path).unwrap();
    assert!(text.contains("\"version\": 1"));
    assert_eq!(read_json::<TrainingState>(&path).unwrap(), Some(state));
}

#[test]
fn test_json_without_version_is_corrupt() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("training_state.json");
    fs::write(&path, r#"{ "epsilon": [1.0, 1.0], "global_step": 0, "episode": 0 }"#).unwrap();

    assert!(matches!(
        read_json::<TrainingState>(&path),
        Err(SnakeError::CorruptFile { .. })
    ));
}

#[test]
fn test_memory_load_keeps_most_recent() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("memory.bin");
    let mut large = ReplayBuffer::new(10);
    for i in 0..10 {
        large.push(transition(i as f32, 0, false));
    }
    large.save(&path).unwrap();

    let mut small = ReplayBuffer::new(4);
    assert!(small.load(&path).unwrap());
    let rewards: Vec<f32> = small.iter().map(|t| t.reward).collect();
    assert_eq!(rewards, vec![6.0, 7.0, 8.0, 9.0]);
}

#[test]
fn test_reset_reports_deleted_and_absent() {
    let dir = tempdir().unwrap();
    let paths = CheckpointPaths::in_dir(dir.path());
    write_binary(&paths.models[0], &1u32).unwrap();

    let report = reset_checkpoints(&paths).unwrap();

    assert_eq!(report.len(), 5);
    assert_eq!(report[0], (paths.models[0].clone(), ResetOutcome::Deleted));
    assert!(report[1..].iter().all(|(_, outcome)| *outcome == ResetOutcome::Absent));
    assert!(!paths.models[0].exists());
}
