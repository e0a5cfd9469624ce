//! # Checkpoint Files
//!
//! Every file written by the crate is wrapped in a versioned envelope
//! `{ version, payload }`. Model and memory files are bincode, the
//! training state is JSON so it stays readable by hand.
//!
//! Loaders distinguish three cases:
//!
//! - the file does not exist: `Ok(None)`, callers start fresh
//! - the file exists but cannot be decoded: [`SnakeError::CorruptFile`]
//! - the file carries another format version: [`SnakeError::IncompatibleVersion`]

use crate::error::{Result, SnakeError};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Version stamped into every envelope written by this build
pub const FORMAT_VERSION: u32 = 1;

pub const MODEL_FILES: [&str; 2] = ["snake_agent1.bin", "snake_agent2.bin"];
pub const MEMORY_FILES: [&str; 2] = ["memory1.bin", "memory2.bin"];
pub const TRAINING_STATE_FILE: &str = "training_state.json";

#[derive(Serialize, Deserialize)]
struct Envelope<T> {
    version: u32,
    payload: T,
}

/// Exploration schedule and cadence counters carried across runs.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct TrainingState {
    pub epsilon: [f32; 2],
    pub global_step: u64,
    pub episode: u64,
}

/// Locations of every checkpoint file of one training run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CheckpointPaths {
    pub models: [PathBuf; 2],
    pub memories: [PathBuf; 2],
    pub training_state: PathBuf,
}

impl CheckpointPaths {
    /// Standard file names inside `dir`.
    pub fn in_dir<P: AsRef<Path>>(dir: P) -> Self {
        let dir = dir.as_ref();
        CheckpointPaths {
            models: MODEL_FILES.map(|name| dir.join(name)),
            memories: MEMORY_FILES.map(|name| dir.join(name)),
            training_state: dir.join(TRAINING_STATE_FILE),
        }
    }

    pub fn all(&self) -> Vec<&Path> {
        self.models
            .iter()
            .chain(self.memories.iter())
            .chain(std::iter::once(&self.training_state))
            .map(PathBuf::as_path)
            .collect()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ResetOutcome {
    Deleted,
    Absent,
}

/// Delete every checkpoint file, reporting per file whether it existed.
pub fn reset_checkpoints(paths: &CheckpointPaths) -> Result<Vec<(PathBuf, ResetOutcome)>> {
    let mut report = Vec::new();
    for path in paths.all() {
        let outcome = match fs::remove_file(path) {
            Ok(()) => ResetOutcome::Deleted,
            Err(err) if err.kind() == ErrorKind::NotFound => ResetOutcome::Absent,
            Err(err) => return Err(err.into()),
        };
        tracing::info!(path = %path.display(), ?outcome, "checkpoint reset");
        report.push((path.to_path_buf(), outcome));
    }
    Ok(report)
}

pub fn write_binary<T: Serialize>(path: &Path, payload: &T) -> Result<()> {
    let envelope = Envelope {
        version: FORMAT_VERSION,
        payload,
    };
    let bytes = bincode::serialize(&envelope)?;
    ensure_parent(path)?;
    fs::write(path, bytes)?;
    Ok(())
}

pub fn read_binary<T: DeserializeOwned>(path: &Path) -> Result<Option<T>> {
    let Some(bytes) = read_if_present(path)? else {
        return Ok(None);
    };
    // The version is the leading field, so it decodes on its own
    let version: u32 = bincode::deserialize(&bytes).map_err(|err| corrupt(path, err))?;
    check_version(path, version)?;
    let envelope: Envelope<T> = bincode::deserialize(&bytes).map_err(|err| corrupt(path, err))?;
    Ok(Some(envelope.payload))
}

pub fn write_json<T: Serialize>(path: &Path, payload: &T) -> Result<()> {
    let envelope = Envelope {
        version: FORMAT_VERSION,
        payload,
    };
    let text = serde_json::to_string_pretty(&envelope)?;
    ensure_parent(path)?;
    fs::write(path, text)?;
    Ok(())
}

pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>> {
    let Some(bytes) = read_if_present(path)? else {
        return Ok(None);
    };
    let value: serde_json::Value = serde_json::from_slice(&bytes).map_err(|err| corrupt(path, err))?;
    let version = value
        .get("version")
        .and_then(serde_json::Value::as_u64)
        .ok_or_else(|| corrupt(path, "missing version field"))?;
    let version = u32::try_from(version).map_err(|err| corrupt(path, err))?;
    check_version(path, version)?;
    let envelope: Envelope<T> = serde_json::from_value(value).map_err(|err| corrupt(path, err))?;
    Ok(Some(envelope.payload))
}

fn read_if_present(path: &Path) -> Result<Option<Vec<u8>>> {
    match fs::read(path) {
        Ok(bytes) => Ok(Some(bytes)),
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
        Err(err) => Err(err.into()),
    }
}

fn ensure_parent(path: &Path) -> Result<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => {
            fs::create_dir_all(parent)?;
            Ok(())
        }
        _ => Ok(()),
    }
}

fn check_version(path: &Path, found: u32) -> Result<()> {
    if found != FORMAT_VERSION {
        return Err(SnakeError::IncompatibleVersion {
            path: path.to_path_buf(),
            found,
            expected: FORMAT_VERSION,
        });
    }
    Ok(())
}

fn corrupt<E: ToString>(path: &Path, reason: E) -> SnakeError {
    SnakeError::CorruptFile {
        path: path.to_path_buf(),
        reason: reason.to_string(),
    }
}
