// Durable JSON-backed key/value storage with an atomic write contract.
//
// Writing in place with `OpenOptions::truncate(true)` + `write_all` +
// `sync_all` leaves a crash window between the truncate and the write where
// the file is readable but zero-length. This store instead writes a
// sibling `.tmp` file and renames it over the target, so a crash mid-write
// never disturbs the file readers actually see.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

#[derive(Error, Debug)]
pub enum StateError {
  #[error("IO error: {0}")]
  Io(#[from] std::io::Error),
  #[error("state file is not valid JSON: {0}")]
  Parse(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, StateError>;

/// A flat string-to-string map persisted as a single UTF-8 JSON file.
pub struct JsonFileStorage {
  path: PathBuf,
}

impl JsonFileStorage {
  pub fn new(path: impl Into<PathBuf>) -> Self {
    Self { path: path.into() }
  }

  pub fn path(&self) -> &Path {
    &self.path
  }

  /// Returns an empty map if the file does not exist. A present-but-corrupt
  /// file is a fatal `Parse` error — the caller must not overwrite
  /// potentially valid state with an empty map.
  pub fn load(&self) -> Result<BTreeMap<String, String>> {
    if !self.path.exists() {
      info!("state file {:?} does not exist, starting fresh", self.path);
      return Ok(BTreeMap::new());
    }
    let contents = fs::read_to_string(&self.path)?;
    let data: BTreeMap<String, String> = serde_json::from_str(&contents)?;
    debug!("loaded state from {:?}", self.path);
    Ok(data)
  }

  /// Serialises `data` and atomically replaces the target file: write to
  /// `<path>.tmp`, `sync_all`, then `rename` over `path`. Rename is atomic
  /// on the same filesystem on both POSIX and Windows, so a crash never
  /// leaves a truncated-but-readable file at `path`.
  pub fn save(&self, data: &BTreeMap<String, String>) -> Result<()> {
    let tmp_path = self.tmp_path();
    let body = serde_json::to_string_pretty(data)?;
    {
      let file = fs::File::create(&tmp_path)?;
      use std::io::Write;
      let mut file = file;
      file.write_all(body.as_bytes())?;
      file.sync_all()?;
    }
    fs::rename(&tmp_path, &self.path)?;
    debug!("saved state to {:?}", self.path);
    Ok(())
  }

  fn tmp_path(&self) -> PathBuf {
    let mut name = self.path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".tmp");
    self.path.with_file_name(name)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use tempfile::TempDir;

  #[test]
  fn load_missing_file_returns_empty() {
    let dir = TempDir::new().unwrap();
    let storage = JsonFileStorage::new(dir.path().join("state.json"));
    assert!(storage.load().unwrap().is_empty());
  }

  #[test]
  fn save_then_load_round_trips() {
    let dir = TempDir::new().unwrap();
    let storage = JsonFileStorage::new(dir.path().join("state.json"));
    let mut data = BTreeMap::new();
    data.insert("genre_ts".to_string(), "2024-01-01T00:00:00+00:00".to_string());
    storage.save(&data).unwrap();
    assert_eq!(storage.load().unwrap(), data);
  }

  #[test]
  fn save_leaves_no_tmp_file_behind() {
    let dir = TempDir::new().unwrap();
    let storage = JsonFileStorage::new(dir.path().join("state.json"));
    storage.save(&BTreeMap::new()).unwrap();
    assert!(!storage.tmp_path().exists());
    assert!(storage.path().exists());
  }

  #[test]
  fn corrupt_file_is_a_fatal_parse_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("state.json");
    fs::write(&path, b"not json").unwrap();
    let storage = JsonFileStorage::new(path);
    assert!(matches!(storage.load(), Err(StateError::Parse(_))));
  }

  #[test]
  fn rewriting_identical_data_is_idempotent() {
    let dir = TempDir::new().unwrap();
    let storage = JsonFileStorage::new(dir.path().join("state.json"));
    let mut data = BTreeMap::new();
    data.insert("person_ts".to_string(), "2024-01-01T00:00:00+00:00".to_string());
    storage.save(&data).unwrap();
    let first = fs::read_to_string(storage.path()).unwrap();
    storage.save(&data).unwrap();
    let second = fs::read_to_string(storage.path()).unwrap();
    assert_eq!(first, second);
  }
}
