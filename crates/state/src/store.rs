use crate::storage::{JsonFileStorage, Result};
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// A durable map from watermark name to the last-known timestamp for that
/// name, backed by a single atomically-written JSON file.
///
/// Loaded once at process start; every [`StateStore::set`] re-serialises
/// and writes the entire map.
pub struct StateStore {
  storage: JsonFileStorage,
  values: BTreeMap<String, String>,
}

impl StateStore {
  pub fn load(path: impl Into<PathBuf>) -> Result<Self> {
    let storage = JsonFileStorage::new(path);
    let values = storage.load()?;
    Ok(Self { storage, values })
  }

  /// The parsed timestamp for `key`, or `None` if absent or unparseable.
  /// An absent key means "from the beginning".
  pub fn get(&self, key: &str) -> Option<DateTime<Utc>> {
    self
      .values
      .get(key)
      .and_then(|raw| DateTime::parse_from_rfc3339(raw).ok())
      .map(|dt| dt.with_timezone(&Utc))
  }

  /// Sets `key` to `value`, or removes it if `value` is `None`, then
  /// flushes the whole map to disk.
  pub fn set(&mut self, key: &str, value: Option<DateTime<Utc>>) -> Result<()> {
    match value {
      Some(v) => {
        self.values.insert(key.to_string(), v.to_rfc3339());
      }
      None => {
        self.values.remove(key);
      }
    }
    self.storage.save(&self.values)
  }

  pub fn path(&self) -> &std::path::Path {
    self.storage.path()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use chrono::TimeZone;
  use tempfile::TempDir;

  fn ts(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc)
  }

  #[test]
  fn missing_file_gives_null_watermarks() {
    let dir = TempDir::new().unwrap();
    let state = StateStore::load(dir.path().join("state.json")).unwrap();
    assert_eq!(state.get("genre_ts"), None);
  }

  #[test]
  fn set_then_get_round_trips_to_second_precision() {
    let dir = TempDir::new().unwrap();
    let mut state = StateStore::load(dir.path().join("state.json")).unwrap();
    let t = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    state.set("genre_ts", Some(t)).unwrap();
    assert_eq!(state.get("genre_ts"), Some(t));
  }

  #[test]
  fn setting_none_removes_the_key() {
    let dir = TempDir::new().unwrap();
    let mut state = StateStore::load(dir.path().join("state.json")).unwrap();
    state.set("genre_ts", Some(ts("2024-01-01T00:00:00+00:00"))).unwrap();
    state.set("genre_ts", None).unwrap();
    assert_eq!(state.get("genre_ts"), None);
  }

  #[test]
  fn state_survives_reload_from_disk() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("state.json");
    let t = ts("2024-01-02T00:00:00+00:00");
    {
      let mut state = StateStore::load(&path).unwrap();
      state.set("person_ts", Some(t)).unwrap();
    }
    let reloaded = StateStore::load(&path).unwrap();
    assert_eq!(reloaded.get("person_ts"), Some(t));
  }
}
