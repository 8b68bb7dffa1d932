use crate::error::{ConfigError, Result};

fn require_var(name: &str) -> Result<String> {
  std::env::var(name).map_err(|_| ConfigError::MissingVar(name.to_string()))
}

fn optional_var(name: &str, default: &str) -> String {
  std::env::var(name).unwrap_or_else(|_| default.to_string())
}

fn parse_var<T: std::str::FromStr>(name: &str, value: String) -> Result<T> {
  value.parse().map_err(|_| ConfigError::InvalidVar {
    name: name.to_string(),
    value,
  })
}

/// Connection settings for the upstream PostgreSQL source.
#[derive(Debug, Clone)]
pub struct PostgresConfig {
  pub host: String,
  pub port: u16,
  pub db: String,
  pub user: String,
  pub password: String,
}

impl PostgresConfig {
  fn from_env() -> Result<Self> {
    Ok(Self {
      host: require_var("POSTGRES_HOST")?,
      port: parse_var("POSTGRES_PORT", require_var("POSTGRES_PORT")?)?,
      db: require_var("POSTGRES_DB")?,
      user: require_var("POSTGRES_USER")?,
      password: require_var("POSTGRES_PASSWORD")?,
    })
  }
}

/// Connection settings for the Elasticsearch-compatible sink, plus the
/// names of the three indices it writes.
#[derive(Debug, Clone)]
pub struct SinkConfig {
  pub host: String,
  pub port: u16,
  pub movies_index: String,
  pub genres_index: String,
  pub persons_index: String,
}

impl SinkConfig {
  fn from_env() -> Result<Self> {
    Ok(Self {
      host: require_var("ES_HOST")?,
      port: parse_var("ES_PORT", require_var("ES_PORT")?)?,
      movies_index: optional_var("MOVIES_ES_INDEX", "movies"),
      genres_index: optional_var("GENRES_ES_INDEX", "genres"),
      persons_index: optional_var("PERSONS_ES_INDEX", "persons"),
    })
  }

  pub fn base_url(&self) -> String {
    format!("http://{}:{}", self.host, self.port)
  }
}

/// Top-level configuration assembled once at process start from the
/// environment.
#[derive(Debug, Clone)]
pub struct Config {
  pub postgres: PostgresConfig,
  pub sink: SinkConfig,
  pub storage_file_name: String,
  pub poll_interval_seconds: u64,
  pub log_level: String,
}

impl Config {
  pub fn from_env() -> Result<Self> {
    Ok(Self {
      postgres: PostgresConfig::from_env()?,
      sink: SinkConfig::from_env()?,
      storage_file_name: optional_var("STORAGE_FILE_NAME", "state.json"),
      poll_interval_seconds: parse_var(
        "POLL_INTERVAL_SECONDS",
        optional_var("POLL_INTERVAL_SECONDS", "10"),
      )?,
      log_level: optional_var("LOG_LEVEL", "debug"),
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::sync::Mutex;

  static ENV_MUTEX: Mutex<()> = Mutex::new(());

  fn clear_all() {
    for var in [
      "POSTGRES_HOST",
      "POSTGRES_PORT",
      "POSTGRES_DB",
      "POSTGRES_USER",
      "POSTGRES_PASSWORD",
      "ES_HOST",
      "ES_PORT",
      "MOVIES_ES_INDEX",
      "GENRES_ES_INDEX",
      "PERSONS_ES_INDEX",
      "STORAGE_FILE_NAME",
      "POLL_INTERVAL_SECONDS",
      "LOG_LEVEL",
    ] {
      unsafe { std::env::remove_var(var) };
    }
  }

  fn set_required() {
    unsafe {
      std::env::set_var("POSTGRES_HOST", "localhost");
      std::env::set_var("POSTGRES_PORT", "5432");
      std::env::set_var("POSTGRES_DB", "movies");
      std::env::set_var("POSTGRES_USER", "app");
      std::env::set_var("POSTGRES_PASSWORD", "secret");
      std::env::set_var("ES_HOST", "localhost");
      std::env::set_var("ES_PORT", "9200");
    }
  }

  #[test]
  fn missing_required_var_is_fatal() {
    let _guard = ENV_MUTEX.lock().unwrap();
    clear_all();
    let err = Config::from_env().unwrap_err();
    assert!(matches!(err, ConfigError::MissingVar(_)));
  }

  #[test]
  fn defaults_apply_when_optional_vars_absent() {
    let _guard = ENV_MUTEX.lock().unwrap();
    clear_all();
    set_required();
    let config = Config::from_env().unwrap();
    assert_eq!(config.sink.movies_index, "movies");
    assert_eq!(config.sink.genres_index, "genres");
    assert_eq!(config.sink.persons_index, "persons");
    assert_eq!(config.storage_file_name, "state.json");
    assert_eq!(config.poll_interval_seconds, 10);
    assert_eq!(config.log_level, "debug");
    clear_all();
  }

  #[test]
  fn invalid_port_is_reported() {
    let _guard = ENV_MUTEX.lock().unwrap();
    clear_all();
    set_required();
    unsafe { std::env::set_var("POSTGRES_PORT", "not-a-port") };
    let err = Config::from_env().unwrap_err();
    assert!(matches!(err, ConfigError::InvalidVar { .. }));
    clear_all();
  }
}
