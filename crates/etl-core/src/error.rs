use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
  #[error("missing required environment variable: {0}")]
  MissingVar(String),
  #[error("invalid value for environment variable {name}: {value}")]
  InvalidVar { name: String, value: String },
}

pub type Result<T> = std::result::Result<T, ConfigError>;
