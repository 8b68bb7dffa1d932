use thiserror::Error;

#[derive(Error, Debug)]
pub enum SinkError {
  #[error("request error: {0}")]
  Request(#[from] reqwest::Error),
  #[error("sink returned {status}: {body}")]
  Status { status: u16, body: String },
}

pub type Result<T> = std::result::Result<T, SinkError>;

/// 5xx responses and transport-level failures are transient; 4xx responses
/// (other than the already-exists race, which `ensure_index` absorbs
/// itself and never surfaces as an error) are not retried.
pub fn is_transient(error: &SinkError) -> bool {
  match error {
    SinkError::Request(e) => e.is_timeout() || e.is_connect(),
    SinkError::Status { status, .. } => *status >= 500,
  }
}
