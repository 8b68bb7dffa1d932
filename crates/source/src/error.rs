use thiserror::Error;

#[derive(Error, Debug)]
pub enum SourceError {
  #[error("postgres error: {0}")]
  Query(#[from] sqlx::Error),
}

pub type Result<T> = std::result::Result<T, SourceError>;

/// Classifies connection-level failures (unreachable host, pool timeout,
/// connection reset) as transient and retryable by the pipeline's backoff
/// wrapper. A query against a live connection that fails for a structural
/// reason (bad SQL, constraint violation) is not retried — retrying it
/// would fail identically every time.
pub fn is_transient(error: &SourceError) -> bool {
  match error {
    SourceError::Query(sqlx::Error::Io(_)) => true,
    SourceError::Query(sqlx::Error::PoolTimedOut) => true,
    SourceError::Query(sqlx::Error::PoolClosed) => true,
    SourceError::Query(sqlx::Error::Database(db_err)) => db_err
      .code()
      .map(|code| code.starts_with("08"))
      .unwrap_or(false),
    _ => false,
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn pool_timeout_is_transient() {
    assert!(is_transient(&SourceError::Query(sqlx::Error::PoolTimedOut)));
  }

  #[test]
  fn row_not_found_is_not_transient() {
    assert!(!is_transient(&SourceError::Query(sqlx::Error::RowNotFound)));
  }
}
