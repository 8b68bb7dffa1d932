use thiserror::Error;

#[derive(Error, Debug)]
pub enum PipelineError {
  #[error(transparent)]
  Source(#[from] source::SourceError),
  #[error(transparent)]
  Sink(#[from] sink::SinkError),
  #[error(transparent)]
  State(#[from] state::StateError),
}

pub type Result<T> = std::result::Result<T, PipelineError>;

/// True when `error` reflects an unreachable endpoint rather than a
/// structural problem. The scheduler warns and sleeps on these (the
/// backoff wrapper has already exhausted in-tick retries) and propagates
/// everything else, crashing the process for supervisor restart.
pub fn is_connectivity_error(error: &PipelineError) -> bool {
  match error {
    PipelineError::Source(e) => source::is_transient(e),
    PipelineError::Sink(e) => sink::is_transient(e),
    PipelineError::State(_) => false,
  }
}
