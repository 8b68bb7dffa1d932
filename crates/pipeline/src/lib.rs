pub mod coordinator;
pub mod error;
pub mod scheduler;

pub use coordinator::Coordinator;
pub use error::{PipelineError, Result, is_connectivity_error};
pub use scheduler::{Scheduler, spawn_scheduler};
