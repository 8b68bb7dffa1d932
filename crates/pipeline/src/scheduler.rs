// Outer loop: a `tokio::select!` between the tick timer and a
// `broadcast::Receiver<()>` shutdown signal, checked between ticks rather
// than mid-tick.

use std::time::Duration;
use tokio::sync::broadcast;
use tracing::{error, info, warn};

use crate::coordinator::Coordinator;
use crate::error::{PipelineError, Result, is_connectivity_error};

pub struct Scheduler {
  coordinator: Coordinator,
  poll_interval: Duration,
  shutdown_rx: broadcast::Receiver<()>,
}

impl Scheduler {
  pub fn new(coordinator: Coordinator, poll_interval: Duration, shutdown_rx: broadcast::Receiver<()>) -> Self {
    Self {
      coordinator,
      poll_interval,
      shutdown_rx,
    }
  }

  /// Runs ticks until a shutdown signal arrives (`Ok(())`) or the
  /// coordinator reports an error that is not a connectivity problem, in
  /// which case it propagates so the process can crash for supervisor
  /// restart.
  pub async fn run(mut self) -> Result<()> {
    info!(poll_interval_secs = self.poll_interval.as_secs(), "etl scheduler started");

    loop {
      tokio::select! {
        biased;
        _ = self.shutdown_rx.recv() => {
          info!("shutdown received, exiting");
          return Ok(());
        }
        result = self.coordinator.run_tick() => {
          if let Err(err) = result {
            if is_connectivity_error(&err) {
              warn!("{err}, backing off for {:?}", self.poll_interval);
            } else {
              error!("unrecoverable pipeline error: {err}");
              return Err(err);
            }
          }
        }
      }

      tokio::select! {
        _ = self.shutdown_rx.recv() => {
          info!("shutdown received, exiting");
          return Ok(());
        }
        _ = tokio::time::sleep(self.poll_interval) => {}
      }
    }
  }
}

/// Spawns the scheduler on its own task.
pub fn spawn_scheduler(
  coordinator: Coordinator,
  poll_interval: Duration,
  shutdown_rx: broadcast::Receiver<()>,
) -> tokio::task::JoinHandle<Result<()>> {
  let scheduler = Scheduler::new(coordinator, poll_interval, shutdown_rx);
  tokio::spawn(scheduler.run())
}
