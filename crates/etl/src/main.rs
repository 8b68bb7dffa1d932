// Process entrypoint: a clap-parsed CLI over a single long-running
// command, console logging initialised from an env-derived level before
// anything else runs.

use clap::Parser;
use etl_core::Config;
use pipeline::{Coordinator, spawn_scheduler};
use sink::SinkWriter;
use state::StateStore;
use std::process::ExitCode;
use std::time::Duration;
use tracing::{error, info};

/// `EX_CONFIG` from BSD `sysexits.h`: missing or invalid configuration.
const EXIT_CONFIG_ERROR: u8 = 78;
/// `EX_DATAERR`: the state file exists but could not be parsed.
const EXIT_DATA_ERROR: u8 = 65;

#[derive(Parser)]
#[command(name = "etl")]
#[command(about = "Incrementally reflects the film catalogue into the search indices")]
struct Cli {
  /// Run a single tick and exit instead of looping forever.
  #[arg(long)]
  once: bool,
}

fn init_logging(log_level: &str) {
  let filter = tracing_subscriber::EnvFilter::try_new(log_level)
    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("debug"));
  tracing_subscriber::fmt().with_env_filter(filter).init();
}

#[tokio::main]
async fn main() -> ExitCode {
  let cli = Cli::parse();

  let config = match Config::from_env() {
    Ok(config) => config,
    Err(err) => {
      // Logging is not initialised yet: configuration is the one failure
      // mode that can happen before we know what level to log at.
      eprintln!("fatal: {err}");
      return ExitCode::from(EXIT_CONFIG_ERROR);
    }
  };

  init_logging(&config.log_level);

  let state = match StateStore::load(config.storage_file_name.as_str()) {
    Ok(state) => state,
    Err(err) => {
      error!("fatal: state file unreadable: {err}");
      return ExitCode::from(EXIT_DATA_ERROR);
    }
  };

  let sink = SinkWriter::new(config.sink.base_url());
  let poll_interval = Duration::from_secs(config.poll_interval_seconds);
  let mut coordinator = Coordinator::new(config, sink, state);

  if cli.once {
    return match coordinator.run_tick().await {
      Ok(()) => {
        info!("single tick complete, exiting");
        ExitCode::SUCCESS
      }
      Err(err) => {
        error!("tick failed: {err}");
        ExitCode::FAILURE
      }
    };
  }

  let (shutdown_tx, shutdown_rx) = tokio::sync::broadcast::channel(1);
  let handle = spawn_scheduler(coordinator, poll_interval, shutdown_rx);

  if tokio::signal::ctrl_c().await.is_ok() {
    info!("ctrl-c received, signaling shutdown");
    let _ = shutdown_tx.send(());
  }

  match handle.await {
    Ok(Ok(())) => ExitCode::SUCCESS,
    Ok(Err(err)) => {
      error!("scheduler exited with an unrecoverable error: {err}");
      ExitCode::FAILURE
    }
    Err(join_err) => {
      error!("scheduler task panicked: {join_err}");
      ExitCode::FAILURE
    }
  }
}
