// Exponential backoff retry wrapper, no jitter.
//
// Wraps a fallible async unit of work and retries it a fixed number of
// times with a growing delay, capped by a ceiling. Each caller supplies its
// own `retry_on` predicate so the policy stays compositional: the source
// reader and the sink writer wrap independently, each classifying its own
// error type.

use std::future::Future;
use std::time::Duration;
use tracing::warn;

/// Retry parameters. `RetryPolicy::default()` matches the five fixed
/// values this workspace standardises on: `start`=0.1s, `factor`=2,
/// `ceiling`=10s, `max_tries`=8.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryPolicy {
  pub start: Duration,
  pub factor: u32,
  pub ceiling: Duration,
  pub max_tries: u32,
}

impl Default for RetryPolicy {
  fn default() -> Self {
    Self {
      start: Duration::from_millis(100),
      factor: 2,
      ceiling: Duration::from_secs(10),
      max_tries: 8,
    }
  }
}

impl RetryPolicy {
  /// Delay before the `attempt`-th retry (1-indexed: the delay before the
  /// *second* overall call is `delay_for_attempt(1)`).
  ///
  /// `t = start * factor^n`, capped at `ceiling`. No jitter.
  pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
    let factor = (self.factor as f64).powi(attempt as i32);
    let raw = self.start.as_secs_f64() * factor;
    Duration::from_secs_f64(raw.min(self.ceiling.as_secs_f64()))
  }
}

/// Run `f` up to `policy.max_tries` times, retrying only errors for which
/// `retry_on` returns `true`. On the last attempt any matching error is
/// still returned to the caller rather than retried again.
pub async fn retry<T, E, F, Fut>(policy: &RetryPolicy, retry_on: impl Fn(&E) -> bool, mut f: F) -> Result<T, E>
where
  F: FnMut() -> Fut,
  Fut: Future<Output = Result<T, E>>,
  E: std::fmt::Display,
{
  let mut attempt = 1;
  loop {
    match f().await {
      Ok(value) => return Ok(value),
      Err(err) => {
        if attempt >= policy.max_tries || !retry_on(&err) {
          if attempt >= policy.max_tries {
            warn!("max retries ({}) exceeded: {}", policy.max_tries, err);
          }
          return Err(err);
        }
        let delay = policy.delay_for_attempt(attempt);
        warn!(
          "attempt {}/{} failed: {}. retrying in {:?}",
          attempt, policy.max_tries, err, delay
        );
        tokio::time::sleep(delay).await;
        attempt += 1;
      }
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::cell::Cell;

  #[test]
  fn delay_grows_exponentially_until_ceiling() {
    let policy = RetryPolicy::default();
    assert_eq!(policy.delay_for_attempt(1), Duration::from_millis(200));
    assert_eq!(policy.delay_for_attempt(2), Duration::from_millis(400));
    assert_eq!(policy.delay_for_attempt(3), Duration::from_millis(800));
    assert_eq!(policy.delay_for_attempt(7), Duration::from_secs(10));
  }

  #[test]
  fn delay_respects_ceiling_early() {
    let policy = RetryPolicy {
      start: Duration::from_secs(5),
      factor: 10,
      ceiling: Duration::from_secs(10),
      max_tries: 8,
    };
    // 5 * 10^2 = 500s, capped to 10s.
    assert_eq!(policy.delay_for_attempt(2), Duration::from_secs(10));
  }

  #[tokio::test]
  async fn succeeds_without_retry_on_first_try() {
    let policy = RetryPolicy::default();
    let calls = Cell::new(0);
    let result: Result<u32, &str> = retry(&policy, |_| true, || {
      calls.set(calls.get() + 1);
      async { Ok(42) }
    })
    .await;
    assert_eq!(result, Ok(42));
    assert_eq!(calls.get(), 1);
  }

  #[tokio::test]
  async fn retries_until_success() {
    let policy = RetryPolicy {
      start: Duration::from_millis(1),
      factor: 1,
      ceiling: Duration::from_millis(1),
      max_tries: 5,
    };
    let calls = Cell::new(0);
    let result: Result<u32, &str> = retry(&policy, |_| true, || {
      calls.set(calls.get() + 1);
      async move {
        if calls.get() < 3 {
          Err("transient")
        } else {
          Ok(7)
        }
      }
    })
    .await;
    assert_eq!(result, Ok(7));
    assert_eq!(calls.get(), 3);
  }

  #[tokio::test]
  async fn gives_up_after_max_tries() {
    let policy = RetryPolicy {
      start: Duration::from_millis(1),
      factor: 1,
      ceiling: Duration::from_millis(1),
      max_tries: 3,
    };
    let calls = Cell::new(0);
    let result: Result<u32, &str> = retry(&policy, |_| true, || {
      calls.set(calls.get() + 1);
      async { Err("permanent") }
    })
    .await;
    assert_eq!(result, Err("permanent"));
    assert_eq!(calls.get(), 3);
  }

  #[tokio::test]
  async fn non_retryable_error_returns_immediately() {
    let policy = RetryPolicy::default();
    let calls = Cell::new(0);
    let result: Result<u32, &str> = retry(&policy, |_| false, || {
      calls.set(calls.get() + 1);
      async { Err("fatal") }
    })
    .await;
    assert_eq!(result, Err("fatal"));
    assert_eq!(calls.get(), 1);
  }
}
