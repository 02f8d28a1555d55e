use std::future::Future;

use tokio::time::sleep;
use tracing::{debug, warn};

use crate::retry::{RetryDecision, RetryPolicy, RetrySchedule};

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug)]
pub enum LoadError {
    /// The failure class does not improve with retrying; surfaced as-is.
    Fatal { source: BoxError },
    /// Every allowed attempt failed transiently; carries the last failure
    /// for diagnostics.
    RetryExhausted { attempts: u32, last: BoxError },
}

impl std::fmt::Display for LoadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LoadError::Fatal { source } => write!(f, "load failed: {source}"),
            LoadError::RetryExhausted { attempts, last } => {
                write!(f, "load failed after {attempts} attempts: {last}")
            }
        }
    }
}

impl std::error::Error for LoadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LoadError::Fatal { source } => Some(source.as_ref()),
            LoadError::RetryExhausted { last, .. } => Some(last.as_ref()),
        }
    }
}

/// Runs `load_fn` until it succeeds, fails fatally, or exhausts the retry
/// budget, sleeping the scheduled backoff between transient failures.
///
/// Each call is an independent state machine; concurrent loads of the same
/// unit do not coordinate (callers wanting at-most-once-in-flight add
/// their own deduplication). There is no cancellation token: dropping the
/// returned future abandons the load without interrupting an attempt
/// already in flight.
pub async fn load<T, F, Fut>(policy: RetryPolicy, mut load_fn: F) -> Result<T, LoadError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, BoxError>>,
{
    let mut schedule = RetrySchedule::new(policy);
    loop {
        match load_fn().await {
            Ok(value) => {
                debug!(attempts = schedule.attempts_made() + 1, "load succeeded");
                return Ok(value);
            }
            Err(err) => match schedule.on_failure(&err.to_string()) {
                RetryDecision::Abort => {
                    warn!(%err, "fatal load failure");
                    return Err(LoadError::Fatal { source: err });
                }
                RetryDecision::RetryAfter(delay) => {
                    warn!(%err, delay_ms = delay.as_millis() as u64, "transient load failure, backing off");
                    sleep(delay).await;
                }
                RetryDecision::Exhausted => {
                    let attempts = schedule.attempts_made();
                    warn!(%err, attempts, "retry budget exhausted");
                    return Err(LoadError::RetryExhausted {
                        attempts,
                        last: err,
                    });
                }
            },
        }
    }
}

/// [`load`] with the default policy (1000 ms base delay, 3 retries).
pub async fn load_with_defaults<T, F, Fut>(load_fn: F) -> Result<T, LoadError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, BoxError>>,
{
    load(RetryPolicy::default(), load_fn).await
}

#[cfg(test)]
mod tests {
    use super::{BoxError, LoadError, load, load_with_defaults};
    use crate::retry::RetryPolicy;
    use std::cell::RefCell;
    use std::rc::Rc;
    use std::time::Duration;
    use tokio::time::Instant;

    #[tokio::test(start_paused = true)]
    async fn transient_failures_back_off_then_succeed() {
        let starts = Rc::new(RefCell::new(Vec::<Instant>::new()));

        let result = load_with_defaults(|| {
            let starts = Rc::clone(&starts);
            async move {
                let attempt = {
                    let mut starts = starts.borrow_mut();
                    starts.push(Instant::now());
                    starts.len()
                };
                if attempt <= 2 {
                    Err::<&str, BoxError>("network error while fetching unit".into())
                } else {
                    Ok("unit")
                }
            }
        })
        .await;

        assert_eq!(result.unwrap(), "unit");
        let starts = starts.borrow();
        assert_eq!(starts.len(), 3);
        assert_eq!(starts[1] - starts[0], Duration::from_millis(1000));
        assert_eq!(starts[2] - starts[1], Duration::from_millis(2000));
    }

    #[tokio::test(start_paused = true)]
    async fn fatal_failure_short_circuits_with_zero_retries() {
        let calls = Rc::new(RefCell::new(0u32));

        let result: Result<(), LoadError> = load_with_defaults(|| {
            let calls = Rc::clone(&calls);
            async move {
                *calls.borrow_mut() += 1;
                Err("SyntaxError: unexpected token".into())
            }
        })
        .await;

        assert!(matches!(result, Err(LoadError::Fatal { .. })));
        assert_eq!(*calls.borrow(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn exhaustion_reports_attempts_and_the_last_error() {
        let result: Result<(), LoadError> =
            load(RetryPolicy::with_max_retries(3), || async {
                Err("request timed out".into())
            })
            .await;

        match result {
            Err(LoadError::RetryExhausted { attempts, last }) => {
                assert_eq!(attempts, 4);
                assert!(last.to_string().contains("timed out"));
            }
            other => panic!("expected RetryExhausted, got {other:?}"),
        }
    }
}
