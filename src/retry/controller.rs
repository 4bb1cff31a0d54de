//! Bounded retries with a per-attempt deadline.
//!
//! Every attempt runs on its own tokio task and receives a fresh
//! [`CancellationToken`]. When the deadline passes the token is cancelled
//! and the task aborted; the controller then moves on. A request that was
//! already on the wire may still complete server-side, so work with external
//! effects must tolerate duplicates.

use std::fmt;
use std::future::Future;
use std::time::Duration;

use tokio::time::{sleep, timeout};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::outcome::{AttemptOutcome, LastFailure, PolicyError, RetryError, Retryable};

/// Delay slept after a retryable failure. Timeouts retry immediately.
pub const DEFAULT_RETRY_BACKOFF: Duration = Duration::from_millis(1500);

/// Attempt budget, deadline and backoff for one controller run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_attempts: u32,
    attempt_timeout: Duration,
    retry_backoff: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, attempt_timeout: Duration) -> Result<Self, PolicyError> {
        if max_attempts == 0 {
            return Err(PolicyError::ZeroAttempts);
        }
        if attempt_timeout.is_zero() {
            return Err(PolicyError::ZeroTimeout);
        }
        Ok(Self {
            max_attempts,
            attempt_timeout,
            retry_backoff: DEFAULT_RETRY_BACKOFF,
        })
    }

    /// Replaces the fixed delay slept after a retryable failure.
    pub fn with_backoff(mut self, retry_backoff: Duration) -> Self {
        self.retry_backoff = retry_backoff;
        self
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub fn retry_backoff(&self) -> Duration {
        self.retry_backoff
    }
}

/// Receives each attempt's outcome before the controller acts on it.
pub trait AttemptObserver<T, E> {
    fn on_attempt(&mut self, attempt: u32, outcome: &AttemptOutcome<T, E>);
}

impl<T, E, F> AttemptObserver<T, E> for F
where
    F: FnMut(u32, &AttemptOutcome<T, E>),
{
    fn on_attempt(&mut self, attempt: u32, outcome: &AttemptOutcome<T, E>) {
        self(attempt, outcome)
    }
}

/// Observer that ignores every attempt.
#[derive(Debug, Clone, Copy, Default)]
pub struct Unobserved;

impl<T, E> AttemptObserver<T, E> for Unobserved {
    fn on_attempt(&mut self, _attempt: u32, _outcome: &AttemptOutcome<T, E>) {}
}

/// Runs a unit of work until it succeeds, fails fatally, or the budget runs out.
#[derive(Debug, Clone)]
pub struct RetryController<O = Unobserved> {
    policy: RetryPolicy,
    observer: O,
}

impl RetryController {
    pub fn new(policy: RetryPolicy) -> Self {
        Self {
            policy,
            observer: Unobserved,
        }
    }
}

impl<O> RetryController<O> {
    /// Reports every attempt's outcome to `observer`.
    pub fn observe<P>(self, observer: P) -> RetryController<P> {
        RetryController {
            policy: self.policy,
            observer,
        }
    }

    /// Executes `work`, classifying its errors with `is_retryable`.
    pub async fn execute<T, E, F, Fut, C>(&mut self, mut work: F, is_retryable: C) -> Result<T, RetryError<E>>
    where
        F: FnMut(CancellationToken) -> Fut,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
        T: Send + 'static,
        E: fmt::Debug + fmt::Display + Send + 'static,
        C: Fn(&E) -> bool,
        O: AttemptObserver<T, E>,
    {
        let max_attempts = self.policy.max_attempts;
        let mut attempt = 1;

        loop {
            let outcome = self.run_attempt(&mut work, &is_retryable).await;
            self.observer.on_attempt(attempt, &outcome);

            let last = match outcome {
                AttemptOutcome::Success(value) => {
                    if attempt > 1 {
                        debug!(attempt, max_attempts, "attempt succeeded after retries");
                    }
                    return Ok(value);
                }
                AttemptOutcome::FatalFailure(cause) => {
                    info!(attempt, max_attempts, error = %cause, "non-retryable failure");
                    return Err(RetryError::Fatal { attempt, cause });
                }
                AttemptOutcome::Timeout { after } => {
                    info!(attempt, max_attempts, timeout_ms = after.as_millis() as u64, "attempt timed out");
                    LastFailure::Timeout(after)
                }
                AttemptOutcome::RetryableFailure(cause) => {
                    info!(attempt, max_attempts, error = %cause, "retryable failure");
                    LastFailure::Retryable(cause)
                }
            };

            if attempt >= max_attempts {
                info!(attempts = attempt, last = %last, "retry budget exhausted");
                return Err(RetryError::Exhausted { attempts: attempt, last });
            }

            // Only transient errors back off; a timeout already spent its wait.
            if matches!(last, LastFailure::Retryable(_)) {
                debug!(backoff_ms = self.policy.retry_backoff.as_millis() as u64, "backing off");
                sleep(self.policy.retry_backoff).await;
            }
            attempt += 1;
        }
    }

    /// Like [`execute`](Self::execute), for errors that classify themselves.
    pub async fn execute_retryable<T, E, F, Fut>(&mut self, work: F) -> Result<T, RetryError<E>>
    where
        F: FnMut(CancellationToken) -> Fut,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
        T: Send + 'static,
        E: Retryable + fmt::Debug + fmt::Display + Send + 'static,
        O: AttemptObserver<T, E>,
    {
        self.execute(work, E::is_retryable).await
    }

    async fn run_attempt<T, E, F, Fut, C>(&self, work: &mut F, is_retryable: &C) -> AttemptOutcome<T, E>
    where
        F: FnMut(CancellationToken) -> Fut,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
        T: Send + 'static,
        E: Send + 'static,
        C: Fn(&E) -> bool,
    {
        let token = CancellationToken::new();
        let mut handle = tokio::spawn(work(token.clone()));

        match timeout(self.policy.attempt_timeout, &mut handle).await {
            Ok(Ok(Ok(value))) => AttemptOutcome::Success(value),
            Ok(Ok(Err(err))) => {
                if is_retryable(&err) {
                    AttemptOutcome::RetryableFailure(err)
                } else {
                    AttemptOutcome::FatalFailure(err)
                }
            }
            Ok(Err(join_err)) => match join_err.try_into_panic() {
                Ok(payload) => std::panic::resume_unwind(payload),
                // Only reachable while the runtime is shutting down.
                Err(_) => {
                    warn!("attempt task was cancelled by the runtime");
                    AttemptOutcome::Timeout {
                        after: self.policy.attempt_timeout,
                    }
                }
            },
            Err(_elapsed) => {
                token.cancel();
                handle.abort();
                AttemptOutcome::Timeout {
                    after: self.policy.attempt_timeout,
                }
            }
        }
    }
}
