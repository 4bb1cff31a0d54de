use std::fmt;
use std::time::Duration;

use thiserror::Error;

/// What happened during a single attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttemptOutcome<T, E> {
    /// The work finished and produced a value.
    Success(T),
    /// The work did not finish within the per-attempt bound.
    Timeout { after: Duration },
    /// The work failed with an error classified as transient.
    RetryableFailure(E),
    /// The work failed with an error classified as permanent.
    FatalFailure(E),
}

impl<T, E> AttemptOutcome<T, E> {
    pub fn is_success(&self) -> bool {
        matches!(self, AttemptOutcome::Success(_))
    }
}

/// The most recent non-success cause, kept for the exhausted-budget report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LastFailure<E> {
    Timeout(Duration),
    Retryable(E),
}

impl<E: fmt::Display> fmt::Display for LastFailure<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LastFailure::Timeout(after) => write!(f, "timed out after {}s", after.as_secs_f64()),
            LastFailure::Retryable(err) => write!(f, "{err}"),
        }
    }
}

/// Terminal failure of a controller run.
///
/// `Fatal` means the work was rejected outright; `Exhausted` means every
/// attempt in the budget timed out or hit a transient error. Callers render
/// them differently.
#[derive(Debug, Error)]
pub enum RetryError<E>
where
    E: fmt::Debug + fmt::Display,
{
    #[error("rejected on attempt {attempt}: {cause}")]
    Fatal { attempt: u32, cause: E },

    #[error("gave up after {attempts} attempts; last error: {last}")]
    Exhausted { attempts: u32, last: LastFailure<E> },
}

impl<E> RetryError<E>
where
    E: fmt::Debug + fmt::Display,
{
    /// Number of attempts consumed before the controller returned.
    pub fn attempts(&self) -> u32 {
        match self {
            RetryError::Fatal { attempt, .. } => *attempt,
            RetryError::Exhausted { attempts, .. } => *attempts,
        }
    }

    pub fn is_exhausted(&self) -> bool {
        matches!(self, RetryError::Exhausted { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PolicyError {
    #[error("max_attempts must be at least 1")]
    ZeroAttempts,

    #[error("per-attempt timeout must be greater than zero")]
    ZeroTimeout,
}

/// Errors that know whether retrying them can help.
pub trait Retryable {
    fn is_retryable(&self) -> bool;
}

/// Textual classification for error shapes without a typed signal.
///
/// Matches an HTTP 503 code or the word "overload" anywhere in the message.
pub fn looks_transient(message: &str) -> bool {
    message.contains("503") || message.to_lowercase().contains("overload")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn looks_transient_matches_status_and_overload() {
        assert!(looks_transient("API error (status 503): try later"));
        assert!(looks_transient("The model is OVERLOADED"));
        assert!(!looks_transient("API error (status 400): bad request"));
        assert!(!looks_transient(""));
    }

    #[test]
    fn exhausted_and_fatal_render_differently() {
        let exhausted: RetryError<String> = RetryError::Exhausted {
            attempts: 3,
            last: LastFailure::Timeout(Duration::from_secs(2)),
        };
        assert_eq!(
            exhausted.to_string(),
            "gave up after 3 attempts; last error: timed out after 2s"
        );
        assert!(exhausted.is_exhausted());

        let fatal: RetryError<String> = RetryError::Fatal {
            attempt: 1,
            cause: "invalid api key".into(),
        };
        assert_eq!(fatal.to_string(), "rejected on attempt 1: invalid api key");
        assert!(!fatal.is_exhausted());
        assert_eq!(fatal.attempts(), 1);
    }

    #[test]
    fn last_failure_displays_fractional_timeout() {
        let last: LastFailure<String> = LastFailure::Timeout(Duration::from_millis(1500));
        assert_eq!(last.to_string(), "timed out after 1.5s");
    }
}
