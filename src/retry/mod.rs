mod controller;
mod outcome;

pub use controller::{DEFAULT_RETRY_BACKOFF, RetryController, RetryPolicy};
pub use outcome::{AttemptOutcome, PolicyError, RetryError, Retryable, looks_transient};
