//! Structured logging setup.
//!
//! Logs go to stderr so rendered documents on stdout stay clean. `RUST_LOG`
//! wins when set; otherwise only warnings are shown, or debug output with
//! `--verbose`.

use tracing_subscriber::EnvFilter;

pub fn default_directive(verbose: bool) -> &'static str {
    if verbose { "pebble=debug" } else { "pebble=warn" }
}

/// Installs the global subscriber. Calling it twice is harmless.
pub fn init(verbose: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive(verbose)));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbose_raises_level() {
        assert_eq!(default_directive(false), "pebble=warn");
        assert_eq!(default_directive(true), "pebble=debug");
    }

    #[test]
    fn init_twice_does_not_panic() {
        init(false);
        init(true);
    }
}
