//! shardnet logging
//!
//! A thin wrapper around `tracing-subscriber`'s fmt layer, giving every
//! shardnet binary the same log level vocabulary and env-filter
//! override (`SHARDNET_LOG`) without each one re-deriving it.

use tracing_subscriber::EnvFilter;

/// Log verbosity, independent of `tracing`'s own `Level` so callers
/// don't need the `tracing` crate in scope just to pick a level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    fn as_filter_str(&self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

/// Initialize the global subscriber at `level`, honoring `SHARDNET_LOG`
/// if set. Returns an error if a subscriber is already installed;
/// callers that may initialize more than once (tests, repeated builder
/// calls) should ignore it.
pub fn try_init(level: LogLevel) -> Result<(), tracing_subscriber::util::TryInitError> {
    let filter = EnvFilter::try_from_env("SHARDNET_LOG").unwrap_or_else(|_| EnvFilter::new(level.as_filter_str()));
    tracing_subscriber::fmt().with_env_filter(filter).with_target(false).try_init()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_strings() {
        assert_eq!(LogLevel::Info.as_filter_str(), "info");
        assert_eq!(LogLevel::Trace.as_filter_str(), "trace");
    }
}
