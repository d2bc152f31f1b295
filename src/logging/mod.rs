//! Structured logging setup using the tracing crate

use std::error::Error;
use tracing_subscriber::EnvFilter;

/// Initialize the tracing subscriber for structured logging
///
/// Filtering comes from `RUST_LOG` when set, defaulting to `info`.
/// With `json = true` events are emitted as JSON for log aggregation;
/// otherwise the human-readable formatter is used.
///
/// # Errors
///
/// Returns an error if a global subscriber is already installed.
pub fn init_subscriber(json: bool) -> Result<(), Box<dyn Error + Send + Sync>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    if json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .try_init()?;
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).try_init()?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_subscriber_is_idempotent_enough() {
        // First call wins; a second call reports the conflict instead of
        // panicking.
        let first = init_subscriber(false);
        let second = init_subscriber(true);
        assert!(first.is_ok() || second.is_err());
    }
}
