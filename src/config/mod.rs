//! Gateway configuration
//!
//! The configuration is resolved once when the middleware is constructed and
//! is immutable for its lifetime. `source` is required; everything else has
//! a default. An empty `cache_time` disables expiry computation and the
//! conditional-request short circuit; an empty `sign_key` disables signature
//! verification (open mode).

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

use crate::error::GatewayError;

fn default_base_url() -> String {
    "/images".to_string()
}

fn default_cache_time() -> String {
    "+1 day".to_string()
}

/// Gateway configuration, immutable after construction
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// Root location of the original images (required, non-empty)
    pub source: String,

    /// URL prefix handled by the middleware; all other paths pass through
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Root location of the rendered derivatives
    #[serde(default)]
    pub cache: String,

    /// Relative expiry expression, e.g. `+1 day`. Empty disables caching
    /// headers and conditional-request handling.
    #[serde(default = "default_cache_time")]
    pub cache_time: String,

    /// Shared secret for URL signatures. Empty disables verification.
    #[serde(default)]
    pub sign_key: String,

    /// Opaque options passed through to the transform backend
    #[serde(default)]
    pub transform_options: HashMap<String, String>,
}

impl GatewayConfig {
    /// Create a configuration with the given source root and defaults for
    /// everything else
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            base_url: default_base_url(),
            cache: String::new(),
            cache_time: default_cache_time(),
            sign_key: String::new(),
            transform_options: HashMap::new(),
        }
    }

    /// Load configuration from YAML with `${VAR_NAME}` environment
    /// variable substitution
    pub fn from_yaml_with_env(yaml: &str) -> Result<Self, GatewayError> {
        let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}")
            .map_err(|e| GatewayError::config(e.to_string()))?;

        // First, check that all referenced environment variables exist
        for caps in re.captures_iter(yaml) {
            let var_name = &caps[1];
            std::env::var(var_name).map_err(|_| {
                GatewayError::config(format!(
                    "Environment variable '{}' is referenced but not set",
                    var_name
                ))
            })?;
        }

        // Now perform the substitution (we know all vars exist)
        let substituted = re.replace_all(yaml, |caps: &regex::Captures| {
            std::env::var(&caps[1]).unwrap_or_default()
        });

        let config: GatewayConfig = serde_yaml::from_str(&substituted)
            .map_err(|e| GatewayError::config(format!("Invalid YAML: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the resolved configuration
    ///
    /// `source` must be non-empty. When caching is enabled (`cache_time`
    /// non-empty), `cache` must be set and the expression must parse.
    pub fn validate(&self) -> Result<(), GatewayError> {
        if self.source.trim().is_empty() {
            return Err(GatewayError::config("'source' is required"));
        }
        if !self.cache_time.is_empty() {
            if self.cache.trim().is_empty() {
                return Err(GatewayError::config(
                    "'cache' is required when 'cache_time' is set",
                ));
            }
            if parse_duration_expr(&self.cache_time).is_none() {
                return Err(GatewayError::config(format!(
                    "Invalid 'cache_time' expression: '{}'",
                    self.cache_time
                )));
            }
        }
        Ok(())
    }

    /// The cache TTL, or None when caching is disabled
    pub fn cache_ttl(&self) -> Option<Duration> {
        if self.cache_time.is_empty() {
            return None;
        }
        parse_duration_expr(&self.cache_time)
    }

    /// Whether signature verification is enabled
    pub fn signing_enabled(&self) -> bool {
        !self.sign_key.is_empty()
    }
}

/// Parse a relative duration expression like `+1 day` or `+2 hours`
///
/// Supported units: seconds, minutes, hours, days, weeks (singular or
/// plural). The leading `+` is optional. Returns None for anything else.
pub fn parse_duration_expr(expr: &str) -> Option<Duration> {
    let trimmed = expr.trim().trim_start_matches('+').trim();
    let (amount_str, unit) = trimmed.split_once(char::is_whitespace)?;
    let amount: u64 = amount_str.parse().ok()?;
    let per_unit = match unit.trim().to_lowercase().as_str() {
        "second" | "seconds" => 1,
        "minute" | "minutes" => 60,
        "hour" | "hours" => 3600,
        "day" | "days" => 86400,
        "week" | "weeks" => 604800,
        _ => return None,
    };
    Some(Duration::from_secs(amount * per_unit))
}
