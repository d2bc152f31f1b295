//! Cache-header synthesis and conditional-request freshness checks
//!
//! Pure functions over timestamps and header values; no I/O. The
//! orchestrator resolves the source's last-modified time and hands it in,
//! so everything here is testable without a storage backend.
//!
//! HTTP dates are RFC 1123 in GMT. Freshness comparison is exact equality
//! at second granularity: both sides are normalized to whole seconds
//! before comparing.

use chrono::{DateTime, Utc};
use http::header::{HeaderValue, CACHE_CONTROL, DATE, EXPIRES, LAST_MODIFIED};
use http::HeaderMap;
use std::time::Duration;

/// RFC 1123 format used for all emitted date headers
const HTTP_DATE_FORMAT: &str = "%a, %d %b %Y %H:%M:%S GMT";

/// Format whole seconds since the Unix epoch as an RFC 1123 GMT date
pub fn format_http_date(secs: i64) -> String {
    let dt = DateTime::<Utc>::from_timestamp(secs, 0).unwrap_or(DateTime::<Utc>::UNIX_EPOCH);
    dt.format(HTTP_DATE_FORMAT).to_string()
}

/// Parse an HTTP date header value to whole seconds since the Unix epoch
///
/// Accepts RFC 1123 dates (the RFC 2822 superset, including the `GMT`
/// zone name). Returns None for anything unparseable.
pub fn parse_http_date(value: &str) -> Option<i64> {
    DateTime::parse_from_rfc2822(value)
        .ok()
        .map(|dt| dt.timestamp())
}

/// Outcome of the conditional-request check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Freshness {
    /// Client already has the current version; respond 304
    NotModified,
    /// Render and send the full response
    Modified,
}

/// Compare the source's last-modified time against If-Modified-Since
///
/// An absent header always renders. An unknown source timestamp (missing
/// source) never short-circuits; the render step surfaces the real error.
pub fn check_freshness(
    source_modified: Option<i64>,
    if_modified_since: Option<&str>,
) -> Freshness {
    let (Some(modified), Some(header)) = (source_modified, if_modified_since) else {
        return Freshness::Modified;
    };

    match parse_http_date(header) {
        Some(client_seen) if client_seen == modified => Freshness::NotModified,
        _ => Freshness::Modified,
    }
}

/// The cache headers attached to rendered and 304 responses
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheHeaders {
    pub cache_control: String,
    pub date: String,
    pub last_modified: String,
    pub expires: String,
}

impl CacheHeaders {
    /// Synthesize headers for a response produced at `now`
    ///
    /// With a TTL, `Expires` is `now + ttl` and max-age is the TTL in
    /// seconds. Without one, expiry collapses to `now` and max-age to 0
    /// (no caching asserted). A missing source timestamp is emitted as
    /// the epoch, matching bare-zero semantics.
    pub fn synthesize(ttl: Option<Duration>, source_modified: Option<i64>, now: i64) -> Self {
        let expire = match ttl {
            Some(ttl) => now + ttl.as_secs() as i64,
            None => now,
        };

        Self {
            cache_control: format!("public,max-age={}", expire - now),
            date: format_http_date(now),
            last_modified: format_http_date(source_modified.unwrap_or(0)),
            expires: format_http_date(expire),
        }
    }

    /// Write the headers into a response header map
    pub fn apply(&self, headers: &mut HeaderMap) {
        let pairs = [
            (CACHE_CONTROL, &self.cache_control),
            (DATE, &self.date),
            (LAST_MODIFIED, &self.last_modified),
            (EXPIRES, &self.expires),
        ];
        for (name, value) in pairs {
            if let Ok(value) = HeaderValue::from_str(value) {
                headers.insert(name, value);
            }
        }
    }
}
