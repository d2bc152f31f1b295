//! Signed URL construction
//!
//! Builds URLs pointing back at the gateway: base URL + normalized resource
//! path + sorted query string, with a `sign` parameter appended when a
//! [`Signer`] is configured. Output is designed to survive a round trip:
//! re-parsing the path and query of a built URL and handing them to
//! `Signer::validate` always succeeds.
//!
//! A base URL starting with `//` is protocol-relative: it is parsed as
//! `http://` internally but re-emitted without a scheme. The flag is fixed
//! at construction; the builder is immutable and safe to share across
//! requests.

use std::collections::HashMap;
use url::Url;

use crate::error::GatewayError;
use crate::signature::{encode_query, Signer};

/// Builds (optionally signed) gateway URLs from a fixed base URL
#[derive(Debug, Clone)]
pub struct UrlBuilder {
    base_url: String,
    is_relative_domain: bool,
    signer: Option<Signer>,
}

impl UrlBuilder {
    /// Create a builder for the given base URL and optional signer
    ///
    /// Trailing slashes on the base URL are stripped.
    pub fn new(base_url: &str, signer: Option<Signer>) -> Self {
        let (base_url, is_relative_domain) = if let Some(rest) = base_url.strip_prefix("//") {
            (format!("http://{}", rest), true)
        } else {
            (base_url.to_string(), false)
        };

        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            is_relative_domain,
            signer,
        }
    }

    /// Create a builder, constructing a signer when `sign_key` is non-empty
    pub fn create(base_url: &str, sign_key: &str) -> Self {
        let signer = if sign_key.is_empty() {
            None
        } else {
            Some(Signer::new(sign_key))
        };
        Self::new(base_url, signer)
    }

    /// Build the URL for a resource path and parameter set
    ///
    /// The path is normalized to a single leading slash with no trailing
    /// slash. When a signer is configured, a `sign` parameter is added over
    /// the normalized path before serializing. Fails with `InvalidPath`
    /// when the joined base + path cannot be parsed as a URL.
    pub fn url(
        &self,
        path: &str,
        params: &HashMap<String, String>,
    ) -> Result<String, GatewayError> {
        let joined = format!("{}/{}", self.base_url, path.trim_matches('/'));

        let (authority, normalized_path) = if self.base_url.contains("://") {
            let parsed =
                Url::parse(&joined).map_err(|_| GatewayError::invalid_path(joined.clone()))?;

            let mut authority = String::new();
            if let Some(host) = parsed.host_str() {
                if self.is_relative_domain {
                    authority.push_str("//");
                } else {
                    authority.push_str(parsed.scheme());
                    authority.push_str("://");
                }
                authority.push_str(host);
                if let Some(port) = parsed.port() {
                    authority.push(':');
                    authority.push_str(&port.to_string());
                }
            }

            (authority, format!("/{}", parsed.path().trim_matches('/')))
        } else {
            // Host-less base: purely relative output, no authority segment
            (String::new(), format!("/{}", joined.trim_matches('/')))
        };

        let params = match &self.signer {
            Some(signer) => signer.add_signature(&normalized_path, params),
            None => params.clone(),
        };

        let mut out = format!("{}{}", authority, normalized_path);
        let query = encode_query(&params);
        if !query.is_empty() {
            out.push('?');
            out.push_str(&query);
        }
        Ok(out)
    }
}
