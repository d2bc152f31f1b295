//! URL signature generation and verification
//!
//! A signature is a deterministic digest over the requested path and the
//! transform parameters, proving the URL was issued by a holder of the
//! shared secret. Generation and verification share one normalization
//! routine: any divergence between the two sides breaks every URL already
//! in the wild, so both the signer and the URL builder serialize parameters
//! through [`encode_query`].
//!
//! The digest is a SHA-256 hex string over
//! `key ':' path-without-leading-slash '?' canonical-query`, where the
//! canonical query is the parameter set minus `sign`, sorted by key.

use sha2::{Digest, Sha256};
use std::collections::{BTreeMap, HashMap};

use crate::error::GatewayError;

/// Query parameter carrying the signature; excluded from digest input
pub const SIGN_PARAM: &str = "sign";

/// Serialize parameters into a query string, sorted by key ascending,
/// with keys and values percent-encoded
pub fn encode_query(params: &HashMap<String, String>) -> String {
    let sorted: BTreeMap<&str, &str> = params
        .iter()
        .map(|(k, v)| (k.as_str(), v.as_str()))
        .collect();
    sorted
        .iter()
        .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
        .collect::<Vec<_>>()
        .join("&")
}

/// Signs and verifies (path, parameter-set) pairs with a shared secret
///
/// Pure function of its inputs and the configured key; no side effects.
#[derive(Debug, Clone)]
pub struct Signer {
    key: String,
}

impl Signer {
    pub fn new(key: impl Into<String>) -> Self {
        Self { key: key.into() }
    }

    /// Generate the signature digest for a path and parameter set
    ///
    /// Any existing `sign` entry is ignored; remaining parameters are
    /// sorted by key before encoding, so insertion order never matters.
    pub fn generate(&self, path: &str, params: &HashMap<String, String>) -> String {
        let mut unsigned = params.clone();
        unsigned.remove(SIGN_PARAM);

        let payload = format!(
            "{}:{}?{}",
            self.key,
            path.trim_start_matches('/'),
            encode_query(&unsigned)
        );

        let mut hasher = Sha256::new();
        hasher.update(payload.as_bytes());
        hex::encode(hasher.finalize())
    }

    /// Return the parameter set with `sign` set to the computed digest
    pub fn add_signature(
        &self,
        path: &str,
        params: &HashMap<String, String>,
    ) -> HashMap<String, String> {
        let mut signed = params.clone();
        let signature = self.generate(path, params);
        signed.insert(SIGN_PARAM.to_string(), signature);
        signed
    }

    /// Validate a request's signature
    ///
    /// Fails with `SignatureMissing` when no `sign` entry exists and
    /// `SignatureInvalid` when the recomputed digest does not match.
    pub fn validate(
        &self,
        path: &str,
        params: &HashMap<String, String>,
    ) -> Result<(), GatewayError> {
        let supplied = params
            .get(SIGN_PARAM)
            .ok_or(GatewayError::SignatureMissing)?;

        if *supplied != self.generate(path, params) {
            return Err(GatewayError::SignatureInvalid);
        }

        Ok(())
    }
}
