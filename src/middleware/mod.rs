//! Request orchestration middleware
//!
//! `ImageGateway` is the middleware itself: it matches decoded request
//! paths against the configured prefix, strips the framework routing
//! parameter, verifies the URL signature, short-circuits conditional GETs
//! against the source's last-modified time, invokes the transform backend
//! for a fresh render, and synthesizes cache headers on the way out.
//!
//! Each request is a single pass with no retries and no state shared
//! across requests beyond the immutable configuration. Failures in
//! verification or rendering are routed to the configured exception
//! handler, which owns the error response.

pub mod exception;
pub mod headers;

use async_trait::async_trait;
use bytes::Bytes;
use chrono::Utc;
use http::header::IF_MODIFIED_SINCE;
use http::{Request, Response, StatusCode, Uri};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn, Instrument};
use uuid::Uuid;

use crate::config::GatewayConfig;
use crate::error::GatewayError;
use crate::response::ResponseFactory;
use crate::signature::Signer;
use crate::storage::Storage;
use crate::transform::TransformService;
use crate::urlbuilder::UrlBuilder;

use exception::ExceptionHandler;
use headers::{CacheHeaders, Freshness};

/// Framework routing parameter, stripped before any processing
const ROUTE_PARAM: &str = "s";

/// A handler in the request chain
///
/// The gateway forwards non-matching requests to the next handler
/// unchanged; hosts compose the chain externally.
#[async_trait]
pub trait Handler: Send + Sync {
    async fn handle(&self, request: Request<Bytes>) -> Response<Bytes>;
}

/// The image-transformation gateway middleware
///
/// Immutable after construction and safe to share across concurrent
/// requests. Collaborators (source store, cache store, transform backend)
/// are injected; the gateway performs no locking and holds no cross-request
/// resources.
pub struct ImageGateway {
    config: GatewayConfig,
    ttl: Option<Duration>,
    signer: Option<Signer>,
    source: Arc<dyn Storage>,
    cache: Arc<dyn Storage>,
    transform: Arc<dyn TransformService>,
    on_exception: ExceptionHandler,
}

impl std::fmt::Debug for ImageGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageGateway").finish_non_exhaustive()
    }
}

impl ImageGateway {
    /// Construct the gateway, validating the configuration
    ///
    /// Fails with a `Config` error when `source` is missing or the cache
    /// settings are inconsistent; this is fatal, not a request-time error.
    pub fn new(
        config: GatewayConfig,
        source: Arc<dyn Storage>,
        cache: Arc<dyn Storage>,
        transform: Arc<dyn TransformService>,
    ) -> Result<Self, GatewayError> {
        config.validate()?;

        let ttl = config.cache_ttl();
        let signer = if config.signing_enabled() {
            Some(Signer::new(config.sign_key.clone()))
        } else {
            None
        };

        Ok(Self {
            config,
            ttl,
            signer,
            source,
            cache,
            transform,
            on_exception: exception::default_handler(),
        })
    }

    /// Replace the default exception handler
    pub fn with_exception_handler(mut self, handler: ExceptionHandler) -> Self {
        self.on_exception = handler;
        self
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    /// A URL builder matched to this gateway's prefix and signing key
    ///
    /// URLs it emits verify against this gateway's signature check.
    pub fn url_builder(&self) -> UrlBuilder {
        UrlBuilder::create(&self.config.base_url, &self.config.sign_key)
    }

    /// Handle one request, forwarding non-matching paths to `next`
    pub async fn handle(&self, request: Request<Bytes>, next: &dyn Handler) -> Response<Bytes> {
        let decoded = decode_path(request.uri().path());

        if !decoded.starts_with(&self.config.base_url) {
            return next.handle(request).await;
        }

        let mut params = extract_query_params(request.uri());
        params.remove(ROUTE_PARAM);

        let request_id = Uuid::new_v4();
        let span = tracing::info_span!("image_request", %request_id, path = %decoded);
        async {
            match self.process(&request, &decoded, &params).await {
                Ok(response) => {
                    debug!(status = response.status().as_u16(), "request handled");
                    response
                }
                Err(error) => {
                    warn!(%error, "request failed");
                    (self.on_exception)(&error, &request)
                }
            }
        }
        .instrument(span)
        .await
    }

    async fn process(
        &self,
        request: &Request<Bytes>,
        decoded: &str,
        params: &HashMap<String, String>,
    ) -> Result<Response<Bytes>, GatewayError> {
        if let Some(signer) = &self.signer {
            signer.validate(decoded, params)?;
        }

        let mut modified = None;
        if self.ttl.is_some() {
            // A missing source is not fatal here: skip the short circuit
            // and let the render step report it.
            modified = self
                .source
                .last_modified(&self.source_path(decoded))
                .await
                .ok();

            let if_modified_since = request
                .headers()
                .get(IF_MODIFIED_SINCE)
                .and_then(|v| v.to_str().ok());

            if headers::check_freshness(modified, if_modified_since) == Freshness::NotModified {
                debug!("source unchanged");
                let mut response = Response::new(Bytes::new());
                *response.status_mut() = StatusCode::NOT_MODIFIED;
                self.cache_headers(modified).apply(response.headers_mut());
                return Ok(response);
            }
        }

        let cache_path = self.transform.render(decoded, params).await?;
        let mut response = ResponseFactory::create(self.cache.as_ref(), &cache_path).await?;
        self.cache_headers(modified).apply(response.headers_mut());
        Ok(response)
    }

    fn cache_headers(&self, modified: Option<i64>) -> CacheHeaders {
        CacheHeaders::synthesize(self.ttl, modified, Utc::now().timestamp())
    }

    /// Map a request path to a source-store path by stripping the prefix
    fn source_path(&self, decoded: &str) -> String {
        decoded
            .strip_prefix(&self.config.base_url)
            .unwrap_or(decoded)
            .trim_start_matches('/')
            .to_string()
    }
}

/// Percent-decode a request path, falling back to the raw path on
/// malformed encodings
fn decode_path(path: &str) -> String {
    urlencoding::decode(path)
        .map(|decoded| decoded.into_owned())
        .unwrap_or_else(|_| path.to_string())
}

/// Extract query parameters from a URI
///
/// Values are URL-decoded; pairs without `=` are skipped.
fn extract_query_params(uri: &Uri) -> HashMap<String, String> {
    let mut params = HashMap::new();
    if let Some(query) = uri.query() {
        for pair in query.split('&') {
            if let Some((key, value)) = pair.split_once('=') {
                params.insert(
                    key.to_string(),
                    urlencoding::decode(value).unwrap_or_default().to_string(),
                );
            }
        }
    }
    params
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_path() {
        assert_eq!(decode_path("/images/cat.jpg"), "/images/cat.jpg");
        assert_eq!(decode_path("/images/black%20cat.jpg"), "/images/black cat.jpg");
        assert_eq!(decode_path("/images/%zz.jpg"), "/images/%zz.jpg");
    }

    #[test]
    fn test_extract_query_params() {
        let uri: Uri = "/images/cat.jpg?w=100&h=50&mark=a%20b".parse().unwrap();
        let params = extract_query_params(&uri);
        assert_eq!(params.get("w"), Some(&"100".to_string()));
        assert_eq!(params.get("h"), Some(&"50".to_string()));
        assert_eq!(params.get("mark"), Some(&"a b".to_string()));
    }

    #[test]
    fn test_extract_query_params_empty() {
        let uri: Uri = "/images/cat.jpg".parse().unwrap();
        assert!(extract_query_params(&uri).is_empty());
    }

    #[test]
    fn test_extract_query_params_skips_bare_keys() {
        let uri: Uri = "/images/cat.jpg?flag&w=100".parse().unwrap();
        let params = extract_query_params(&uri);
        assert_eq!(params.len(), 1);
        assert_eq!(params.get("w"), Some(&"100".to_string()));
    }

    #[test]
    fn test_source_path_strips_prefix() {
        let config = {
            let mut c = GatewayConfig::new("/srv/uploads");
            c.cache = "/srv/cache".to_string();
            c
        };
        let storage: Arc<dyn Storage> = Arc::new(crate::storage::DiskStorage::new("/tmp"));
        let transform: Arc<dyn TransformService> = Arc::new(NoopTransform);
        let gateway =
            ImageGateway::new(config, storage.clone(), storage, transform).unwrap();

        assert_eq!(gateway.source_path("/images/cat.jpg"), "cat.jpg");
        assert_eq!(gateway.source_path("/images/sub/cat.jpg"), "sub/cat.jpg");
        assert_eq!(gateway.source_path("/elsewhere/cat.jpg"), "elsewhere/cat.jpg");
    }

    #[test]
    fn test_new_rejects_invalid_config() {
        let storage: Arc<dyn Storage> = Arc::new(crate::storage::DiskStorage::new("/tmp"));
        let transform: Arc<dyn TransformService> = Arc::new(NoopTransform);
        let err = ImageGateway::new(
            GatewayConfig::new(""),
            storage.clone(),
            storage,
            transform,
        )
        .unwrap_err();
        assert!(matches!(err, GatewayError::Config { .. }));
    }

    struct NoopTransform;

    #[async_trait]
    impl TransformService for NoopTransform {
        async fn render(
            &self,
            path: &str,
            _params: &HashMap<String, String>,
        ) -> Result<String, GatewayError> {
            Ok(path.to_string())
        }
    }
}
