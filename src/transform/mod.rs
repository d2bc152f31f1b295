//! Transform backend abstraction
//!
//! The gateway does not decode or resize images itself. Rendering is
//! delegated to an injected `TransformService`: given the decoded request
//! path and the transform parameters, the backend produces the derivative
//! in the cache store and returns the cache path it was written under.
//! The response factory then reads that entry back out.
//!
//! Backends receive the gateway's `transform_options` mapping at
//! construction; the gateway itself never interprets those options.

use async_trait::async_trait;
use std::collections::HashMap;

use crate::error::GatewayError;

/// External image-processing engine consumed by the gateway
#[async_trait]
pub trait TransformService: Send + Sync {
    /// Render a derivative for the given request path and parameters
    ///
    /// Returns the cache-store path of the rendered derivative. Fails with
    /// `SourceNotFound` when the original image does not exist and
    /// `TransformFailed` for any processing failure. The backend owns
    /// derivative reuse and eviction; the gateway never inspects the cache
    /// tree directly.
    async fn render(
        &self,
        path: &str,
        params: &HashMap<String, String>,
    ) -> Result<String, GatewayError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    struct EchoTransform;

    #[async_trait]
    impl TransformService for EchoTransform {
        async fn render(
            &self,
            path: &str,
            params: &HashMap<String, String>,
        ) -> Result<String, GatewayError> {
            let mut keys: Vec<&str> = params.keys().map(String::as_str).collect();
            keys.sort_unstable();
            Ok(format!("{}#{}", path.trim_start_matches('/'), keys.join(",")))
        }
    }

    #[test]
    fn test_trait_is_object_safe() {
        fn _assert(_svc: &dyn TransformService) {}
        _assert(&EchoTransform);
    }

    #[tokio::test]
    async fn test_render_returns_cache_path() {
        let svc = EchoTransform;
        let mut params = HashMap::new();
        params.insert("w".to_string(), "100".to_string());
        params.insert("h".to_string(), "50".to_string());
        let cache_path = svc.render("/images/cat.jpg", &params).await.unwrap();
        assert_eq!(cache_path, "images/cat.jpg#h,w");
    }
}
