//! Cache-entry to HTTP response conversion
//!
//! Packages a stored derivative (content, MIME type, size) into an
//! `http::Response` with `Content-Type` and `Content-Length` set. The body
//! is read eagerly; storage failures propagate to the orchestrator's
//! exception handling, never retried here.

use bytes::Bytes;
use http::header::{HeaderValue, CONTENT_LENGTH, CONTENT_TYPE};
use http::Response;

use crate::error::GatewayError;
use crate::storage::Storage;

/// Builds success responses from cache-store entries
pub struct ResponseFactory;

impl ResponseFactory {
    /// Read the entry at `path` and package it as a 200 response
    pub async fn create(
        store: &dyn Storage,
        path: &str,
    ) -> Result<Response<Bytes>, GatewayError> {
        let content_type = store.mime_type(path).await?;
        let content_length = store.size(path).await?;
        let body = store.read(path).await?;

        let mut response = Response::new(body);
        if let Ok(value) = HeaderValue::from_str(&content_type) {
            response.headers_mut().insert(CONTENT_TYPE, value);
        }
        response
            .headers_mut()
            .insert(CONTENT_LENGTH, HeaderValue::from(content_length));
        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::DiskStorage;
    use http::StatusCode;

    #[tokio::test]
    async fn test_create_packages_entry() {
        let dir = tempfile::tempdir().unwrap();
        let store = DiskStorage::new(dir.path());
        store
            .write("derived/cat.jpg", Bytes::from_static(b"jpeg bytes"))
            .await
            .unwrap();

        let response = ResponseFactory::create(&store, "derived/cat.jpg")
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(CONTENT_TYPE).unwrap(),
            "image/jpeg"
        );
        assert_eq!(response.headers().get(CONTENT_LENGTH).unwrap(), "10");
        assert_eq!(response.body(), &Bytes::from_static(b"jpeg bytes"));
    }

    #[tokio::test]
    async fn test_create_propagates_missing_entry() {
        let dir = tempfile::tempdir().unwrap();
        let store = DiskStorage::new(dir.path());

        let err = ResponseFactory::create(&store, "derived/missing.jpg")
            .await
            .unwrap_err();
        assert!(matches!(err, GatewayError::SourceNotFound { .. }));
    }
}
