//! Exception handling strategy
//!
//! Any failure during verification or rendering is handed to the configured
//! handler, which owns the user-visible response entirely; the orchestrator
//! never writes a fallback body or status itself. The handler is a plain
//! function value injected at construction, so callers wanting a stricter
//! policy (e.g. translate to their framework's error page, or log and
//! convert everything to 500) install their own.

use bytes::Bytes;
use http::header::{HeaderValue, CONTENT_TYPE};
use http::{Request, Response, StatusCode};
use std::sync::Arc;

use crate::error::GatewayError;

/// Strategy producing the final response for a failed request
pub type ExceptionHandler =
    Arc<dyn Fn(&GatewayError, &Request<Bytes>) -> Response<Bytes> + Send + Sync>;

/// The default policy: signature failures get a generic 403, everything
/// else a 404 naming the requested path
pub fn default_handler() -> ExceptionHandler {
    Arc::new(|error, request| {
        let (status, body) = if error.is_signature_error() {
            (
                StatusCode::FORBIDDEN,
                "Invalid image signature".to_string(),
            )
        } else {
            (
                StatusCode::NOT_FOUND,
                format!(
                    "Image resource \"{}\" was not found",
                    request.uri().path()
                ),
            )
        };
        text_response(status, body)
    })
}

fn text_response(status: StatusCode, body: String) -> Response<Bytes> {
    let mut response = Response::new(Bytes::from(body));
    *response.status_mut() = status;
    response.headers_mut().insert(
        CONTENT_TYPE,
        HeaderValue::from_static("text/plain; charset=utf-8"),
    );
    response
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(path: &str) -> Request<Bytes> {
        let mut request = Request::new(Bytes::new());
        *request.uri_mut() = path.parse().unwrap();
        request
    }

    #[test]
    fn test_signature_missing_maps_to_403() {
        let handler = default_handler();
        let response = handler(&GatewayError::SignatureMissing, &request("/images/cat.jpg"));
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        assert_eq!(response.body(), &Bytes::from_static(b"Invalid image signature"));
    }

    #[test]
    fn test_signature_invalid_maps_to_403() {
        let handler = default_handler();
        let response = handler(&GatewayError::SignatureInvalid, &request("/images/cat.jpg"));
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn test_other_errors_map_to_404_naming_the_path() {
        let handler = default_handler();
        let response = handler(
            &GatewayError::source_not_found("images/cat.jpg"),
            &request("/images/cat.jpg"),
        );
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body = String::from_utf8(response.body().to_vec()).unwrap();
        assert!(body.contains("/images/cat.jpg"));
    }

    #[test]
    fn test_transform_failure_maps_to_404() {
        let handler = default_handler();
        let response = handler(
            &GatewayError::transform_failed("boom"),
            &request("/images/cat.jpg"),
        );
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_responses_are_plain_text() {
        let handler = default_handler();
        let response = handler(&GatewayError::SignatureMissing, &request("/images/cat.jpg"));
        assert_eq!(
            response.headers().get(CONTENT_TYPE).unwrap(),
            "text/plain; charset=utf-8"
        );
    }
}
