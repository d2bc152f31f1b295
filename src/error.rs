//! Gateway error types
//!
//! Every request-time failure is represented here and routed through the
//! configured exception handler, which owns the user-visible response.
//! Configuration errors are raised at construction time and are fatal.

use std::fmt;

/// Errors that can occur while handling a gateway request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GatewayError {
    /// No `sign` parameter was supplied on a signed route
    SignatureMissing,
    /// The supplied `sign` parameter does not match the recomputed digest
    SignatureInvalid,
    /// The source image does not exist
    SourceNotFound { path: String },
    /// The transform backend failed to produce a derivative
    TransformFailed { message: String },
    /// A base URL + path combination could not be parsed as a URL
    InvalidPath { path: String },
    /// Invalid gateway configuration (fatal, raised at construction)
    Config { message: String },
}

impl fmt::Display for GatewayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GatewayError::SignatureMissing => {
                write!(f, "Signature is missing")
            }
            GatewayError::SignatureInvalid => {
                write!(f, "Signature is not valid")
            }
            GatewayError::SourceNotFound { path } => {
                write!(f, "Source image not found: {}", path)
            }
            GatewayError::TransformFailed { message } => {
                write!(f, "Transform failed: {}", message)
            }
            GatewayError::InvalidPath { path } => {
                write!(f, "Not a valid path: {}", path)
            }
            GatewayError::Config { message } => {
                write!(f, "Configuration error: {}", message)
            }
        }
    }
}

impl std::error::Error for GatewayError {}

impl GatewayError {
    /// Maps gateway errors to HTTP status codes
    ///
    /// Status mapping:
    /// - SignatureMissing, SignatureInvalid → 403 (Forbidden)
    /// - SourceNotFound → 404 (Not Found)
    /// - InvalidPath → 400 (Bad Request)
    /// - TransformFailed, Config → 500 (Internal Server Error)
    pub fn to_http_status(&self) -> u16 {
        match self {
            GatewayError::SignatureMissing | GatewayError::SignatureInvalid => 403,
            GatewayError::SourceNotFound { .. } => 404,
            GatewayError::InvalidPath { .. } => 400,
            GatewayError::TransformFailed { .. } | GatewayError::Config { .. } => 500,
        }
    }

    /// True for signature verification failures (missing or mismatched)
    pub fn is_signature_error(&self) -> bool {
        matches!(
            self,
            GatewayError::SignatureMissing | GatewayError::SignatureInvalid
        )
    }

    /// Helper constructors for common error patterns
    pub fn source_not_found(path: impl Into<String>) -> Self {
        GatewayError::SourceNotFound { path: path.into() }
    }

    pub fn transform_failed(message: impl Into<String>) -> Self {
        GatewayError::TransformFailed {
            message: message.into(),
        }
    }

    pub fn invalid_path(path: impl Into<String>) -> Self {
        GatewayError::InvalidPath { path: path.into() }
    }

    pub fn config(message: impl Into<String>) -> Self {
        GatewayError::Config {
            message: message.into(),
        }
    }
}

impl From<crate::storage::StorageError> for GatewayError {
    fn from(err: crate::storage::StorageError) -> Self {
        match err {
            crate::storage::StorageError::NotFound { path } => {
                GatewayError::SourceNotFound { path }
            }
            other => GatewayError::TransformFailed {
                message: other.to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::StorageError;

    #[test]
    fn test_signature_missing_display() {
        let err = GatewayError::SignatureMissing;
        assert_eq!(err.to_string(), "Signature is missing");
        assert_eq!(err.to_http_status(), 403);
        assert!(err.is_signature_error());
    }

    #[test]
    fn test_signature_invalid_display() {
        let err = GatewayError::SignatureInvalid;
        assert_eq!(err.to_string(), "Signature is not valid");
        assert_eq!(err.to_http_status(), 403);
        assert!(err.is_signature_error());
    }

    #[test]
    fn test_source_not_found_display() {
        let err = GatewayError::source_not_found("images/cat.jpg");
        assert_eq!(err.to_string(), "Source image not found: images/cat.jpg");
        assert_eq!(err.to_http_status(), 404);
        assert!(!err.is_signature_error());
    }

    #[test]
    fn test_transform_failed_display() {
        let err = GatewayError::transform_failed("decoder crashed");
        assert_eq!(err.to_string(), "Transform failed: decoder crashed");
        assert_eq!(err.to_http_status(), 500);
    }

    #[test]
    fn test_invalid_path_display() {
        let err = GatewayError::invalid_path("http://");
        assert_eq!(err.to_string(), "Not a valid path: http://");
        assert_eq!(err.to_http_status(), 400);
    }

    #[test]
    fn test_config_display() {
        let err = GatewayError::config("source is required");
        assert_eq!(err.to_string(), "Configuration error: source is required");
        assert_eq!(err.to_http_status(), 500);
    }

    #[test]
    fn test_from_storage_not_found() {
        let err: GatewayError = StorageError::NotFound {
            path: "a.jpg".to_string(),
        }
        .into();
        assert_eq!(err, GatewayError::source_not_found("a.jpg"));
    }

    #[test]
    fn test_from_storage_io_error() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err: GatewayError = StorageError::from(io).into();
        assert!(matches!(err, GatewayError::TransformFailed { .. }));
    }

    #[test]
    fn test_error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<GatewayError>();
    }
}
