//! Byte-store abstraction
//!
//! This module defines the `Storage` trait the gateway consumes for both
//! the source tree (original images) and the cache tree (rendered
//! derivatives). The trait treats a store as an opaque key-addressable
//! collection of byte entries; `DiskStorage` is the local-filesystem
//! implementation.

use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;

mod disk;

pub use disk::DiskStorage;

/// Storage error types
#[derive(Debug, Error)]
pub enum StorageError {
    /// Entry does not exist
    #[error("entry not found: {path}")]
    NotFound { path: String },
    /// Underlying I/O failure
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// Path rejected before touching the filesystem
    #[error("invalid storage path: {path}")]
    InvalidPath { path: String },
}

/// Key-addressable byte store (source images, rendered derivatives)
#[async_trait]
pub trait Storage: Send + Sync {
    /// Whether an entry exists at the given path
    async fn exists(&self, path: &str) -> Result<bool, StorageError>;

    /// Read the full contents of an entry
    async fn read(&self, path: &str) -> Result<Bytes, StorageError>;

    /// Write an entry, replacing any existing contents
    async fn write(&self, path: &str, data: Bytes) -> Result<(), StorageError>;

    /// Last-modified time of an entry as whole seconds since the Unix epoch
    ///
    /// Sub-second precision is truncated so freshness comparisons against
    /// HTTP dates (which carry second granularity) are exact.
    async fn last_modified(&self, path: &str) -> Result<i64, StorageError>;

    /// MIME type of an entry
    async fn mime_type(&self, path: &str) -> Result<String, StorageError>;

    /// Size of an entry in bytes
    async fn size(&self, path: &str) -> Result<u64, StorageError>;
}
