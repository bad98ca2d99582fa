// Copyright (c) 2026 Notice Reply Maintainers
// SPDX-License-Identifier: AGPL-3.0
//! # Object Store Trait - Anti-Corruption Layer for the Storage Gateway
//!
//! Abstraction over the object-storage backend holding uploaded notices.
//! Isolates the domain from the concrete backend (HTTP bucket gateway in
//! production, local filesystem in development, in-memory mock in tests).
//!
//! Uploads land under a path namespaced by user id and original file name;
//! reads go through time-limited signed URLs derived from the stored public
//! URL by stripping the configured public-URL prefix.

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

use crate::domain::activity::UserId;

/// Default lifetime of a signed read URL.
pub const DEFAULT_SIGNED_URL_TTL: Duration = Duration::from_secs(3600);

/// A time-limited, capability-bearing read URL.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignedUrl {
    pub url: String,
    pub expires_at: DateTime<Utc>,
}

/// Object storage gateway.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Store `bytes` at `path` (relative to the bucket root) and return the
    /// public URL of the stored object.
    async fn upload(
        &self,
        path: &str,
        bytes: Bytes,
        content_type: &str,
    ) -> Result<String, StorageError>;

    /// Issue a signed read URL for a previously stored object.
    ///
    /// `public_url` must be under the store's public-URL prefix; anything
    /// else fails with [`StorageError::InvalidPath`] instead of silently
    /// deriving a wrong object path.
    async fn signed_read_url(
        &self,
        public_url: &str,
        ttl: Duration,
    ) -> Result<SignedUrl, StorageError>;

    /// Check health of the storage backend.
    async fn health_check(&self) -> Result<(), StorageError>;
}

/// Destination path for an uploaded notice: `{user_id}/{file_name}`.
///
/// File names containing path separators or `..` components are rejected so
/// one user cannot write into another user's namespace.
pub fn destination_path(user: &UserId, file_name: &str) -> Result<String, StorageError> {
    if file_name.is_empty()
        || file_name.contains('/')
        || file_name.contains('\\')
        || file_name.contains("..")
    {
        return Err(StorageError::InvalidPath(file_name.to_string()));
    }
    Ok(format!("{}/{}", user.as_str(), file_name))
}

/// Storage errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Object not found: {0}")]
    NotFound(String),

    #[error("Invalid path: {0}")]
    InvalidPath(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Timeout while communicating with storage backend")]
    Timeout,

    #[error("Backend unavailable: {0}")]
    Unavailable(String),

    #[error("IO error: {0}")]
    IoError(String),

    #[error("Unknown storage error: {0}")]
    Unknown(String),
}

impl From<reqwest::Error> for StorageError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            StorageError::Timeout
        } else if err.is_connect() {
            StorageError::Network(err.to_string())
        } else {
            StorageError::Unknown(err.to_string())
        }
    }
}

impl From<std::io::Error> for StorageError {
    fn from(err: std::io::Error) -> Self {
        StorageError::IoError(err.to_string())
    }
}
