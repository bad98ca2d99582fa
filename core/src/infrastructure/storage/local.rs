// Copyright (c) 2026 Notice Reply Maintainers
// SPDX-License-Identifier: AGPL-3.0
//! Local Filesystem Storage Provider
//!
//! Filesystem-backed `ObjectStore` for single-node development and testing.
//! Objects live under `base_path`; public URLs use the configured local
//! prefix and signed reads carry the same capability query parameters as
//! the HTTP gateway, so the rest of the system behaves identically.
//!
//! Not suitable for production: no replication, files are only reachable on
//! the local machine.

use async_trait::async_trait;
use bytes::Bytes;
use std::path::{Component, Path, PathBuf};
use std::time::Duration;

use super::UrlSigner;
use crate::domain::storage::{ObjectStore, SignedUrl, StorageError};

pub struct LocalObjectStore {
    base_path: PathBuf,
    signer: UrlSigner,
}

impl LocalObjectStore {
    pub fn new(base_path: impl Into<PathBuf>, signer: UrlSigner) -> Result<Self, StorageError> {
        let base_path = base_path.into();

        std::fs::create_dir_all(&base_path).map_err(|e| {
            StorageError::IoError(format!(
                "Failed to create base directory {}: {}",
                base_path.display(),
                e
            ))
        })?;

        Ok(Self { base_path, signer })
    }

    fn resolve(&self, path: &str) -> Result<PathBuf, StorageError> {
        let relative = Path::new(path);
        // Object paths are already `{user}/{file}`; anything that walks out
        // of the base directory is invalid regardless.
        let safe = relative
            .components()
            .all(|c| matches!(c, Component::Normal(_)));
        if !safe {
            return Err(StorageError::InvalidPath(path.to_string()));
        }
        Ok(self.base_path.join(relative))
    }
}

#[async_trait]
impl ObjectStore for LocalObjectStore {
    async fn upload(
        &self,
        path: &str,
        bytes: Bytes,
        _content_type: &str,
    ) -> Result<String, StorageError> {
        let full = self.resolve(path)?;
        if let Some(parent) = full.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&full, &bytes).await?;
        Ok(self.signer.public_url(path))
    }

    async fn signed_read_url(
        &self,
        public_url: &str,
        ttl: Duration,
    ) -> Result<SignedUrl, StorageError> {
        let path = self.signer.object_path(public_url)?;
        let full = self.resolve(path)?;
        if !full.is_file() {
            return Err(StorageError::NotFound(path.to_string()));
        }
        self.signer.sign(public_url, ttl)
    }

    async fn health_check(&self) -> Result<(), StorageError> {
        let probe = self.base_path.join(".notice-store-probe");
        tokio::fs::write(&probe, b"ok").await?;
        tokio::fs::remove_file(&probe).await?;
        Ok(())
    }
}
