// Copyright (c) 2026 Notice Reply Maintainers
// SPDX-License-Identifier: AGPL-3.0
//! # Storage Infrastructure Module
//!
//! Concrete `ObjectStore` implementations plus the shared signed-URL
//! machinery. Signed reads are capability URLs: the object path and an
//! expiry timestamp are bound together with a keyed BLAKE3 MAC appended as
//! query parameters, verified by whatever front serves the bucket.

pub mod http;
pub mod local;

pub use http::HttpBucketStore;
pub use local::LocalObjectStore;

use bytes::Bytes;
use chrono::{DateTime, TimeZone, Utc};
use std::sync::Arc;
use std::time::Duration;

use crate::domain::config::StorageConfig;
use crate::domain::storage::{ObjectStore, SignedUrl, StorageError};

/// Factory selecting the object store from configuration.
pub fn create_object_store(config: &StorageConfig) -> Result<Arc<dyn ObjectStore>, StorageError> {
    match config {
        StorageConfig::Http { base_url, bucket, public_url_prefix, signing_key } => {
            Ok(Arc::new(HttpBucketStore::new(
                base_url.clone(),
                bucket.clone(),
                UrlSigner::new(signing_key, public_url_prefix.clone()),
            )))
        }
        StorageConfig::Local { base_path, public_url_prefix, signing_key } => {
            Ok(Arc::new(LocalObjectStore::new(
                base_path,
                UrlSigner::new(signing_key, public_url_prefix.clone()),
            )?))
        }
    }
}

/// Issues and verifies time-boxed signed read URLs.
///
/// The MAC covers `"{path}:{expires_unix}"` under a key derived from the
/// configured key material, so a token for one object cannot be replayed
/// against another or past its expiry.
#[derive(Clone)]
pub struct UrlSigner {
    key: [u8; 32],
    public_url_prefix: String,
}

impl UrlSigner {
    const KEY_CONTEXT: &'static str = "notice-reply 2026 signed read url v1";

    pub fn new(key_material: &str, public_url_prefix: String) -> Self {
        Self {
            key: blake3::derive_key(Self::KEY_CONTEXT, key_material.as_bytes()),
            public_url_prefix,
        }
    }

    pub fn public_url_prefix(&self) -> &str {
        &self.public_url_prefix
    }

    /// Public URL of an object path under this store's prefix.
    pub fn public_url(&self, path: &str) -> String {
        format!("{}{}", self.public_url_prefix, path)
    }

    /// Derive the object path from a public URL. URLs outside the prefix are
    /// rejected instead of silently mis-derived.
    pub fn object_path<'a>(&self, public_url: &'a str) -> Result<&'a str, StorageError> {
        public_url
            .strip_prefix(&self.public_url_prefix)
            .filter(|path| !path.is_empty())
            .ok_or_else(|| StorageError::InvalidPath(public_url.to_string()))
    }

    /// Sign a read of `public_url` valid for `ttl` from `now`.
    pub fn sign_at(
        &self,
        public_url: &str,
        ttl: Duration,
        now: DateTime<Utc>,
    ) -> Result<SignedUrl, StorageError> {
        let path = self.object_path(public_url)?;
        let expires_at = now + chrono::Duration::from_std(ttl).unwrap_or(chrono::Duration::hours(1));
        let token = self.token(path, expires_at.timestamp());
        Ok(SignedUrl {
            url: format!(
                "{}{}?expires={}&sig={}",
                self.public_url_prefix,
                path,
                expires_at.timestamp(),
                token
            ),
            expires_at,
        })
    }

    pub fn sign(&self, public_url: &str, ttl: Duration) -> Result<SignedUrl, StorageError> {
        self.sign_at(public_url, ttl, Utc::now())
    }

    /// Verify a presented capability. Comparison goes through
    /// `blake3::Hash` equality, which is constant-time.
    pub fn verify(&self, path: &str, expires_unix: i64, sig: &str, now: DateTime<Utc>) -> bool {
        let Some(expires_at) = Utc.timestamp_opt(expires_unix, 0).single() else {
            return false;
        };
        if now > expires_at {
            return false;
        }
        let Ok(presented) = blake3::Hash::from_hex(sig) else {
            return false;
        };
        self.mac(path, expires_unix) == presented
    }

    fn token(&self, path: &str, expires_unix: i64) -> String {
        self.mac(path, expires_unix).to_hex().to_string()
    }

    fn mac(&self, path: &str, expires_unix: i64) -> blake3::Hash {
        blake3::keyed_hash(&self.key, format!("{}:{}", path, expires_unix).as_bytes())
    }
}

// In-memory mock for unit tests.
pub use mock::MockObjectStore;

mod mock {
    use super::*;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::Mutex;

    pub struct MockObjectStore {
        pub objects: Mutex<HashMap<String, (Vec<u8>, String)>>,
        signer: UrlSigner,
    }

    impl MockObjectStore {
        pub fn new() -> Self {
            Self {
                objects: Mutex::new(HashMap::new()),
                signer: UrlSigner::new("mock-key", "mock://notice-reply/".to_string()),
            }
        }
    }

    impl Default for MockObjectStore {
        fn default() -> Self {
            Self::new()
        }
    }

    #[async_trait]
    impl ObjectStore for MockObjectStore {
        async fn upload(
            &self,
            path: &str,
            bytes: Bytes,
            content_type: &str,
        ) -> Result<String, StorageError> {
            let mut objects = self.objects.lock().unwrap();
            objects.insert(path.to_string(), (bytes.to_vec(), content_type.to_string()));
            Ok(self.signer.public_url(path))
        }

        async fn signed_read_url(
            &self,
            public_url: &str,
            ttl: Duration,
        ) -> Result<SignedUrl, StorageError> {
            let path = self.signer.object_path(public_url)?;
            if !self.objects.lock().unwrap().contains_key(path) {
                return Err(StorageError::NotFound(path.to_string()));
            }
            self.signer.sign(public_url, ttl)
        }

        async fn health_check(&self) -> Result<(), StorageError> {
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signer() -> UrlSigner {
        UrlSigner::new("test-key", "https://storage.example.com/notice-reply/".to_string())
    }

    #[test]
    fn test_sign_preserves_file_name() {
        let signer = signer();
        let url = signer.public_url("u-1/notice.pdf");
        let signed = signer.sign(&url, Duration::from_secs(3600)).unwrap();
        assert!(signed.url.contains("u-1/notice.pdf"));
        assert!(signed.url.contains("sig="));
    }

    #[test]
    fn test_sign_rejects_foreign_prefix() {
        let signer = signer();
        let result = signer.sign("https://elsewhere.example.com/x.pdf", Duration::from_secs(60));
        assert!(matches!(result, Err(StorageError::InvalidPath(_))));
    }

    #[test]
    fn test_verify_round_trip() {
        let signer = signer();
        let now = Utc::now();
        let url = signer.public_url("u-1/notice.pdf");
        let signed = signer.sign_at(&url, Duration::from_secs(3600), now).unwrap();

        let sig = signed.url.split("sig=").nth(1).unwrap();
        assert!(signer.verify("u-1/notice.pdf", signed.expires_at.timestamp(), sig, now));
    }

    #[test]
    fn test_verify_rejects_expired_and_tampered() {
        let signer = signer();
        let now = Utc::now();
        let url = signer.public_url("u-1/notice.pdf");
        let signed = signer.sign_at(&url, Duration::from_secs(10), now).unwrap();
        let sig = signed.url.split("sig=").nth(1).unwrap();

        let later = now + chrono::Duration::seconds(11);
        assert!(!signer.verify("u-1/notice.pdf", signed.expires_at.timestamp(), sig, later));

        // Same token against another object path.
        assert!(!signer.verify("u-2/other.pdf", signed.expires_at.timestamp(), sig, now));

        assert!(!signer.verify("u-1/notice.pdf", signed.expires_at.timestamp(), "deadbeef", now));
    }

    #[tokio::test]
    async fn test_mock_store_round_trip() {
        let store = MockObjectStore::new();
        let url = store
            .upload("u-1/n.pdf", Bytes::from_static(b"%PDF"), "application/pdf")
            .await
            .unwrap();
        let signed = store.signed_read_url(&url, Duration::from_secs(60)).await.unwrap();
        assert!(signed.url.contains("u-1/n.pdf"));

        let missing = store
            .signed_read_url("mock://notice-reply/u-9/x.pdf", Duration::from_secs(60))
            .await;
        assert!(matches!(missing, Err(StorageError::NotFound(_))));
    }

    #[test]
    fn test_factory_local() {
        let dir = tempfile::TempDir::new().unwrap();
        let config = StorageConfig::Local {
            base_path: dir.path().to_string_lossy().to_string(),
            public_url_prefix: "local://notice-reply/".to_string(),
            signing_key: "k".to_string(),
        };
        let store = create_object_store(&config).unwrap();
        assert_eq!(Arc::strong_count(&store), 1);
    }
}
