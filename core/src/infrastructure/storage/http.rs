// Copyright (c) 2026 Notice Reply Maintainers
// SPDX-License-Identifier: AGPL-3.0
//! HTTP Bucket Gateway Storage Provider
//!
//! Talks to a filer-style HTTP storage gateway: objects are uploaded with a
//! plain `PUT {base_url}/{bucket}/{path}` and served publicly under the
//! configured public-URL prefix. Signed reads are issued locally by
//! [`UrlSigner`]; the gateway front verifies the capability query
//! parameters.

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::{Client, StatusCode};
use std::time::Duration;

use super::UrlSigner;
use crate::domain::storage::{ObjectStore, SignedUrl, StorageError};

pub struct HttpBucketStore {
    client: Client,
    base_url: String,
    bucket: String,
    signer: UrlSigner,
}

impl HttpBucketStore {
    pub fn new(base_url: impl Into<String>, bucket: impl Into<String>, signer: UrlSigner) -> Self {
        Self::with_timeout(base_url, bucket, signer, Duration::from_secs(30))
    }

    pub fn with_timeout(
        base_url: impl Into<String>,
        bucket: impl Into<String>,
        signer: UrlSigner,
        timeout: Duration,
    ) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            base_url: base_url.into(),
            bucket: bucket.into(),
            signer,
        }
    }

    fn object_url(&self, path: &str) -> String {
        format!(
            "{}/{}/{}",
            self.base_url.trim_end_matches('/'),
            self.bucket,
            path
        )
    }
}

#[async_trait]
impl ObjectStore for HttpBucketStore {
    async fn upload(
        &self,
        path: &str,
        bytes: Bytes,
        content_type: &str,
    ) -> Result<String, StorageError> {
        let url = self.object_url(path);

        let response = self
            .client
            .put(&url)
            .header("Content-Type", content_type)
            .body(bytes)
            .send()
            .await?;

        match response.status() {
            StatusCode::OK | StatusCode::CREATED | StatusCode::NO_CONTENT => {
                Ok(self.signer.public_url(path))
            }
            status => {
                let error_msg = response
                    .text()
                    .await
                    .unwrap_or_else(|_| format!("HTTP {}", status));
                Err(StorageError::Unknown(format!(
                    "Failed to upload {}: {}",
                    path, error_msg
                )))
            }
        }
    }

    async fn signed_read_url(
        &self,
        public_url: &str,
        ttl: Duration,
    ) -> Result<SignedUrl, StorageError> {
        self.signer.sign(public_url, ttl)
    }

    async fn health_check(&self) -> Result<(), StorageError> {
        let url = format!("{}/", self.base_url.trim_end_matches('/'));

        let response = self
            .client
            .get(&url)
            .timeout(Duration::from_secs(5))
            .send()
            .await?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(StorageError::Unavailable(format!(
                "Gateway returned status {}",
                response.status()
            )))
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
    fn test_object_url_building() {
        let store = HttpBucketStore::new("http://localhost:8333/", "notice-reply", signer());
        assert_eq!(
            store.object_url("u-1/n.pdf"),
            "http://localhost:8333/notice-reply/u-1/n.pdf"
        );
    }

    #[tokio::test]
    async fn test_upload_returns_public_url() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("PUT", "/notice-reply/u-1/n.pdf")
            .match_header("content-type", "application/pdf")
            .with_status(201)
            .create_async()
            .await;

        let store = HttpBucketStore::new(server.url(), "notice-reply", signer());
        let url = store
            .upload("u-1/n.pdf", Bytes::from_static(b"%PDF"), "application/pdf")
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(url, "https://storage.example.com/notice-reply/u-1/n.pdf");
    }

    #[tokio::test]
    async fn test_upload_failure_surfaces() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("PUT", "/notice-reply/u-1/n.pdf")
            .with_status(507)
            .with_body("out of space")
            .create_async()
            .await;

        let store = HttpBucketStore::new(server.url(), "notice-reply", signer());
        let result = store
            .upload("u-1/n.pdf", Bytes::from_static(b"%PDF"), "application/pdf")
            .await;
        assert!(matches!(result, Err(StorageError::Unknown(_))));
    }

    #[tokio::test]
    async fn test_health_check() {
        let mut server = mockito::Server::new_async().await;
        server.mock("GET", "/").with_status(200).create_async().await;

        let store = HttpBucketStore::new(server.url(), "notice-reply", signer());
        store.health_check().await.unwrap();
    }
}
