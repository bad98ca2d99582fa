// Copyright (c) 2026 Notice Reply Maintainers
// SPDX-License-Identifier: AGPL-3.0
//! Upload handoff: object-store write plus provenance record.
//!
//! Implements the server side of `POST /api/uploadNoticePDF`: stream the
//! received file into the object store under `{user_id}/{file_name}` and
//! insert one activity row carrying the resulting public URL. The two writes
//! are sequential and non-atomic; a storage failure leaves no activity row,
//! a repository failure leaves an orphaned object.

use async_trait::async_trait;
use bytes::Bytes;
use std::sync::Arc;
use tracing::info;

use crate::application::ServiceError;
use crate::domain::activity::{Activity, UserId};
use crate::domain::repository::ActivityRepository;
use crate::domain::storage::{destination_path, ObjectStore};

#[async_trait]
pub trait UploadService: Send + Sync {
    /// Store the uploaded notice and record its provenance.
    /// Returns the public URL of the stored object.
    async fn store_notice(
        &self,
        user: &UserId,
        file_name: &str,
        content_type: &str,
        bytes: Bytes,
    ) -> Result<String, ServiceError>;
}

pub struct StandardUploadService {
    store: Arc<dyn ObjectStore>,
    activities: Arc<dyn ActivityRepository>,
}

impl StandardUploadService {
    pub fn new(store: Arc<dyn ObjectStore>, activities: Arc<dyn ActivityRepository>) -> Self {
        Self { store, activities }
    }
}

#[async_trait]
impl UploadService for StandardUploadService {
    async fn store_notice(
        &self,
        user: &UserId,
        file_name: &str,
        content_type: &str,
        bytes: Bytes,
    ) -> Result<String, ServiceError> {
        let path = destination_path(user, file_name)?;
        let size = bytes.len();
        let url = self.store.upload(&path, bytes, content_type).await?;

        let activity = Activity::new(user.clone(), url.clone(), file_name);
        self.activities.record_upload(&activity).await?;

        info!(
            user = %user,
            activity = %activity.id,
            size_bytes = size,
            "Notice stored at {}",
            url
        );
        Ok(url)
    }
}
