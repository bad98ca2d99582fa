// Copyright (c) 2026 Notice Reply Maintainers
// SPDX-License-Identifier: AGPL-3.0
//! Notice progression: field updates against the user's latest activity and
//! the current-data snapshot.
//!
//! `save_notice` performs two independent writes (activity update, then
//! snapshot upsert). They are not wrapped in a transaction; the first
//! failure aborts the step and the user repeats the action.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::{info, warn};

use crate::application::ServiceError;
use crate::domain::activity::UserId;
use crate::domain::repository::{
    ActivityRepository, CurrentDataRepository, RepositoryError, UpsertOutcome,
};

#[async_trait]
pub trait NoticeService: Send + Sync {
    /// Persist the combined reason string on the latest activity.
    async fn save_reasons(&self, user: &UserId, reasons: &str) -> Result<(), ServiceError>;

    /// Persist selected questions and answers on the latest activity.
    async fn save_qnas(
        &self,
        user: &UserId,
        questions: &str,
        answers: &str,
    ) -> Result<(), ServiceError>;

    /// Persist the generated notice text: latest activity update plus
    /// snapshot overwrite. Returns whether the snapshot was created.
    async fn save_notice(&self, user: &UserId, notice: &str)
        -> Result<UpsertOutcome, ServiceError>;

    /// Current extracted-reasons string from the snapshot (`.,`-separated),
    /// empty when no snapshot exists.
    async fn current_reasons(&self, user: &UserId) -> Result<String, ServiceError>;
}

pub struct StandardNoticeService {
    activities: Arc<dyn ActivityRepository>,
    snapshots: Arc<dyn CurrentDataRepository>,
}

impl StandardNoticeService {
    pub fn new(
        activities: Arc<dyn ActivityRepository>,
        snapshots: Arc<dyn CurrentDataRepository>,
    ) -> Self {
        Self { activities, snapshots }
    }

    fn log_no_activity(&self, user: &UserId, step: &str, err: &RepositoryError) {
        if matches!(err, RepositoryError::NoActivity(_)) {
            warn!(user = %user, step, "Update against a user with no recorded activity");
        }
    }
}

#[async_trait]
impl NoticeService for StandardNoticeService {
    async fn save_reasons(&self, user: &UserId, reasons: &str) -> Result<(), ServiceError> {
        self.activities.append_reasons(user, reasons).await.map_err(|e| {
            self.log_no_activity(user, "save_reasons", &e);
            ServiceError::from(e)
        })?;
        info!(user = %user, "Reasons updated");
        Ok(())
    }

    async fn save_qnas(
        &self,
        user: &UserId,
        questions: &str,
        answers: &str,
    ) -> Result<(), ServiceError> {
        self.activities.append_qnas(user, questions, answers).await.map_err(|e| {
            self.log_no_activity(user, "save_qnas", &e);
            ServiceError::from(e)
        })?;
        info!(user = %user, "Questions and answers updated");
        Ok(())
    }

    async fn save_notice(
        &self,
        user: &UserId,
        notice: &str,
    ) -> Result<UpsertOutcome, ServiceError> {
        self.activities.append_notice(user, notice).await.map_err(|e| {
            self.log_no_activity(user, "save_notice", &e);
            ServiceError::from(e)
        })?;
        let outcome = self.snapshots.upsert_notice(user, notice).await?;
        info!(user = %user, ?outcome, "Notice saved");
        Ok(outcome)
    }

    async fn current_reasons(&self, user: &UserId) -> Result<String, ServiceError> {
        let snapshot = self.snapshots.find_for_user(user).await?;
        Ok(snapshot.map(|s| s.current_reason).unwrap_or_default())
    }
}
