// Copyright (c) 2026 Notice Reply Maintainers
// SPDX-License-Identifier: AGPL-3.0
//! # Domain Repository Interfaces
//!
//! Persistence contracts for the two aggregates, one repository per
//! aggregate root, interfaces in the domain layer, implementations in
//! `crate::infrastructure::repositories`.
//!
//! | Trait | Aggregate | Implementations |
//! |-------|-----------|----------------|
//! | `ActivityRepository` | `Activity` | `InMemoryActivityRepository`, `PostgresActivityRepository` |
//! | `CurrentDataRepository` | `CurrentData` | `InMemoryCurrentDataRepository`, `PostgresCurrentDataRepository` |
//!
//! The `append_*` operations locate the most recently created activity for
//! the user and update a single field. A user with zero activities yields
//! `RepositoryError::NoActivity` — the original system issued a blind update
//! against an empty identifier in that case; here the condition is typed so
//! callers can at least log it before surfacing the generic failure.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::activity::{Activity, CurrentData, UserId};

/// Whether an upsert created a new row or overwrote an existing one.
/// The HTTP layer maps this to 201 vs 200.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    Created,
    Updated,
}

/// Repository interface for `Activity` aggregates.
#[async_trait]
pub trait ActivityRepository: Send + Sync {
    /// Insert a new activity row recording an upload.
    async fn record_upload(&self, activity: &Activity) -> Result<(), RepositoryError>;

    /// Most recently created activity for the user, if any.
    /// Ordering is `created_at DESC, id DESC` so ties are deterministic.
    async fn find_latest_for_user(&self, user: &UserId) -> Result<Option<Activity>, RepositoryError>;

    /// Set the reasons field on the user's latest activity.
    async fn append_reasons(&self, user: &UserId, reasons: &str) -> Result<(), RepositoryError>;

    /// Set the questions and answers fields on the user's latest activity.
    async fn append_qnas(
        &self,
        user: &UserId,
        questions: &str,
        answers: &str,
    ) -> Result<(), RepositoryError>;

    /// Set the notice-response field on the user's latest activity.
    async fn append_notice(&self, user: &UserId, notice: &str) -> Result<(), RepositoryError>;
}

/// Repository interface for the `CurrentData` single-slot snapshot.
#[async_trait]
pub trait CurrentDataRepository: Send + Sync {
    /// Overwrite the current notice text, creating the snapshot with blank
    /// placeholder fields if it does not exist yet.
    async fn upsert_notice(&self, user: &UserId, notice: &str)
        -> Result<UpsertOutcome, RepositoryError>;

    /// Overwrite the current extracted reasons and questions (written at
    /// upload time from the classifier outcome).
    async fn upsert_extraction(
        &self,
        user: &UserId,
        reasons: &str,
        questions: &str,
    ) -> Result<UpsertOutcome, RepositoryError>;

    /// Fetch the snapshot for a user, if present.
    async fn find_for_user(&self, user: &UserId) -> Result<Option<CurrentData>, RepositoryError>;
}

/// Repository errors
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("No activity recorded for user {0}")]
    NoActivity(String),
}
