// Copyright (c) 2026 Notice Reply Maintainers
// SPDX-License-Identifier: AGPL-3.0
//! # PostgreSQL CurrentData Repository
//!
//! Production `CurrentDataRepository` backed by the `user_current_data`
//! table, one row per user keyed by the derived `CD<user_id>` identifier.
//!
//! Expected schema:
//!
//! ```sql
//! CREATE TABLE user_current_data (
//!     data_id          TEXT PRIMARY KEY,
//!     user_id          TEXT NOT NULL,
//!     current_notice   TEXT NOT NULL DEFAULT '',
//!     current_question TEXT NOT NULL DEFAULT '',
//!     current_answer   TEXT NOT NULL DEFAULT '',
//!     current_reason   TEXT NOT NULL DEFAULT ''
//! );
//! ```
//!
//! Upserts use `ON CONFLICT ... DO UPDATE` with `(xmax = 0)` to report
//! whether the row was inserted or overwritten.

use async_trait::async_trait;
use sqlx::postgres::PgPool;
use sqlx::Row;

use crate::domain::activity::{CurrentData, UserId};
use crate::domain::repository::{CurrentDataRepository, RepositoryError, UpsertOutcome};

pub struct PostgresCurrentDataRepository {
    pool: PgPool,
}

impl PostgresCurrentDataRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CurrentDataRepository for PostgresCurrentDataRepository {
    async fn upsert_notice(
        &self,
        user: &UserId,
        notice: &str,
    ) -> Result<UpsertOutcome, RepositoryError> {
        let row = sqlx::query(
            r#"
            INSERT INTO user_current_data (data_id, user_id, current_notice)
            VALUES ($1, $2, $3)
            ON CONFLICT (data_id) DO UPDATE SET current_notice = EXCLUDED.current_notice
            RETURNING (xmax = 0) AS inserted
            "#,
        )
        .bind(CurrentData::data_id_for(user))
        .bind(user.as_str())
        .bind(notice)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| RepositoryError::Database(format!("Failed to upsert notice: {}", e)))?;

        if row.get::<bool, _>("inserted") {
            Ok(UpsertOutcome::Created)
        } else {
            Ok(UpsertOutcome::Updated)
        }
    }

    async fn upsert_extraction(
        &self,
        user: &UserId,
        reasons: &str,
        questions: &str,
    ) -> Result<UpsertOutcome, RepositoryError> {
        let row = sqlx::query(
            r#"
            INSERT INTO user_current_data (data_id, user_id, current_reason, current_question)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (data_id) DO UPDATE SET
                current_reason = EXCLUDED.current_reason,
                current_question = EXCLUDED.current_question
            RETURNING (xmax = 0) AS inserted
            "#,
        )
        .bind(CurrentData::data_id_for(user))
        .bind(user.as_str())
        .bind(reasons)
        .bind(questions)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| RepositoryError::Database(format!("Failed to upsert extraction: {}", e)))?;

        if row.get::<bool, _>("inserted") {
            Ok(UpsertOutcome::Created)
        } else {
            Ok(UpsertOutcome::Updated)
        }
    }

    async fn find_for_user(&self, user: &UserId) -> Result<Option<CurrentData>, RepositoryError> {
        let row = sqlx::query(
            r#"
            SELECT data_id, user_id, current_notice, current_question,
                   current_answer, current_reason
            FROM user_current_data
            WHERE data_id = $1
            "#,
        )
        .bind(CurrentData::data_id_for(user))
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| RepositoryError::Database(e.to_string()))?;

        Ok(row.map(|r| CurrentData {
            data_id: r.get("data_id"),
            user_id: UserId::new(r.get::<String, _>("user_id")),
            current_notice: r.get("current_notice"),
            current_question: r.get("current_question"),
            current_answer: r.get("current_answer"),
            current_reason: r.get("current_reason"),
        }))
    }
}
