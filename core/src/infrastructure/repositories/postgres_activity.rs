// Copyright (c) 2026 Notice Reply Maintainers
// SPDX-License-Identifier: AGPL-3.0
//! # PostgreSQL Activity Repository
//!
//! Production `ActivityRepository` backed by the `user_activity` table.
//!
//! Expected schema:
//!
//! ```sql
//! CREATE TABLE user_activity (
//!     id              UUID PRIMARY KEY,
//!     user_id         TEXT NOT NULL,
//!     pdf_url         TEXT NOT NULL,
//!     pdf_name        TEXT NOT NULL,
//!     reasons         TEXT,
//!     questions       TEXT,
//!     answers         TEXT,
//!     notice_response TEXT,
//!     created_at      TIMESTAMPTZ NOT NULL,
//!     updated_at      TIMESTAMPTZ NOT NULL
//! );
//! CREATE INDEX user_activity_latest ON user_activity (user_id, created_at DESC, id DESC);
//! ```
//!
//! The `append_*` updates target the most recently created row for the user
//! in a single statement; zero affected rows maps to
//! `RepositoryError::NoActivity`.

use async_trait::async_trait;
use sqlx::postgres::PgPool;
use sqlx::Row;

use crate::domain::activity::{Activity, ActivityId, UserId};
use crate::domain::repository::{ActivityRepository, RepositoryError};

pub struct PostgresActivityRepository {
    pool: PgPool,
}

impl PostgresActivityRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn update_latest(
        &self,
        user: &UserId,
        sql: &str,
        binds: &[&str],
    ) -> Result<(), RepositoryError> {
        let mut query = sqlx::query(sql).bind(user.as_str());
        for value in binds {
            query = query.bind(*value);
        }
        let result = query
            .execute(&self.pool)
            .await
            .map_err(|e| RepositoryError::Database(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NoActivity(user.to_string()));
        }
        Ok(())
    }

    fn from_row(row: &sqlx::postgres::PgRow) -> Activity {
        Activity {
            id: ActivityId(row.get("id")),
            user_id: UserId::new(row.get::<String, _>("user_id")),
            pdf_url: row.get("pdf_url"),
            pdf_name: row.get("pdf_name"),
            reasons: row.get("reasons"),
            questions: row.get("questions"),
            answers: row.get("answers"),
            notice_response: row.get("notice_response"),
            created_at: row.get("created_at"),
            updated_at: row.get("updated_at"),
        }
    }
}

#[async_trait]
impl ActivityRepository for PostgresActivityRepository {
    async fn record_upload(&self, activity: &Activity) -> Result<(), RepositoryError> {
        sqlx::query(
            r#"
            INSERT INTO user_activity (
                id, user_id, pdf_url, pdf_name,
                reasons, questions, answers, notice_response,
                created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(activity.id.0)
        .bind(activity.user_id.as_str())
        .bind(&activity.pdf_url)
        .bind(&activity.pdf_name)
        .bind(&activity.reasons)
        .bind(&activity.questions)
        .bind(&activity.answers)
        .bind(&activity.notice_response)
        .bind(activity.created_at)
        .bind(activity.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| RepositoryError::Database(format!("Failed to record upload: {}", e)))?;

        Ok(())
    }

    async fn find_latest_for_user(
        &self,
        user: &UserId,
    ) -> Result<Option<Activity>, RepositoryError> {
        let row = sqlx::query(
            r#"
            SELECT id, user_id, pdf_url, pdf_name,
                   reasons, questions, answers, notice_response,
                   created_at, updated_at
            FROM user_activity
            WHERE user_id = $1
            ORDER BY created_at DESC, id DESC
            LIMIT 1
            "#,
        )
        .bind(user.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| RepositoryError::Database(e.to_string()))?;

        Ok(row.map(|r| Self::from_row(&r)))
    }

    async fn append_reasons(&self, user: &UserId, reasons: &str) -> Result<(), RepositoryError> {
        self.update_latest(
            user,
            r#"
            UPDATE user_activity SET reasons = $2, updated_at = now()
            WHERE id = (
                SELECT id FROM user_activity WHERE user_id = $1
                ORDER BY created_at DESC, id DESC LIMIT 1
            )
            "#,
            &[reasons],
        )
        .await
    }

    async fn append_qnas(
        &self,
        user: &UserId,
        questions: &str,
        answers: &str,
    ) -> Result<(), RepositoryError> {
        self.update_latest(
            user,
            r#"
            UPDATE user_activity SET questions = $2, answers = $3, updated_at = now()
            WHERE id = (
                SELECT id FROM user_activity WHERE user_id = $1
                ORDER BY created_at DESC, id DESC LIMIT 1
            )
            "#,
            &[questions, answers],
        )
        .await
    }

    async fn append_notice(&self, user: &UserId, notice: &str) -> Result<(), RepositoryError> {
        self.update_latest(
            user,
            r#"
            UPDATE user_activity SET notice_response = $2, updated_at = now()
            WHERE id = (
                SELECT id FROM user_activity WHERE user_id = $1
                ORDER BY created_at DESC, id DESC LIMIT 1
            )
            "#,
            &[notice],
        )
        .await
    }
}
