// Copyright (c) 2026 Notice Reply Maintainers
// SPDX-License-Identifier: AGPL-3.0
//! # Activity Aggregate
//!
//! One `Activity` row is created per uploaded document per user and mutated
//! in place as the workflow progresses (reason selection, Q&A selection,
//! final notice text). The "activity being worked on" is the most recently
//! created row for the user — there is no explicit step identifier, so the
//! lookup is only unambiguous under sequential, single-session usage.
//!
//! `CurrentData` is the single-slot per-user snapshot of in-progress state;
//! it is overwritten, never appended to.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Opaque user identifier issued by the auth provider.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(pub String);

impl UserId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ActivityId(pub Uuid);

impl ActivityId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_string(s: &str) -> Result<Self, uuid::Error> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

impl Default for ActivityId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ActivityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One document-upload workflow instance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Activity {
    pub id: ActivityId,
    pub user_id: UserId,
    /// Public URL of the stored PDF in the object store.
    pub pdf_url: String,
    /// Original file name as submitted by the user.
    pub pdf_name: String,
    /// Combined reason string chosen on the summon-reasons step.
    pub reasons: Option<String>,
    /// Selected questions, `.,`-separated.
    pub questions: Option<String>,
    /// Answers matching `questions`, `.,`-separated.
    pub answers: Option<String>,
    /// Generated notice reply text.
    pub notice_response: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Activity {
    /// Create a fresh activity for a newly uploaded document.
    pub fn new(user_id: UserId, pdf_url: impl Into<String>, pdf_name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: ActivityId::new(),
            user_id,
            pdf_url: pdf_url.into(),
            pdf_name: pdf_name.into(),
            reasons: None,
            questions: None,
            answers: None,
            notice_response: None,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Single-slot per-user cache of in-progress notice/Q&A/reason text.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentData {
    /// Derived key: `"CD" + user_id`.
    pub data_id: String,
    pub user_id: UserId,
    pub current_notice: String,
    pub current_question: String,
    pub current_answer: String,
    pub current_reason: String,
}

impl CurrentData {
    /// Derive the snapshot key for a user.
    pub fn data_id_for(user: &UserId) -> String {
        format!("CD{}", user.as_str())
    }

    /// Empty snapshot with blank placeholder fields.
    pub fn empty(user_id: UserId) -> Self {
        Self {
            data_id: Self::data_id_for(&user_id),
            user_id,
            current_notice: String::new(),
            current_question: String::new(),
            current_answer: String::new(),
            current_reason: String::new(),
        }
    }
}
