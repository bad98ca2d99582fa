// Copyright (c) 2026 Notice Reply Maintainers
// SPDX-License-Identifier: AGPL-3.0
//! # Reply Generator Trait - Anti-Corruption Layer for the External Backend
//!
//! The reply generator is an opaque third-party HTTP service that classifies
//! an uploaded notice, extracts candidate reasons/questions from it, and
//! later produces the reply text. This trait isolates the domain from its
//! API; the concrete adapter lives in `crate::infrastructure::reply`.

use async_trait::async_trait;
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::activity::UserId;

/// Separator used by the backend between reason/question entries.
pub const ENTRY_SEPARATOR: &str = ".,";

/// Outcome of classifying an uploaded document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Classification {
    /// Whether the document is a court-summons-style notice. Branches the
    /// workflow between the summon-reasons step and the Q&A step.
    pub is_summon: bool,

    /// Candidate reasons extracted from the document.
    #[serde(default)]
    pub reasons: Vec<String>,

    /// Candidate questions extracted from the document.
    #[serde(default)]
    pub questions: Vec<String>,
}

impl Classification {
    /// Reasons joined with the backend's `.,` separator, the form the
    /// snapshot stores and the reason-selection step splits on.
    pub fn reasons_string(&self) -> String {
        self.reasons.join(ENTRY_SEPARATOR)
    }

    pub fn questions_string(&self) -> String {
        self.questions.join(ENTRY_SEPARATOR)
    }
}

/// External reply-generation backend.
#[async_trait]
pub trait ReplyGenerator: Send + Sync {
    /// Submit the uploaded PDF for classification and extraction.
    async fn classify(
        &self,
        user: &UserId,
        file_name: &str,
        bytes: Bytes,
    ) -> Result<Classification, ReplyError>;

    /// Record the requested reply length in pages.
    async fn submit_page_count(&self, user: &UserId, pages: u32) -> Result<(), ReplyError>;

    /// Generate the reply for a summon-style notice from the selected reason
    /// and free-text instructions. Returns the reply text.
    async fn generate_summon_reply(
        &self,
        user: &UserId,
        reason: &str,
        extra: &str,
    ) -> Result<String, ReplyError>;

    /// Generate the reply for a non-summon notice from the collected Q&A.
    async fn generate_qna_reply(
        &self,
        user: &UserId,
        questions: &str,
        answers: &str,
    ) -> Result<String, ReplyError>;
}

/// Reply backend errors
#[derive(Debug, Error)]
pub enum ReplyError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Backend error: {0}")]
    Backend(String),

    #[error("Malformed backend response: {0}")]
    Serialization(String),
}

impl From<reqwest::Error> for ReplyError {
    fn from(err: reqwest::Error) -> Self {
        ReplyError::Network(err.to_string())
    }
}
