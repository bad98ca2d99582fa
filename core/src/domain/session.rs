// Copyright (c) 2026 Notice Reply Maintainers
// SPDX-License-Identifier: AGPL-3.0
//! # Session Context
//!
//! Explicit per-request session passed to handlers and the workflow driver.
//! Nothing in this crate reads an ambient "current session" — a handler
//! either receives a verified `Session` or acts as anonymous.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::activity::UserId;

/// A verified user session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub user_id: UserId,
    pub email: String,
    pub email_verified: bool,
}

impl Session {
    pub fn new(user_id: impl Into<String>, email: impl Into<String>, email_verified: bool) -> Self {
        Self {
            user_id: UserId::new(user_id),
            email: email.into(),
            email_verified,
        }
    }
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Missing session token")]
    Missing,

    #[error("Invalid session token: {0}")]
    Invalid(String),

    #[error("Session token expired")]
    Expired,
}
