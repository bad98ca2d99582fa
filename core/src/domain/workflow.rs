// Copyright (c) 2026 Notice Reply Maintainers
// SPDX-License-Identifier: AGPL-3.0
//! # Upload Workflow State Machine
//!
//! The client-driven flow that moves a notice from file selection through
//! upload, classification branching and reason/Q&A collection to the
//! generated reply:
//!
//! ```text
//! NoFile → FileSelected → Uploading → Uploaded{is_summon}
//!            → (SummonReasons | Qnas) → NoticeResponse
//! ```
//!
//! Transitions are self-validating: selecting a file requires an
//! authenticated, email-verified session and a PDF MIME type, and every
//! state may regress to `NoFile` via an explicit reset. There is no
//! automatic retry anywhere in the flow — a failed upload drops back to
//! `FileSelected` and waits for the user.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::reply::ENTRY_SEPARATOR;
use crate::domain::session::Session;

/// MIME type accepted by the upload step.
pub const PDF_MIME: &str = "application/pdf";

/// Lower bound on the requested reply length.
pub const MIN_PAGE_COUNT: u32 = 2;

/// Front-end routes the workflow navigates between.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Route {
    Home,
    SummonReasons,
    Qnas,
    NoticeResponse,
    Profile,
}

impl Route {
    pub fn path(&self) -> &'static str {
        match self {
            Route::Home => "/",
            Route::SummonReasons => "/summon-reasons",
            Route::Qnas => "/qnas",
            Route::NoticeResponse => "/notice-response",
            Route::Profile => "/profile",
        }
    }
}

/// Paths that require an authenticated session at the request gate.
pub const PROTECTED_ROUTES: [&str; 4] = ["/qnas", "/summon-reasons", "/profile", "/notice-response"];

/// Workflow states, in flow order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum UploadState {
    NoFile,
    FileSelected { file_name: String },
    Uploading { file_name: String },
    Uploaded { file_name: String, is_summon: bool },
    SummonReasons,
    Qnas,
    NoticeResponse,
}

impl UploadState {
    pub fn name(&self) -> &'static str {
        match self {
            UploadState::NoFile => "NoFile",
            UploadState::FileSelected { .. } => "FileSelected",
            UploadState::Uploading { .. } => "Uploading",
            UploadState::Uploaded { .. } => "Uploaded",
            UploadState::SummonReasons => "SummonReasons",
            UploadState::Qnas => "Qnas",
            UploadState::NoticeResponse => "NoticeResponse",
        }
    }
}

#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error("Access denied: sign in with a verified email to upload files")]
    AccessDenied,

    #[error("Only PDF files are accepted, got {0}")]
    NotPdf(String),

    #[error("Select a reason or provide additional information")]
    NothingSelected,

    #[error("Invalid transition: cannot {action} from {from}")]
    InvalidTransition { from: &'static str, action: &'static str },
}

/// The workflow state machine proper.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadWorkflow {
    state: UploadState,
}

impl UploadWorkflow {
    pub fn new() -> Self {
        Self { state: UploadState::NoFile }
    }

    pub fn state(&self) -> &UploadState {
        &self.state
    }

    /// File name carried by the current state, if any.
    pub fn file_name(&self) -> Option<&str> {
        match &self.state {
            UploadState::FileSelected { file_name }
            | UploadState::Uploading { file_name }
            | UploadState::Uploaded { file_name, .. } => Some(file_name),
            _ => None,
        }
    }

    /// Accept a file from drag-drop or the picker.
    ///
    /// Refused without an authenticated, email-verified session, and for any
    /// MIME type other than `application/pdf`. On refusal no state changes
    /// and the caller must not issue any network call.
    pub fn select_file(
        &mut self,
        session: Option<&Session>,
        file_name: &str,
        mime: &str,
    ) -> Result<(), WorkflowError> {
        let session = session.ok_or(WorkflowError::AccessDenied)?;
        if !session.email_verified {
            return Err(WorkflowError::AccessDenied);
        }
        if mime != PDF_MIME {
            return Err(WorkflowError::NotPdf(mime.to_string()));
        }
        match self.state {
            UploadState::NoFile | UploadState::FileSelected { .. } => {
                self.state = UploadState::FileSelected { file_name: file_name.to_string() };
                Ok(())
            }
            _ => Err(self.invalid("select_file")),
        }
    }

    pub fn begin_upload(&mut self) -> Result<(), WorkflowError> {
        match &self.state {
            UploadState::FileSelected { file_name } => {
                self.state = UploadState::Uploading { file_name: file_name.clone() };
                Ok(())
            }
            _ => Err(self.invalid("begin_upload")),
        }
    }

    pub fn finish_upload(&mut self, is_summon: bool) -> Result<(), WorkflowError> {
        match &self.state {
            UploadState::Uploading { file_name } => {
                self.state = UploadState::Uploaded { file_name: file_name.clone(), is_summon };
                Ok(())
            }
            _ => Err(self.invalid("finish_upload")),
        }
    }

    /// A failed upload keeps the selected file so the user can retry.
    pub fn fail_upload(&mut self) -> Result<(), WorkflowError> {
        match &self.state {
            UploadState::Uploading { file_name } => {
                self.state = UploadState::FileSelected { file_name: file_name.clone() };
                Ok(())
            }
            _ => Err(self.invalid("fail_upload")),
        }
    }

    /// Branch on the classification outcome recorded at upload.
    pub fn continue_to_next(&mut self) -> Result<Route, WorkflowError> {
        match &self.state {
            UploadState::Uploaded { is_summon, .. } => {
                let route = if *is_summon { Route::SummonReasons } else { Route::Qnas };
                self.state = match route {
                    Route::SummonReasons => UploadState::SummonReasons,
                    _ => UploadState::Qnas,
                };
                Ok(route)
            }
            _ => Err(self.invalid("continue_to_next")),
        }
    }

    /// Reply generated and saved; land on the response page.
    pub fn complete(&mut self) -> Result<Route, WorkflowError> {
        match self.state {
            UploadState::SummonReasons | UploadState::Qnas => {
                self.state = UploadState::NoticeResponse;
                Ok(Route::NoticeResponse)
            }
            _ => Err(self.invalid("complete")),
        }
    }

    /// Explicit re-upload: discard all in-memory state.
    pub fn reset(&mut self) {
        self.state = UploadState::NoFile;
    }

    fn invalid(&self, action: &'static str) -> WorkflowError {
        WorkflowError::InvalidTransition { from: self.state.name(), action }
    }
}

impl Default for UploadWorkflow {
    fn default() -> Self {
        Self::new()
    }
}

/// Mutually exclusive single-select reason choice with toggle-to-deselect,
/// plus optional free-text instructions.
#[derive(Debug, Clone, Default)]
pub struct ReasonSelection {
    selected: Option<String>,
    extra: String,
}

impl ReasonSelection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clicking the active selection deselects it; clicking another reason
    /// replaces the selection.
    pub fn toggle(&mut self, reason: &str) {
        if self.selected.as_deref() == Some(reason) {
            self.selected = None;
        } else {
            self.selected = Some(reason.to_string());
        }
    }

    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    pub fn set_extra(&mut self, extra: impl Into<String>) {
        self.extra = extra.into();
    }

    pub fn extra(&self) -> &str {
        &self.extra
    }

    /// Submission requires a selected reason or non-empty free text.
    pub fn is_submittable(&self) -> bool {
        self.selected.is_some() || !self.extra.trim().is_empty()
    }

    /// Combined reason string persisted on submission.
    pub fn combined(&self) -> String {
        format!(
            "{}{}Additional Instructions: {}",
            self.selected.as_deref().unwrap_or(""),
            ENTRY_SEPARATOR,
            self.extra
        )
    }

    pub fn clear(&mut self) {
        self.selected = None;
        self.extra.clear();
    }
}

/// Normalize the requested page count: base-10 parse, non-numeric input and
/// anything below [`MIN_PAGE_COUNT`] coerce to the minimum.
pub fn normalize_page_count(input: &str) -> u32 {
    match input.trim().parse::<u32>() {
        Ok(n) if n >= MIN_PAGE_COUNT => n,
        _ => MIN_PAGE_COUNT,
    }
}
