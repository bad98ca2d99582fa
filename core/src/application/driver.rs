// Copyright (c) 2026 Notice Reply Maintainers
// SPDX-License-Identifier: AGPL-3.0
//! # Workflow Driver
//!
//! Drives one user through the upload → branch → reasons/Q&A → reply flow,
//! holding the [`UploadWorkflow`] state machine and the in-progress reason
//! selection. One driver per user session; all calls are awaited
//! sequentially, nothing is retried.
//!
//! Upload order matters: the file goes to the external classifier first,
//! then to the object store, and the extracted reasons/questions are written
//! into the current-data snapshot so the next step can read them back.

use bytes::Bytes;
use std::sync::Arc;
use tracing::{error, info};

use crate::application::{NoticeService, ServiceError, UploadService};
use crate::domain::activity::UserId;
use crate::domain::reply::ReplyGenerator;
use crate::domain::repository::CurrentDataRepository;
use crate::domain::session::Session;
use crate::domain::workflow::{
    normalize_page_count, ReasonSelection, Route, UploadState, UploadWorkflow, WorkflowError,
};

pub struct WorkflowDriver {
    workflow: UploadWorkflow,
    selection: ReasonSelection,
    session: Option<Session>,
    generator: Arc<dyn ReplyGenerator>,
    uploads: Arc<dyn UploadService>,
    notices: Arc<dyn NoticeService>,
    snapshots: Arc<dyn CurrentDataRepository>,
}

impl WorkflowDriver {
    pub fn new(
        session: Option<Session>,
        generator: Arc<dyn ReplyGenerator>,
        uploads: Arc<dyn UploadService>,
        notices: Arc<dyn NoticeService>,
        snapshots: Arc<dyn CurrentDataRepository>,
    ) -> Self {
        Self {
            workflow: UploadWorkflow::new(),
            selection: ReasonSelection::new(),
            session,
            generator,
            uploads,
            notices,
            snapshots,
        }
    }

    pub fn state(&self) -> &UploadState {
        self.workflow.state()
    }

    fn user(&self) -> Result<UserId, WorkflowError> {
        self.session
            .as_ref()
            .map(|s| s.user_id.clone())
            .ok_or(WorkflowError::AccessDenied)
    }

    /// Accept a file from drag-drop or the picker. Refusals (no session,
    /// unverified email, non-PDF) happen before any network call.
    pub fn select_file(&mut self, file_name: &str, mime: &str) -> Result<(), WorkflowError> {
        self.workflow.select_file(self.session.as_ref(), file_name, mime)
    }

    /// Classify the selected file, persist it, and record the extraction.
    /// Returns the summon flag that decides the next route.
    pub async fn upload(&mut self, bytes: Bytes, content_type: &str) -> Result<bool, ServiceError> {
        let user = self.user()?;
        let file_name = self
            .workflow
            .file_name()
            .ok_or(WorkflowError::InvalidTransition {
                from: self.workflow.state().name(),
                action: "upload",
            })?
            .to_string();

        self.workflow.begin_upload()?;

        let classification = match self.generator.classify(&user, &file_name, bytes.clone()).await
        {
            Ok(c) => c,
            Err(e) => {
                error!(user = %user, "Classification failed: {}", e);
                self.workflow.fail_upload()?;
                return Err(e.into());
            }
        };

        if let Err(e) = self.uploads.store_notice(&user, &file_name, content_type, bytes).await {
            error!(user = %user, "Upload failed: {}", e);
            self.workflow.fail_upload()?;
            return Err(e);
        }

        if let Err(e) = self
            .snapshots
            .upsert_extraction(
                &user,
                &classification.reasons_string(),
                &classification.questions_string(),
            )
            .await
        {
            error!(user = %user, "Failed to record extraction: {}", e);
            self.workflow.fail_upload()?;
            return Err(e.into());
        }

        self.workflow.finish_upload(classification.is_summon)?;
        info!(user = %user, is_summon = classification.is_summon, "Upload complete");
        Ok(classification.is_summon)
    }

    /// Branch to the summon-reasons or Q&A step.
    pub fn continue_to_next(&mut self) -> Result<Route, WorkflowError> {
        self.workflow.continue_to_next()
    }

    pub fn toggle_reason(&mut self, reason: &str) {
        self.selection.toggle(reason);
    }

    pub fn selected_reason(&self) -> Option<&str> {
        self.selection.selected()
    }

    pub fn set_extra_text(&mut self, extra: impl Into<String>) {
        self.selection.set_extra(extra);
    }

    /// Submit the summon-reasons step: persist the combined reason string,
    /// push the normalized page count, generate the reply and save it.
    pub async fn submit_reasons(&mut self, page_count: &str) -> Result<Route, ServiceError> {
        if !matches!(self.workflow.state(), UploadState::SummonReasons) {
            return Err(WorkflowError::InvalidTransition {
                from: self.workflow.state().name(),
                action: "submit_reasons",
            }
            .into());
        }
        if !self.selection.is_submittable() {
            return Err(WorkflowError::NothingSelected.into());
        }
        let user = self.user()?;

        self.notices.save_reasons(&user, &self.selection.combined()).await?;

        let pages = normalize_page_count(page_count);
        self.generator.submit_page_count(&user, pages).await?;

        let reply = self
            .generator
            .generate_summon_reply(
                &user,
                self.selection.selected().unwrap_or(""),
                self.selection.extra(),
            )
            .await?;

        self.notices.save_notice(&user, &reply).await?;
        Ok(self.workflow.complete()?)
    }

    /// Submit the Q&A step: persist the selections, generate and save.
    pub async fn submit_qnas(
        &mut self,
        questions: &str,
        answers: &str,
    ) -> Result<Route, ServiceError> {
        if !matches!(self.workflow.state(), UploadState::Qnas) {
            return Err(WorkflowError::InvalidTransition {
                from: self.workflow.state().name(),
                action: "submit_qnas",
            }
            .into());
        }
        let user = self.user()?;

        self.notices.save_qnas(&user, questions, answers).await?;
        let reply = self.generator.generate_qna_reply(&user, questions, answers).await?;
        self.notices.save_notice(&user, &reply).await?;
        Ok(self.workflow.complete()?)
    }

    /// Explicit re-upload: discard all in-memory state.
    pub fn reset(&mut self) {
        self.workflow.reset();
        self.selection.clear();
    }
}
