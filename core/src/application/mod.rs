// Copyright (c) 2026 Notice Reply Maintainers
// SPDX-License-Identifier: AGPL-3.0

pub mod driver;
pub mod notice;
pub mod upload;

pub use driver::WorkflowDriver;
pub use notice::{NoticeService, StandardNoticeService};
pub use upload::{StandardUploadService, UploadService};

use thiserror::Error;

use crate::domain::reply::ReplyError;
use crate::domain::repository::RepositoryError;
use crate::domain::storage::StorageError;
use crate::domain::workflow::WorkflowError;

/// Failures surfaced by application services. Externally every variant maps
/// to the same generic error envelope; internally the distinction is kept
/// for logging.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Repository(#[from] RepositoryError),

    #[error(transparent)]
    Reply(#[from] ReplyError),

    #[error(transparent)]
    Workflow(#[from] WorkflowError),
}
