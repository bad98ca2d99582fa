// Copyright (c) 2026 Notice Reply Maintainers
// SPDX-License-Identifier: AGPL-3.0
//! # notice-reply-core
//!
//! Server-side core of the legal-notice-reply service: users upload a PDF
//! notice, an external backend extracts reasons and questions from it, and
//! the user assembles a reply step by step.
//!
//! # Architecture
//!
//! - **`domain`** — aggregates, workflow state machine, port traits
//! - **`application`** — services coordinating the workflow steps
//! - **`infrastructure`** — Postgres/in-memory repositories, object-store
//!   and reply-backend adapters, session verification
//! - **`presentation`** — Axum HTTP surface

pub mod domain;
pub mod application;
pub mod infrastructure;
pub mod presentation;

pub use domain::*;
