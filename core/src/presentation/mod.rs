// Copyright (c) 2026 Notice Reply Maintainers
// SPDX-License-Identifier: AGPL-3.0

pub mod api;
pub mod middleware;

pub use api::{app, AppState};
