// Copyright (c) 2026 Notice Reply Maintainers
// SPDX-License-Identifier: AGPL-3.0

pub mod activity;
pub mod config;
pub mod reply;
pub mod repository;
pub mod session;
pub mod storage;
pub mod workflow;
