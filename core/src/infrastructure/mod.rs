// Copyright (c) 2026 Notice Reply Maintainers
// SPDX-License-Identifier: AGPL-3.0

pub mod auth;
pub mod db;
pub mod reply;
pub mod repositories;
pub mod storage;
