// Copyright (c) 2026 Notice Reply Maintainers
// SPDX-License-Identifier: AGPL-3.0
//! Repository implementations: in-memory for development and tests,
//! PostgreSQL for production.

pub mod memory;
pub mod postgres_activity;
pub mod postgres_current_data;

pub use memory::{InMemoryActivityRepository, InMemoryCurrentDataRepository};
pub use postgres_activity::PostgresActivityRepository;
pub use postgres_current_data::PostgresCurrentDataRepository;
