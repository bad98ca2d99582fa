// Copyright (c) 2026 Notice Reply Maintainers
// SPDX-License-Identifier: AGPL-3.0
//! Route gate for authenticated front-end pages.
//!
//! The workflow pages (`/qnas`, `/summon-reasons`, `/profile`,
//! `/notice-response`) require a signed-in user; anonymous requests are sent
//! back to the landing page. API routes carry the user id in their payloads
//! and pass through untouched.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use std::sync::Arc;
use tracing::debug;

use crate::domain::workflow::PROTECTED_ROUTES;
use crate::presentation::api::AppState;

pub async fn route_gate(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Response {
    let path = request.uri().path();
    if PROTECTED_ROUTES.contains(&path) {
        match state.verifier.session_from_headers(request.headers()) {
            Ok(session) => {
                debug!(user_id = %session.user_id, path, "Route gate passed");
            }
            Err(e) => {
                debug!(path, reason = %e, "Route gate redirect");
                return Redirect::temporary("/").into_response();
            }
        }
    }
    next.run(request).await
}
