// Copyright (c) 2026 Notice Reply Maintainers
// SPDX-License-Identifier: AGPL-3.0
//! HTTP API
//!
//! JSON endpoints consumed by the notice-reply front end. Responses keep the
//! `{success, message, ...}` envelope the front end expects; `getPdfUrl` is
//! the one exception and reports failure as `{error}`.

use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    middleware::from_fn_with_state,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use bytes::Bytes;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{error, warn};

use crate::application::{NoticeService, UploadService};
use crate::domain::activity::UserId;
use crate::domain::reply::ReplyGenerator;
use crate::domain::repository::{CurrentDataRepository, UpsertOutcome};
use crate::domain::storage::{ObjectStore, DEFAULT_SIGNED_URL_TTL};
use crate::infrastructure::auth::SessionVerifier;
use crate::presentation::middleware::route_gate;

pub struct AppState {
    pub uploads: Arc<dyn UploadService>,
    pub notices: Arc<dyn NoticeService>,
    pub store: Arc<dyn ObjectStore>,
    pub generator: Arc<dyn ReplyGenerator>,
    pub snapshots: Arc<dyn CurrentDataRepository>,
    pub verifier: SessionVerifier,
}

pub fn app(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/uploadNoticePDF", post(upload_notice_pdf))
        .route("/api/getPdfUrl", post(get_pdf_url))
        .route("/api/getReasons", post(get_reasons))
        .route("/api/save-selected-reasons", post(save_selected_reasons))
        .route("/api/save-selected-qnas", post(save_selected_qnas))
        .route("/api/saveNotice", post(save_notice))
        .route("/health", get(health))
        .fallback(not_found)
        .layer(from_fn_with_state(state.clone(), route_gate))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[derive(Deserialize)]
struct GetPdfUrlRequest {
    #[serde(rename = "pdfLink")]
    pdf_link: String,
}

#[derive(Deserialize)]
struct GetReasonsRequest {
    #[serde(rename = "userID")]
    user_id: String,
}

#[derive(Deserialize)]
struct SaveReasonsRequest {
    #[serde(rename = "userID")]
    user_id: String,
    reasons: String,
}

#[derive(Deserialize)]
struct SaveQnasRequest {
    #[serde(rename = "userID")]
    user_id: String,
    questions: String,
    answers: String,
}

#[derive(Deserialize)]
struct SaveNoticeRequest {
    #[serde(rename = "userID")]
    user_id: String,
    notice: String,
}

struct UploadParts {
    user_id: Option<String>,
    file: Option<(String, String, Bytes)>,
}

async fn collect_upload_parts(mut multipart: Multipart) -> Result<UploadParts, axum::Error> {
    let mut parts = UploadParts {
        user_id: None,
        file: None,
    };
    while let Some(field) = multipart.next_field().await.map_err(axum::Error::new)? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "file" => {
                let file_name = field.file_name().unwrap_or_default().to_string();
                let content_type = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_string();
                let bytes = field.bytes().await.map_err(axum::Error::new)?;
                parts.file = Some((file_name, content_type, bytes));
            }
            "userId" => {
                parts.user_id = Some(field.text().await.map_err(axum::Error::new)?);
            }
            _ => {}
        }
    }
    Ok(parts)
}

async fn upload_notice_pdf(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> impl IntoResponse {
    let no_data = (
        StatusCode::BAD_REQUEST,
        Json(json!({ "success": false, "message": "No Data received" })),
    );

    let parts = match collect_upload_parts(multipart).await {
        Ok(parts) => parts,
        Err(_) => return no_data,
    };
    let (user_id, (file_name, content_type, bytes)) = match (parts.user_id, parts.file) {
        (Some(user_id), Some(file)) if !file.0.is_empty() => (user_id, file),
        _ => return no_data,
    };

    let user = UserId::new(user_id);
    match state
        .uploads
        .store_notice(&user, &file_name, &content_type, bytes.clone())
        .await
    {
        Ok(url) => {
            // Run extraction so getReasons can serve the snapshot. The upload
            // itself already succeeded; a classifier outage only loses the
            // pre-extracted reasons.
            match state.generator.classify(&user, &file_name, bytes).await {
                Ok(classification) => {
                    if let Err(e) = state
                        .snapshots
                        .upsert_extraction(
                            &user,
                            &classification.reasons_string(),
                            &classification.questions_string(),
                        )
                        .await
                    {
                        warn!(user_id = %user, error = %e, "Failed to record extraction");
                    }
                }
                Err(e) => warn!(user_id = %user, error = %e, "Classification failed"),
            }
            (
                StatusCode::OK,
                Json(json!({
                    "success": true,
                    "message": "File uploaded successfully",
                    "url": url,
                })),
            )
        }
        Err(e) => {
            error!(user_id = %user, error = %e, "Upload failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "success": false, "message": "Error uploading file" })),
            )
        }
    }
}

async fn get_pdf_url(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<GetPdfUrlRequest>,
) -> impl IntoResponse {
    match state
        .store
        .signed_read_url(&payload.pdf_link, DEFAULT_SIGNED_URL_TTL)
        .await
    {
        Ok(signed) => (StatusCode::OK, Json(json!({ "url": signed.url }))),
        Err(e) => {
            error!(pdf_link = %payload.pdf_link, error = %e, "Failed to sign read URL");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "Failed to generate URL" })),
            )
        }
    }
}

async fn get_reasons(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<GetReasonsRequest>,
) -> impl IntoResponse {
    let user = UserId::new(payload.user_id);
    match state.notices.current_reasons(&user).await {
        Ok(reasons) => (StatusCode::OK, Json(json!(reasons))),
        Err(e) => {
            error!(user_id = %user, error = %e, "Failed to fetch reasons");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "success": false, "message": "Error fetching reasons" })),
            )
        }
    }
}

async fn save_selected_reasons(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<SaveReasonsRequest>,
) -> impl IntoResponse {
    let user = UserId::new(payload.user_id);
    match state.notices.save_reasons(&user, &payload.reasons).await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({ "success": true, "message": "Reason updated successfully" })),
        ),
        Err(e) => {
            error!(user_id = %user, error = %e, "Failed to save reasons");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "success": false, "message": "Error processing request" })),
            )
        }
    }
}

async fn save_selected_qnas(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<SaveQnasRequest>,
) -> impl IntoResponse {
    let user = UserId::new(payload.user_id);
    match state
        .notices
        .save_qnas(&user, &payload.questions, &payload.answers)
        .await
    {
        Ok(()) => (
            StatusCode::CREATED,
            Json(json!({
                "success": true,
                "message": "Questions and Answer added successfully",
            })),
        ),
        Err(e) => {
            error!(user_id = %user, error = %e, "Failed to save Q&A");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "success": false, "message": "Error processing request" })),
            )
        }
    }
}

async fn save_notice(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<SaveNoticeRequest>,
) -> impl IntoResponse {
    let user = UserId::new(payload.user_id);
    match state.notices.save_notice(&user, &payload.notice).await {
        Ok(UpsertOutcome::Updated) => (
            StatusCode::OK,
            Json(json!({ "success": true, "message": "Notice updated successfully" })),
        ),
        Ok(UpsertOutcome::Created) => (
            StatusCode::CREATED,
            Json(json!({ "success": true, "message": "Notice added successfully" })),
        ),
        Err(e) => {
            error!(user_id = %user, error = %e, "Failed to save notice");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "success": false, "message": "Error processing request" })),
            )
        }
    }
}

async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

async fn not_found() -> StatusCode {
    StatusCode::NOT_FOUND
}
