use axum::extract::rejection::JsonRejection;
use axum::extract::{DefaultBodyLimit, Path, State};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use idscan_core::{FieldRecord, SessionId, Stage};
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use crate::error::ApiError;
use crate::AppState;

const EXPORT_FILENAME: &str = "aadhaar_form.txt";

#[derive(Debug, Deserialize)]
pub struct CaptureRequest {
    /// Base64 image or `data:` URL.
    pub image: String,
    pub stage: String,
    #[serde(default)]
    pub session_id: Option<Uuid>,
}

#[derive(Debug, Serialize)]
pub struct CaptureResponse {
    pub status: String,
    pub session_id: SessionId,
    pub data: FieldRecord,
}

#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub session_id: SessionId,
    pub stages: Vec<Stage>,
    pub data: FieldRecord,
}

pub fn router(state: AppState, max_body_bytes: usize) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/process_image", post(process_image))
        .route("/sessions/{id}", get(get_session).delete(delete_session))
        .route("/sessions/{id}/download", get(download))
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(max_body_bytes))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health() -> &'static str {
    "ok"
}

/// One capture: decode → OCR pipeline (blocking pool) → merge into the session.
async fn process_image(
    State(state): State<AppState>,
    payload: Result<Json<CaptureRequest>, JsonRejection>,
) -> Result<Json<CaptureResponse>, ApiError> {
    let Json(req) = payload.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let stage: Stage = req.stage.parse()?;
    let session_id = req.session_id.map(SessionId);

    // Fail before the OCR work when the capture has nowhere to go.
    if let Some(id) = session_id {
        if !stage.resets_session() && !state.sessions.contains(id).await {
            return Err(ApiError::UnknownSession(id));
        }
    }

    let bytes = idscan_ocr::decode_payload(&req.image)?;
    let pipeline = state.pipeline.clone();
    let outcome = tokio::task::spawn_blocking(move || pipeline.process(&bytes, stage))
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?;

    let session = state.sessions.submit(session_id, stage, &outcome.update).await?;
    tracing::info!(session_id = %session.id, %stage, "capture processed");

    Ok(Json(CaptureResponse {
        status: stage.success_status(),
        session_id: session.id,
        data: session.record,
    }))
}

async fn get_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionResponse>, ApiError> {
    let id = SessionId(id);
    let session = state.sessions.get(id).await.ok_or(ApiError::UnknownSession(id))?;
    Ok(Json(SessionResponse {
        session_id: session.id,
        stages: session.stages.into_iter().collect(),
        data: session.record,
    }))
}

async fn delete_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    let id = SessionId(id);
    if !state.sessions.remove(id).await {
        return Err(ApiError::UnknownSession(id));
    }
    tracing::info!(session_id = %id, "session cleared");
    Ok(StatusCode::NO_CONTENT)
}

/// `Key: Value` text export of everything captured so far.
async fn download(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let id = SessionId(id);
    let session = state.sessions.get(id).await.ok_or(ApiError::UnknownSession(id))?;
    let body = session.export()?;
    Ok((
        [
            (header::CONTENT_TYPE, "text/plain; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, format!("attachment; filename=\"{EXPORT_FILENAME}\"")),
        ],
        body,
    ))
}
