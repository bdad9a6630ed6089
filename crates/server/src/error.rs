use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use idscan_core::{ExportError, SessionId, StageError};
use idscan_ocr::PayloadError;
use serde_json::json;
use thiserror::Error;

use crate::store::StoreError;

/// Everything the transport reports back as `{ "status": "error", "message": ... }`.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Bad request: {0}")]
    BadRequest(String),
    #[error(transparent)]
    Stage(#[from] StageError),
    #[error(transparent)]
    Payload(#[from] PayloadError),
    #[error("Unknown or expired session: {0}")]
    UnknownSession(SessionId),
    #[error(transparent)]
    Export(#[from] ExportError),
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::UnknownSession(id) => ApiError::UnknownSession(id),
        }
    }
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) | ApiError::Stage(_) | ApiError::Payload(_) => StatusCode::BAD_REQUEST,
            ApiError::UnknownSession(_) | ApiError::Export(_) => StatusCode::NOT_FOUND,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        } else {
            tracing::debug!(error = %self, "request rejected");
        }
        (status, Json(json!({ "status": "error", "message": self.to_string() }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes() {
        assert_eq!(ApiError::Stage(StageError("x".into())).status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::Payload(PayloadError::Empty).status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::Export(ExportError::NoData).status_code(), StatusCode::NOT_FOUND);
        assert_eq!(ApiError::Internal("boom".into()).status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn store_error_maps_to_unknown_session() {
        let id = SessionId::new();
        assert!(matches!(ApiError::from(StoreError::UnknownSession(id)), ApiError::UnknownSession(i) if i == id));
    }
}
