use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use replog_engine::{IngestError, SyncError};

/// Request-boundary failure. Rendered as a bare status code.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    Ingest(#[from] IngestError),

    /// Sync body is not `{"offset": <u64>}`.
    #[error("sync request: {0}")]
    SyncPayload(String),

    #[error("{0}")]
    Sync(#[from] SyncError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Ingest(IngestError::MalformedPayload(_)) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            ApiError::Ingest(IngestError::MissingOffset { .. }) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::SyncPayload(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            ApiError::Sync(SyncError::SpanTooLarge { .. }) => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        tracing::warn!(status = status.as_u16(), error = %self, "request rejected");
        status.into_response()
    }
}
