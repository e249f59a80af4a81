use axum::Json;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use serde::{Deserialize, Serialize};

use replog_engine::Record;

use super::AppState;
use crate::error::ApiError;

#[derive(Debug, Serialize)]
pub struct ReadResponse {
    pub records: Vec<Record>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SyncRequest {
    pub offset: u64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SyncResponse {
    pub offsets: Vec<u64>,
}

// ═══════════════════════════════════════════════════════════════
//  GET /internal/post
// ═══════════════════════════════════════════════════════════════

pub(crate) async fn handle_read(State(state): State<AppState>) -> Json<ReadResponse> {
    let records = state.node.prefix().await;
    tracing::debug!(records = records.len(), "served prefix");
    Json(ReadResponse { records })
}

// ═══════════════════════════════════════════════════════════════
//  POST /internal/post
// ═══════════════════════════════════════════════════════════════

/// Body: a record, `{"records": [...]}` or a bare array of records.
/// Empty 200 once applied and the simulated latency has passed.
pub(crate) async fn handle_append(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<StatusCode, ApiError> {
    let summary = state.node.ingest_bytes(&body).await?;
    tracing::debug!(
        received = summary.received,
        inserted = summary.inserted,
        duplicates = summary.duplicates,
        "append applied"
    );
    Ok(StatusCode::OK)
}

// ═══════════════════════════════════════════════════════════════
//  POST /internal/sync
// ═══════════════════════════════════════════════════════════════

pub(crate) async fn handle_sync(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<SyncResponse>, ApiError> {
    let request: SyncRequest =
        serde_json::from_slice(&body).map_err(|e| ApiError::SyncPayload(e.to_string()))?;
    let offsets = state.node.missing(request.offset).await?;
    tracing::debug!(upper = request.offset, missing = offsets.len(), "sync computed");
    Ok(Json(SyncResponse { offsets }))
}

// ═══════════════════════════════════════════════════════════════
//  GET /internal/health
// ═══════════════════════════════════════════════════════════════

pub(crate) async fn handle_health() -> StatusCode {
    StatusCode::OK
}
