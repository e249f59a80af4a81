//! HTTP surface of the secondary: append, prefix read, gap sync, health.

mod error;
mod http;

use std::sync::Arc;

use axum::Router;
use axum::routing::get;
use tokio_util::sync::CancellationToken;

use replog_engine::Node;

pub use error::ApiError;
pub use http::{ReadResponse, SyncRequest, SyncResponse};

#[derive(Clone)]
pub struct AppState {
    node: Arc<Node>,
}

/// Build the router over a shared node.
pub fn router(node: Arc<Node>) -> Router {
    let state = AppState { node };

    Router::new()
        .route(
            "/internal/post",
            get(http::handle_read).post(http::handle_append),
        )
        .route("/internal/sync", axum::routing::post(http::handle_sync))
        .route("/internal/health", get(http::handle_health))
        // Legacy location of the log read.
        .route("/", get(http::handle_read))
        .with_state(state)
}

/// Serve the replication API until `shutdown` is cancelled.
pub async fn run(
    host: &str,
    port: u16,
    node: Arc<Node>,
    shutdown: CancellationToken,
) -> Result<(), String> {
    let app = router(node);

    let listener = tokio::net::TcpListener::bind(format!("{host}:{port}"))
        .await
        .map_err(|e| format!("bind api {host}:{port}: {e}"))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown.cancelled_owned())
        .await
        .map_err(|e| format!("axum serve: {e}"))?;

    Ok(())
}
