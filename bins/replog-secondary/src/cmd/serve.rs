use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use replog_engine::Node;

use crate::config::ServeArgs;
use crate::error::ServerError;

pub async fn run(args: ServeArgs) -> Result<(), ServerError> {
    tracing::info!("replog-secondary starting");

    // --- Load config ---
    let config = args.load_config()?;
    tracing::info!(
        config = args.config.as_deref().unwrap_or("<defaults>"),
        delay = ?config.delay,
        max_sync_span = config.max_sync_span,
        "loaded config"
    );

    // --- Node: the one log of this process ---
    let node = Arc::new(Node::from_config(&config)?);

    // --- CancellationToken for graceful shutdown ---
    let token = CancellationToken::new();

    // --- API server ---
    let api_node = node.clone();
    let api_host = config.api_host.clone();
    let api_port = config.api_port;
    let api_token = token.clone();
    let mut api_handle = tokio::spawn(async move {
        replog_api_server::run(&api_host, api_port, api_node, api_token).await
    });

    tracing::info!(host = %config.api_host, port = config.api_port, "api server listening");

    tokio::select! {
        res = &mut api_handle => {
            // Server exited on its own: bind or serve failure.
            return match res {
                Ok(Ok(())) => Ok(()),
                Ok(Err(e)) => Err(ServerError::Api(e)),
                Err(e) => Err(ServerError::Api(format!("api task: {e}"))),
            };
        }
        res = shutdown_signal() => res?,
    }

    tracing::info!("shutting down...");
    token.cancel();

    // Give in-flight requests (and their delays) a bounded drain window.
    match tokio::time::timeout(Duration::from_secs(10), &mut api_handle).await {
        Ok(Ok(Err(e))) => tracing::error!(error = %e, "api server error"),
        Ok(_) => {}
        Err(_) => {
            tracing::warn!("api server did not drain in time, aborting");
            api_handle.abort();
        }
    }

    let status = node.status().await;
    tracing::info!(
        records = status.records,
        watermark = status.watermark,
        max_offset = ?status.max_offset,
        "shutdown complete, in-memory log discarded"
    );
    Ok(())
}

/// Resolves on SIGINT (Ctrl+C) or SIGTERM.
async fn shutdown_signal() -> Result<(), std::io::Error> {
    #[cfg(unix)]
    {
        let mut terminate =
            tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())?;
        tokio::select! {
            res = tokio::signal::ctrl_c() => {
                res?;
                tracing::info!("received SIGINT");
            }
            _ = terminate.recv() => tracing::info!("received SIGTERM"),
        }
        Ok(())
    }

    #[cfg(not(unix))]
    {
        tokio::signal::ctrl_c().await?;
        tracing::info!("received SIGINT");
        Ok(())
    }
}
