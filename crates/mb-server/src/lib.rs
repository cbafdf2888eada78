//! mb-server: HTTP API over the mediabay root.
//!
//! This crate ties the other mb-* crates into a running server:
//!
//! - Axum router with request ids, CORS and request tracing
//! - File listing and deletion, range-capable media streaming
//! - Video edit endpoint backed by [`mb_pipeline::SegmentPipeline`]
//! - Static single-page-app serving for the bundled web UI
//! - Graceful shutdown via signal handling

pub mod context;
pub mod error;
pub mod middleware;
pub mod router;
pub mod routes;
pub mod streaming;

use std::sync::Arc;

use mb_av::{ToolInfo, ToolRegistry};
use mb_core::config::Config;
use mb_core::MediaRoot;

use crate::context::AppContext;

/// Start the mediabay server.
///
/// Builds the [`MediaRoot`] and [`AppContext`], binds the listener and serves
/// until a shutdown signal is received.
///
/// # Errors
///
/// Fails if `media.root` is not absolute or the address cannot be bound.
/// A missing ffmpeg is only logged; edits then fail individually.
pub async fn start(config: Config) -> mb_core::Result<()> {
    for warning in config.validate() {
        tracing::warn!("Config warning: {warning}");
    }

    let root = Arc::new(MediaRoot::new(config.media.root.clone())?);
    if root.path().is_dir() {
        tracing::info!("Serving media root {}", root.path().display());
    } else {
        tracing::warn!(
            "Media root {} does not exist or is not a directory",
            root.path().display()
        );
    }

    let tools = Arc::new(ToolRegistry::discover(&config.tools));
    for info in check_tools(tools.clone()).await? {
        if info.available {
            tracing::info!(
                "Tool found: {} ({})",
                info.name,
                info.version.as_deref().unwrap_or("unknown version")
            );
        } else {
            tracing::warn!("Tool not found: {}; video edits will fail", info.name);
        }
    }

    let host = config.server.host.clone();
    let port = config.server.port;
    let static_dir = config.server.static_dir.clone();
    let ctx = AppContext::new(root, tools);
    let app = router::build_router(ctx, static_dir);

    let listener = tokio::net::TcpListener::bind((host.as_str(), port))
        .await
        .map_err(|e| mb_core::Error::Internal(format!("Failed to bind to {host}:{port}: {e}")))?;
    let addr = listener
        .local_addr()
        .map_err(|e| mb_core::Error::Internal(format!("Failed to read local address: {e}")))?;

    tracing::info!("Server running on http://{addr}");
    println!("Server running on http://{addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| mb_core::Error::Internal(format!("Server error: {e}")))?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Availability of every known tool. `check_all` runs `<tool> -version`
/// synchronously, so it is kept off the async worker threads.
async fn check_tools(tools: Arc<ToolRegistry>) -> mb_core::Result<Vec<ToolInfo>> {
    tokio::task::spawn_blocking(move || tools.check_all())
        .await
        .map_err(|e| mb_core::Error::Internal(format!("tool check failed: {e}")))
}

/// Wait for a shutdown signal (SIGINT or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }

    tracing::info!("Shutdown signal received");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn relative_root_refuses_to_start() {
        let mut config = Config::default();
        config.media.root = "relative/media".into();
        let err = start(config).await.unwrap_err();
        assert!(matches!(err, mb_core::Error::InvalidPath(_)));
    }

    #[cfg(unix)]
    #[tokio::test(flavor = "current_thread")]
    async fn tool_check_runs_off_the_runtime() {
        // `echo -version` prints its argument and exits 0.
        let tools = Arc::new(ToolRegistry::default().with_tool("ffmpeg", "echo"));
        let infos = check_tools(tools).await.unwrap();
        assert_eq!(infos.len(), 1);
        assert!(infos[0].available);
        assert_eq!(infos[0].version.as_deref(), Some("-version"));
    }
}
