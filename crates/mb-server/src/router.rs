//! Axum router construction.
//!
//! Builds the full application router with the API routes, middleware
//! layers, and static file serving for the web UI.

use std::path::PathBuf;

use axum::middleware;
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::context::AppContext;
use crate::middleware::request_id::request_id_middleware;
use crate::routes;

/// Build the complete Axum router.
///
/// Unknown `/api/*` paths get a JSON 404. Anything else outside the API is
/// served from `static_dir`, falling back to its `index.html` so client-side
/// routes work.
pub fn build_router(ctx: AppContext, static_dir: Option<PathBuf>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api = Router::new()
        .route(
            "/files",
            get(routes::files::list_files).delete(routes::files::delete_file),
        )
        .route("/media", get(routes::media::stream_media))
        .route("/edit-video", post(routes::edit::edit_video))
        .fallback(routes::api_not_found);

    let mut app = Router::new()
        .route("/health", get(routes::health::health_check))
        .nest("/api", api)
        .layer(middleware::from_fn(request_id_middleware))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(ctx);

    if let Some(dir) = static_dir {
        if dir.is_dir() {
            tracing::info!("Serving static files from {}", dir.display());
            let index_path = dir.join("index.html");
            app = app.fallback_service(
                tower_http::services::ServeDir::new(&dir)
                    .append_index_html_on_directories(true)
                    .fallback(tower_http::services::ServeFile::new(index_path)),
            );
        } else {
            tracing::warn!(
                "Static directory {} not found; web UI disabled",
                dir.display()
            );
        }
    }

    app
}
