//! Route handlers for the HTTP API.

pub mod edit;
pub mod files;
pub mod health;
pub mod media;

use axum::extract::OriginalUri;
use axum::Extension;
use serde::Deserialize;

use crate::error::AppError;
use crate::middleware::request_id::RequestId;

/// `?path=` query shared by the file and media routes. Absent means the root.
#[derive(Debug, Default, Deserialize)]
pub struct PathQuery {
    #[serde(default)]
    pub path: String,
}

/// Fallback for unknown `/api/*` routes: a JSON 404 instead of the web UI.
pub async fn api_not_found(
    Extension(rid): Extension<RequestId>,
    OriginalUri(uri): OriginalUri,
) -> AppError {
    AppError::new(mb_core::Error::not_found("route", uri.path())).with_request_id(rid.0)
}
