//! Directory listing and deletion under the media root.

use std::path::Path;

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::{Extension, Json};
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::json;

use crate::context::AppContext;
use crate::error::{AppError, ResultExt};
use crate::middleware::request_id::RequestId;
use crate::routes::PathQuery;

/// One listing entry. `path` is relative to the root.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileEntry {
    pub name: String,
    pub path: String,
    pub is_directory: bool,
    pub size: u64,
    pub modified_time: Option<DateTime<Utc>>,
}

/// GET /api/files?path=
///
/// 200 with the entries sorted by name, 204 for an empty directory, 404 if
/// the directory does not exist.
pub async fn list_files(
    State(ctx): State<AppContext>,
    Extension(rid): Extension<RequestId>,
    Query(params): Query<PathQuery>,
) -> Result<Response, AppError> {
    let dir = ctx.root.resolve(&params.path).for_request(&rid)?;
    let entries = read_entries(&ctx, &dir).await.for_request(&rid)?;

    if entries.is_empty() {
        tracing::debug!("Directory {} is empty", dir.display());
        return Ok(StatusCode::NO_CONTENT.into_response());
    }

    Ok(Json(entries).into_response())
}

async fn read_entries(ctx: &AppContext, dir: &Path) -> mb_core::Result<Vec<FileEntry>> {
    let metadata = tokio::fs::metadata(dir)
        .await
        .map_err(|e| mb_core::Error::filesystem(dir, e))?;
    if !metadata.is_dir() {
        return Err(mb_core::Error::Validation(format!(
            "{} is not a directory",
            ctx.root.to_relative(dir)
        )));
    }

    let mut read_dir = tokio::fs::read_dir(dir)
        .await
        .map_err(|e| mb_core::Error::filesystem(dir, e))?;

    let mut entries = Vec::new();
    while let Some(entry) = read_dir
        .next_entry()
        .await
        .map_err(|e| mb_core::Error::filesystem(dir, e))?
    {
        let path = entry.path();
        let metadata = match entry.metadata().await {
            Ok(m) => m,
            Err(e) => {
                tracing::warn!("Skipping {}: {e}", path.display());
                continue;
            }
        };

        entries.push(FileEntry {
            name: entry.file_name().to_string_lossy().into_owned(),
            path: ctx.root.to_relative(&path),
            is_directory: metadata.is_dir(),
            size: metadata.len(),
            modified_time: metadata.modified().ok().map(DateTime::<Utc>::from),
        });
    }

    entries.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(entries)
}

/// DELETE /api/files?path=
///
/// Directories are removed recursively, files individually. The root itself
/// cannot be deleted.
pub async fn delete_file(
    State(ctx): State<AppContext>,
    Extension(rid): Extension<RequestId>,
    Query(params): Query<PathQuery>,
) -> Result<Json<serde_json::Value>, AppError> {
    let path = ctx.root.resolve(&params.path).for_request(&rid)?;
    remove(&ctx, &path).await.for_request(&rid)?;

    tracing::info!("Deleted {}", path.display());
    Ok(Json(json!({ "success": true })))
}

async fn remove(ctx: &AppContext, path: &Path) -> mb_core::Result<()> {
    if ctx.root.is_root(path) {
        return Err(mb_core::Error::InvalidPath(
            "refusing to delete the media root".into(),
        ));
    }

    // Symlinks are removed, never followed.
    let metadata = tokio::fs::symlink_metadata(path)
        .await
        .map_err(|e| mb_core::Error::filesystem(path, e))?;

    let result = if metadata.is_dir() {
        tokio::fs::remove_dir_all(path).await
    } else {
        tokio::fs::remove_file(path).await
    };
    result.map_err(|e| mb_core::Error::filesystem(path, e))
}
