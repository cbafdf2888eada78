//! Video edit route.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::{Extension, Json};
use mb_pipeline::VideoEditRequest;
use serde::Serialize;
use tracing::Instrument;

use crate::context::AppContext;
use crate::error::{AppError, ResultExt};
use crate::middleware::request_id::RequestId;

#[derive(Debug, Serialize)]
pub struct EditResponse {
    pub success: bool,
    /// Output file, relative to the root.
    pub output: String,
}

/// POST /api/edit-video
///
/// The pipeline runs on its own task. If the client goes away the handler
/// future is dropped, but extraction, concat and cleanup still finish.
pub async fn edit_video(
    State(ctx): State<AppContext>,
    Extension(rid): Extension<RequestId>,
    payload: Result<Json<VideoEditRequest>, JsonRejection>,
) -> Result<Json<EditResponse>, AppError> {
    let Json(request) = payload
        .map_err(|e| mb_core::Error::Validation(e.body_text()))
        .for_request(&rid)?;

    let pipeline = ctx.pipeline.clone();
    let edit_id = rid.0.clone();
    let task = tokio::spawn(
        async move { pipeline.run(&request, &edit_id).await }.instrument(tracing::Span::current()),
    );

    let result = match task.await {
        Ok(result) => result,
        Err(e) => Err(mb_core::Error::Internal(format!("edit task failed: {e}"))),
    }
    .for_request(&rid)?;

    Ok(Json(EditResponse {
        success: true,
        output: result.output,
    }))
}
