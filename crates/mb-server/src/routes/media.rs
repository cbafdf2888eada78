//! Media streaming route.

use axum::extract::{Query, State};
use axum::http::{header, HeaderMap};
use axum::response::Response;
use axum::Extension;

use crate::context::AppContext;
use crate::error::{AppError, ResultExt};
use crate::middleware::request_id::RequestId;
use crate::routes::PathQuery;
use crate::streaming;

/// GET /api/media?path=
///
/// Streams a file under the root with an inferred content type. Supports a
/// single byte range.
pub async fn stream_media(
    State(ctx): State<AppContext>,
    Extension(rid): Extension<RequestId>,
    Query(params): Query<PathQuery>,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    let path = ctx.root.resolve(&params.path).for_request(&rid)?;
    let range = headers
        .get(header::RANGE)
        .and_then(|v| v.to_str().ok());

    tracing::debug!("Streaming {} (range: {:?})", path.display(), range);
    streaming::serve_file(&path, range).await.for_request(&rid)
}
