//! Error-to-HTTP response conversion.
//!
//! Implements `IntoResponse` for [`mb_core::Error`] so that route handlers
//! can return `Result<T, AppError>` directly. Clients only ever see the
//! short public message and code; the full error is logged here.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use crate::middleware::request_id::RequestId;

/// Wrapper so we can implement `IntoResponse` for an external type.
#[derive(Debug)]
pub struct AppError {
    inner: mb_core::Error,
    request_id: Option<String>,
}

impl AppError {
    pub fn new(inner: mb_core::Error) -> Self {
        Self {
            inner,
            request_id: None,
        }
    }

    pub fn with_request_id(mut self, id: String) -> Self {
        self.request_id = Some(id);
        self
    }

    pub fn inner(&self) -> &mb_core::Error {
        &self.inner
    }
}

impl From<mb_core::Error> for AppError {
    fn from(e: mb_core::Error) -> Self {
        Self::new(e)
    }
}

/// Attach the current request id to a failing [`mb_core::Result`].
pub trait ResultExt<T> {
    fn for_request(self, id: &RequestId) -> Result<T, AppError>;
}

impl<T> ResultExt<T> for mb_core::Result<T> {
    fn for_request(self, id: &RequestId) -> Result<T, AppError> {
        self.map_err(|e| AppError::new(e).with_request_id(id.0.clone()))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.inner.http_status())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        if status.is_server_error() {
            tracing::error!(
                status = %status,
                error = %self.inner,
                request_id = self.request_id.as_deref().unwrap_or("-"),
                "Server error in API handler"
            );
        } else {
            tracing::warn!(
                status = %status,
                error = %self.inner,
                request_id = self.request_id.as_deref().unwrap_or("-"),
                "Request rejected"
            );
        }

        let body = json!({
            "error": self.inner.public_message(),
            "code": self.inner.code(),
            "request_id": self.request_id,
        });

        (status, axum::Json(body)).into_response()
    }
}
