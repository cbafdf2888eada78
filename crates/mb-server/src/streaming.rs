//! Byte-range file streaming: range parsing, content-type inference, and
//! chunked serving via `ReaderStream`.

use std::path::Path;

use axum::body::Body;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use tokio::io::{AsyncReadExt, AsyncSeekExt};
use tokio_util::io::ReaderStream;

const CHUNK_SIZE: usize = 64 * 1024;

/// Parse a `Range: bytes=START-END` header value.
///
/// Returns `(start, Option<end>)` where `end` is `None` for open-ended ranges
/// like `bytes=500-`. Suffix ranges (`bytes=-500`), multi-range requests and
/// ranges whose end precedes their start are not supported and yield `None`,
/// which callers treat as "no range".
pub fn parse_range_header(value: &str) -> Option<(u64, Option<u64>)> {
    let bytes_prefix = value.trim().strip_prefix("bytes=")?;
    if bytes_prefix.contains(',') {
        return None;
    }
    let (start_str, end_str) = bytes_prefix.split_once('-')?;

    let start: u64 = start_str.trim().parse().ok()?;
    let end_str = end_str.trim();
    let end = if end_str.is_empty() {
        None
    } else {
        Some(end_str.parse().ok()?)
    };
    if end.is_some_and(|end| end < start) {
        return None;
    }

    Some((start, end))
}

/// Infer the MIME type from the file extension.
pub fn content_type_for(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default();

    match ext.as_str() {
        "mp4" => "video/mp4",
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        _ => "application/octet-stream",
    }
}

/// Serve `file_path`, honouring a single `Range` header.
///
/// Reads are done in 64KB chunks so memory stays bounded regardless of file
/// size.
///
/// # Errors
///
/// [`mb_core::Error::NotFound`] if the path is missing or is a directory,
/// [`mb_core::Error::Filesystem`] if it cannot be opened or seeked.
pub async fn serve_file(
    file_path: &Path,
    range_header: Option<&str>,
) -> mb_core::Result<Response> {
    let metadata = match tokio::fs::metadata(file_path).await {
        Ok(m) if m.is_file() => m,
        Ok(_) => return Err(mb_core::Error::not_found("file", file_path.display())),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(mb_core::Error::not_found("file", file_path.display()))
        }
        Err(e) => return Err(mb_core::Error::filesystem(file_path, e)),
    };

    let file_size = metadata.len();
    let content_type = content_type_for(file_path);

    let mut file = tokio::fs::File::open(file_path)
        .await
        .map_err(|e| mb_core::Error::filesystem(file_path, e))?;

    let Some((start, end_opt)) = range_header.and_then(parse_range_header) else {
        let stream = ReaderStream::with_capacity(file, CHUNK_SIZE);
        return Ok((
            StatusCode::OK,
            [
                (header::CONTENT_TYPE, content_type.to_string()),
                (header::CONTENT_LENGTH, file_size.to_string()),
                (header::ACCEPT_RANGES, "bytes".to_string()),
            ],
            Body::from_stream(stream),
        )
            .into_response());
    };

    let Some(last) = file_size.checked_sub(1) else {
        return Ok(range_not_satisfiable(file_size));
    };
    let end = end_opt.unwrap_or(last).min(last);
    if start > end {
        return Ok(range_not_satisfiable(file_size));
    }

    let length = end - start + 1;
    file.seek(std::io::SeekFrom::Start(start))
        .await
        .map_err(|e| mb_core::Error::filesystem(file_path, e))?;

    // Limit reads to exactly `length` bytes.
    let stream = ReaderStream::with_capacity(file.take(length), CHUNK_SIZE);

    Ok((
        StatusCode::PARTIAL_CONTENT,
        [
            (header::CONTENT_TYPE, content_type.to_string()),
            (
                header::CONTENT_RANGE,
                format!("bytes {start}-{end}/{file_size}"),
            ),
            (header::CONTENT_LENGTH, length.to_string()),
            (header::ACCEPT_RANGES, "bytes".to_string()),
        ],
        Body::from_stream(stream),
    )
        .into_response())
}

fn range_not_satisfiable(file_size: u64) -> Response {
    (
        StatusCode::RANGE_NOT_SATISFIABLE,
        [
            (header::CONTENT_RANGE, format!("bytes */{file_size}")),
            (header::ACCEPT_RANGES, "bytes".to_string()),
        ],
        Body::empty(),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    async fn body_bytes(response: Response) -> Vec<u8> {
        response
            .into_body()
            .collect()
            .await
            .unwrap()
            .to_bytes()
            .to_vec()
    }

    #[test]
    fn parse_range_full() {
        assert_eq!(parse_range_header("bytes=0-999"), Some((0, Some(999))));
    }

    #[test]
    fn parse_range_open_end() {
        assert_eq!(parse_range_header("bytes=500-"), Some((500, None)));
    }

    #[test]
    fn parse_range_invalid() {
        assert!(parse_range_header("invalid").is_none());
        assert!(parse_range_header("bytes=abc-def").is_none());
        assert!(parse_range_header("bytes=-500").is_none());
        assert!(parse_range_header("bytes=0-1,5-6").is_none());
    }

    #[test]
    fn parse_range_inverted() {
        assert!(parse_range_header("bytes=5-3").is_none());
        assert_eq!(parse_range_header("bytes=5-5"), Some((5, Some(5))));
    }

    #[test]
    fn content_types() {
        assert_eq!(content_type_for(Path::new("a/clip.mp4")), "video/mp4");
        assert_eq!(content_type_for(Path::new("a/clip.MP4")), "video/mp4");
        assert_eq!(content_type_for(Path::new("shot.jpg")), "image/jpeg");
        assert_eq!(content_type_for(Path::new("shot.jpeg")), "image/jpeg");
        assert_eq!(content_type_for(Path::new("shot.png")), "image/png");
        assert_eq!(
            content_type_for(Path::new("movie.mkv")),
            "application/octet-stream"
        );
        assert_eq!(
            content_type_for(Path::new("README")),
            "application/octet-stream"
        );
    }

    #[tokio::test]
    async fn serves_whole_file_without_range() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("clip.mp4");
        std::fs::write(&path, b"0123456789").unwrap();

        let response = serve_file(&path, None).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "video/mp4");
        assert_eq!(response.headers()[header::CONTENT_LENGTH], "10");
        assert_eq!(body_bytes(response).await, b"0123456789");
    }

    #[tokio::test]
    async fn serves_requested_range() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("clip.mp4");
        std::fs::write(&path, b"0123456789").unwrap();

        let response = serve_file(&path, Some("bytes=2-5")).await.unwrap();
        assert_eq!(response.status(), StatusCode::PARTIAL_CONTENT);
        assert_eq!(response.headers()[header::CONTENT_RANGE], "bytes 2-5/10");
        assert_eq!(body_bytes(response).await, b"2345");
    }

    #[tokio::test]
    async fn clamps_range_end_to_file_size() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("clip.mp4");
        std::fs::write(&path, b"0123456789").unwrap();

        let response = serve_file(&path, Some("bytes=7-100")).await.unwrap();
        assert_eq!(response.headers()[header::CONTENT_RANGE], "bytes 7-9/10");
        assert_eq!(body_bytes(response).await, b"789");
    }

    #[tokio::test]
    async fn inverted_range_serves_whole_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("clip.mp4");
        std::fs::write(&path, b"0123456789").unwrap();

        let response = serve_file(&path, Some("bytes=5-3")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().get(header::CONTENT_RANGE).is_none());
        assert_eq!(response.headers()[header::CONTENT_LENGTH], "10");
        assert_eq!(body_bytes(response).await, b"0123456789");
    }

    #[tokio::test]
    async fn range_past_end_is_416() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("clip.mp4");
        std::fs::write(&path, b"0123456789").unwrap();

        let response = serve_file(&path, Some("bytes=10-")).await.unwrap();
        assert_eq!(response.status(), StatusCode::RANGE_NOT_SATISFIABLE);
        assert_eq!(response.headers()[header::CONTENT_RANGE], "bytes */10");
    }

    #[tokio::test]
    async fn range_on_empty_file_is_416() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.mp4");
        std::fs::write(&path, b"").unwrap();

        let response = serve_file(&path, Some("bytes=0-")).await.unwrap();
        assert_eq!(response.status(), StatusCode::RANGE_NOT_SATISFIABLE);
    }

    #[tokio::test]
    async fn directory_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let err = serve_file(dir.path(), None).await.unwrap_err();
        assert_eq!(err.http_status(), 404);
    }
}
