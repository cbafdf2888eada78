//! Shared test harness for integration tests.
//!
//! Provides [`TestHarness`], which owns a scratch media root and a full
//! [`AppContext`] whose edits go through [`RecordingTranscoder`] instead of
//! ffmpeg. [`TestHarness::with_server`] starts Axum on a random port for
//! HTTP-level testing.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use tower::ServiceExt;

use mb_av::{ToolRegistry, Transcoder};
use mb_core::{MediaRoot, Timecode};
use mb_server::context::AppContext;
use mb_server::router::build_router;

/// One call seen by [`RecordingTranscoder`].
#[derive(Debug, Clone, PartialEq)]
pub enum ToolCall {
    Extract {
        output: PathBuf,
        start_seconds: i64,
        duration_seconds: u64,
    },
    Concat {
        manifest: String,
        output: PathBuf,
    },
}

/// Stand-in for ffmpeg: writes a small file at every output path and records
/// the call. With `fail_on` set, the N-th call (1-based) leaves its partial
/// output behind and fails.
#[derive(Default)]
pub struct RecordingTranscoder {
    pub fail_on: Option<usize>,
    calls: Mutex<Vec<ToolCall>>,
}

impl RecordingTranscoder {
    pub fn failing_on(call: usize) -> Self {
        Self {
            fail_on: Some(call),
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<ToolCall> {
        self.calls.lock().unwrap().clone()
    }

    fn finish(&self, call: ToolCall, output: &Path) -> mb_core::Result<()> {
        let n = {
            let mut calls = self.calls.lock().unwrap();
            calls.push(call);
            calls.len()
        };
        std::fs::write(output, b"clip").unwrap();
        if self.fail_on == Some(n) {
            return Err(mb_core::Error::tool("ffmpeg", "exit status: 1"));
        }
        Ok(())
    }
}

#[async_trait]
impl Transcoder for RecordingTranscoder {
    async fn extract_range(
        &self,
        _source: &Path,
        output: &Path,
        start: Timecode,
        duration_seconds: u64,
    ) -> mb_core::Result<()> {
        self.finish(
            ToolCall::Extract {
                output: output.to_path_buf(),
                start_seconds: start.total_seconds(),
                duration_seconds,
            },
            output,
        )
    }

    async fn concat(&self, manifest: &Path, output: &Path) -> mb_core::Result<()> {
        let manifest_text = std::fs::read_to_string(manifest).unwrap();
        self.finish(
            ToolCall::Concat {
                manifest: manifest_text,
                output: output.to_path_buf(),
            },
            output,
        )
    }
}

/// Test harness wrapping a scratch media root and a fully-constructed
/// [`AppContext`].
pub struct TestHarness {
    pub dir: tempfile::TempDir,
    pub ctx: AppContext,
    pub transcoder: Arc<RecordingTranscoder>,
    static_dir: Option<PathBuf>,
}

impl TestHarness {
    pub fn new() -> Self {
        Self::with_transcoder(RecordingTranscoder::default())
    }

    pub fn with_transcoder(transcoder: RecordingTranscoder) -> Self {
        let dir = tempfile::tempdir().expect("failed to create media root");
        let root = Arc::new(MediaRoot::new(dir.path()).expect("tempdir is absolute"));
        let transcoder = Arc::new(transcoder);

        let ctx = AppContext::with_transcoder(
            root,
            Arc::new(ToolRegistry::default()),
            transcoder.clone(),
        );

        Self {
            dir,
            ctx,
            transcoder,
            static_dir: None,
        }
    }

    /// Serve `static_dir` as the web UI.
    pub fn with_static_dir(mut self, static_dir: PathBuf) -> Self {
        self.static_dir = Some(static_dir);
        self
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    /// Write `contents` at `relative`, creating parent directories.
    pub fn write(&self, relative: &str, contents: &[u8]) -> PathBuf {
        let path = self.root().join(relative);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(&path, contents).unwrap();
        path
    }

    pub fn mkdir(&self, relative: &str) -> PathBuf {
        let path = self.root().join(relative);
        std::fs::create_dir_all(&path).unwrap();
        path
    }

    pub fn router(&self) -> Router {
        build_router(self.ctx.clone(), self.static_dir.clone())
    }

    /// Send one request through a fresh router.
    pub async fn send(&self, request: Request<Body>) -> Response<Body> {
        self.router().oneshot(request).await.unwrap()
    }

    /// Start an Axum server on a random port and return the bound address.
    pub async fn serve(&self) -> SocketAddr {
        let app = self.router();
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind random port");
        let addr = listener.local_addr().expect("failed to get local addr");

        tokio::spawn(async move {
            axum::serve(listener, app).await.ok();
        });

        addr
    }
}

/// Helper to get response body as string.
pub async fn body_to_string(body: Body) -> String {
    let bytes = body.collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

pub async fn body_to_json(body: Body) -> serde_json::Value {
    let bytes = body.collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// Names of leftover edit workspaces directly inside `dir`.
pub fn workspace_residue(dir: &Path) -> Vec<String> {
    std::fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .filter(|name| name.starts_with(mb_av::workspace::WORKSPACE_PREFIX))
        .collect()
}
