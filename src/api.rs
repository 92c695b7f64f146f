//! Client for the remote document service.
//!
//! [`DocumentService`] names the six calls the interaction core relies on.
//! [`HttpBackend`] implements them over HTTP with `reqwest`; tests swap in
//! in-memory implementations.
//!
//! # Endpoints
//!
//! | Method | Path | Response |
//! |--------|------|----------|
//! | `GET`    | `/documents` | list of documents |
//! | `GET`    | `/stats` | aggregate statistics |
//! | `POST`   | `/upload` | created document (multipart field `file`) |
//! | `POST`   | `/search` | `{ "documents": [...] }` |
//! | `GET`    | `/document/{id}` | one document with content |
//! | `DELETE` | `/document/{id}` | acknowledgement |
//!
//! # Error Contract
//!
//! Failed calls carry `{ "detail": "..." }`. The detail surfaces through
//! [`ApiError::detail`]; callers fall back to a generic message otherwise.
//!
//! Every call has a timeout (from `[backend]` config) and can be cancelled
//! with [`HttpBackend::cancel_in_flight`].

use async_trait::async_trait;
use bytes::Bytes;
use parking_lot::Mutex;
use reqwest::{multipart, Body, Response, StatusCode};
use serde::de::DeserializeOwned;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use crate::config::BackendConfig;
use crate::models::{Acknowledgement, Document, SearchRequest, SearchResponse, Stats};
use crate::upload::UploadFile;

/// Callback receiving `(bytes_sent, bytes_total)` while an upload body is sent.
pub type ProgressFn = Arc<dyn Fn(u64, u64) + Send + Sync>;

/// Failure of a single service call.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("service returned {status}{}", .detail.as_ref().map(|d| format!(": {}", d)).unwrap_or_default())]
    Status {
        status: StatusCode,
        detail: Option<String>,
    },
    #[error("request timed out")]
    Timeout,
    #[error("request cancelled")]
    Cancelled,
    #[error("transport error: {0}")]
    Transport(String),
    #[error("invalid response: {0}")]
    Decode(String),
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl ApiError {
    /// The `detail` message supplied by the service, if any.
    pub fn detail(&self) -> Option<&str> {
        match self {
            ApiError::Status { detail, .. } => detail.as_deref(),
            _ => None,
        }
    }

    /// The service detail, or `fallback` when none was provided.
    pub fn user_message(&self, fallback: &str) -> String {
        self.detail().unwrap_or(fallback).to_string()
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            ApiError::Timeout
        } else if e.is_decode() {
            ApiError::Decode(e.to_string())
        } else {
            ApiError::Transport(e.to_string())
        }
    }
}

/// The backend contract consumed by the controllers.
#[async_trait]
pub trait DocumentService: Send + Sync {
    async fn list_documents(&self) -> Result<Vec<Document>, ApiError>;

    async fn stats(&self) -> Result<Stats, ApiError>;

    /// Submit one file. `progress` is invoked as body bytes are handed to
    /// the transport.
    async fn upload(&self, file: &UploadFile, progress: ProgressFn) -> Result<Document, ApiError>;

    async fn search(&self, request: &SearchRequest) -> Result<SearchResponse, ApiError>;

    async fn get_document(&self, id: &str) -> Result<Document, ApiError>;

    async fn delete_document(&self, id: &str) -> Result<Acknowledgement, ApiError>;
}

/// HTTP implementation of [`DocumentService`].
pub struct HttpBackend {
    base_url: String,
    client: reqwest::Client,
    chunk_size: usize,
    cancel: Mutex<CancellationToken>,
}

impl HttpBackend {
    pub fn new(config: &BackendConfig, chunk_size: usize) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .build()?;

        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            client,
            chunk_size: chunk_size.max(1),
            cancel: Mutex::new(CancellationToken::new()),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Abort every call currently in flight. Later calls are unaffected.
    pub fn cancel_in_flight(&self) {
        let mut token = self.cancel.lock();
        token.cancel();
        *token = CancellationToken::new();
    }

    /// `GET /` on the service root.
    pub async fn health(&self) -> Result<Acknowledgement, ApiError> {
        let resp = self
            .guarded(self.client.get(self.url("/")).send())
            .await?;
        decode(resp).await
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn guarded<F>(&self, call: F) -> Result<Response, ApiError>
    where
        F: Future<Output = Result<Response, reqwest::Error>>,
    {
        let token = self.cancel.lock().clone();
        tokio::select! {
            _ = token.cancelled() => Err(ApiError::Cancelled),
            resp = call => Ok(resp?),
        }
    }
}

#[async_trait]
impl DocumentService for HttpBackend {
    async fn list_documents(&self) -> Result<Vec<Document>, ApiError> {
        let resp = self
            .guarded(self.client.get(self.url("/documents")).send())
            .await?;
        decode(resp).await
    }

    async fn stats(&self) -> Result<Stats, ApiError> {
        let resp = self
            .guarded(self.client.get(self.url("/stats")).send())
            .await?;
        decode(resp).await
    }

    async fn upload(&self, file: &UploadFile, progress: ProgressFn) -> Result<Document, ApiError> {
        let total = file.bytes.len() as u64;
        if total == 0 {
            progress(0, 0);
        }

        let chunks: Vec<Bytes> = file
            .bytes
            .chunks(self.chunk_size)
            .map(Bytes::copy_from_slice)
            .collect();
        let mut sent = 0u64;
        let stream = futures_util::stream::iter(chunks.into_iter().map(move |chunk| {
            sent += chunk.len() as u64;
            progress(sent, total);
            Ok::<Bytes, std::io::Error>(chunk)
        }));

        let part = multipart::Part::stream_with_length(Body::wrap_stream(stream), total)
            .file_name(file.name.clone())
            .mime_str(file.mime_type())?;
        let form = multipart::Form::new().part("file", part);

        let resp = self
            .guarded(self.client.post(self.url("/upload")).multipart(form).send())
            .await?;
        decode(resp).await
    }

    async fn search(&self, request: &SearchRequest) -> Result<SearchResponse, ApiError> {
        let resp = self
            .guarded(self.client.post(self.url("/search")).json(request).send())
            .await?;
        decode(resp).await
    }

    async fn get_document(&self, id: &str) -> Result<Document, ApiError> {
        let path = format!("/document/{}", urlencoding::encode(id));
        let resp = self.guarded(self.client.get(self.url(&path)).send()).await?;
        decode(resp).await
    }

    async fn delete_document(&self, id: &str) -> Result<Acknowledgement, ApiError> {
        let path = format!("/document/{}", urlencoding::encode(id));
        let resp = self
            .guarded(self.client.delete(self.url(&path)).send())
            .await?;
        decode(resp).await
    }
}

/// Turn a response into `T`, or into [`ApiError::Status`] carrying the
/// service's `detail` when the status is not a success.
async fn decode<T: DeserializeOwned>(resp: Response) -> Result<T, ApiError> {
    let status = resp.status();
    if status.is_success() {
        return resp.json::<T>().await.map_err(|e| ApiError::Decode(e.to_string()));
    }

    let body = resp.text().await.unwrap_or_default();
    Err(ApiError::Status {
        status,
        detail: extract_detail(&body),
    })
}

/// Pull a string `detail` out of an error body. Structured details (such as
/// validation error lists) count as absent.
fn extract_detail(body: &str) -> Option<String> {
    let json: serde_json::Value = serde_json::from_str(body).ok()?;
    json.get("detail")
        .and_then(|d| d.as_str())
        .map(|s| s.to_string())
        .filter(|s| !s.is_empty())
}
