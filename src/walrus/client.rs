// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Mintgate

//! Walrus HTTP client.
//!
//! Writes retry on retryable conditions only (5xx and transport failures)
//! with a bounded attempt count and exponential backoff; 4xx and id-less
//! responses fail immediately. Reads are a single pass-through request,
//! cheap for the caller or a CDN to retry.

use std::time::Duration;

use reqwest::{header, Client, StatusCode};
use serde_json::Value;

use super::RetentionPolicy;
use crate::config::WalrusConfig;
use crate::error::truncate_upstream;

#[derive(Debug, thiserror::Error)]
pub enum BlobStoreError {
    #[error("blob of {size} bytes exceeds the {limit} byte ceiling")]
    TooLarge { size: usize, limit: usize },

    /// The publisher refused the request (4xx). Retrying will not help.
    #[error("blob store rejected the request: {0}")]
    Rejected(String),

    /// Retryable failures exhausted the attempt budget.
    #[error("blob store unavailable: {0}")]
    Unavailable(String),

    #[error("blob store returned an invalid response: {0}")]
    InvalidResponse(String),

    #[error("blob not found: {0}")]
    NotFound(String),
}

/// Outcome of a stored blob.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredBlob {
    pub blob_id: String,
    pub size: usize,
}

/// Bytes read back from the aggregator.
#[derive(Debug, Clone)]
pub struct FetchedBlob {
    pub bytes: Vec<u8>,
    pub content_type: String,
}

/// One attempt's failure, split by whether another attempt makes sense.
enum AttemptError {
    Retryable(String),
    Fatal(BlobStoreError),
}

/// Client for a Walrus publisher/aggregator pair.
#[derive(Debug, Clone)]
pub struct WalrusClient {
    publisher_url: String,
    aggregator_url: String,
    max_blob_bytes: usize,
    store_attempts: u32,
    retry_base_delay: Duration,
    attempt_timeout: Duration,
    http: Client,
}

impl WalrusClient {
    pub fn new(config: &WalrusConfig) -> Result<Self, BlobStoreError> {
        let http = Client::builder()
            .build()
            .map_err(|e| BlobStoreError::Unavailable(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            publisher_url: config.publisher_url.trim_end_matches('/').to_string(),
            aggregator_url: config.aggregator_url.trim_end_matches('/').to_string(),
            max_blob_bytes: config.max_blob_bytes,
            store_attempts: config.store_attempts.max(1),
            retry_base_delay: config.retry_base_delay,
            attempt_timeout: config.attempt_timeout,
            http,
        })
    }

    /// Upload a blob under an explicit retention policy and return its
    /// content-derived id.
    pub async fn store(
        &self,
        bytes: &[u8],
        content_type: &str,
        retention: RetentionPolicy,
    ) -> Result<StoredBlob, BlobStoreError> {
        if bytes.len() > self.max_blob_bytes {
            return Err(BlobStoreError::TooLarge {
                size: bytes.len(),
                limit: self.max_blob_bytes,
            });
        }

        let url = format!("{}/v1/blobs", self.publisher_url);
        let mut last_failure = String::new();

        for attempt in 0..self.store_attempts {
            if attempt > 0 {
                let delay = self.retry_base_delay * 2u32.pow(attempt - 1);
                tokio::time::sleep(delay).await;
            }

            match self
                .try_store(&url, bytes, content_type, retention)
                .await
            {
                Ok(stored) => {
                    tracing::info!(
                        blob_id = %stored.blob_id,
                        size = stored.size,
                        %retention,
                        attempt = attempt + 1,
                        "blob stored"
                    );
                    return Ok(stored);
                }
                Err(AttemptError::Fatal(err)) => return Err(err),
                Err(AttemptError::Retryable(msg)) => {
                    tracing::warn!(attempt = attempt + 1, failure = %msg, "blob store attempt failed");
                    last_failure = msg;
                }
            }
        }

        Err(BlobStoreError::Unavailable(last_failure))
    }

    async fn try_store(
        &self,
        url: &str,
        bytes: &[u8],
        content_type: &str,
        retention: RetentionPolicy,
    ) -> Result<StoredBlob, AttemptError> {
        let response = self
            .http
            .put(url)
            .query(&[retention.query_param()])
            .header(header::CONTENT_TYPE, content_type)
            .body(bytes.to_vec())
            .timeout(self.attempt_timeout)
            .send()
            .await
            .map_err(|e| AttemptError::Retryable(format!("publisher request failed: {e}")))?;

        let status = response.status();
        if status.is_server_error() {
            let body = response.text().await.unwrap_or_default();
            return Err(AttemptError::Retryable(format!(
                "publisher returned {status}: {}",
                truncate_upstream(&body)
            )));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AttemptError::Fatal(BlobStoreError::Rejected(format!(
                "publisher returned {status}: {}",
                truncate_upstream(&body)
            ))));
        }

        let body: Value = response.json().await.map_err(|e| {
            AttemptError::Fatal(BlobStoreError::InvalidResponse(format!(
                "publisher response was not JSON: {e}"
            )))
        })?;

        match extract_blob_id(&body) {
            Some(blob_id) => Ok(StoredBlob {
                blob_id,
                size: bytes.len(),
            }),
            None => Err(AttemptError::Fatal(BlobStoreError::InvalidResponse(
                "publisher response missing blob id".to_string(),
            ))),
        }
    }

    /// Read a blob back from the aggregator. No retry: reads are cheap to
    /// retry at the caller or CDN layer.
    pub async fn fetch(&self, blob_id: &str) -> Result<FetchedBlob, BlobStoreError> {
        let url = format!("{}/v1/blobs/{blob_id}", self.aggregator_url);
        let response = self
            .http
            .get(&url)
            .timeout(self.attempt_timeout)
            .send()
            .await
            .map_err(|e| BlobStoreError::Unavailable(format!("aggregator request failed: {e}")))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(BlobStoreError::NotFound(blob_id.to_string()));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(BlobStoreError::Unavailable(format!(
                "aggregator returned {status}: {}",
                truncate_upstream(&body)
            )));
        }

        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("application/octet-stream")
            .to_string();
        let bytes = response
            .bytes()
            .await
            .map_err(|e| BlobStoreError::Unavailable(format!("aggregator body read failed: {e}")))?
            .to_vec();

        Ok(FetchedBlob {
            bytes,
            content_type,
        })
    }
}

/// Blob id from a publisher response. The publisher answers with
/// `newlyCreated` for fresh uploads and `alreadyCertified` for blobs it
/// has seen before.
fn extract_blob_id(response: &Value) -> Option<String> {
    response
        .pointer("/newlyCreated/blobObject/blobId")
        .and_then(Value::as_str)
        .or_else(|| response.pointer("/alreadyCertified/blobId").and_then(Value::as_str))
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::extract::Query;
    use axum::{http::StatusCode, routing::get, routing::put, Json, Router};
    use std::collections::HashMap;
    use std::net::SocketAddr;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    fn config(addr: SocketAddr) -> WalrusConfig {
        WalrusConfig {
            publisher_url: format!("http://{addr}"),
            aggregator_url: format!("http://{addr}"),
            default_retention: RetentionPolicy::Epochs(5),
            max_blob_bytes: 1024,
            store_attempts: 3,
            retry_base_delay: Duration::from_millis(10),
            attempt_timeout: Duration::from_secs(2),
        }
    }

    async fn spawn_backend(router: Router) -> SocketAddr {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        addr
    }

    #[test]
    fn extract_blob_id_handles_both_publisher_shapes() {
        let newly = serde_json::json!({
            "newlyCreated": {"blobObject": {"blobId": "id-1", "size": 3}}
        });
        assert_eq!(extract_blob_id(&newly).as_deref(), Some("id-1"));

        let certified = serde_json::json!({"alreadyCertified": {"blobId": "id-2"}});
        assert_eq!(extract_blob_id(&certified).as_deref(), Some("id-2"));

        assert_eq!(extract_blob_id(&serde_json::json!({"ok": true})), None);
    }

    #[tokio::test]
    async fn oversized_blob_is_rejected_locally() {
        // Never dials: the publisher address is unreachable on purpose.
        let mut cfg = config("127.0.0.1:1".parse().unwrap());
        cfg.max_blob_bytes = 4;
        let client = WalrusClient::new(&cfg).unwrap();

        let err = client
            .store(&[0u8; 5], "image/png", RetentionPolicy::Permanent)
            .await
            .unwrap_err();
        assert!(matches!(err, BlobStoreError::TooLarge { size: 5, limit: 4 }));
    }

    #[tokio::test]
    async fn store_sends_exactly_one_retention_parameter() {
        let seen: Arc<Mutex<Vec<HashMap<String, String>>>> = Arc::new(Mutex::new(Vec::new()));
        let seen_handler = seen.clone();
        let app = Router::new().route(
            "/v1/blobs",
            put(move |Query(params): Query<HashMap<String, String>>| {
                let seen = seen_handler.clone();
                async move {
                    seen.lock().unwrap().push(params);
                    Json(serde_json::json!({
                        "newlyCreated": {"blobObject": {"blobId": "blob-xyz"}}
                    }))
                }
            }),
        );
        let addr = spawn_backend(app).await;
        let client = WalrusClient::new(&config(addr)).unwrap();

        let stored = client
            .store(b"png-bytes", "image/png", RetentionPolicy::Epochs(2))
            .await
            .unwrap();
        assert_eq!(stored.blob_id, "blob-xyz");
        assert_eq!(stored.size, 9);

        let recorded = seen.lock().unwrap();
        assert_eq!(recorded.len(), 1);
        assert_eq!(recorded[0].len(), 1);
        assert_eq!(recorded[0].get("epochs").map(String::as_str), Some("2"));
    }

    #[tokio::test]
    async fn store_retries_5xx_exactly_max_attempts_then_classifies_retryable() {
        let hits = Arc::new(AtomicUsize::new(0));
        let hits_handler = hits.clone();
        let app = Router::new().route(
            "/v1/blobs",
            put(move || {
                let hits = hits_handler.clone();
                async move {
                    hits.fetch_add(1, Ordering::SeqCst);
                    StatusCode::SERVICE_UNAVAILABLE
                }
            }),
        );
        let addr = spawn_backend(app).await;
        let client = WalrusClient::new(&config(addr)).unwrap();

        let err = client
            .store(b"data", "image/png", RetentionPolicy::Deletable)
            .await
            .unwrap_err();
        assert!(matches!(err, BlobStoreError::Unavailable(_)));
        assert_eq!(hits.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn store_fails_immediately_on_4xx() {
        let hits = Arc::new(AtomicUsize::new(0));
        let hits_handler = hits.clone();
        let app = Router::new().route(
            "/v1/blobs",
            put(move || {
                let hits = hits_handler.clone();
                async move {
                    hits.fetch_add(1, Ordering::SeqCst);
                    (StatusCode::NOT_FOUND, "no such bucket")
                }
            }),
        );
        let addr = spawn_backend(app).await;
        let client = WalrusClient::new(&config(addr)).unwrap();

        let err = client
            .store(b"data", "image/png", RetentionPolicy::Permanent)
            .await
            .unwrap_err();
        assert!(matches!(err, BlobStoreError::Rejected(msg) if msg.contains("404")));
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn store_fails_immediately_on_id_less_response() {
        let app = Router::new().route(
            "/v1/blobs",
            put(|| async { Json(serde_json::json!({"status": "ok"})) }),
        );
        let addr = spawn_backend(app).await;
        let client = WalrusClient::new(&config(addr)).unwrap();

        let err = client
            .store(b"data", "image/png", RetentionPolicy::Permanent)
            .await
            .unwrap_err();
        assert!(matches!(err, BlobStoreError::InvalidResponse(msg) if msg.contains("blob id")));
    }

    #[tokio::test]
    async fn fetch_returns_bytes_and_content_type() {
        let app = Router::new().route(
            "/v1/blobs/{blob_id}",
            get(|| async { ([(header::CONTENT_TYPE, "image/webp")], b"artwork".to_vec()) }),
        );
        let addr = spawn_backend(app).await;
        let client = WalrusClient::new(&config(addr)).unwrap();

        let blob = client.fetch("blob-1").await.unwrap();
        assert_eq!(blob.bytes, b"artwork");
        assert_eq!(blob.content_type, "image/webp");
    }

    #[tokio::test]
    async fn fetch_maps_missing_blob_to_not_found() {
        let app = Router::new().route(
            "/v1/blobs/{blob_id}",
            get(|| async { StatusCode::NOT_FOUND }),
        );
        let addr = spawn_backend(app).await;
        let client = WalrusClient::new(&config(addr)).unwrap();

        let err = client.fetch("missing").await.unwrap_err();
        assert!(matches!(err, BlobStoreError::NotFound(id) if id == "missing"));
    }
}
