// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Mintgate

//! Blob ingestion and serving.

use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::{header, HeaderMap},
    response::{IntoResponse, Response},
    Json,
};

use crate::{
    auth::UploadAuth,
    error::ApiError,
    models::{StoreBlobParams, StoreBlobResponse, StoredBlobData},
    state::AppState,
    walrus::RetentionPolicy,
};

/// Stored content is addressed by its hash, so it never changes.
const IMMUTABLE_CACHE_CONTROL: &str = "public, max-age=31536000, immutable";

/// Ingest a blob into the store under an explicit retention policy.
#[utoipa::path(
    post,
    path = "/api/walrus/store",
    params(StoreBlobParams),
    request_body(content = Vec<u8>, description = "Raw blob bytes", content_type = "application/octet-stream"),
    tag = "Blobs",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Blob stored", body = StoreBlobResponse),
        (status = 400, description = "Conflicting retention selection or oversized blob"),
        (status = 401, description = "Missing or invalid upload token"),
        (status = 502, description = "Blob store failure"),
    )
)]
pub async fn store_blob(
    UploadAuth(claims): UploadAuth,
    State(state): State<AppState>,
    Query(params): Query<StoreBlobParams>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<StoreBlobResponse>, ApiError> {
    let retention = select_retention(&params, state.default_retention)?;
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("application/octet-stream")
        .to_string();

    tracing::info!(
        uploader = %claims.sub,
        size = body.len(),
        %retention,
        "storing blob"
    );

    let stored = state.walrus.store(&body, &content_type, retention).await?;
    Ok(Json(StoreBlobResponse {
        success: true,
        data: StoredBlobData {
            blob_id: stored.blob_id,
            content_type,
            size: stored.size,
        },
    }))
}

/// Serve a stored blob with its original content type and an immutable
/// cache header.
#[utoipa::path(
    get,
    path = "/walrus/blobs/{blob_id}",
    params(("blob_id" = String, Path, description = "Content-derived blob identifier")),
    tag = "Blobs",
    responses(
        (status = 200, description = "Blob bytes"),
        (status = 404, description = "Unknown blob"),
    )
)]
pub async fn serve_blob(
    State(state): State<AppState>,
    Path(blob_id): Path<String>,
) -> Result<Response, ApiError> {
    let blob = state.walrus.fetch(&blob_id).await?;
    Ok((
        [
            (header::CONTENT_TYPE, blob.content_type),
            (
                header::CACHE_CONTROL,
                IMMUTABLE_CACHE_CONTROL.to_string(),
            ),
        ],
        blob.bytes,
    )
        .into_response())
}

/// Resolve the retention selection: at most one policy may be chosen;
/// none falls back to the configured default. Either way exactly one
/// explicit policy goes upstream.
fn select_retention(
    params: &StoreBlobParams,
    default: RetentionPolicy,
) -> Result<RetentionPolicy, ApiError> {
    let selected = [
        params.epochs.is_some(),
        params.permanent == Some(true),
        params.deletable == Some(true),
    ]
    .iter()
    .filter(|&&s| s)
    .count();

    if selected > 1 {
        return Err(ApiError::bad_request(
            "at most one of epochs, permanent, deletable may be selected",
        ));
    }

    if let Some(epochs) = params.epochs {
        if epochs == 0 {
            return Err(ApiError::bad_request("epochs must be at least 1"));
        }
        return Ok(RetentionPolicy::Epochs(epochs));
    }
    if params.permanent == Some(true) {
        return Ok(RetentionPolicy::Permanent);
    }
    if params.deletable == Some(true) {
        return Ok(RetentionPolicy::Deletable);
    }
    Ok(default)
}
