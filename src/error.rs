// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Mintgate

//! HTTP boundary errors.
//!
//! Every failure leaving the service is an [`ApiError`] rendered as the
//! `{success:false, error}` envelope. Domain errors (`MintError`,
//! `BlobStoreError`) convert into it with stable, user-safe messages;
//! upstream error text is truncated before it reaches a response body.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::mint::MintError;
use crate::walrus::BlobStoreError;

/// Upstream error text is capped at this many bytes in responses.
const UPSTREAM_TEXT_CAP: usize = 256;

#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

#[derive(Serialize)]
struct ErrorBody {
    success: bool,
    error: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }

    pub fn bad_gateway(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_GATEWAY, message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(ErrorBody {
            success: false,
            error: self.message,
        });
        (self.status, body).into_response()
    }
}

impl From<MintError> for ApiError {
    fn from(err: MintError) -> Self {
        match &err {
            MintError::InvalidAddress
            | MintError::EventNotActive
            | MintError::AlreadyMinted
            | MintError::MintInProgress
            | MintError::CapReached
            | MintError::InvalidSignature => Self::bad_request(err.to_string()),
            MintError::EventNotFound => Self::not_found(err.to_string()),
            MintError::Ledger(_) => Self::internal(err.to_string()),
            MintError::SponsorTimeout => Self::bad_gateway(err.to_string()),
            MintError::SponsorUpstream(_) => Self::bad_gateway(truncate_upstream(&err.to_string())),
        }
    }
}

impl From<BlobStoreError> for ApiError {
    fn from(err: BlobStoreError) -> Self {
        match &err {
            BlobStoreError::TooLarge { .. } => Self::bad_request(err.to_string()),
            BlobStoreError::NotFound(_) => Self::not_found(err.to_string()),
            BlobStoreError::Rejected(_)
            | BlobStoreError::Unavailable(_)
            | BlobStoreError::InvalidResponse(_) => {
                Self::bad_gateway(truncate_upstream(&err.to_string()))
            }
        }
    }
}

/// Cap upstream error text so response bodies stay small and do not leak
/// internal detail wholesale.
pub fn truncate_upstream(text: &str) -> String {
    if text.len() <= UPSTREAM_TEXT_CAP {
        return text.to_string();
    }
    let mut end = UPSTREAM_TEXT_CAP;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}…", &text[..end])
}
