// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Mintgate

//! Upload authentication.
//!
//! Blob ingestion is operator-facing, so `POST /api/walrus/store` requires
//! a bearer JWT signed with the configured HS256 secret. When no secret is
//! configured the endpoint fails closed. Use the `UploadAuth` extractor in
//! handlers to require it:
//!
//! ```rust,ignore
//! async fn store_blob(UploadAuth(claims): UploadAuth, ...) -> impl IntoResponse {
//!     // claims.sub identifies the uploader
//! }
//! ```

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};

use crate::state::AppState;

/// Claims carried by an upload token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadClaims {
    /// Uploader identity, recorded in logs.
    pub sub: String,
    /// Expiration timestamp (unix seconds).
    pub exp: u64,
}

/// Authentication error for upload requests.
#[derive(Debug)]
pub enum AuthError {
    /// No Authorization header present.
    MissingAuthHeader,
    /// Header is not `Bearer <token>`.
    InvalidAuthHeader,
    /// Token failed validation (signature, expiry, structure).
    InvalidToken(String),
    /// No upload secret configured; uploads are disabled.
    NotConfigured,
}

impl AuthError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::MissingAuthHeader
            | AuthError::InvalidAuthHeader
            | AuthError::InvalidToken(_)
            | AuthError::NotConfigured => StatusCode::UNAUTHORIZED,
        }
    }
}

impl std::fmt::Display for AuthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuthError::MissingAuthHeader => write!(f, "Authorization header is required"),
            AuthError::InvalidAuthHeader => {
                write!(f, "Invalid authorization header format (expected 'Bearer <token>')")
            }
            AuthError::InvalidToken(msg) => write!(f, "Invalid upload token: {msg}"),
            AuthError::NotConfigured => write!(f, "Uploads are not enabled on this deployment"),
        }
    }
}

impl std::error::Error for AuthError {}

#[derive(Serialize)]
struct AuthErrorBody {
    success: bool,
    error: String,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let body = Json(AuthErrorBody {
            success: false,
            error: self.to_string(),
        });
        (self.status_code(), body).into_response()
    }
}

/// Extractor requiring a valid upload token.
pub struct UploadAuth(pub UploadClaims);

impl FromRequestParts<AppState> for UploadAuth {
    type Rejection = AuthError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let secret = state
            .upload_token_secret
            .as_deref()
            .ok_or(AuthError::NotConfigured)?;

        let auth_header = parts
            .headers
            .get(AUTHORIZATION)
            .ok_or(AuthError::MissingAuthHeader)?
            .to_str()
            .map_err(|_| AuthError::InvalidAuthHeader)?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or(AuthError::InvalidAuthHeader)?;

        let claims = verify_upload_token(token, secret)?;
        Ok(UploadAuth(claims))
    }
}

/// Validate an HS256 upload token against the shared secret.
pub fn verify_upload_token(token: &str, secret: &str) -> Result<UploadClaims, AuthError> {
    let data = decode::<UploadClaims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::new(Algorithm::HS256),
    )
    .map_err(|e| AuthError::InvalidToken(e.to_string()))?;
    Ok(data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;
    use jsonwebtoken::{encode, EncodingKey, Header};

    const SECRET: &str = "test-upload-secret";

    fn token(exp_offset: i64) -> String {
        let exp = (chrono::Utc::now().timestamp() + exp_offset).max(0) as u64;
        encode(
            &Header::default(),
            &UploadClaims {
                sub: "ops".to_string(),
                exp,
            },
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap()
    }

    #[test]
    fn valid_token_round_trips() {
        let claims = verify_upload_token(&token(3600), SECRET).unwrap();
        assert_eq!(claims.sub, "ops");
    }

    #[test]
    fn expired_token_is_rejected() {
        let err = verify_upload_token(&token(-3600), SECRET).unwrap_err();
        assert!(matches!(err, AuthError::InvalidToken(_)));
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let err = verify_upload_token(&token(3600), "other-secret").unwrap_err();
        assert!(matches!(err, AuthError::InvalidToken(_)));
    }

    #[test]
    fn garbage_token_is_rejected() {
        assert!(matches!(
            verify_upload_token("not-a-jwt", SECRET),
            Err(AuthError::InvalidToken(_))
        ));
    }

    #[tokio::test]
    async fn auth_errors_render_the_envelope_with_401() {
        let response = AuthError::MissingAuthHeader.into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let body_bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&body_bytes).unwrap();
        assert_eq!(body["success"], false);
        assert!(body["error"].as_str().unwrap().contains("Authorization"));
    }
}
