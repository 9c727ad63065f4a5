// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Mintgate

//! Mint endpoints.

use axum::{
    extract::{Query, State},
    Json,
};
use base64ct::{Base64, Encoding};

use crate::{
    error::ApiError,
    mint::MintAuthorization,
    models::{CheckParams, CheckResponse, MintData, MintRequest, MintResponse},
    state::AppState,
};

/// Authorize and delegate one mint.
#[utoipa::path(
    post,
    path = "/api/mint",
    request_body = MintRequest,
    tag = "Mint",
    responses(
        (status = 200, description = "Mint delegated", body = MintResponse),
        (status = 400, description = "Validation, signature, already-minted or cap failure"),
        (status = 404, description = "Event not found"),
        (status = 502, description = "Sponsor failure"),
    )
)]
pub async fn mint(
    State(state): State<AppState>,
    Json(request): Json<MintRequest>,
) -> Result<Json<MintResponse>, ApiError> {
    let signature = decode_base64("signature", &request.signature)?;
    // Wallets that do not echo the raw signed bytes back fall back to the
    // plaintext authorization message.
    let message = if request.bytes.is_empty() {
        request.auth_message.clone().into_bytes()
    } else {
        decode_base64("bytes", &request.bytes)?
    };
    let public_key = request
        .public_key
        .as_deref()
        .map(|raw| decode_base64("publicKey", raw))
        .transpose()?;

    let auth = MintAuthorization {
        event_id: request.event_id,
        address: request.address,
        signature,
        message,
        public_key,
    };

    let tx_digest = state.mint.mint(&auth).await?;
    Ok(Json(MintResponse {
        success: true,
        data: MintData { tx_digest },
    }))
}

/// Read-only probe: has this address already minted for this event?
#[utoipa::path(
    get,
    path = "/api/mints/check",
    params(CheckParams),
    tag = "Mint",
    responses(
        (status = 200, description = "Check result", body = CheckResponse),
        (status = 400, description = "Malformed address"),
    )
)]
pub async fn check_mint(
    State(state): State<AppState>,
    Query(params): Query<CheckParams>,
) -> Result<Json<CheckResponse>, ApiError> {
    let already_minted = state.mint.check(&params.event_id, &params.address)?;
    Ok(Json(CheckResponse {
        success: true,
        already_minted,
    }))
}

fn decode_base64(field: &str, value: &str) -> Result<Vec<u8>, ApiError> {
    Base64::decode_vec(value)
        .map_err(|_| ApiError::bad_request(format!("invalid base64 in {field}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mint::{Delegate, MintEvent, MintService, SponsorError};
    use crate::models::SuiAddress;
    use crate::storage::{test_support::test_db, EventStore, MintLedger};
    use crate::walrus::{RetentionPolicy, WalrusClient};
    use async_trait::async_trait;
    use std::sync::Arc;

    struct AlwaysMints;

    #[async_trait]
    impl Delegate for AlwaysMints {
        async fn delegate(
            &self,
            _event: &MintEvent,
            _recipient: &SuiAddress,
        ) -> Result<String, SponsorError> {
            Ok("digest".to_string())
        }
    }

    fn test_state() -> (tempfile::TempDir, AppState) {
        let (dir, db) = test_db();
        let events = EventStore::new(db.clone());
        let ledger = MintLedger::new(db);
        let mint = MintService::new(events, ledger.clone(), Arc::new(AlwaysMints));
        let walrus = WalrusClient::new(&crate::config::WalrusConfig {
            publisher_url: "http://127.0.0.1:1".to_string(),
            aggregator_url: "http://127.0.0.1:1".to_string(),
            default_retention: RetentionPolicy::Epochs(5),
            max_blob_bytes: 1024,
            store_attempts: 1,
            retry_base_delay: std::time::Duration::from_millis(1),
            attempt_timeout: std::time::Duration::from_millis(100),
        })
        .unwrap();
        let state = AppState::new(mint, ledger, walrus, RetentionPolicy::Epochs(5), None);
        (dir, state)
    }

    #[tokio::test]
    async fn mint_happy_path_returns_digest_envelope() {
        use base64::{engine::general_purpose::STANDARD, Engine};
        use chrono::{Duration, Utc};
        use ed25519_dalek::{Signer, SigningKey};

        let (_dir, state) = test_state();

        let now = Utc::now();
        let event = MintEvent {
            id: "e1".to_string(),
            active: true,
            start_at: now - Duration::seconds(1000),
            end_at: now + Duration::seconds(1000),
            total_cap: Some(10),
            move_call_spec: crate::mint::MoveCallSpec {
                target: "0x2::collectible::mint".to_string(),
                argument_template: serde_json::Value::Null,
                gas_budget: 10_000_000,
            },
            collection_id: "c1".to_string(),
            image_ref: None,
        };
        state.mint.events().put(&event).unwrap();

        let address = "0xaa11223344556677889900aabbccddeeff00112233445566778899aabbccddee";
        let message = format!("Mint authorization\naddress={address}\nevent=e1");
        let key = SigningKey::from_bytes(&[7u8; 32]);
        let signature = key.sign(&crate::signature::verifier::personal_message_digest(
            message.as_bytes(),
        ));

        let request = MintRequest {
            event_id: "e1".to_string(),
            address: address.to_string(),
            signature: STANDARD.encode(signature.to_bytes()),
            bytes: STANDARD.encode(message.as_bytes()),
            public_key: Some(STANDARD.encode(key.verifying_key().to_bytes())),
            auth_message: message,
        };

        let response = mint(State(state), Json(request)).await.unwrap();
        assert!(response.0.success);
        assert_eq!(response.0.data.tx_digest, "digest");
    }

    #[tokio::test]
    async fn mint_rejects_invalid_base64_signature() {
        let (_dir, state) = test_state();
        let request = MintRequest {
            event_id: "e1".to_string(),
            address: "0x".to_string() + &"a".repeat(64),
            signature: "!!!not-base64!!!".to_string(),
            bytes: String::new(),
            public_key: None,
            auth_message: "msg".to_string(),
        };

        let err = mint(State(state), Json(request)).await.unwrap_err();
        assert_eq!(err.status, axum::http::StatusCode::BAD_REQUEST);
        assert!(err.message.contains("signature"));
    }

    #[tokio::test]
    async fn check_rejects_malformed_address() {
        let (_dir, state) = test_state();
        let params = CheckParams {
            event_id: "e1".to_string(),
            address: "nope".to_string(),
        };

        let err = check_mint(State(state), Query(params)).await.unwrap_err();
        assert_eq!(err.status, axum::http::StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn check_reports_unminted_pair_as_false() {
        let (_dir, state) = test_state();
        let params = CheckParams {
            event_id: "e1".to_string(),
            address: "0x".to_string() + &"a".repeat(64),
        };

        let response = check_mint(State(state), Query(params)).await.unwrap();
        assert!(response.0.success);
        assert!(!response.0.already_minted);
    }
}
