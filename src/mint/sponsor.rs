// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Mintgate

//! Delegation to the transaction-sponsoring service.
//!
//! The sponsor holds the signing key that submits the on-chain mint and
//! pays its fee. This client sends the event's transaction template and
//! the recipient, waits under a hard deadline, and classifies failures so
//! callers can tell "try again" from "misconfigured".
//!
//! There is deliberately no retry here: a retried sponsor call risks
//! double-minting if the first attempt actually landed upstream.
//! Idempotency protection lives in the mint ledger, not in this client.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};
use uuid::Uuid;

use super::event::MintEvent;
use crate::config::SponsorConfig;
use crate::error::truncate_upstream;
use crate::models::SuiAddress;

#[derive(Debug, thiserror::Error)]
pub enum SponsorError {
    /// The deadline elapsed before the sponsor answered. Safe for the
    /// caller to resubmit; the ledger guards against duplicates.
    #[error("sponsor timeout")]
    Timeout,

    /// Non-2xx status, unreachable host, or a response without a
    /// transaction digest.
    #[error("sponsor error: {0}")]
    Upstream(String),
}

/// Seam for the orchestrator; lets tests substitute the sponsor.
#[async_trait]
pub trait Delegate: Send + Sync {
    async fn delegate(
        &self,
        event: &MintEvent,
        recipient: &SuiAddress,
    ) -> Result<String, SponsorError>;
}

/// HTTP client for the sponsoring service.
#[derive(Debug, Clone)]
pub struct SponsorDelegator {
    endpoint: String,
    deadline: Duration,
    http: Client,
}

impl SponsorDelegator {
    pub fn new(config: &SponsorConfig) -> Result<Self, SponsorError> {
        let http = Client::builder()
            .build()
            .map_err(|e| SponsorError::Upstream(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            deadline: config.deadline,
            http,
        })
    }
}

#[async_trait]
impl Delegate for SponsorDelegator {
    async fn delegate(
        &self,
        event: &MintEvent,
        recipient: &SuiAddress,
    ) -> Result<String, SponsorError> {
        let request_id = Uuid::new_v4().to_string();
        let payload = build_payload(event, recipient);

        tracing::info!(
            request_id = %request_id,
            event = %event.id,
            recipient = %recipient,
            "delegating mint to sponsor"
        );

        let response = self
            .http
            .post(&self.endpoint)
            .header("X-Request-Id", &request_id)
            .json(&payload)
            .timeout(self.deadline)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    SponsorError::Timeout
                } else {
                    SponsorError::Upstream(format!("sponsor request failed: {e}"))
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SponsorError::Upstream(format!(
                "sponsor returned {status}: {}",
                truncate_upstream(&body)
            )));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| SponsorError::Upstream(format!("invalid sponsor response: {e}")))?;

        extract_digest(&body).ok_or_else(|| {
            SponsorError::Upstream("sponsor response missing transaction digest".to_string())
        })
    }
}

/// Minimal delegation payload: transaction template, recipient, artwork
/// reference. Never raw image bytes or URLs; the sponsor stays agnostic of
/// the storage backend.
fn build_payload(event: &MintEvent, recipient: &SuiAddress) -> Value {
    let mut payload = json!({
        "eventId": event.id,
        "collectionId": event.collection_id,
        "moveCall": event.move_call_spec,
        "recipient": recipient.as_str(),
    });
    if let Some(image) = &event.image_ref {
        payload["image"] = json!({
            "blobId": image.blob_id,
            "mimeType": image.mime_type,
        });
    }
    payload
}

/// Transaction digest from the sponsor response. Sponsor deployments have
/// answered with more than one field name.
fn extract_digest(response: &Value) -> Option<String> {
    response
        .get("txDigest")
        .and_then(Value::as_str)
        .or_else(|| response.get("digest").and_then(Value::as_str))
        .or_else(|| {
            response
                .pointer("/effects/transactionDigest")
                .and_then(Value::as_str)
        })
        .map(str::to_string)
}
