// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Mintgate

//! # API Data Models
//!
//! Request and response data structures used by the REST API. All types
//! derive `Serialize`/`Deserialize` and `ToSchema` for automatic JSON
//! handling and OpenAPI documentation; wire fields are camelCase.
//!
//! ## Sui Address Type
//!
//! The [`SuiAddress`] newtype wraps Sui-style addresses (`0x` followed by
//! 64 hexadecimal characters, 32 bytes). Parsing normalizes to lowercase,
//! which is also the case used for ledger keys.

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

// =============================================================================
// Sui Address Type
// =============================================================================

/// Sui wallet address wrapper.
///
/// Format: `0x` followed by 64 hexadecimal characters (32 bytes).
/// Parsing lowercases the hex portion; every ledger key and comparison
/// uses the normalized form.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq, Hash)]
pub struct SuiAddress(String);

impl SuiAddress {
    /// Parse and normalize an address. Returns `None` unless the input is
    /// exactly `0x` + 64 hex characters.
    pub fn parse(raw: &str) -> Option<Self> {
        let hex_part = raw.strip_prefix("0x")?;
        if hex_part.len() != 64 || !hex_part.chars().all(|c| c.is_ascii_hexdigit()) {
            return None;
        }
        Some(Self(format!("0x{}", hex_part.to_ascii_lowercase())))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SuiAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// =============================================================================
// Mint Models
// =============================================================================

/// Request body for `POST /api/mint`.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MintRequest {
    /// The mint event to claim against.
    pub event_id: String,
    /// The recipient wallet address (`0x` + 64 hex).
    pub address: String,
    /// Base64-encoded wallet signature.
    pub signature: String,
    /// Base64-encoded bytes the wallet actually signed.
    #[serde(default)]
    pub bytes: String,
    /// Base64-encoded ed25519 public key, when the signature payload does
    /// not carry one itself.
    #[serde(default)]
    pub public_key: Option<String>,
    /// Plaintext authorization message; used when `bytes` is absent.
    #[serde(default)]
    pub auth_message: String,
}

/// Successful mint payload.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MintData {
    /// Digest of the sponsored on-chain transaction.
    pub tx_digest: String,
}

/// Response for `POST /api/mint`.
#[derive(Debug, Serialize, ToSchema)]
pub struct MintResponse {
    pub success: bool,
    pub data: MintData,
}

/// Query parameters for `GET /api/mints/check`.
#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct CheckParams {
    pub event_id: String,
    pub address: String,
}

/// Response for `GET /api/mints/check`.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CheckResponse {
    pub success: bool,
    pub already_minted: bool,
}

// =============================================================================
// Blob Store Models
// =============================================================================

/// Retention selection for `POST /api/walrus/store`.
///
/// At most one of the three may be supplied; none selects the configured
/// default policy.
#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct StoreBlobParams {
    /// Keep the blob for this many storage epochs.
    pub epochs: Option<u64>,
    /// Keep the blob permanently.
    pub permanent: Option<bool>,
    /// Allow the blob to be deleted by its owner.
    pub deletable: Option<bool>,
}

/// Successful blob ingestion payload.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StoredBlobData {
    /// Content-derived blob identifier.
    pub blob_id: String,
    /// Mime type the blob was stored with.
    pub content_type: String,
    /// Blob size in bytes.
    pub size: usize,
}

/// Response for `POST /api/walrus/store`.
#[derive(Debug, Serialize, ToSchema)]
pub struct StoreBlobResponse {
    pub success: bool,
    pub data: StoredBlobData,
}

#[cfg(test)]
mod tests {
    use super::*;

    const GOOD: &str = "0xAAaa111122223333444455556666777788889999aaaabbbbccccddddeeeeffff";

    #[test]
    fn parse_accepts_and_lowercases_valid_address() {
        let addr = SuiAddress::parse(GOOD).expect("valid address");
        assert_eq!(addr.as_str(), GOOD.to_ascii_lowercase());
    }

    #[test]
    fn parse_rejects_bad_shapes() {
        // No prefix
        assert!(SuiAddress::parse(&GOOD[2..]).is_none());
        // Too short
        assert!(SuiAddress::parse("0x1234").is_none());
        // Too long
        assert!(SuiAddress::parse(&format!("{GOOD}00")).is_none());
        // Non-hex character
        let mut bad = GOOD.to_string();
        bad.replace_range(10..11, "g");
        assert!(SuiAddress::parse(&bad).is_none());
        // Empty
        assert!(SuiAddress::parse("").is_none());
    }

    #[test]
    fn mint_request_deserializes_camel_case() {
        let raw = r#"{
            "eventId": "e1",
            "address": "0xabc",
            "signature": "c2ln",
            "bytes": "bXNn",
            "publicKey": null,
            "authMessage": "Mint authorization"
        }"#;
        let req: MintRequest = serde_json::from_str(raw).unwrap();
        assert_eq!(req.event_id, "e1");
        assert_eq!(req.auth_message, "Mint authorization");
        assert!(req.public_key.is_none());
    }

    #[test]
    fn mint_request_tolerates_missing_optional_fields() {
        let raw = r#"{"eventId": "e1", "address": "0xabc", "signature": "c2ln"}"#;
        let req: MintRequest = serde_json::from_str(raw).unwrap();
        assert!(req.bytes.is_empty());
        assert!(req.auth_message.is_empty());
    }
}
