// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Mintgate

//! Signature normalization and verification.
//!
//! Accepted signature wire shapes:
//!
//! | Length | Layout |
//! |--------|--------|
//! | 64 | raw signature, public key supplied out of band |
//! | 65 | scheme byte + signature, public key out of band |
//! | 97 | scheme byte + signature + 32-byte public key |
//! | 98 | scheme byte + signature + scheme-prefixed 33-byte public key |
//!
//! The only supported scheme byte is the ed25519 flag (`0x00`). Any other
//! length or scheme fails closed. The signature is checked over the Sui
//! personal-message digest: BLAKE2b-256 of the signing intent, the ULEB128
//! message length, and the message bytes.

use blake2::{digest::consts::U32, Blake2b, Digest};
use ed25519_dalek::{Signature, VerifyingKey};

use super::candidates::CANDIDATES;
use super::message::AuthMessage;

type Blake2b256 = Blake2b<U32>;

/// Sui signature scheme flag for ed25519.
const ED25519_SCHEME_FLAG: u8 = 0x00;

/// Signing intent for personal messages (scope, version, app id).
const PERSONAL_MESSAGE_INTENT: [u8; 3] = [0x03, 0x00, 0x00];

const SIGNATURE_LEN: usize = 64;
const PUBLIC_KEY_LEN: usize = 32;

/// Verify that `signature` was produced by the key controlling
/// `claimed_address` over `message`.
///
/// Returns `false` on any malformed input; failure reasons are logged but
/// collapse to a single boolean here.
pub fn verify(
    signature: &[u8],
    message: &[u8],
    claimed_address: &str,
    public_key: Option<&[u8]>,
) -> bool {
    if signature.is_empty() || message.is_empty() {
        tracing::debug!("signature verification failed: empty signature or message");
        return false;
    }

    // The embedded address must match the claimed one. A valid signature
    // over a message naming a different address is a replay.
    match embedded_address(message) {
        Some(embedded) if embedded.eq_ignore_ascii_case(claimed_address) => {}
        Some(embedded) => {
            tracing::debug!(%embedded, claimed = %claimed_address, "address mismatch in signed message");
            return false;
        }
        None => {
            tracing::debug!("signed message carries no address field");
            return false;
        }
    }

    let Some((sig, key)) = normalize_signature(signature, public_key) else {
        tracing::debug!(len = signature.len(), "unrecognized signature payload shape");
        return false;
    };

    for (name, reinterpret) in CANDIDATES {
        let Some(candidate) = reinterpret(message) else {
            continue;
        };
        let digest = personal_message_digest(&candidate);
        if key.verify_strict(&digest, &sig).is_ok() {
            tracing::debug!(candidate = name, "signature verified");
            return true;
        }
    }

    tracing::debug!("signature did not verify under any message reinterpretation");
    false
}

/// Extract the address embedded in the signed message, probing the same
/// reinterpretation order the signature check uses.
fn embedded_address(message: &[u8]) -> Option<String> {
    for (_, reinterpret) in CANDIDATES {
        let Some(bytes) = reinterpret(message) else {
            continue;
        };
        let text = String::from_utf8_lossy(&bytes);
        if let Some(addr) = AuthMessage::parse(&text).and_then(|m| m.address().map(str::to_string))
        {
            return Some(addr);
        }
    }
    None
}

/// Normalize the signature payload into a raw ed25519 signature and
/// verifying key. Fails closed on any unexpected length or scheme byte.
fn normalize_signature(
    raw: &[u8],
    out_of_band_key: Option<&[u8]>,
) -> Option<(Signature, VerifyingKey)> {
    let (sig_bytes, key_bytes): (&[u8], &[u8]) = match raw.len() {
        // Bare signature; the key must come from the request.
        64 => (raw, normalize_public_key(out_of_band_key?)?),
        // Scheme-prefixed signature; key still out of band.
        65 => {
            if raw[0] != ED25519_SCHEME_FLAG {
                return None;
            }
            (&raw[1..65], normalize_public_key(out_of_band_key?)?)
        }
        // Fully self-contained: scheme + signature + key.
        97 | 98 => {
            if raw[0] != ED25519_SCHEME_FLAG {
                return None;
            }
            (&raw[1..65], normalize_public_key(&raw[65..])?)
        }
        _ => return None,
    };

    let sig_arr: [u8; SIGNATURE_LEN] = sig_bytes.try_into().ok()?;
    let key_arr: [u8; PUBLIC_KEY_LEN] = key_bytes.try_into().ok()?;

    let key = VerifyingKey::from_bytes(&key_arr).ok()?;
    Some((Signature::from_bytes(&sig_arr), key))
}

/// Accept a 32-byte key, or a 33-byte scheme-prefixed key with the prefix
/// trimmed.
fn normalize_public_key(raw: &[u8]) -> Option<&[u8]> {
    match raw.len() {
        32 => Some(raw),
        33 if raw[0] == ED25519_SCHEME_FLAG => Some(&raw[1..]),
        _ => None,
    }
}

/// BLAKE2b-256 over intent || ULEB128(len) || message.
pub(crate) fn personal_message_digest(message: &[u8]) -> [u8; 32] {
    let mut hasher = Blake2b256::new();
    hasher.update(PERSONAL_MESSAGE_INTENT);
    hasher.update(uleb128(message.len()));
    hasher.update(message);
    hasher.finalize().into()
}

fn uleb128(mut value: usize) -> Vec<u8> {
    let mut out = Vec::with_capacity(4);
    loop {
        let mut byte = (value & 0x7f) as u8;
        value >>= 7;
        if value != 0 {
            byte |= 0x80;
        }
        out.push(byte);
        if value == 0 {
            return out;
        }
    }
}
