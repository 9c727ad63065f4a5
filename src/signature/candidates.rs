// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Mintgate

//! Ordered message-byte reinterpretations.
//!
//! Different wallet clients frame "the signed message" differently, so the
//! verifier probes each reinterpretation in the order below and stops at
//! the first one whose signature check passes. Every entry exists because
//! of a specific observed client behavior; additions need the same
//! justification, and the list must stay short.

use super::message::AuthMessage;

/// A pure reinterpretation of the submitted message bytes. `None` means
/// the strategy does not apply to these bytes.
pub type Reinterpret = fn(&[u8]) -> Option<Vec<u8>>;

/// The fixed probe order. First successful verification wins; later
/// candidates are never attempted.
pub const CANDIDATES: [(&str, Reinterpret); 5] = [
    ("canonical", canonical_reconstruction),
    ("raw", raw_bytes),
    ("utf8", utf8_reencode),
    ("hex", hex_plain),
    ("hex-0x", hex_prefixed),
];

/// Re-render the parsed key-value form. Covers wallets that normalize
/// whitespace or line endings before signing the server-rendered text.
pub fn canonical_reconstruction(bytes: &[u8]) -> Option<Vec<u8>> {
    let text = String::from_utf8_lossy(bytes);
    let msg = AuthMessage::parse(&text)?;
    Some(msg.canonical().into_bytes())
}

/// The submitted bytes as-is. Covers wallets that sign exactly what the
/// client sent.
pub fn raw_bytes(bytes: &[u8]) -> Option<Vec<u8>> {
    Some(bytes.to_vec())
}

/// Lossy UTF-8 re-encoding. Covers clients that round-trip the message
/// through a string type and replace invalid sequences.
pub fn utf8_reencode(bytes: &[u8]) -> Option<Vec<u8>> {
    Some(String::from_utf8_lossy(bytes).into_owned().into_bytes())
}

/// Hex decoding without prefix. Covers clients that submit the signed
/// bytes hex-encoded.
pub fn hex_plain(bytes: &[u8]) -> Option<Vec<u8>> {
    let text = std::str::from_utf8(bytes).ok()?.trim();
    if text.is_empty() || text.starts_with("0x") || text.starts_with("0X") {
        return None;
    }
    hex::decode(text).ok()
}

/// Hex decoding with a `0x` prefix. Covers clients that submit the signed
/// bytes as a 0x-prefixed hex string.
pub fn hex_prefixed(bytes: &[u8]) -> Option<Vec<u8>> {
    let text = std::str::from_utf8(bytes).ok()?.trim();
    let stripped = text
        .strip_prefix("0x")
        .or_else(|| text.strip_prefix("0X"))?;
    if stripped.is_empty() {
        return None;
    }
    hex::decode(stripped).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_reconstruction_normalizes_crlf() {
        let out = canonical_reconstruction(b"Header\r\naddress=0xabc\r\n").unwrap();
        assert_eq!(out, b"Header\naddress=0xabc");
    }

    #[test]
    fn raw_bytes_is_identity() {
        assert_eq!(raw_bytes(b"\x00\x01\x02").unwrap(), vec![0, 1, 2]);
    }

    #[test]
    fn utf8_reencode_replaces_invalid_sequences() {
        let out = utf8_reencode(&[b'a', 0xFF, b'b']).unwrap();
        assert_eq!(out, "a\u{FFFD}b".as_bytes());
        // Valid UTF-8 passes through unchanged.
        assert_eq!(utf8_reencode(b"plain").unwrap(), b"plain");
    }

    #[test]
    fn hex_plain_decodes_unprefixed_hex() {
        assert_eq!(hex_plain(b"deadbeef").unwrap(), vec![0xde, 0xad, 0xbe, 0xef]);
        assert_eq!(hex_plain(b"  deadbeef\n").unwrap(), vec![0xde, 0xad, 0xbe, 0xef]);
    }

    #[test]
    fn hex_plain_declines_prefixed_or_invalid_input() {
        assert!(hex_plain(b"0xdeadbeef").is_none());
        assert!(hex_plain(b"xyz").is_none());
        assert!(hex_plain(b"abc").is_none()); // odd length
        assert!(hex_plain(b"").is_none());
    }

    #[test]
    fn hex_prefixed_decodes_0x_hex() {
        assert_eq!(
            hex_prefixed(b"0xdeadbeef").unwrap(),
            vec![0xde, 0xad, 0xbe, 0xef]
        );
        assert_eq!(hex_prefixed(b"0Xdeadbeef").unwrap(), vec![0xde, 0xad, 0xbe, 0xef]);
    }

    #[test]
    fn hex_prefixed_declines_unprefixed_input() {
        assert!(hex_prefixed(b"deadbeef").is_none());
        assert!(hex_prefixed(b"0x").is_none());
    }

    #[test]
    fn probe_order_is_fixed() {
        let names: Vec<&str> = CANDIDATES.iter().map(|(name, _)| *name).collect();
        assert_eq!(names, ["canonical", "raw", "utf8", "hex", "hex-0x"]);
    }
}
