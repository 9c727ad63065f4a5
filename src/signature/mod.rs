// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Mintgate

//! # Wallet Signature Verification
//!
//! Verifies that a submitted signature was produced by the private key
//! controlling a claimed Sui address, over a canonical authorization
//! message.
//!
//! Wallet clients disagree on the exact byte framing of "the message that
//! was signed", so verification tries a fixed, ordered list of message
//! reinterpretations (`candidates`) and accepts the first one that passes
//! the ed25519 check over the personal-message digest. The list order is
//! part of the contract: repeated calls with the same inputs always probe
//! candidates in the same sequence.
//!
//! All malformed input collapses to `false`; this module never panics on
//! attacker-controlled bytes.

pub mod candidates;
pub mod message;
pub mod verifier;

pub use message::AuthMessage;
pub use verifier::verify;
