// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Mintgate

//! # Mint Authorization & Delegation
//!
//! End-to-end mint pipeline: validate the request, verify the wallet
//! signature, consult the idempotency ledger, delegate the on-chain
//! transaction to the sponsoring signer, and durably record the outcome.
//!
//! ## Modules
//!
//! - `event` - Mint event model and time-window check
//! - `sponsor` - Delegation to the transaction-sponsoring service
//! - `service` - The orchestrating state machine

pub mod event;
pub mod service;
pub mod sponsor;

pub use event::{ImageRef, MintEvent, MoveCallSpec};
pub use service::{MintAuthorization, MintError, MintService};
pub use sponsor::{Delegate, SponsorDelegator, SponsorError};
