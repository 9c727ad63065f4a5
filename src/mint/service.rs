// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Mintgate

//! Mint orchestration.
//!
//! One mint request moves through Validating → SignatureChecking →
//! Locking → Delegating → Recording, with an abort possible from every
//! state. The handler is request-scoped and stateless; the ledger is the
//! only shared state, and no in-process lock is held across an await.
//!
//! The `already_minted` check and the final `record` are not atomic: two
//! near-simultaneous requests for the same pair can both pass the check
//! before either records. The in-progress marker narrows that window; the
//! remaining exposure is accepted in favor of availability, since the real
//! scarcity of the asset is enforced on-chain.

use std::sync::Arc;

use chrono::Utc;

use super::sponsor::{Delegate, SponsorError};
use crate::models::SuiAddress;
use crate::signature;
use crate::storage::{EventStore, LedgerError, MintLedger};

/// Mint pipeline error taxonomy. Every variant maps to a stable,
/// user-safe message and a fixed HTTP status at the API boundary.
#[derive(Debug, thiserror::Error)]
pub enum MintError {
    #[error("invalid address")]
    InvalidAddress,

    #[error("event not found")]
    EventNotFound,

    #[error("event not active")]
    EventNotActive,

    #[error("already minted")]
    AlreadyMinted,

    #[error("mint already in progress")]
    MintInProgress,

    #[error("cap reached")]
    CapReached,

    #[error("invalid signature")]
    InvalidSignature,

    /// Ledger I/O failed before delegation; safe for the client to retry.
    #[error("ledger unavailable: {0}")]
    Ledger(String),

    #[error("sponsor timeout")]
    SponsorTimeout,

    #[error("{0}")]
    SponsorUpstream(String),
}

impl From<SponsorError> for MintError {
    fn from(err: SponsorError) -> Self {
        match err {
            SponsorError::Timeout => MintError::SponsorTimeout,
            SponsorError::Upstream(msg) => MintError::SponsorUpstream(msg),
        }
    }
}

/// One decoded mint request, ready for the pipeline.
#[derive(Debug, Clone)]
pub struct MintAuthorization {
    pub event_id: String,
    /// Raw claimed address; validated by the pipeline.
    pub address: String,
    pub signature: Vec<u8>,
    /// Bytes the wallet signed, as submitted.
    pub message: Vec<u8>,
    pub public_key: Option<Vec<u8>>,
}

/// Composes verifier, ledger and sponsor into the `mint` and `check`
/// operations.
#[derive(Clone)]
pub struct MintService {
    events: EventStore,
    ledger: MintLedger,
    delegator: Arc<dyn Delegate>,
}

impl MintService {
    pub fn new(events: EventStore, ledger: MintLedger, delegator: Arc<dyn Delegate>) -> Self {
        Self {
            events,
            ledger,
            delegator,
        }
    }

    /// Run one mint request through the pipeline and return the sponsored
    /// transaction digest.
    pub async fn mint(&self, auth: &MintAuthorization) -> Result<String, MintError> {
        // Validating
        let address = SuiAddress::parse(&auth.address).ok_or(MintError::InvalidAddress)?;
        let event = self
            .events
            .get(&auth.event_id)
            .map_err(ledger_unavailable)?
            .ok_or(MintError::EventNotFound)?;
        if !event.is_active(Utc::now()) {
            return Err(MintError::EventNotActive);
        }
        if self
            .ledger
            .already_minted(&event.id, &address)
            .map_err(ledger_unavailable)?
        {
            return Err(MintError::AlreadyMinted);
        }
        if self
            .ledger
            .in_progress(&event.id, &address)
            .map_err(ledger_unavailable)?
        {
            return Err(MintError::MintInProgress);
        }
        if self
            .ledger
            .cap_reached(&event)
            .map_err(ledger_unavailable)?
        {
            return Err(MintError::CapReached);
        }

        // SignatureChecking
        if !signature::verify(
            &auth.signature,
            &auth.message,
            address.as_str(),
            auth.public_key.as_deref(),
        ) {
            return Err(MintError::InvalidSignature);
        }

        // Locking: the marker write never gates progress.
        best_effort(
            "write in-progress marker",
            self.ledger.lock(&event.id, &address),
        );

        // Delegating
        let tx_digest = match self.delegator.delegate(&event, &address).await {
            Ok(digest) => digest,
            Err(err) => {
                best_effort(
                    "release in-progress marker",
                    self.ledger.unlock(&event.id, &address),
                );
                return Err(err.into());
            }
        };

        // Recording: the mint already happened on-chain; bookkeeping
        // failures are logged, never surfaced.
        best_effort(
            "write mint record",
            self.ledger.record(&event.id, &address, &tx_digest),
        );
        best_effort(
            "increment mint counter",
            self.ledger.increment_counter(&event.id),
        );
        best_effort(
            "release in-progress marker",
            self.ledger.unlock(&event.id, &address),
        );

        tracing::info!(
            event = %event.id,
            address = %address,
            tx_digest = %tx_digest,
            "mint delegated and recorded"
        );

        Ok(tx_digest)
    }

    /// Handle to the event catalog this service reads from.
    pub fn events(&self) -> &EventStore {
        &self.events
    }

    /// Read-only probe: has this address already minted for this event?
    pub fn check(&self, event_id: &str, address: &str) -> Result<bool, MintError> {
        let address = SuiAddress::parse(address).ok_or(MintError::InvalidAddress)?;
        self.ledger
            .already_minted(event_id, &address)
            .map_err(ledger_unavailable)
    }
}

fn ledger_unavailable(err: LedgerError) -> MintError {
    MintError::Ledger(err.to_string())
}

/// Run a bookkeeping side effect that must never fail the caller: errors
/// are logged and dropped.
fn best_effort<T>(what: &'static str, result: Result<T, LedgerError>) {
    if let Err(err) = result {
        tracing::warn!(error = %err, what, "best-effort ledger write failed");
    }
}

impl std::fmt::Debug for MintService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MintService").finish_non_exhaustive()
    }
}
