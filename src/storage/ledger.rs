// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Mintgate

//! Mint idempotency and capacity ledger.
//!
//! Keyed by `(event_id, lowercase address)`. The ledger answers three
//! questions: has this address minted, how many mints has the event seen,
//! and is a mint currently in flight. Records are written once and never
//! mutated or deleted.
//!
//! The in-progress lock is a TTL-stamped marker, not a mutual-exclusion
//! primitive: it narrows the window between "not yet minted" and "recorded
//! as minted" while a sponsor call is in flight, and it expires on its own
//! if the process dies mid-flight.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use redb::{Database, ReadableDatabase, ReadableTable};
use serde::{Deserialize, Serialize};

use super::{LedgerError, LedgerResult, MINTED, MINT_COUNTS, MINT_LOCKS};
use crate::mint::MintEvent;
use crate::models::SuiAddress;

/// How long an in-progress marker is honored before it is treated as
/// expired.
const DEFAULT_LOCK_TTL: Duration = Duration::from_secs(60);

/// Durable receipt of one successful mint. Written once after the sponsor
/// confirms success; kept for audit.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct MintRecord {
    /// Digest of the sponsored transaction.
    pub tx_digest: String,
    /// When the record was written.
    pub recorded_at: DateTime<Utc>,
}

/// Key-value backed idempotency and capacity ledger.
#[derive(Clone)]
pub struct MintLedger {
    db: Arc<Database>,
    lock_ttl: Duration,
}

impl MintLedger {
    pub fn new(db: Arc<Database>) -> Self {
        Self {
            db,
            lock_ttl: DEFAULT_LOCK_TTL,
        }
    }

    /// Override the in-progress lock TTL.
    pub fn with_lock_ttl(mut self, ttl: Duration) -> Self {
        self.lock_ttl = ttl;
        self
    }

    /// Whether a MintRecord exists for this pair.
    pub fn already_minted(&self, event_id: &str, address: &SuiAddress) -> LedgerResult<bool> {
        let key = pair_key(event_id, address);
        let txn = self.db.begin_read()?;
        let table = txn.open_table(MINTED)?;
        Ok(table.get(key.as_str())?.is_some())
    }

    /// Write the durable mint record. Re-writing the same pair with the
    /// same digest is harmless; callers invoke this once per successful
    /// delegation.
    pub fn record(&self, event_id: &str, address: &SuiAddress, tx_digest: &str) -> LedgerResult<()> {
        let key = pair_key(event_id, address);
        let value = serde_json::to_string(&MintRecord {
            tx_digest: tx_digest.to_string(),
            recorded_at: Utc::now(),
        })?;

        let txn = self.db.begin_write()?;
        {
            let mut table = txn.open_table(MINTED)?;
            table.insert(key.as_str(), value.as_str())?;
        }
        txn.commit()?;
        Ok(())
    }

    /// Current confirmed-mint total for an event.
    pub fn mint_count(&self, event_id: &str) -> LedgerResult<u64> {
        let txn = self.db.begin_read()?;
        let table = txn.open_table(MINT_COUNTS)?;
        Ok(table.get(event_id)?.map(|g| g.value()).unwrap_or(0))
    }

    /// Whether the event's capacity ceiling has been reached. An event
    /// without a cap is unlimited.
    pub fn cap_reached(&self, event: &MintEvent) -> LedgerResult<bool> {
        match event.total_cap {
            None => Ok(false),
            Some(cap) => Ok(self.mint_count(&event.id)? >= cap),
        }
    }

    /// Increment the event counter by one.
    ///
    /// Read and write run in separate transactions; concurrent requests
    /// can interleave and the counter may undercount or let the cap be
    /// exceeded by a small margin. The cap is an operational guard, not a
    /// scarcity boundary.
    pub fn increment_counter(&self, event_id: &str) -> LedgerResult<()> {
        let current = self.mint_count(event_id)?;
        let txn = self.db.begin_write()?;
        {
            let mut table = txn.open_table(MINT_COUNTS)?;
            table.insert(event_id, current + 1)?;
        }
        txn.commit()?;
        Ok(())
    }

    /// Write the in-progress marker, stamped with the current time.
    pub fn lock(&self, event_id: &str, address: &SuiAddress) -> LedgerResult<()> {
        let key = pair_key(event_id, address);
        let txn = self.db.begin_write()?;
        {
            let mut table = txn.open_table(MINT_LOCKS)?;
            table.insert(key.as_str(), now_secs())?;
        }
        txn.commit()?;
        Ok(())
    }

    /// Remove the in-progress marker so a retried request is not blocked
    /// until the TTL lapses.
    pub fn unlock(&self, event_id: &str, address: &SuiAddress) -> LedgerResult<()> {
        let key = pair_key(event_id, address);
        let txn = self.db.begin_write()?;
        {
            let mut table = txn.open_table(MINT_LOCKS)?;
            table.remove(key.as_str())?;
        }
        txn.commit()?;
        Ok(())
    }

    /// Whether an unexpired in-progress marker exists for this pair.
    pub fn in_progress(&self, event_id: &str, address: &SuiAddress) -> LedgerResult<bool> {
        let key = pair_key(event_id, address);
        let txn = self.db.begin_read()?;
        let table = txn.open_table(MINT_LOCKS)?;
        let Some(guard) = table.get(key.as_str())? else {
            return Ok(false);
        };
        let taken_at = guard.value();
        Ok(now_secs() < taken_at + self.lock_ttl.as_secs())
    }

    /// Verify the database answers a read. Used by the health endpoint.
    pub fn health_check(&self) -> LedgerResult<()> {
        let txn = self.db.begin_read()?;
        txn.open_table(MINTED)?;
        Ok(())
    }
}

/// Row key for pair-scoped tables: `{event_id}:{lowercase address}`.
fn pair_key(event_id: &str, address: &SuiAddress) -> String {
    format!("{event_id}:{address}")
}

fn now_secs() -> u64 {
    Utc::now().timestamp().max(0) as u64
}

impl std::fmt::Debug for MintLedger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MintLedger")
            .field("lock_ttl", &self.lock_ttl)
            .finish_non_exhaustive()
    }
}
