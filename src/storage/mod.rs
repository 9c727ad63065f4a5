// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Mintgate

//! # Embedded Key-Value Ledger
//!
//! Persistent storage uses **redb**, a pure-Rust embedded key-value
//! database. The ledger is the only shared mutable state in the service;
//! request handlers hold no in-process locks across I/O.
//!
//! ## Tables
//!
//! ```text
//! minted            {event_id}:{address} -> MintRecord (JSON)
//! minted_count      {event_id}           -> u64
//! mint_in_progress  {event_id}:{address} -> unix seconds the lock was taken
//! events            {event_id}           -> MintEvent (JSON)
//! ```
//!
//! Addresses in keys are always the lowercase normalized form.
//!
//! Reads and writes deliberately run in separate transactions, mirroring a
//! plain key-value store: two concurrent requests for the same pair can
//! interleave between the existence check and the record write. The mint
//! pipeline accepts that narrow duplicate window instead of serializing
//! requests.

use std::path::Path;

use redb::{Database, TableDefinition};

pub mod events;
pub mod ledger;

pub use events::EventStore;
pub use ledger::{MintLedger, MintRecord};

pub(crate) const MINTED: TableDefinition<&str, &str> = TableDefinition::new("minted");
pub(crate) const MINT_COUNTS: TableDefinition<&str, u64> = TableDefinition::new("minted_count");
pub(crate) const MINT_LOCKS: TableDefinition<&str, u64> = TableDefinition::new("mint_in_progress");
pub(crate) const EVENTS: TableDefinition<&str, &str> = TableDefinition::new("events");

/// Error type for ledger operations.
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("database error: {0}")]
    Database(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for ledger operations.
pub type LedgerResult<T> = Result<T, LedgerError>;

impl From<redb::DatabaseError> for LedgerError {
    fn from(e: redb::DatabaseError) -> Self {
        LedgerError::Database(e.to_string())
    }
}

impl From<redb::TransactionError> for LedgerError {
    fn from(e: redb::TransactionError) -> Self {
        LedgerError::Database(e.to_string())
    }
}

impl From<redb::TableError> for LedgerError {
    fn from(e: redb::TableError) -> Self {
        LedgerError::Database(e.to_string())
    }
}

impl From<redb::StorageError> for LedgerError {
    fn from(e: redb::StorageError) -> Self {
        LedgerError::Database(e.to_string())
    }
}

impl From<redb::CommitError> for LedgerError {
    fn from(e: redb::CommitError) -> Self {
        LedgerError::Database(e.to_string())
    }
}

/// Open (or create) the ledger database and ensure all tables exist.
///
/// Safe to call on every startup; table creation is idempotent.
pub fn open(path: &Path) -> LedgerResult<Database> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let db = Database::create(path)?;
    let txn = db.begin_write()?;
    {
        txn.open_table(MINTED)?;
        txn.open_table(MINT_COUNTS)?;
        txn.open_table(MINT_LOCKS)?;
        txn.open_table(EVENTS)?;
    }
    txn.commit()?;
    Ok(db)
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::Arc;

    use redb::Database;
    use tempfile::TempDir;

    /// Fresh database in a scratch directory. The directory is removed
    /// when the returned guard drops.
    pub fn test_db() -> (TempDir, Arc<Database>) {
        let dir = TempDir::new().expect("create temp dir");
        let db = super::open(&dir.path().join("ledger.redb")).expect("open test database");
        (dir, Arc::new(db))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use redb::ReadableDatabase;
    use tempfile::TempDir;

    #[test]
    fn open_creates_database_and_parent_dirs() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("ledger.redb");
        let db = open(&path).unwrap();

        // All tables are readable immediately after open.
        let txn = db.begin_read().unwrap();
        assert!(txn.open_table(MINTED).is_ok());
        assert!(txn.open_table(MINT_COUNTS).is_ok());
        assert!(txn.open_table(MINT_LOCKS).is_ok());
        assert!(txn.open_table(EVENTS).is_ok());
    }

    #[test]
    fn open_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("ledger.redb");
        drop(open(&path).unwrap());
        assert!(open(&path).is_ok());
    }
}
