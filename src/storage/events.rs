// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Mintgate

//! Mint event catalog.
//!
//! Events are owned by the admin surface; this service only reads them.
//! At startup the catalog can be seeded from a JSON file so a fresh
//! deployment serves events without a separate provisioning step.

use std::path::Path;
use std::sync::Arc;

use redb::{Database, ReadableDatabase, ReadableTable};

use super::{LedgerResult, EVENTS};
use crate::mint::MintEvent;

/// Read-mostly store of mint events.
#[derive(Clone)]
pub struct EventStore {
    db: Arc<Database>,
}

impl EventStore {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// Look up an event by id.
    pub fn get(&self, event_id: &str) -> LedgerResult<Option<MintEvent>> {
        let txn = self.db.begin_read()?;
        let table = txn.open_table(EVENTS)?;
        match table.get(event_id)? {
            Some(guard) => Ok(Some(serde_json::from_str(guard.value())?)),
            None => Ok(None),
        }
    }

    /// Insert or replace an event.
    pub fn put(&self, event: &MintEvent) -> LedgerResult<()> {
        let value = serde_json::to_string(event)?;
        let txn = self.db.begin_write()?;
        {
            let mut table = txn.open_table(EVENTS)?;
            table.insert(event.id.as_str(), value.as_str())?;
        }
        txn.commit()?;
        Ok(())
    }

    /// Seed the catalog from a JSON array of events. Existing entries with
    /// the same id are replaced. Returns the number of events loaded.
    pub fn seed_from_file(&self, path: &Path) -> LedgerResult<usize> {
        let raw = std::fs::read_to_string(path)?;
        let events: Vec<MintEvent> = serde_json::from_str(&raw)?;
        for event in &events {
            self.put(event)?;
        }
        Ok(events.len())
    }
}

impl std::fmt::Debug for EventStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventStore").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mint::MoveCallSpec;
    use crate::storage::test_support::test_db;
    use chrono::Utc;

    fn sample_event(id: &str) -> MintEvent {
        let now = Utc::now();
        MintEvent {
            id: id.to_string(),
            active: true,
            start_at: now - chrono::Duration::hours(1),
            end_at: now + chrono::Duration::hours(1),
            total_cap: Some(100),
            move_call_spec: MoveCallSpec {
                target: "0x2::collectible::mint".to_string(),
                argument_template: serde_json::json!(["{recipient}"]),
                gas_budget: 10_000_000,
            },
            collection_id: "c1".to_string(),
            image_ref: None,
        }
    }

    #[test]
    fn put_then_get_round_trips() {
        let (_dir, db) = test_db();
        let store = EventStore::new(db);

        let event = sample_event("e1");
        store.put(&event).unwrap();

        let loaded = store.get("e1").unwrap().expect("event exists");
        assert_eq!(loaded, event);
    }

    #[test]
    fn get_missing_event_returns_none() {
        let (_dir, db) = test_db();
        let store = EventStore::new(db);
        assert!(store.get("nope").unwrap().is_none());
    }

    #[test]
    fn seed_from_file_loads_all_events() {
        let (_dir, db) = test_db();
        let store = EventStore::new(db);

        let events = vec![sample_event("e1"), sample_event("e2")];
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("events.json");
        std::fs::write(&path, serde_json::to_string(&events).unwrap()).unwrap();

        let count = store.seed_from_file(&path).unwrap();
        assert_eq!(count, 2);
        assert!(store.get("e1").unwrap().is_some());
        assert!(store.get("e2").unwrap().is_some());
    }

    #[test]
    fn seed_from_missing_file_errors() {
        let (_dir, db) = test_db();
        let store = EventStore::new(db);
        assert!(store
            .seed_from_file(Path::new("/nonexistent/events.json"))
            .is_err());
    }
}
