// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Mintgate

//! Mint event model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A mintable campaign.
///
/// Created and updated by the admin surface; read-only here. A mint is
/// permitted only while `active` and `start_at <= now <= end_at`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct MintEvent {
    /// Unique event identifier.
    pub id: String,
    /// Kill switch independent of the time window.
    pub active: bool,
    /// Window start, inclusive.
    pub start_at: DateTime<Utc>,
    /// Window end, inclusive.
    pub end_at: DateTime<Utc>,
    /// Capacity ceiling; absent means unlimited.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_cap: Option<u64>,
    /// Transaction template passed through to the sponsor.
    pub move_call_spec: MoveCallSpec,
    /// Identifies the resulting asset type.
    pub collection_id: String,
    /// Artwork reference, when the event has one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_ref: Option<ImageRef>,
}

/// Opaque transaction template. The sponsor interprets it; this service
/// only forwards it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct MoveCallSpec {
    /// Fully qualified move call target, e.g. `0x2::collectible::mint`.
    pub target: String,
    /// Argument template; placeholders are resolved by the sponsor.
    #[serde(default)]
    pub argument_template: serde_json::Value,
    /// Gas budget for the sponsored transaction.
    pub gas_budget: u64,
}

/// Content-addressed artwork reference: id plus mime type, never bytes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ImageRef {
    pub blob_id: String,
    pub mime_type: String,
}

impl MintEvent {
    /// Whether the event accepts mints at `now`. Both window ends are
    /// inclusive.
    pub fn is_active(&self, now: DateTime<Utc>) -> bool {
        self.active && self.start_at <= now && now <= self.end_at
    }
}
