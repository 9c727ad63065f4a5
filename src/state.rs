// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Mintgate

use crate::mint::MintService;
use crate::storage::MintLedger;
use crate::walrus::{RetentionPolicy, WalrusClient};

/// Shared application state, cloned per request. Collaborators are cheap
/// clones over `Arc`-held resources.
#[derive(Clone)]
pub struct AppState {
    pub mint: MintService,
    /// Held separately from the service for health probing.
    pub ledger: MintLedger,
    pub walrus: WalrusClient,
    /// Applied when a store request selects no retention policy.
    pub default_retention: RetentionPolicy,
    /// HS256 secret for upload tokens; `None` disables uploads.
    pub upload_token_secret: Option<String>,
}

impl AppState {
    pub fn new(
        mint: MintService,
        ledger: MintLedger,
        walrus: WalrusClient,
        default_retention: RetentionPolicy,
        upload_token_secret: Option<String>,
    ) -> Self {
        Self {
            mint,
            ledger,
            walrus,
            default_retention,
            upload_token_secret,
        }
    }
}
