// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Mintgate

//! # Walrus Blob Store Client
//!
//! Stores and retrieves event artwork against a Walrus-compatible
//! content-addressed storage backend: writes go to a publisher, reads to
//! an aggregator.
//!
//! Every store call carries an explicit retention policy. The backend's
//! own default is its least durable option, so relying on it silently is
//! treated as a defect here; the [`RetentionPolicy`] type makes the choice
//! unavoidable.

pub mod client;

pub use client::{BlobStoreError, FetchedBlob, StoredBlob, WalrusClient};

/// Explicit blob lifetime contract. Exactly one variant is always sent
/// upstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetentionPolicy {
    /// Keep the blob for this many storage epochs.
    Epochs(u64),
    /// Keep the blob permanently.
    Permanent,
    /// Blob may be deleted by its owner.
    Deletable,
}

impl RetentionPolicy {
    /// The single query parameter selecting this policy on the publisher.
    pub fn query_param(&self) -> (&'static str, String) {
        match self {
            RetentionPolicy::Epochs(n) => ("epochs", n.to_string()),
            RetentionPolicy::Permanent => ("permanent", "true".to_string()),
            RetentionPolicy::Deletable => ("deletable", "true".to_string()),
        }
    }
}

impl std::fmt::Display for RetentionPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RetentionPolicy::Epochs(n) => write!(f, "epochs={n}"),
            RetentionPolicy::Permanent => write!(f, "permanent"),
            RetentionPolicy::Deletable => write!(f, "deletable"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn each_policy_maps_to_exactly_one_parameter() {
        assert_eq!(
            RetentionPolicy::Epochs(5).query_param(),
            ("epochs", "5".to_string())
        );
        assert_eq!(
            RetentionPolicy::Permanent.query_param(),
            ("permanent", "true".to_string())
        );
        assert_eq!(
            RetentionPolicy::Deletable.query_param(),
            ("deletable", "true".to_string())
        );
    }
}
