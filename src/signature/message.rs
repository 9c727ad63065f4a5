// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Mintgate

//! Canonical authorization message.
//!
//! The message a wallet signs is a short text document: a human-readable
//! header line followed by `key=value` lines. The header carries no
//! machine-readable content and is discarded on parse; the `address` pair
//! binds the signature to one wallet.

/// Parsed authorization message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthMessage {
    header: String,
    fields: Vec<(String, String)>,
}

impl AuthMessage {
    /// Parse the canonical key-value form.
    ///
    /// The first line is kept verbatim as the header; every later line of
    /// the shape `key=value` becomes a field. Lines without `=` are
    /// ignored. Returns `None` on empty input.
    pub fn parse(text: &str) -> Option<Self> {
        let mut lines = text.lines().map(|l| l.trim_end_matches('\r'));
        let header = lines.next()?.to_string();

        let mut fields = Vec::new();
        for line in lines {
            if let Some((key, value)) = line.split_once('=') {
                fields.push((key.trim().to_string(), value.trim().to_string()));
            }
        }

        Some(Self { header, fields })
    }

    /// Look up a field value by key.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// The embedded wallet address, if present.
    pub fn address(&self) -> Option<&str> {
        self.get("address")
    }

    /// Render the canonical wire form: header line plus `key=value` lines
    /// joined with `\n`, no trailing newline.
    pub fn canonical(&self) -> String {
        let mut out = self.header.clone();
        for (key, value) in &self.fields {
            out.push('\n');
            out.push_str(key);
            out.push('=');
            out.push_str(value);
        }
        out
    }
}
