// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Domain table and hostname-to-zone resolution.
//!
//! The table maps domain suffixes to the Cloudflare zone that owns them. It is
//! parsed from JSON once at startup, keeps the document's key order, and is
//! never modified afterwards.
//!
//! ```rust
//! use swarmflare::domains::DomainTable;
//!
//! let table = DomainTable::from_json(
//!     r#"{"example.com": {"zone_id": "z1", "api_key": "k1"}}"#,
//! )
//! .unwrap();
//!
//! assert_eq!(table.resolve("app.example.com").unwrap().zone_id, "z1");
//! assert!(table.resolve("app.example.org").is_none());
//! ```

use serde::{Deserialize, Deserializer};
use std::fmt;

/// Credentials of the Cloudflare zone owning a domain.
#[derive(Clone, PartialEq, Eq, Deserialize)]
pub struct DomainConfig {
    /// Cloudflare zone identifier
    pub zone_id: String,
    /// API token with DNS edit permission on the zone
    #[serde(rename = "api_key")]
    pub api_token: String,
}

impl DomainConfig {
    pub fn new(zone_id: impl Into<String>, api_token: impl Into<String>) -> Self {
        Self {
            zone_id: zone_id.into(),
            api_token: api_token.into(),
        }
    }
}

// Tokens must never reach the logs
impl fmt::Debug for DomainConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DomainConfig")
            .field("zone_id", &self.zone_id)
            .field("api_token", &"<redacted>")
            .finish()
    }
}

/// Ordered table of `(domain suffix, zone credentials)`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DomainTable {
    entries: Vec<(String, DomainConfig)>,
}

impl<'de> Deserialize<'de> for DomainTable {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        crate::ordered::deserialize_entries(deserializer).map(|entries| Self { entries })
    }
}

impl DomainTable {
    /// Build a table from entries, keeping their order.
    pub fn new<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = (S, DomainConfig)>,
        S: Into<String>,
    {
        Self {
            entries: entries
                .into_iter()
                .map(|(domain, config)| (domain.into(), config))
                .collect(),
        }
    }

    /// Parse the `{"domain": {"zone_id": ..., "api_key": ...}}` JSON form.
    ///
    /// # Errors
    ///
    /// Returns the parser error when `json` is not an object of that shape.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Config of the first entry, in table order, whose domain is a suffix of `hostname`.
    ///
    /// Overlapping suffixes are not ranked: with `example.com` listed before
    /// `api.example.com`, `x.api.example.com` resolves to `example.com`.
    #[must_use]
    pub fn resolve(&self, hostname: &str) -> Option<&DomainConfig> {
        self.entries
            .iter()
            .find(|(domain, _)| hostname.ends_with(domain.as_str()))
            .map(|(_, config)| config)
    }

    /// Domain suffixes in table order.
    pub fn domains(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(domain, _)| domain.as_str())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
#[path = "domains_tests.rs"]
mod domains_tests;
