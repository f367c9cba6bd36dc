// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::time::{Duration, Instant};

use moka::Expiry;
use strata_tier::Value;

/// A stored value with the lifetime it was written with.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct MemoryEntry {
    pub(crate) value: Value,
    pub(crate) ttl: Option<Duration>,
    /// Set by in-place updates that must not extend the entry's remaining life.
    pub(crate) keep_expiry: bool,
}

impl MemoryEntry {
    pub(crate) fn new(value: Value, ttl: Option<Duration>) -> Self {
        Self {
            value,
            ttl,
            keep_expiry: false,
        }
    }

    pub(crate) fn updated(&self, value: Value) -> Self {
        Self {
            value,
            ttl: self.ttl,
            keep_expiry: true,
        }
    }
}

/// Per-entry expiration driven by [`MemoryEntry::ttl`].
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct EntryExpiry;

impl Expiry<String, MemoryEntry> for EntryExpiry {
    fn expire_after_create(&self, _key: &String, entry: &MemoryEntry, _created_at: Instant) -> Option<Duration> {
        entry.ttl
    }

    fn expire_after_update(
        &self,
        _key: &String,
        entry: &MemoryEntry,
        _updated_at: Instant,
        duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        if entry.keep_expiry { duration_until_expiry } else { entry.ttl }
    }
}
