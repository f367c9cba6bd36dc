// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! In-process stand-in for a remote key-value service.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use strata_tier::{Error, Result};

use crate::client::{RemoteClient, SetCondition};

#[derive(Debug, Clone)]
struct FakeEntry {
    value: String,
    expires_at: Option<Instant>,
}

impl FakeEntry {
    fn is_live(&self, now: Instant) -> bool {
        self.expires_at.is_none_or(|deadline| deadline > now)
    }
}

/// A string-only [`RemoteClient`] that keeps everything in process.
///
/// Behaves like a single remote server: keys expire, conditional writes honor
/// their precondition and `incr_by` only accepts integer text. Clones talk to
/// the same server.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use strata_remote::testing::FakeRemote;
/// use strata_remote::{RemoteClient, SetCondition};
///
/// let remote = FakeRemote::new();
/// remote.set("k", "1", Some(Duration::from_secs(5)), SetCondition::Always)?;
/// assert_eq!(remote.incr_by("k", 2)?, 3);
/// assert_eq!(remote.raw("k").as_deref(), Some("3"));
/// assert!(remote.ttl_of("k").is_some());
/// # Ok::<(), strata_tier::Error>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct FakeRemote {
    entries: Arc<Mutex<HashMap<String, FakeEntry>>>,
    connects: Arc<AtomicUsize>,
    offline: Arc<AtomicBool>,
}

impl FakeRemote {
    /// Creates an empty server.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the live text stored at `key`, bypassing the client surface.
    #[must_use]
    pub fn raw(&self, key: &str) -> Option<String> {
        let now = Instant::now();
        self.entries
            .lock()
            .get(key)
            .filter(|entry| entry.is_live(now))
            .map(|entry| entry.value.clone())
    }

    /// Returns the remaining lifetime of `key`, or `None` when the key is
    /// absent or never expires.
    #[must_use]
    pub fn ttl_of(&self, key: &str) -> Option<Duration> {
        let now = Instant::now();
        self.entries
            .lock()
            .get(key)
            .filter(|entry| entry.is_live(now))
            .and_then(|entry| entry.expires_at)
            .map(|deadline| deadline.saturating_duration_since(now))
    }

    /// Returns every live key, sorted.
    #[must_use]
    pub fn keys(&self) -> Vec<String> {
        let now = Instant::now();
        let mut keys: Vec<String> = self
            .entries
            .lock()
            .iter()
            .filter(|(_, entry)| entry.is_live(now))
            .map(|(key, _)| key.clone())
            .collect();
        keys.sort();
        keys
    }

    /// Number of successful [`RemoteClient::connect`] calls.
    #[must_use]
    pub fn connect_count(&self) -> usize {
        self.connects.load(Ordering::Relaxed)
    }

    /// Makes every subsequent call fail until switched back.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::Relaxed);
    }

    fn reachable(&self, operation: &'static str, key: &str) -> Result<()> {
        if self.offline.load(Ordering::Relaxed) {
            return Err(Error::backend(operation, key, "fake remote is offline"));
        }
        Ok(())
    }

    fn with_live<T>(&self, key: &str, f: impl FnOnce(Option<&mut FakeEntry>) -> T) -> T {
        let now = Instant::now();
        let mut entries = self.entries.lock();
        if entries.get(key).is_some_and(|entry| !entry.is_live(now)) {
            entries.remove(key);
        }
        f(entries.get_mut(key))
    }
}

impl RemoteClient for FakeRemote {
    fn connect(&self) -> Result<()> {
        self.reachable("connect", "")?;
        self.connects.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    fn get(&self, key: &str) -> Result<Option<String>> {
        self.reachable("get", key)?;
        Ok(self.with_live(key, |entry| entry.map(|entry| entry.value.clone())))
    }

    fn set(&self, key: &str, value: &str, ttl: Option<Duration>, condition: SetCondition) -> Result<bool> {
        self.reachable("set", key)?;
        let now = Instant::now();
        let mut entries = self.entries.lock();
        let exists = entries.get(key).is_some_and(|entry| entry.is_live(now));
        let allowed = match condition {
            SetCondition::Always => true,
            SetCondition::IfAbsent => !exists,
            SetCondition::IfPresent => exists,
        };
        if allowed {
            let entry = FakeEntry {
                value: value.to_owned(),
                expires_at: ttl.map(|ttl| now + ttl),
            };
            entries.insert(key.to_owned(), entry);
        }
        Ok(allowed)
    }

    fn exists(&self, key: &str) -> Result<bool> {
        self.reachable("exists", key)?;
        Ok(self.with_live(key, |entry| entry.is_some()))
    }

    fn expire(&self, key: &str, ttl: Option<Duration>) -> Result<bool> {
        self.reachable("expire", key)?;
        Ok(self.with_live(key, |entry| match entry {
            Some(entry) => {
                entry.expires_at = ttl.map(|ttl| Instant::now() + ttl);
                true
            }
            None => false,
        }))
    }

    fn delete(&self, key: &str) -> Result<bool> {
        self.reachable("delete", key)?;
        let now = Instant::now();
        let removed = self.entries.lock().remove(key);
        Ok(removed.is_some_and(|entry| entry.is_live(now)))
    }

    fn incr_by(&self, key: &str, delta: i64) -> Result<i64> {
        self.reachable("incr_by", key)?;
        let now = Instant::now();
        let mut entries = self.entries.lock();
        let live = entries.get(key).filter(|entry| entry.is_live(now)).cloned();

        let current = match &live {
            Some(entry) => entry
                .value
                .parse::<i64>()
                .ok()
                .ok_or_else(|| Error::conversion("value is not an integer or out of range").with_key(key))?,
            None => 0,
        };
        let updated = current
            .checked_add(delta)
            .ok_or_else(|| Error::conversion("increment or decrement would overflow").with_key(key))?;

        let entry = FakeEntry {
            value: updated.to_string(),
            expires_at: live.and_then(|entry| entry.expires_at),
        };
        entries.insert(key.to_owned(), entry);
        Ok(updated)
    }
}
