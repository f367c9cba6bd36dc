// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! In-memory backend implementation using moka.

use std::sync::Arc;
use std::time::Duration;

use moka::ops::compute::{CompResult, Op};
use moka::sync::Cache;
use strata_tier::{Backend, Error, Result, Value};

use crate::builder::MemoryBackendBuilder;
use crate::entry::{EntryExpiry, MemoryEntry};

/// A process-local backend backed by moka.
///
/// Values are stored natively, so every kind reads back exactly as written.
/// Each entry carries its own lifetime; expired entries behave as absent.
/// Clones share the same store.
///
/// # Examples
///
/// ```
/// use strata_memory::MemoryBackend;
/// use strata_tier::{Backend, Value};
///
/// let backend = MemoryBackend::new();
/// backend.set("ns:hits", &Value::from(1_u32), None)?;
/// assert_eq!(backend.increment("ns:hits", 2)?, 3);
/// assert_eq!(backend.get("ns:hits")?, Some(Value::from(3_u32)));
/// # Ok::<(), strata_tier::Error>(())
/// ```
#[derive(Debug, Clone)]
pub struct MemoryBackend {
    inner: Arc<Cache<String, MemoryEntry>>,
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryBackend {
    /// Creates an unbounded in-memory backend.
    #[must_use]
    pub fn new() -> Self {
        Self::builder().build()
    }

    /// Creates a backend holding at most `max_capacity` entries.
    #[must_use]
    pub fn with_capacity(max_capacity: u64) -> Self {
        Self::builder().max_capacity(max_capacity).build()
    }

    /// Creates a builder for configuring the backend.
    #[must_use]
    pub fn builder() -> MemoryBackendBuilder {
        MemoryBackendBuilder::new()
    }

    pub(crate) fn from_builder(builder: &MemoryBackendBuilder) -> Self {
        let mut moka_builder = Cache::builder().expire_after(EntryExpiry);

        if let Some(capacity) = builder.max_capacity {
            moka_builder = moka_builder.max_capacity(capacity);
        }

        if let Some(capacity) = builder.initial_capacity {
            moka_builder = moka_builder.initial_capacity(capacity);
        }

        if let Some(tti) = builder.time_to_idle {
            moka_builder = moka_builder.time_to_idle(tti);
        }

        if let Some(name) = builder.name.as_deref() {
            moka_builder = moka_builder.name(name);
        }

        Self {
            inner: Arc::new(moka_builder.build()),
        }
    }

    /// Returns the approximate number of live entries.
    #[must_use]
    pub fn entry_count(&self) -> u64 {
        self.inner.run_pending_tasks();
        self.inner.entry_count()
    }
}

impl Backend for MemoryBackend {
    fn name(&self) -> &'static str {
        "memory"
    }

    fn get(&self, key: &str) -> Result<Option<Value>> {
        Ok(self.inner.get(key).map(|entry| entry.value))
    }

    fn contains(&self, key: &str) -> Result<bool> {
        Ok(self.inner.contains_key(key))
    }

    fn set(&self, key: &str, value: &Value, ttl: Option<Duration>) -> Result<()> {
        self.inner.insert(key.to_owned(), MemoryEntry::new(value.clone(), ttl));
        Ok(())
    }

    fn replace(&self, key: &str, value: &Value, ttl: Option<Duration>) -> Result<bool> {
        let result = self.inner.entry(key.to_owned()).and_compute_with(|current| match current {
            Some(_) => Op::Put(MemoryEntry::new(value.clone(), ttl)),
            None => Op::Nop,
        });
        Ok(matches!(result, CompResult::ReplacedWith(_)))
    }

    fn touch(&self, key: &str, ttl: Option<Duration>) -> Result<bool> {
        let result = self.inner.entry(key.to_owned()).and_compute_with(|current| match current {
            Some(entry) => Op::Put(MemoryEntry::new(entry.into_value().value, ttl)),
            None => Op::Nop,
        });
        Ok(matches!(result, CompResult::ReplacedWith(_)))
    }

    fn remove(&self, key: &str) -> Result<bool> {
        Ok(self.inner.remove(key).is_some())
    }

    fn increment(&self, key: &str, delta: i64) -> Result<i64> {
        let result = self.inner.entry(key.to_owned()).and_try_compute_with(|current| {
            let entry = current.ok_or_else(|| Error::key_not_found(key))?;
            let updated = entry.value().value.checked_add(delta).map_err(|e| e.with_key(key))?;
            Ok::<_, Error>(Op::Put(entry.value().updated(updated)))
        })?;

        match result {
            CompResult::ReplacedWith(entry) | CompResult::Inserted(entry) => entry.into_value().value.as_i64(),
            _ => Err(Error::key_not_found(key)),
        }
    }
}
