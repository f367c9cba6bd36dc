// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Mock backend for testing.
//!
//! [`MockBackend`] keeps values in memory, records every operation it receives
//! and supports failure injection for exercising error paths.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;

use crate::{Backend, Error, KindSet, Result, Value};

/// Recorded backend operation with full context.
#[derive(Debug, Clone, PartialEq)]
pub enum BackendOp {
    /// A read of the given key.
    Get(String),
    /// A liveness check of the given key.
    Contains(String),
    /// An unconditional write.
    Set {
        /// The key that was written.
        key: String,
        /// The value that was written.
        value: Value,
        /// The lifetime requested for the entry.
        ttl: Option<Duration>,
    },
    /// A conditional write.
    Replace {
        /// The key that was targeted.
        key: String,
        /// The value offered.
        value: Value,
    },
    /// A lifetime refresh of the given key.
    Touch(String),
    /// A deletion of the given key.
    Remove(String),
    /// An arithmetic update.
    Increment {
        /// The key that was targeted.
        key: String,
        /// The signed amount added.
        delta: i64,
    },
    /// The backend was opened.
    Open,
    /// The backend was closed.
    Close,
}

impl BackendOp {
    /// Returns the key the operation targets, if any.
    #[must_use]
    pub fn key(&self) -> Option<&str> {
        match self {
            Self::Get(key) | Self::Contains(key) | Self::Touch(key) | Self::Remove(key) => Some(key),
            Self::Set { key, .. } | Self::Replace { key, .. } | Self::Increment { key, .. } => Some(key),
            Self::Open | Self::Close => None,
        }
    }
}

type FailPredicate = Box<dyn Fn(&BackendOp) -> bool + Send + Sync>;

/// A configurable mock backend for testing.
///
/// Clones share data, the operation log and the failure predicate. Entries do
/// not expire; the requested lifetime is only recorded.
///
/// # Examples
///
/// ```
/// use strata_tier::testing::{BackendOp, MockBackend};
/// use strata_tier::{Backend, Value};
///
/// let backend = MockBackend::new();
/// backend.set("k", &Value::from(1_i64), None).unwrap();
///
/// backend.fail_when(|op| matches!(op, BackendOp::Get(_)));
/// assert!(backend.get("k").is_err());
///
/// backend.clear_failures();
/// assert_eq!(backend.get("k").unwrap(), Some(Value::from(1_i64)));
/// ```
#[derive(Clone, Default)]
pub struct MockBackend {
    data: Arc<Mutex<HashMap<String, Value>>>,
    operations: Arc<Mutex<Vec<BackendOp>>>,
    fail_when: Arc<Mutex<Option<FailPredicate>>>,
    kinds: Option<KindSet>,
}

impl std::fmt::Debug for MockBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockBackend")
            .field("data", &self.data)
            .field("operations", &self.operations)
            .field("fail_when", &self.fail_when.lock().is_some())
            .finish_non_exhaustive()
    }
}

impl MockBackend {
    /// Creates an empty mock backend.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a mock backend pre-populated with `data`.
    #[must_use]
    pub fn with_data(data: impl IntoIterator<Item = (String, Value)>) -> Self {
        let backend = Self::new();
        backend.data.lock().extend(data);
        backend
    }

    /// Limits the kinds the backend reports as storable.
    #[must_use]
    pub fn with_supported_kinds(mut self, kinds: KindSet) -> Self {
        self.kinds = Some(kinds);
        self
    }

    /// Sets a predicate that decides which operations fail.
    pub fn fail_when<F>(&self, predicate: F)
    where
        F: Fn(&BackendOp) -> bool + Send + Sync + 'static,
    {
        *self.fail_when.lock() = Some(Box::new(predicate));
    }

    /// Clears the failure predicate.
    pub fn clear_failures(&self) {
        *self.fail_when.lock() = None;
    }

    /// Returns a copy of the recorded operations.
    #[must_use]
    pub fn operations(&self) -> Vec<BackendOp> {
        self.operations.lock().clone()
    }

    /// Clears the operation log.
    pub fn clear_operations(&self) {
        self.operations.lock().clear();
    }

    /// Returns the stored value for `key`, bypassing the operation log.
    #[must_use]
    pub fn peek(&self, key: &str) -> Option<Value> {
        self.data.lock().get(key).cloned()
    }

    /// Returns the number of stored entries.
    #[must_use]
    pub fn entry_count(&self) -> usize {
        self.data.lock().len()
    }

    fn check(&self, op: BackendOp) -> Result<()> {
        let fails = self.fail_when.lock().as_ref().is_some_and(|predicate| predicate(&op));
        let key = op.key().unwrap_or_default().to_owned();
        let name = op_name(&op);
        self.operations.lock().push(op);
        if fails {
            return Err(Error::backend(name, key, format!("mock: {name} failed")));
        }
        Ok(())
    }
}

fn op_name(op: &BackendOp) -> &'static str {
    match op {
        BackendOp::Get(_) => "get",
        BackendOp::Contains(_) => "contains",
        BackendOp::Set { .. } => "set",
        BackendOp::Replace { .. } => "replace",
        BackendOp::Touch(_) => "touch",
        BackendOp::Remove(_) => "remove",
        BackendOp::Increment { .. } => "increment",
        BackendOp::Open => "open",
        BackendOp::Close => "close",
    }
}

impl Backend for MockBackend {
    fn name(&self) -> &'static str {
        "mock"
    }

    fn supported_kinds(&self) -> KindSet {
        self.kinds.unwrap_or_else(KindSet::all)
    }

    fn get(&self, key: &str) -> Result<Option<Value>> {
        self.check(BackendOp::Get(key.to_owned()))?;
        Ok(self.data.lock().get(key).cloned())
    }

    fn contains(&self, key: &str) -> Result<bool> {
        self.check(BackendOp::Contains(key.to_owned()))?;
        Ok(self.data.lock().contains_key(key))
    }

    fn set(&self, key: &str, value: &Value, ttl: Option<Duration>) -> Result<()> {
        self.check(BackendOp::Set {
            key: key.to_owned(),
            value: value.clone(),
            ttl,
        })?;
        self.data.lock().insert(key.to_owned(), value.clone());
        Ok(())
    }

    fn replace(&self, key: &str, value: &Value, _ttl: Option<Duration>) -> Result<bool> {
        self.check(BackendOp::Replace {
            key: key.to_owned(),
            value: value.clone(),
        })?;
        let mut data = self.data.lock();
        match data.get_mut(key) {
            Some(current) => {
                *current = value.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn touch(&self, key: &str, _ttl: Option<Duration>) -> Result<bool> {
        self.check(BackendOp::Touch(key.to_owned()))?;
        Ok(self.data.lock().contains_key(key))
    }

    fn remove(&self, key: &str) -> Result<bool> {
        self.check(BackendOp::Remove(key.to_owned()))?;
        Ok(self.data.lock().remove(key).is_some())
    }

    fn increment(&self, key: &str, delta: i64) -> Result<i64> {
        self.check(BackendOp::Increment {
            key: key.to_owned(),
            delta,
        })?;
        let mut data = self.data.lock();
        let current = data.get_mut(key).ok_or_else(|| Error::key_not_found(key))?;
        let updated = current.checked_add(delta).map_err(|e| e.with_key(key))?;
        let result = updated.as_i64()?;
        *current = updated;
        Ok(result)
    }

    fn open(&self) -> Result<()> {
        self.check(BackendOp::Open)
    }

    fn close(&self) -> Result<()> {
        self.check(BackendOp::Close)
    }
}
