// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! The storage contract every cache backend satisfies.
//!
//! [`Backend`] is the narrow surface a cache drives after it has applied its
//! policy. Keys reaching a backend are already namespaced and validated, and
//! written values are already known to be of an allowed kind.

use std::fmt::Debug;
use std::time::Duration;

use crate::{Error, KindSet, Result, Value};

/// Trait for cache backend implementations.
///
/// Implementations must be safe to share across threads and must keep each
/// single-key operation atomic with respect to concurrent operations on the
/// same backend.
///
/// The batch methods default to one call per key; backends with a native
/// pipelined or multi-key primitive should override them. Batch results are
/// positional: the `n`th result belongs to the `n`th key.
pub trait Backend: Debug + Send + Sync {
    /// A short name identifying the backend in logs and telemetry.
    fn name(&self) -> &'static str;

    /// Kinds this backend is able to store. Defaults to every kind.
    fn supported_kinds(&self) -> KindSet {
        KindSet::all()
    }

    /// Reads a value. `Ok(None)` means the key is absent or expired.
    fn get(&self, key: &str) -> Result<Option<Value>>;

    /// Reads several values.
    fn get_many(&self, keys: &[String]) -> Vec<Result<Option<Value>>> {
        keys.iter().map(|key| self.get(key)).collect()
    }

    /// Returns `true` when a live entry exists for `key`.
    fn contains(&self, key: &str) -> Result<bool>;

    /// Stores a value unconditionally. `ttl` of `None` means never expire.
    fn set(&self, key: &str, value: &Value, ttl: Option<Duration>) -> Result<()>;

    /// Stores several values with the same lifetime.
    fn set_many(&self, entries: &[(String, Value)], ttl: Option<Duration>) -> Vec<Result<()>> {
        entries.iter().map(|(key, value)| self.set(key, value, ttl)).collect()
    }

    /// Stores a value only if a live entry already exists.
    ///
    /// Returns `false` without writing when the key is absent.
    fn replace(&self, key: &str, value: &Value, ttl: Option<Duration>) -> Result<bool>;

    /// Resets the lifetime of an existing entry. Returns `false` when the key
    /// is absent.
    fn touch(&self, key: &str, ttl: Option<Duration>) -> Result<bool>;

    /// Deletes an entry. Returns `true` when something was deleted.
    fn remove(&self, key: &str) -> Result<bool>;

    /// Deletes several entries.
    fn remove_many(&self, keys: &[String]) -> Vec<Result<bool>> {
        keys.iter().map(|key| self.remove(key)).collect()
    }

    /// Adds `delta` to a numeric entry and returns the new value as `i64`.
    fn increment(&self, key: &str, delta: i64) -> Result<i64>;

    /// Subtracts `delta` from a numeric entry and returns the new value as `i64`.
    fn decrement(&self, key: &str, delta: i64) -> Result<i64> {
        let negated = delta
            .checked_neg()
            .ok_or_else(|| Error::conversion(format!("cannot negate {delta}")).with_key(key))?;
        self.increment(key, negated)
    }

    /// Acquires any resources the backend needs. Called once before use.
    fn open(&self) -> Result<()> {
        Ok(())
    }

    /// Releases resources acquired by [`open`](Self::open).
    fn close(&self) -> Result<()> {
        Ok(())
    }
}

impl<B: Backend + ?Sized> Backend for Box<B> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn supported_kinds(&self) -> KindSet {
        (**self).supported_kinds()
    }

    fn get(&self, key: &str) -> Result<Option<Value>> {
        (**self).get(key)
    }

    fn get_many(&self, keys: &[String]) -> Vec<Result<Option<Value>>> {
        (**self).get_many(keys)
    }

    fn contains(&self, key: &str) -> Result<bool> {
        (**self).contains(key)
    }

    fn set(&self, key: &str, value: &Value, ttl: Option<Duration>) -> Result<()> {
        (**self).set(key, value, ttl)
    }

    fn set_many(&self, entries: &[(String, Value)], ttl: Option<Duration>) -> Vec<Result<()>> {
        (**self).set_many(entries, ttl)
    }

    fn replace(&self, key: &str, value: &Value, ttl: Option<Duration>) -> Result<bool> {
        (**self).replace(key, value, ttl)
    }

    fn touch(&self, key: &str, ttl: Option<Duration>) -> Result<bool> {
        (**self).touch(key, ttl)
    }

    fn remove(&self, key: &str) -> Result<bool> {
        (**self).remove(key)
    }

    fn remove_many(&self, keys: &[String]) -> Vec<Result<bool>> {
        (**self).remove_many(keys)
    }

    fn increment(&self, key: &str, delta: i64) -> Result<i64> {
        (**self).increment(key, delta)
    }

    fn decrement(&self, key: &str, delta: i64) -> Result<i64> {
        (**self).decrement(key, delta)
    }

    fn open(&self) -> Result<()> {
        (**self).open()
    }

    fn close(&self) -> Result<()> {
        (**self).close()
    }
}
