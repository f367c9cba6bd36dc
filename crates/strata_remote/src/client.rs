// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! The string-only primitives a remote key-value service offers.

use std::fmt::Debug;
use std::time::Duration;

use strata_tier::Result;

/// Precondition attached to a [`RemoteClient::set`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SetCondition {
    /// Write regardless of whether the key exists.
    #[default]
    Always,
    /// Write only if the key does not exist (`NX`).
    IfAbsent,
    /// Write only if the key already exists (`XX`).
    IfPresent,
}

/// A connection to a remote key-value service that stores text.
///
/// Lifetimes of `None` mean the key never expires. Batch methods default to
/// one round trip per key; clients able to pipeline should override them.
pub trait RemoteClient: Debug + Send + Sync {
    /// Establishes and validates the connection.
    fn connect(&self) -> Result<()> {
        Ok(())
    }

    /// Reads the text stored at `key`.
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Reads several keys, positionally.
    fn get_many(&self, keys: &[String]) -> Result<Vec<Option<String>>> {
        keys.iter().map(|key| self.get(key)).collect()
    }

    /// Writes `value` under `key` if `condition` holds. Returns whether the
    /// write happened.
    fn set(&self, key: &str, value: &str, ttl: Option<Duration>, condition: SetCondition) -> Result<bool>;

    /// Returns whether `key` exists.
    fn exists(&self, key: &str) -> Result<bool>;

    /// Sets the lifetime of an existing key. With `None` any lifetime is
    /// removed so the key persists. Returns whether the key exists.
    fn expire(&self, key: &str, ttl: Option<Duration>) -> Result<bool>;

    /// Deletes `key`. Returns whether it existed.
    fn delete(&self, key: &str) -> Result<bool>;

    /// Deletes several keys, positionally.
    fn delete_many(&self, keys: &[String]) -> Result<Vec<bool>> {
        keys.iter().map(|key| self.delete(key)).collect()
    }

    /// Atomically adds `delta` to the integer stored at `key`.
    ///
    /// An absent key is created from zero and never expires. An existing
    /// key keeps its remaining lifetime. Text that is not a 64-bit integer,
    /// or a sum outside the `i64` range, fails with
    /// [`ErrorKind::Conversion`](strata_tier::ErrorKind::Conversion).
    fn incr_by(&self, key: &str, delta: i64) -> Result<i64>;

    /// Releases the connection.
    fn close(&self) -> Result<()> {
        Ok(())
    }
}
