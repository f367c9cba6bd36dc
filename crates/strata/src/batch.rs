// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Multi-key operations.
//!
//! Each key runs the single-key protocol independently. Reads, writes and
//! removals reach the backend as one batch so backends with a pipelined
//! transport can use it; there is no cross-key atomicity and no rollback.

use std::collections::HashMap;
use std::time::Instant;

use strata_tier::Value;

use crate::telemetry::{CacheActivity, CacheOperation};
use crate::{Cache, Partial};

impl Cache {
    /// Reads several keys at once.
    ///
    /// Found values are returned keyed by the caller's (non-namespaced) key.
    /// Missing, rejected and failed keys are left out and the most recent of
    /// their errors is reported alongside.
    pub fn get_many<K: AsRef<str>>(&self, keys: &[K]) -> Partial<HashMap<String, Value>> {
        let start = Instant::now();
        let mut last_error = None;
        let mut accepted = Vec::with_capacity(keys.len());
        let mut ns_keys = Vec::with_capacity(keys.len());

        for key in keys {
            let key = key.as_ref();
            match self.read_key(key) {
                Ok(ns_key) => {
                    accepted.push(key);
                    ns_keys.push(ns_key);
                }
                Err(error) => {
                    self.record(CacheOperation::Get, CacheActivity::Rejected, start);
                    last_error = Some(error);
                }
            }
        }

        let mut found = HashMap::with_capacity(accepted.len());
        if accepted.is_empty() {
            return Partial::new(found, last_error);
        }

        let results = self.backend.get_many(&ns_keys);
        for ((key, ns_key), local) in accepted.into_iter().zip(&ns_keys).zip(results) {
            match self.resolve(CacheOperation::Get, key, ns_key, local, start) {
                Ok(value) => {
                    found.insert(key.to_owned(), value);
                }
                Err(error) => last_error = Some(error),
            }
        }

        Partial::new(found, last_error)
    }

    /// Checks several keys at once; see [`has`](Self::has).
    pub fn has_many<K: AsRef<str>>(&self, keys: &[K]) -> HashMap<String, bool> {
        keys.iter()
            .map(|key| (key.as_ref().to_owned(), self.has(key.as_ref())))
            .collect()
    }

    /// Stores several values at once with this tier's lifetime.
    ///
    /// Returns the keys this tier stored. Successfully stored entries are
    /// copied to the chained tier in one batch.
    ///
    /// # Examples
    ///
    /// ```
    /// use strata::Cache;
    ///
    /// let cache = Cache::memory("", None)?;
    /// let stored = cache.set_many([("a", 1_i64), ("b", 2_i64)]).into_result()?;
    /// assert_eq!(stored, ["a", "b"]);
    /// # Ok::<(), strata::Error>(())
    /// ```
    pub fn set_many<I, K, V>(&self, values: I) -> Partial<Vec<String>>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        let start = Instant::now();
        let mut last_error = None;
        let mut keys = Vec::new();
        let mut entries = Vec::new();

        for (key, value) in values {
            let key = key.into();
            let value = value.into();
            match self.admit(&key, &value) {
                Ok(ns_key) => {
                    keys.push(key);
                    entries.push((ns_key, value));
                }
                Err(error) => {
                    self.record(CacheOperation::Set, CacheActivity::Rejected, start);
                    last_error = Some(error);
                }
            }
        }

        if entries.is_empty() {
            return Partial::new(Vec::new(), last_error);
        }

        let results = self.backend.set_many(&entries, self.options.ttl());
        let mut stored = Vec::with_capacity(keys.len());
        let mut mirror = Vec::new();
        for ((key, (_, value)), result) in keys.into_iter().zip(entries).zip(results) {
            match result {
                Ok(()) => {
                    self.record(CacheOperation::Set, CacheActivity::Inserted, start);
                    if self.next.is_some() {
                        mirror.push((key.clone(), value));
                    }
                    stored.push(key);
                }
                Err(error) => {
                    self.record(CacheOperation::Set, CacheActivity::Error, start);
                    last_error = Some(error);
                }
            }
        }

        if let Some(next) = self.chained()
            && !mirror.is_empty()
            && let Some(error) = next.set_many(mirror).into_parts().1
        {
            self.mirrored::<()>(CacheOperation::Set, Err(error));
        }

        Partial::new(stored, last_error)
    }

    /// Replaces several existing values; see [`check_and_set`](Self::check_and_set).
    ///
    /// Returns the keys that were replaced.
    pub fn check_and_set_many<I, K, V>(&self, values: I) -> Partial<Vec<String>>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        let mut last_error = None;
        let mut replaced = Vec::new();

        for (key, value) in values {
            let key = key.into();
            match self.check_and_set(&key, value) {
                Ok(()) => replaced.push(key),
                Err(error) => last_error = Some(error),
            }
        }

        Partial::new(replaced, last_error)
    }

    /// Refreshes several keys; see [`touch`](Self::touch).
    ///
    /// Returns the keys refreshed in this tier.
    pub fn touch_many<K: AsRef<str>>(&self, keys: &[K]) -> Vec<String> {
        keys.iter()
            .map(K::as_ref)
            .filter(|key| self.touch(key))
            .map(str::to_owned)
            .collect()
    }

    /// Deletes several keys from this tier and every chained tier.
    ///
    /// Returns the keys this tier removed.
    pub fn remove_many<K: AsRef<str>>(&self, keys: &[K]) -> Vec<String> {
        let start = Instant::now();
        let mut accepted = Vec::with_capacity(keys.len());
        let mut ns_keys = Vec::with_capacity(keys.len());

        for key in keys {
            let key = key.as_ref();
            if let Ok(ns_key) = self.write_key(key) {
                accepted.push(key);
                ns_keys.push(ns_key);
            } else {
                self.record(CacheOperation::Remove, CacheActivity::Rejected, start);
            }
        }

        let mut removed = Vec::new();
        if !accepted.is_empty() {
            for (key, result) in accepted.into_iter().zip(self.backend.remove_many(&ns_keys)) {
                match result {
                    Ok(true) => {
                        self.record(CacheOperation::Remove, CacheActivity::Removed, start);
                        removed.push(key.to_owned());
                    }
                    Ok(false) => self.record(CacheOperation::Remove, CacheActivity::Miss, start),
                    Err(error) => {
                        self.record(CacheOperation::Remove, CacheActivity::Error, start);
                        tracing::debug!(cache.name = self.name, key, error = %error, "remove failed");
                    }
                }
            }
        }

        if let Some(next) = self.chained() {
            next.remove_many(keys);
        }
        removed
    }
}

#[cfg(test)]
mod tests {
    use strata_tier::testing::{BackendOp, MockBackend};
    use strata_tier::{Backend, ErrorKind, Kind, KindSet, Options};

    use super::*;

    fn tier() -> (MockBackend, Cache) {
        let backend = MockBackend::new();
        (backend.clone(), Cache::new(backend, Options::default()))
    }

    #[test]
    fn get_many_reports_found_keys_and_last_error() {
        let (backend, cache) = tier();
        backend.set("a", &Value::from(1_u8), None).unwrap();

        let (found, error) = cache.get_many(&["a", "missing"]).into_parts();

        assert_eq!(found.len(), 1);
        assert_eq!(found["a"], Value::from(1_u8));
        assert_eq!(error.unwrap().kind(), ErrorKind::KeyNotFound);
    }

    #[test]
    fn get_many_strips_the_namespace() {
        let backend = MockBackend::new();
        backend.set("ns:a", &Value::from("x"), None).unwrap();
        let options = Options::builder().namespace("ns:").build().unwrap();
        let cache = Cache::new(backend, options);

        let found = cache.get_many(&["a"]).into_result().unwrap();

        assert_eq!(found.keys().collect::<Vec<_>>(), ["a"]);
    }

    #[test]
    fn rejected_keys_skip_the_backend() {
        let backend = MockBackend::new();
        let options = Options::builder().key_pattern("^[a-z]+$").build().unwrap();
        let cache = Cache::new(backend.clone(), options);

        let partial = cache.get_many(&["UPPER"]);

        assert_eq!(partial.error().unwrap().kind(), ErrorKind::KeyInvalid);
        assert!(backend.operations().is_empty());
    }

    #[test]
    fn get_many_falls_back_per_key() {
        let (near_backend, near) = tier();
        let (far_backend, far) = tier();
        near_backend.set("a", &Value::from("near"), None).unwrap();
        far_backend.set("b", &Value::from("far"), None).unwrap();

        let cache = near.chain(far);
        let found = cache.get_many(&["a", "b"]).into_result().unwrap();

        assert_eq!(found["a"], Value::from("near"));
        assert_eq!(found["b"], Value::from("far"));
        assert_eq!(near_backend.peek("b"), Some(Value::from("far")));
    }

    #[test]
    fn has_many_maps_every_key() {
        let (backend, cache) = tier();
        backend.set("a", &Value::from(true), None).unwrap();

        let present = cache.has_many(&["a", "b"]);

        assert_eq!(present.len(), 2);
        assert!(present["a"]);
        assert!(!present["b"]);
    }

    #[test]
    fn set_many_keeps_successes_beside_rejections() {
        let backend = MockBackend::new();
        let options = Options::builder().kinds(KindSet::of([Kind::String])).build().unwrap();
        let cache = Cache::new(backend.clone(), options);

        let partial = cache.set_many([("a", Value::from("x")), ("b", Value::from(1_u8))]);

        assert_eq!(partial.value(), &["a".to_owned()]);
        assert_eq!(partial.error().unwrap().kind(), ErrorKind::UnsupportedDataType);
        assert_eq!(backend.entry_count(), 1);
    }

    #[test]
    fn set_many_reports_backend_failures() {
        let (backend, cache) = tier();
        backend.fail_when(|op| op.key() == Some("b"));

        let partial = cache.set_many([("a", 1_i32), ("b", 2_i32)]);

        assert_eq!(partial.value(), &["a".to_owned()]);
        assert_eq!(partial.error().unwrap().kind(), ErrorKind::Backend);
    }

    #[test]
    fn set_many_mirrors_stored_entries() {
        let (_, near) = tier();
        let (far_backend, far) = tier();

        let cache = near.chain(far);
        cache.set_many([("a", 1_i32), ("b", 2_i32)]).into_result().unwrap();

        assert_eq!(far_backend.entry_count(), 2);
    }

    #[test]
    fn check_and_set_many_returns_replaced_keys() {
        let (backend, cache) = tier();
        backend.set("a", &Value::from(1_u8), None).unwrap();

        let partial = cache.check_and_set_many([("a", 2_u8), ("b", 3_u8)]);

        assert_eq!(partial.value(), &["a".to_owned()]);
        assert_eq!(partial.error().unwrap().kind(), ErrorKind::KeyNotFound);
        assert_eq!(backend.peek("a"), Some(Value::from(2_u8)));
        assert_eq!(backend.peek("b"), None);
    }

    #[test]
    fn touch_many_returns_live_keys() {
        let (backend, cache) = tier();
        backend.set("a", &Value::from(1_u8), None).unwrap();

        assert_eq!(cache.touch_many(&["a", "b"]), ["a"]);
    }

    #[test]
    fn remove_many_clears_every_tier() {
        let (near_backend, near) = tier();
        let (far_backend, far) = tier();
        near_backend.set("a", &Value::from(1_u8), None).unwrap();
        far_backend.set("a", &Value::from(1_u8), None).unwrap();
        far_backend.set("b", &Value::from(2_u8), None).unwrap();

        let cache = near.chain(far);
        let removed = cache.remove_many(&["a", "b"]);

        assert_eq!(removed, ["a"]);
        assert_eq!(near_backend.entry_count(), 0);
        assert_eq!(far_backend.entry_count(), 0);
    }

    #[test]
    fn remove_many_on_read_only_tier_removes_nothing() {
        let backend = MockBackend::new();
        backend.set("a", &Value::from(1_u8), None).unwrap();
        backend.clear_operations();
        let options = Options::builder().writable(false).build().unwrap();
        let cache = Cache::new(backend.clone(), options);

        assert!(cache.remove_many(&["a"]).is_empty());
        assert!(!backend.operations().iter().any(|op| matches!(op, BackendOp::Remove(_))));
    }
}
