// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Backend over a string-only remote key-value service.

use std::time::Duration;

use moka::sync::Cache;
use strata_tier::{Backend, Error, Kind, Result, Value};

use crate::client::{RemoteClient, SetCondition};
use crate::options::RemoteOptions;
use crate::tags::TypeTags;

/// A [`Backend`] that stores values as text in a remote service.
///
/// Values are written in their canonical text form. Without type management
/// every read returns a [`Value::String`]; with it, each key's kind is kept in
/// a companion tag (see [`crate::tags`]) and restored on read.
///
/// When result caching is enabled, decoded reads are kept in process for the
/// configured lifetime. Every write through this backend invalidates the key,
/// but writes made by other processes become visible only once the cached
/// result expires.
///
/// Arithmetic runs on the server. Incrementing an absent key creates it from
/// zero with no lifetime and, with type management, classifies it as `i64`.
/// A classified key whose new total leaves its kind has the change taken back
/// and fails with [`ErrorKind::Conversion`](strata_tier::ErrorKind::Conversion).
///
/// # Examples
///
/// ```
/// use strata_remote::testing::FakeRemote;
/// use strata_remote::{RemoteBackend, RemoteOptions};
/// use strata_tier::{Backend, Value};
///
/// let options = RemoteOptions::new("fake://").with_manage_types(true);
/// let backend = RemoteBackend::new(FakeRemote::new(), options);
///
/// backend.set("ns:small", &Value::from(8_u8), None)?;
/// assert_eq!(backend.get("ns:small")?, Some(Value::from(8_u8)));
/// # Ok::<(), strata_tier::Error>(())
/// ```
#[derive(Debug)]
pub struct RemoteBackend<C> {
    client: C,
    options: RemoteOptions,
    results: Option<Cache<String, Value>>,
}

impl<C: RemoteClient> RemoteBackend<C> {
    /// Creates a backend driving `client`.
    #[must_use]
    pub fn new(client: C, options: RemoteOptions) -> Self {
        let results = options.result_caching().then(|| {
            Cache::builder()
                .max_capacity(options.result_cache_capacity())
                .time_to_live(options.result_caching_ttl())
                .build()
        });

        Self {
            client,
            options,
            results,
        }
    }

    /// The underlying client.
    #[must_use]
    pub fn client(&self) -> &C {
        &self.client
    }

    /// The remote settings in effect.
    #[must_use]
    pub fn options(&self) -> &RemoteOptions {
        &self.options
    }

    fn tags(&self) -> Option<TypeTags<'_, C>> {
        self.options.manage_types().then(|| TypeTags::new(&self.client))
    }

    fn encode(&self, value: &Value) -> String {
        value.to_text(self.options.datetime_format())
    }

    fn decode(&self, key: &str, text: String, kind: Option<Kind>) -> Result<Value> {
        match kind {
            Some(kind) => Value::from_text(kind, &text, self.options.datetime_format()).map_err(|e| e.with_key(key)),
            None => Ok(Value::String(text)),
        }
    }

    fn cached(&self, key: &str) -> Option<Value> {
        self.results.as_ref().and_then(|results| results.get(key))
    }

    fn remember(&self, key: &str, value: &Value) {
        if let Some(results) = &self.results {
            results.insert(key.to_owned(), value.clone());
        }
    }

    fn forget(&self, key: &str) {
        if let Some(results) = &self.results {
            results.invalidate(key);
        }
    }

    /// Writes the kind tag, or refreshes its lifetime when the key is already
    /// classified.
    fn classify(&self, key: &str, kind: Kind, ttl: Option<Duration>) -> Result<()> {
        if let Some(tags) = self.tags() {
            if !tags.record(key, kind, ttl)? {
                tags.refresh(key, ttl)?;
            }
        }
        Ok(())
    }

    /// Takes back an increment whose total left the key's kind.
    fn revert(&self, key: &str, delta: i64) -> Result<()> {
        match delta.checked_neg() {
            Some(negated) => self.client.incr_by(key, negated).map(|_| ()),
            None => {
                self.client.incr_by(key, i64::MAX)?;
                self.client.incr_by(key, 1).map(|_| ())
            }
        }
    }

    fn fetch_many(&self, keys: &[String]) -> Result<Vec<Result<Option<Value>>>> {
        let texts = self.client.get_many(keys)?;
        let kinds = match self.tags() {
            Some(tags) => tags.lookup_many(keys)?,
            None => keys.iter().map(|_| None).collect(),
        };

        Ok(keys
            .iter()
            .zip(texts)
            .zip(kinds)
            .map(|((key, text), kind)| {
                let Some(text) = text else { return Ok(None) };
                let value = self.decode(key, text, kind.transpose()?)?;
                self.remember(key, &value);
                Ok(Some(value))
            })
            .collect())
    }
}

/// Gives every key of a failed batch its own copy of the failure.
fn spread<T>(operation: &'static str, keys: &[String], error: &Error) -> Vec<Result<T>> {
    keys.iter()
        .map(|key| Err(Error::backend(operation, key.as_str(), error.to_string())))
        .collect()
}

impl<C: RemoteClient> Backend for RemoteBackend<C> {
    fn name(&self) -> &'static str {
        "remote"
    }

    fn get(&self, key: &str) -> Result<Option<Value>> {
        if let Some(value) = self.cached(key) {
            return Ok(Some(value));
        }

        let Some(text) = self.client.get(key)? else {
            return Ok(None);
        };
        let kind = match self.tags() {
            Some(tags) => tags.lookup(key)?,
            None => None,
        };
        let value = self.decode(key, text, kind)?;
        self.remember(key, &value);
        Ok(Some(value))
    }

    fn get_many(&self, keys: &[String]) -> Vec<Result<Option<Value>>> {
        let mut results: Vec<Option<Result<Option<Value>>>> =
            keys.iter().map(|key| self.cached(key).map(|value| Ok(Some(value)))).collect();

        let missing: Vec<String> = keys
            .iter()
            .zip(&results)
            .filter(|(_, result)| result.is_none())
            .map(|(key, _)| key.clone())
            .collect();

        if !missing.is_empty() {
            let fetched = self
                .fetch_many(&missing)
                .unwrap_or_else(|error| spread("get_many", &missing, &error));
            let mut fetched = fetched.into_iter();
            for slot in results.iter_mut().filter(|slot| slot.is_none()) {
                *slot = fetched.next();
            }
        }

        results.into_iter().map(|result| result.unwrap_or(Ok(None))).collect()
    }

    fn contains(&self, key: &str) -> Result<bool> {
        self.client.exists(key)
    }

    fn set(&self, key: &str, value: &Value, ttl: Option<Duration>) -> Result<()> {
        self.forget(key);
        self.client.set(key, &self.encode(value), ttl, SetCondition::Always)?;
        self.classify(key, value.kind(), ttl)
    }

    fn replace(&self, key: &str, value: &Value, ttl: Option<Duration>) -> Result<bool> {
        self.forget(key);
        let replaced = self.client.set(key, &self.encode(value), ttl, SetCondition::IfPresent)?;
        if replaced {
            self.classify(key, value.kind(), ttl)?;
        }
        Ok(replaced)
    }

    fn touch(&self, key: &str, ttl: Option<Duration>) -> Result<bool> {
        self.forget(key);
        let touched = self.client.expire(key, ttl)?;
        if touched && let Some(tags) = self.tags() {
            tags.refresh(key, ttl)?;
        }
        Ok(touched)
    }

    fn remove(&self, key: &str) -> Result<bool> {
        self.forget(key);
        let removed = self.client.delete(key)?;
        if let Some(tags) = self.tags() {
            tags.forget(key)?;
        }
        Ok(removed)
    }

    fn remove_many(&self, keys: &[String]) -> Vec<Result<bool>> {
        for key in keys {
            self.forget(key);
        }

        let removed = self.client.delete_many(keys).and_then(|removed| {
            if let Some(tags) = self.tags() {
                tags.forget_many(keys)?;
            }
            Ok(removed)
        });

        match removed {
            Ok(removed) => removed.into_iter().map(Ok).collect(),
            Err(error) => spread("remove_many", keys, &error),
        }
    }

    fn increment(&self, key: &str, delta: i64) -> Result<i64> {
        self.forget(key);
        let Some(tags) = self.tags() else {
            return self.client.incr_by(key, delta);
        };

        let kind = tags.lookup(key)?;
        let value = self.client.incr_by(key, delta)?;
        match kind {
            Some(kind) => {
                if Value::from_text(kind, &value.to_string(), self.options.datetime_format()).is_err() {
                    self.revert(key, delta)?;
                    return Err(Error::conversion(format!("adding {delta} overflows the {kind} range")).with_key(key));
                }
            }
            None => {
                tags.record(key, Kind::I64, None)?;
            }
        }
        Ok(value)
    }

    fn open(&self) -> Result<()> {
        self.client.connect()
    }

    fn close(&self) -> Result<()> {
        if let Some(results) = &self.results {
            results.invalidate_all();
        }
        self.client.close()
    }
}
