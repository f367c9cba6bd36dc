// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! The cache type: policy checks, backend dispatch and lifecycle.

#[cfg(any(feature = "memory", feature = "redis", feature = "object"))]
use std::time::Duration;
use std::time::Instant;

use strata_tier::{Backend, Error, KindSet, Options, Result, Value};

use crate::builder::CacheBuilder;
use crate::telemetry::{CacheActivity, CacheOperation, CacheTelemetry};

/// Type alias for cache names used in telemetry.
pub type CacheName = &'static str;

/// A cache over one backend, optionally backed by further tiers.
///
/// Every operation runs the same sequence: the readable/writable gate, key
/// namespacing and validation, the allowed-kind check for writes, the
/// backend call and finally the chain protocol. Anything rejected before the
/// backend call never reaches a backend or a chained tier.
///
/// When a tier is chained behind this one, reads that miss (or fail) locally
/// are answered by the chained tier and the value is promoted into this
/// tier's backend. Writes go to this tier first; the chained tier receives a
/// best-effort copy and its failures are only logged.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use strata::{Cache, Value};
///
/// let cache = Cache::memory("sessions:", Some(Duration::from_secs(300)))?;
///
/// cache.set("alice", "token-1")?;
/// assert_eq!(cache.get("alice")?, Value::from("token-1"));
/// assert!(cache.has("alice"));
/// assert!(cache.remove("alice"));
/// # Ok::<(), strata::Error>(())
/// ```
#[derive(Debug)]
pub struct Cache {
    pub(crate) name: CacheName,
    pub(crate) backend: Box<dyn Backend>,
    pub(crate) options: Options,
    pub(crate) next: Option<Box<Cache>>,
    pub(crate) telemetry: CacheTelemetry,
}

impl Cache {
    /// Creates a cache builder.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::time::Duration;
    /// use strata::{Cache, Options};
    ///
    /// let options = Options::builder()
    ///     .namespace("users:")
    ///     .ttl(Duration::from_secs(60))
    ///     .build()?;
    ///
    /// let cache = Cache::builder().memory().options(options).name("users").build();
    /// assert_eq!(cache.name(), "users");
    /// # Ok::<(), strata::Error>(())
    /// ```
    #[must_use]
    pub fn builder() -> CacheBuilder {
        CacheBuilder::new()
    }

    /// Creates a cache over `backend` with the given options.
    #[must_use]
    pub fn new(backend: impl Backend + 'static, options: Options) -> Self {
        Self::builder().backend(backend).options(options).build()
    }

    /// Creates an in-process cache.
    ///
    /// `ttl` of `None` keeps entries until they are removed.
    ///
    /// # Errors
    ///
    /// Returns an error when the options cannot be built.
    #[cfg(feature = "memory")]
    #[cfg_attr(docsrs, doc(cfg(feature = "memory")))]
    pub fn memory(namespace: impl Into<String>, ttl: Option<Duration>) -> Result<Self> {
        let options = tier_options(namespace, ttl, KindSet::all())?;
        Ok(Self::builder().memory().options(options).build())
    }

    /// Creates a cache backed by a Redis-compatible server at `options.url()`.
    ///
    /// No connection is made until the first operation or [`open`](Self::open).
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::InvalidConfiguration`](crate::ErrorKind::InvalidConfiguration)
    /// when the URL is malformed.
    #[cfg(feature = "redis")]
    #[cfg_attr(docsrs, doc(cfg(feature = "redis")))]
    pub fn remote(namespace: impl Into<String>, options: strata_remote::RemoteOptions, ttl: Option<Duration>) -> Result<Self> {
        let client = strata_remote::RedisClient::open(options.url())?;
        let tier = tier_options(namespace, ttl, KindSet::all())?;
        Ok(Self::builder().remote(client, options).options(tier).build())
    }

    /// Creates a cache that keeps text and byte values as objects in `store`.
    ///
    /// # Errors
    ///
    /// Returns an error when the options cannot be built.
    #[cfg(feature = "object")]
    #[cfg_attr(docsrs, doc(cfg(feature = "object")))]
    pub fn object<S>(
        prefix: impl Into<String>,
        options: strata_object::ObjectOptions,
        store: S,
        ttl: Option<Duration>,
    ) -> Result<Self>
    where
        S: strata_object::ObjectStore + 'static,
    {
        let kinds = KindSet::of([strata_tier::Kind::String, strata_tier::Kind::Bytes]);
        let tier = tier_options(prefix, ttl, kinds)?;
        Ok(Self::builder().object(store, options).options(tier).build())
    }

    /// The name identifying this tier in telemetry.
    #[must_use]
    pub fn name(&self) -> CacheName {
        self.name
    }

    /// The policy this tier applies.
    #[must_use]
    pub fn options(&self) -> &Options {
        &self.options
    }

    /// The backend this tier dispatches to.
    #[must_use]
    pub fn backend(&self) -> &dyn Backend {
        self.backend.as_ref()
    }

    /// Reads the value stored under `key`.
    ///
    /// # Errors
    ///
    /// - [`ErrorKind::NotReadable`](crate::ErrorKind::NotReadable) when reads are disabled.
    /// - [`ErrorKind::KeyInvalid`](crate::ErrorKind::KeyInvalid) when the namespaced key
    ///   fails validation.
    /// - [`ErrorKind::KeyNotFound`](crate::ErrorKind::KeyNotFound) when neither this tier
    ///   nor any chained tier holds the key.
    /// - The backend's error when it fails and no tier is chained.
    pub fn get(&self, key: &str) -> Result<Value> {
        let start = Instant::now();
        let ns_key = self
            .read_key(key)
            .inspect_err(|_| self.record(CacheOperation::Get, CacheActivity::Rejected, start))?;
        let local = self.backend.get(&ns_key);
        self.resolve(CacheOperation::Get, key, &ns_key, local, start)
    }

    /// Returns `true` when `key` is held by this tier or a chained one.
    ///
    /// A value found in a chained tier is promoted into this tier. Rejected
    /// keys and backend failures read as `false`.
    pub fn has(&self, key: &str) -> bool {
        let start = Instant::now();
        let Ok(ns_key) = self.read_key(key) else {
            self.record(CacheOperation::Has, CacheActivity::Rejected, start);
            return false;
        };

        match self.backend.contains(&ns_key) {
            Ok(true) => {
                self.record(CacheOperation::Has, CacheActivity::Hit, start);
                true
            }
            Ok(false) => {
                self.record(CacheOperation::Has, CacheActivity::Miss, start);
                self.fall_back(CacheOperation::Has, key, &ns_key, Error::key_not_found(key), start)
                    .is_ok()
            }
            Err(error) => {
                self.record(CacheOperation::Has, CacheActivity::Error, start);
                self.fall_back(CacheOperation::Has, key, &ns_key, error, start).is_ok()
            }
        }
    }

    /// Stores `value` under `key` with this tier's lifetime.
    ///
    /// # Errors
    ///
    /// - [`ErrorKind::NotWritable`](crate::ErrorKind::NotWritable) when writes are disabled.
    /// - [`ErrorKind::KeyInvalid`](crate::ErrorKind::KeyInvalid) when the namespaced key
    ///   fails validation.
    /// - [`ErrorKind::UnsupportedDataType`](crate::ErrorKind::UnsupportedDataType) when the
    ///   value's kind is not accepted by this tier.
    /// - The backend's error when the write fails.
    pub fn set(&self, key: &str, value: impl Into<Value>) -> Result<()> {
        let start = Instant::now();
        let value = value.into();
        let ns_key = self
            .admit(key, &value)
            .inspect_err(|_| self.record(CacheOperation::Set, CacheActivity::Rejected, start))?;

        match self.backend.set(&ns_key, &value, self.options.ttl()) {
            Ok(()) => {
                self.record(CacheOperation::Set, CacheActivity::Inserted, start);
                if let Some(next) = self.chained() {
                    self.mirrored(CacheOperation::Set, next.set(key, value));
                }
                Ok(())
            }
            Err(error) => {
                self.record(CacheOperation::Set, CacheActivity::Error, start);
                Err(error)
            }
        }
    }

    /// Replaces the value under `key` only if the key already exists.
    ///
    /// # Errors
    ///
    /// The same policy errors as [`set`](Self::set), plus
    /// [`ErrorKind::KeyNotFound`](crate::ErrorKind::KeyNotFound) when the key is absent.
    pub fn check_and_set(&self, key: &str, value: impl Into<Value>) -> Result<()> {
        let start = Instant::now();
        let value = value.into();
        let ns_key = self
            .admit(key, &value)
            .inspect_err(|_| self.record(CacheOperation::CheckAndSet, CacheActivity::Rejected, start))?;

        match self.backend.replace(&ns_key, &value, self.options.ttl()) {
            Ok(true) => {
                self.record(CacheOperation::CheckAndSet, CacheActivity::Replaced, start);
                if let Some(next) = self.chained() {
                    self.mirrored(CacheOperation::CheckAndSet, next.check_and_set(key, value));
                }
                Ok(())
            }
            Ok(false) => {
                self.record(CacheOperation::CheckAndSet, CacheActivity::Miss, start);
                Err(Error::key_not_found(key))
            }
            Err(error) => {
                self.record(CacheOperation::CheckAndSet, CacheActivity::Error, start);
                Err(error)
            }
        }
    }

    /// Resets the lifetime of `key` to this tier's TTL.
    ///
    /// Requires the tier to be both readable and writable. Returns whether a
    /// live entry was refreshed here; chained tiers are refreshed as well.
    pub fn touch(&self, key: &str) -> bool {
        let start = Instant::now();
        let ns_key = if self.options.readable() {
            self.write_key(key)
        } else {
            Err(Error::not_readable())
        };
        let Ok(ns_key) = ns_key else {
            self.record(CacheOperation::Touch, CacheActivity::Rejected, start);
            return false;
        };

        let touched = match self.backend.touch(&ns_key, self.options.ttl()) {
            Ok(touched) => {
                let activity = if touched { CacheActivity::Touched } else { CacheActivity::Miss };
                self.record(CacheOperation::Touch, activity, start);
                touched
            }
            Err(error) => {
                self.record(CacheOperation::Touch, CacheActivity::Error, start);
                tracing::debug!(cache.name = self.name, error = %error, "touch failed");
                false
            }
        };

        if let Some(next) = self.chained() {
            next.touch(key);
        }
        touched
    }

    /// Deletes `key` from this tier and every chained tier.
    ///
    /// Returns whether this tier removed an entry.
    pub fn remove(&self, key: &str) -> bool {
        let start = Instant::now();
        let Ok(ns_key) = self.write_key(key) else {
            self.record(CacheOperation::Remove, CacheActivity::Rejected, start);
            return false;
        };

        let removed = match self.backend.remove(&ns_key) {
            Ok(removed) => {
                let activity = if removed { CacheActivity::Removed } else { CacheActivity::Miss };
                self.record(CacheOperation::Remove, activity, start);
                removed
            }
            Err(error) => {
                self.record(CacheOperation::Remove, CacheActivity::Error, start);
                tracing::debug!(cache.name = self.name, error = %error, "remove failed");
                false
            }
        };

        if let Some(next) = self.chained() {
            next.remove(key);
        }
        removed
    }

    /// Adds `delta` to the numeric value under `key` and returns the result as `i64`.
    ///
    /// The stored value keeps its kind. Chained tiers receive the same
    /// increment once it succeeded here.
    ///
    /// # Errors
    ///
    /// Policy errors as for [`set`](Self::set), and the backend's error when the
    /// key is missing (for backends that require it), the value is not numeric
    /// or the result overflows its kind.
    pub fn increment(&self, key: &str, delta: i64) -> Result<i64> {
        self.arithmetic(
            CacheOperation::Increment,
            key,
            |backend, ns_key| backend.increment(ns_key, delta),
            |next| next.increment(key, delta),
        )
    }

    /// Subtracts `delta` from the numeric value under `key` and returns the result as `i64`.
    ///
    /// # Errors
    ///
    /// As for [`increment`](Self::increment).
    pub fn decrement(&self, key: &str, delta: i64) -> Result<i64> {
        self.arithmetic(
            CacheOperation::Decrement,
            key,
            |backend, ns_key| backend.decrement(ns_key, delta),
            |next| next.decrement(key, delta),
        )
    }

    /// Opens the backend of this tier and of every chained tier.
    ///
    /// # Errors
    ///
    /// Returns the first backend failure. Tiers opened before the failure are
    /// closed again.
    pub fn open(mut self) -> Result<Self> {
        let start = Instant::now();
        if let Err(error) = self.backend.open() {
            self.record(CacheOperation::Open, CacheActivity::Error, start);
            return Err(error);
        }
        self.record(CacheOperation::Open, CacheActivity::Ok, start);

        if let Some(next) = self.next.take() {
            match (*next).open() {
                Ok(next) => self.next = Some(Box::new(next)),
                Err(error) => {
                    if let Err(close_error) = self.backend.close() {
                        tracing::warn!(cache.name = self.name, error = %close_error, "failed to close tier after chained open failed");
                    }
                    return Err(error);
                }
            }
        }
        Ok(self)
    }

    /// Closes the backend of this tier and of every chained tier.
    ///
    /// Every tier is closed even when an earlier one fails.
    ///
    /// # Errors
    ///
    /// Returns this tier's failure, or else the first chained failure.
    pub fn close(&self) -> Result<()> {
        let start = Instant::now();
        let local = self.backend.close();
        let activity = if local.is_ok() { CacheActivity::Ok } else { CacheActivity::Error };
        self.record(CacheOperation::Close, activity, start);

        let chained = self.chained().map_or(Ok(()), Self::close);
        local.and(chained)
    }

    pub(crate) fn record(&self, operation: CacheOperation, activity: CacheActivity, start: Instant) {
        self.telemetry.record(self.name, operation, activity, start.elapsed());
    }

    /// Kinds this tier accepts: the configured set narrowed to what the backend stores.
    pub(crate) fn allowed_kinds(&self) -> KindSet {
        self.options.kinds().intersection(self.backend.supported_kinds())
    }

    pub(crate) fn read_key(&self, key: &str) -> Result<String> {
        if !self.options.readable() {
            return Err(Error::not_readable());
        }
        self.validated_key(key)
    }

    pub(crate) fn write_key(&self, key: &str) -> Result<String> {
        if !self.options.writable() {
            return Err(Error::not_writable());
        }
        self.validated_key(key)
    }

    /// Write gate, key validation and kind check, in that order.
    pub(crate) fn admit(&self, key: &str, value: &Value) -> Result<String> {
        let ns_key = self.write_key(key)?;
        let kind = value.kind();
        if !self.allowed_kinds().contains(kind) {
            return Err(Error::unsupported_data_type(key, kind));
        }
        Ok(ns_key)
    }

    fn validated_key(&self, key: &str) -> Result<String> {
        let ns_key = self.options.namespaced(key);
        if self.options.is_valid_key(&ns_key) {
            Ok(ns_key)
        } else {
            Err(Error::key_invalid(key))
        }
    }

    /// Turns a local read result into the caller's answer, consulting the chain on a miss or failure.
    pub(crate) fn resolve(
        &self,
        operation: CacheOperation,
        key: &str,
        ns_key: &str,
        local: Result<Option<Value>>,
        start: Instant,
    ) -> Result<Value> {
        match local {
            Ok(Some(value)) => {
                self.record(operation, CacheActivity::Hit, start);
                Ok(value)
            }
            Ok(None) => {
                self.record(operation, CacheActivity::Miss, start);
                self.fall_back(operation, key, ns_key, Error::key_not_found(key), start)
            }
            Err(error) => {
                self.record(operation, CacheActivity::Error, start);
                tracing::debug!(cache.name = self.name, error = %error, "local read failed");
                self.fall_back(operation, key, ns_key, error, start)
            }
        }
    }

    fn arithmetic(
        &self,
        operation: CacheOperation,
        key: &str,
        local: impl FnOnce(&dyn Backend, &str) -> Result<i64>,
        chained: impl FnOnce(&Self) -> Result<i64>,
    ) -> Result<i64> {
        let start = Instant::now();
        let ns_key = self
            .write_key(key)
            .inspect_err(|_| self.record(operation, CacheActivity::Rejected, start))?;

        match local(self.backend.as_ref(), &ns_key) {
            Ok(value) => {
                self.record(operation, CacheActivity::Ok, start);
                if let Some(next) = self.chained() {
                    self.mirrored(operation, chained(next));
                }
                Ok(value)
            }
            Err(error) => {
                self.record(operation, CacheActivity::Error, start);
                Err(error)
            }
        }
    }
}

#[cfg(any(feature = "memory", feature = "redis", feature = "object"))]
fn tier_options(namespace: impl Into<String>, ttl: Option<Duration>, kinds: KindSet) -> Result<Options> {
    let builder = Options::builder().namespace(namespace).kinds(kinds);
    match ttl {
        Some(ttl) => builder.ttl(ttl),
        None => builder.no_expiry(),
    }
    .build()
}
