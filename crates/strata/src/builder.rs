// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Builder for constructing caches and tier chains.
//!
//! The builder starts without a backend; choosing one (`backend()`,
//! `memory()`, `remote()` or `object()`) moves it into a state where
//! `build()` becomes available.

use strata_tier::{Backend, Options};

use crate::Cache;
use crate::cache::CacheName;
use crate::telemetry::CacheTelemetry;

/// Builder for a [`Cache`].
///
/// Created by [`Cache::builder`].
///
/// # Examples
///
/// ```
/// use strata::{Cache, Options, Value};
///
/// let far = Cache::builder().memory().name("far").build();
/// far.set("k", 1_u8)?;
///
/// let near = Cache::builder()
///     .memory()
///     .name("near")
///     .options(Options::builder().namespace("near:").build()?)
///     .chain(far)
///     .build();
///
/// assert_eq!(near.get("k")?, Value::from(1_u8));
/// # Ok::<(), strata::Error>(())
/// ```
#[derive(Debug)]
pub struct CacheBuilder<B = ()> {
    name: Option<CacheName>,
    backend: B,
    options: Options,
    telemetry: CacheTelemetry,
    next: Option<Cache>,
}

impl CacheBuilder<()> {
    pub(crate) fn new() -> Self {
        Self {
            name: None,
            backend: (),
            options: Options::default(),
            telemetry: CacheTelemetry::default(),
            next: None,
        }
    }

    /// Uses a custom backend.
    ///
    /// # Examples
    ///
    /// ```
    /// # #[cfg(feature = "test-util")]
    /// # fn main() {
    /// use strata::{Cache, MockBackend};
    ///
    /// let backend = MockBackend::new();
    /// let cache = Cache::builder().backend(backend.clone()).build();
    ///
    /// cache.set("k", "v").unwrap();
    /// assert_eq!(backend.entry_count(), 1);
    /// # }
    /// # #[cfg(not(feature = "test-util"))]
    /// # fn main() {}
    /// ```
    pub fn backend<B>(self, backend: B) -> CacheBuilder<B>
    where
        B: Backend + 'static,
    {
        CacheBuilder {
            name: self.name,
            backend,
            options: self.options,
            telemetry: self.telemetry,
            next: self.next,
        }
    }

    /// Uses an in-process backend with default capacity.
    #[cfg(feature = "memory")]
    #[cfg_attr(docsrs, doc(cfg(feature = "memory")))]
    pub fn memory(self) -> CacheBuilder<strata_memory::MemoryBackend> {
        self.backend(strata_memory::MemoryBackend::new())
    }

    /// Uses a remote key-value server reached through `client`.
    #[cfg(feature = "remote")]
    #[cfg_attr(docsrs, doc(cfg(feature = "remote")))]
    pub fn remote<C>(self, client: C, options: strata_remote::RemoteOptions) -> CacheBuilder<strata_remote::RemoteBackend<C>>
    where
        C: strata_remote::RemoteClient + 'static,
    {
        self.backend(strata_remote::RemoteBackend::new(client, options))
    }

    /// Uses an object store.
    ///
    /// Only text and byte values can be stored; set the tier's kinds
    /// accordingly or rely on the backend narrowing them.
    #[cfg(feature = "object")]
    #[cfg_attr(docsrs, doc(cfg(feature = "object")))]
    pub fn object<S>(self, store: S, options: strata_object::ObjectOptions) -> CacheBuilder<strata_object::ObjectBackend<S>>
    where
        S: strata_object::ObjectStore + 'static,
    {
        self.backend(strata_object::ObjectBackend::new(store, options))
    }
}

impl<B> CacheBuilder<B> {
    /// Sets the name used in telemetry. Defaults to the backend's name.
    #[must_use]
    pub fn name(mut self, name: CacheName) -> Self {
        self.name = Some(name);
        self
    }

    /// Sets the policy for this tier.
    #[must_use]
    pub fn options(mut self, options: Options) -> Self {
        self.options = options;
        self
    }

    /// Enables telemetry built with [`TelemetryConfig`](crate::TelemetryConfig).
    #[must_use]
    pub fn telemetry(mut self, telemetry: CacheTelemetry) -> Self {
        self.telemetry = telemetry;
        self
    }

    /// Chains `next` behind the cache being built.
    ///
    /// Calling this again appends behind the previously chained tier.
    #[must_use]
    pub fn chain(mut self, next: Cache) -> Self {
        self.next = Some(match self.next.take() {
            Some(existing) => existing.chain(next),
            None => next,
        });
        self
    }
}

impl<B: Backend + 'static> CacheBuilder<B> {
    /// Builds the cache.
    #[must_use]
    pub fn build(self) -> Cache {
        Cache {
            name: self.name.unwrap_or_else(|| self.backend.name()),
            backend: Box::new(self.backend),
            options: self.options,
            next: self.next.map(Box::new),
            telemetry: self.telemetry,
        }
    }
}

impl Default for CacheBuilder<()> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use strata_tier::testing::MockBackend;

    use super::*;

    #[test]
    fn backend_name_is_the_default_name() {
        let cache = CacheBuilder::default().backend(MockBackend::new()).build();
        assert_eq!(cache.name(), "mock");
    }

    #[test]
    fn settings_survive_choosing_the_backend() {
        let options = Options::builder().namespace("x:").build().unwrap();
        let cache = Cache::builder()
            .name("named")
            .options(options)
            .backend(MockBackend::new())
            .build();

        assert_eq!(cache.name(), "named");
        assert_eq!(cache.options().namespace(), "x:");
    }

    #[test]
    fn repeated_chain_appends() {
        let first = Cache::builder().backend(MockBackend::new()).name("first").build();
        let second = Cache::builder().backend(MockBackend::new()).name("second").build();

        let cache = Cache::builder()
            .backend(MockBackend::new())
            .chain(first)
            .chain(second)
            .build();

        let names: Vec<_> = cache.tiers().map(Cache::name).collect();
        assert_eq!(names, ["mock", "first", "second"]);
    }

    #[cfg(feature = "memory")]
    #[test]
    fn memory_builder_uses_the_memory_backend() {
        let cache = Cache::builder().memory().build();
        assert_eq!(cache.backend().name(), "memory");
    }
}
