// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Builder for configuring in-memory backends.
//!
//! Entry lifetimes are chosen per write by the cache that drives the backend,
//! so the builder only shapes the store itself.

use std::time::Duration;

use crate::backend::MemoryBackend;

/// Builder for configuring a [`MemoryBackend`].
///
/// # Examples
///
/// ```
/// use strata_memory::MemoryBackend;
/// use std::time::Duration;
///
/// let backend = MemoryBackend::builder()
///     .max_capacity(1000)
///     .initial_capacity(100)
///     .time_to_idle(Duration::from_secs(600))
///     .name("sessions")
///     .build();
/// ```
#[derive(Debug, Default)]
pub struct MemoryBackendBuilder {
    pub(crate) max_capacity: Option<u64>,
    pub(crate) initial_capacity: Option<usize>,
    pub(crate) time_to_idle: Option<Duration>,
    pub(crate) name: Option<String>,
}

impl MemoryBackendBuilder {
    /// Creates a builder for an unbounded store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the maximum number of entries.
    ///
    /// Once reached, entries are evicted using the `TinyLFU` policy. Without a
    /// limit the store is bounded only by available memory.
    #[must_use]
    pub fn max_capacity(mut self, capacity: u64) -> Self {
        self.max_capacity = Some(capacity);
        self
    }

    /// Sets the pre-allocation hint.
    #[must_use]
    pub fn initial_capacity(mut self, capacity: usize) -> Self {
        self.initial_capacity = Some(capacity);
        self
    }

    /// Evicts entries that have not been read or written for `duration`, in
    /// addition to their per-write lifetime.
    #[must_use]
    pub fn time_to_idle(mut self, duration: Duration) -> Self {
        self.time_to_idle = Some(duration);
        self
    }

    /// Names the underlying store for debugging output.
    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Builds the configured backend.
    #[must_use]
    pub fn build(self) -> MemoryBackend {
        MemoryBackend::from_builder(&self)
    }
}
