// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::time::Duration;

use strata_tier::TimestampFormat;

const DEFAULT_RESULT_CACHING_TTL: Duration = Duration::from_secs(10);
const DEFAULT_RESULT_CACHE_CAPACITY: u64 = 10_000;

/// Settings specific to remote backends.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use strata_remote::RemoteOptions;
///
/// let options = RemoteOptions::new("redis://127.0.0.1:6379")
///     .with_manage_types(true)
///     .with_result_caching(true)
///     .with_result_caching_ttl(Duration::from_secs(30));
///
/// assert!(options.manage_types());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteOptions {
    url: String,
    result_caching: bool,
    result_caching_ttl: Duration,
    result_cache_capacity: u64,
    manage_types: bool,
    datetime_format: TimestampFormat,
}

impl RemoteOptions {
    /// Creates options for the service at `url` with result caching and type
    /// management disabled.
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            result_caching: false,
            result_caching_ttl: DEFAULT_RESULT_CACHING_TTL,
            result_cache_capacity: DEFAULT_RESULT_CACHE_CAPACITY,
            manage_types: false,
            datetime_format: TimestampFormat::default(),
        }
    }

    /// Keeps recent read results in process for `result_caching_ttl`.
    #[must_use]
    pub fn with_result_caching(mut self, enabled: bool) -> Self {
        self.result_caching = enabled;
        self
    }

    /// Sets how long a cached read result stays valid.
    #[must_use]
    pub fn with_result_caching_ttl(mut self, ttl: Duration) -> Self {
        self.result_caching_ttl = ttl;
        self
    }

    /// Bounds the number of cached read results.
    #[must_use]
    pub fn with_result_cache_capacity(mut self, capacity: u64) -> Self {
        self.result_cache_capacity = capacity;
        self
    }

    /// Persists each value's kind next to it so reads restore the kind.
    #[must_use]
    pub fn with_manage_types(mut self, enabled: bool) -> Self {
        self.manage_types = enabled;
        self
    }

    /// Sets how timestamps are written as text.
    #[must_use]
    pub fn with_datetime_format(mut self, format: TimestampFormat) -> Self {
        self.datetime_format = format;
        self
    }

    /// The service address.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Whether read results are cached in process.
    #[must_use]
    pub fn result_caching(&self) -> bool {
        self.result_caching
    }

    /// Lifetime of a cached read result.
    #[must_use]
    pub fn result_caching_ttl(&self) -> Duration {
        self.result_caching_ttl
    }

    /// Maximum number of cached read results.
    #[must_use]
    pub fn result_cache_capacity(&self) -> u64 {
        self.result_cache_capacity
    }

    /// Whether kinds are persisted next to values.
    #[must_use]
    pub fn manage_types(&self) -> bool {
        self.manage_types
    }

    /// The timestamp text format.
    #[must_use]
    pub fn datetime_format(&self) -> &TimestampFormat {
        &self.datetime_format
    }
}
