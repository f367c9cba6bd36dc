// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Per-cache policy: namespace, key validation, gates, lifetime and allowed kinds.

use std::time::Duration;

use regex::Regex;

use crate::{Error, KindSet, Result};

/// Policy applied by a cache before any backend is contacted.
///
/// Options are immutable once built. Use [`Options::builder`] to create them:
///
/// ```
/// use std::time::Duration;
/// use strata_tier::Options;
///
/// let options = Options::builder()
///     .namespace("users:")
///     .key_pattern(r"^users:[0-9]+$")
///     .ttl(Duration::from_secs(300))
///     .build()?;
///
/// assert_eq!(options.namespaced("42"), "users:42");
/// assert!(options.is_valid_key("users:42"));
/// assert!(!options.is_valid_key("users:bob"));
/// # Ok::<(), strata_tier::Error>(())
/// ```
#[derive(Debug, Clone)]
pub struct Options {
    namespace: String,
    key_pattern: Option<Regex>,
    readable: bool,
    writable: bool,
    ttl: Option<Duration>,
    kinds: KindSet,
}

impl Options {
    /// Creates a builder with permissive defaults.
    #[must_use]
    pub fn builder() -> OptionsBuilder {
        OptionsBuilder::default()
    }

    /// The prefix prepended to every caller key.
    #[must_use]
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// The pattern namespaced keys must match, if any.
    #[must_use]
    pub fn key_pattern(&self) -> Option<&str> {
        self.key_pattern.as_ref().map(Regex::as_str)
    }

    /// Whether reads are permitted.
    #[must_use]
    pub fn readable(&self) -> bool {
        self.readable
    }

    /// Whether writes are permitted.
    #[must_use]
    pub fn writable(&self) -> bool {
        self.writable
    }

    /// Lifetime applied to writes. `None` means entries never expire.
    #[must_use]
    pub fn ttl(&self) -> Option<Duration> {
        self.ttl
    }

    /// Kinds accepted for writes.
    #[must_use]
    pub fn kinds(&self) -> KindSet {
        self.kinds
    }

    /// Prepends the namespace to `key`.
    #[must_use]
    pub fn namespaced(&self, key: &str) -> String {
        let mut namespaced = String::with_capacity(self.namespace.len() + key.len());
        namespaced.push_str(&self.namespace);
        namespaced.push_str(key);
        namespaced
    }

    /// Removes one leading occurrence of the namespace, if present.
    #[must_use]
    pub fn strip_namespace<'a>(&self, key: &'a str) -> &'a str {
        key.strip_prefix(self.namespace.as_str()).unwrap_or(key)
    }

    /// Checks a namespaced key against the key pattern. Without a pattern every
    /// key is valid.
    #[must_use]
    pub fn is_valid_key(&self, namespaced_key: &str) -> bool {
        self.key_pattern
            .as_ref()
            .is_none_or(|pattern| pattern.is_match(namespaced_key))
    }
}

impl Default for Options {
    fn default() -> Self {
        Self {
            namespace: String::new(),
            key_pattern: None,
            readable: true,
            writable: true,
            ttl: None,
            kinds: KindSet::all(),
        }
    }
}

/// Builder for [`Options`].
#[derive(Debug, Clone)]
pub struct OptionsBuilder {
    namespace: String,
    key_pattern: Option<String>,
    readable: bool,
    writable: bool,
    ttl: Option<Duration>,
    kinds: KindSet,
}

impl Default for OptionsBuilder {
    fn default() -> Self {
        Self {
            namespace: String::new(),
            key_pattern: None,
            readable: true,
            writable: true,
            ttl: None,
            kinds: KindSet::all(),
        }
    }
}

impl OptionsBuilder {
    /// Sets the namespace prefix.
    #[must_use]
    pub fn namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }

    /// Sets the regular expression namespaced keys must match.
    #[must_use]
    pub fn key_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.key_pattern = Some(pattern.into());
        self
    }

    /// Enables or disables reads.
    #[must_use]
    pub fn readable(mut self, readable: bool) -> Self {
        self.readable = readable;
        self
    }

    /// Enables or disables writes.
    #[must_use]
    pub fn writable(mut self, writable: bool) -> Self {
        self.writable = writable;
        self
    }

    /// Sets the lifetime of written entries.
    #[must_use]
    pub fn ttl(mut self, ttl: Duration) -> Self {
        self.ttl = Some(ttl);
        self
    }

    /// Entries written by the cache never expire.
    #[must_use]
    pub fn no_expiry(mut self) -> Self {
        self.ttl = None;
        self
    }

    /// Restricts the kinds accepted for writes.
    #[must_use]
    pub fn kinds(mut self, kinds: KindSet) -> Self {
        self.kinds = kinds;
        self
    }

    /// Builds the options.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::InvalidConfiguration`](crate::ErrorKind::InvalidConfiguration)
    /// when the key pattern is not a valid regular expression.
    pub fn build(self) -> Result<Options> {
        let key_pattern = self
            .key_pattern
            .map(|pattern| Regex::new(&pattern))
            .transpose()
            .map_err(Error::invalid_configuration)?;

        Ok(Options {
            namespace: self.namespace,
            key_pattern,
            readable: self.readable,
            writable: self.writable,
            ttl: self.ttl,
            kinds: self.kinds,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ErrorKind, Kind};

    #[test]
    fn defaults_are_permissive() {
        let options = Options::default();
        assert!(options.readable());
        assert!(options.writable());
        assert_eq!(options.ttl(), None);
        assert_eq!(options.kinds(), KindSet::all());
        assert!(options.is_valid_key("anything at all"));
    }

    #[test]
    fn strip_namespace_removes_one_prefix() {
        let options = Options::builder().namespace("ns:").build().unwrap();
        assert_eq!(options.strip_namespace("ns:ns:key"), "ns:key");
        assert_eq!(options.strip_namespace("other:key"), "other:key");
    }

    #[test]
    fn invalid_pattern_is_a_configuration_error() {
        let error = Options::builder().key_pattern("([a-z").build().unwrap_err();
        assert_eq!(error.kind(), ErrorKind::InvalidConfiguration);
    }

    #[test]
    fn builder_sets_every_field() {
        let options = Options::builder()
            .namespace("one:")
            .key_pattern("^one:.*$")
            .readable(false)
            .writable(false)
            .ttl(Duration::from_secs(5))
            .kinds(KindSet::of([Kind::String]))
            .build()
            .unwrap();

        assert_eq!(options.namespace(), "one:");
        assert_eq!(options.key_pattern(), Some("^one:.*$"));
        assert!(!options.readable());
        assert!(!options.writable());
        assert_eq!(options.ttl(), Some(Duration::from_secs(5)));
        assert!(options.kinds().contains(Kind::String));
        assert!(!options.kinds().contains(Kind::Bytes));
    }
}
