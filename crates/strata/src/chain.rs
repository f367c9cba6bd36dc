// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Tier chaining: read-through fallback, promotion and write mirroring.

use std::iter;
use std::time::Instant;

use strata_tier::{Error, ErrorKind, Result, Value};

use crate::Cache;
use crate::telemetry::{CacheActivity, CacheOperation};

impl Cache {
    /// Appends `next` behind the last tier of this chain.
    ///
    /// # Examples
    ///
    /// ```
    /// use strata::{Backend, Cache, Value};
    ///
    /// let near = Cache::memory("near:", None)?;
    /// let far = Cache::memory("far:", None)?;
    /// far.set("k", "from far")?;
    ///
    /// let cache = near.chain(far);
    /// assert_eq!(cache.get("k")?, Value::from("from far"));
    /// assert_eq!(cache.backend().get("near:k")?, Some(Value::from("from far")));
    /// # Ok::<(), strata::Error>(())
    /// ```
    #[must_use]
    pub fn chain(mut self, next: Self) -> Self {
        self.next = Some(Box::new(match self.next.take() {
            Some(existing) => (*existing).chain(next),
            None => next,
        }));
        self
    }

    /// Sets the tier directly behind this one and returns the one it replaced.
    pub fn attach(&mut self, next: Self) -> Option<Self> {
        self.next.replace(Box::new(next)).map(|previous| *previous)
    }

    /// Removes and returns the tier directly behind this one, with its own chain.
    pub fn detach(&mut self) -> Option<Self> {
        self.next.take().map(|next| *next)
    }

    /// The tier directly behind this one.
    #[must_use]
    pub fn chained(&self) -> Option<&Self> {
        self.next.as_deref()
    }

    /// Iterates over this tier and every tier behind it, nearest first.
    pub fn tiers(&self) -> impl Iterator<Item = &Self> {
        iter::successors(Some(self), |tier| tier.chained())
    }

    /// Answers a local miss or failure from the chained tier.
    ///
    /// A value found behind this tier is promoted here. Without a chained
    /// tier the local error is returned as is; when the chained tier cannot
    /// answer either, the caller sees `KeyNotFound`.
    pub(crate) fn fall_back(
        &self,
        operation: CacheOperation,
        key: &str,
        ns_key: &str,
        local_error: Error,
        start: Instant,
    ) -> Result<Value> {
        let Some(next) = self.chained() else {
            return Err(local_error);
        };

        match next.get(key) {
            Ok(value) => {
                self.record(operation, CacheActivity::Fallback, start);
                self.promote(operation, ns_key, &value, start);
                Ok(value)
            }
            Err(error) => {
                tracing::debug!(cache.name = self.name, chained = next.name, error = %error, "chained tier could not answer");
                Err(Error::key_not_found(key))
            }
        }
    }

    /// Copies a value found in a chained tier into this tier's backend.
    fn promote(&self, operation: CacheOperation, ns_key: &str, value: &Value, start: Instant) {
        if !self.options.writable() || !self.allowed_kinds().contains(value.kind()) {
            return;
        }

        match self.backend.set(ns_key, value, self.options.ttl()) {
            Ok(()) => self.record(operation, CacheActivity::FallbackPromotion, start),
            Err(error) => {
                tracing::warn!(cache.name = self.name, key = ns_key, error = %error, "failed to promote value from chained tier");
            }
        }
    }

    /// Logs the outcome of a write copied to the chained tier.
    pub(crate) fn mirrored<T>(&self, operation: CacheOperation, result: Result<T>) {
        let Err(error) = result else {
            return;
        };

        let expected = error.kind().is_policy() || matches!(error.kind(), ErrorKind::KeyNotFound | ErrorKind::NotImplemented);
        if expected {
            tracing::debug!(cache.name = self.name, operation = operation.as_str(), error = %error, "chained tier skipped write");
        } else {
            tracing::warn!(cache.name = self.name, operation = operation.as_str(), error = %error, "chained tier write failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use strata_tier::testing::{BackendOp, MockBackend};
    use strata_tier::{Backend, Kind, KindSet, Options};

    use super::*;
    use crate::TelemetryConfig;
    use crate::telemetry::testing::LogCapture;

    fn tier(name: &'static str) -> (MockBackend, Cache) {
        let backend = MockBackend::new();
        let cache = Cache::builder().backend(backend.clone()).name(name).build();
        (backend, cache)
    }

    #[test]
    fn chain_appends_at_the_tail() {
        let (_, a) = tier("a");
        let (_, b) = tier("b");
        let (_, c) = tier("c");

        let cache = a.chain(b).chain(c);

        let names: Vec<_> = cache.tiers().map(Cache::name).collect();
        assert_eq!(names, ["a", "b", "c"]);
    }

    #[test]
    fn attach_and_detach_replace_the_direct_tier() {
        let (_, mut a) = tier("a");
        let (_, b) = tier("b");
        let (_, c) = tier("c");

        assert!(a.attach(b).is_none());
        let previous = a.attach(c).unwrap();
        assert_eq!(previous.name(), "b");
        assert_eq!(a.chained().unwrap().name(), "c");

        assert_eq!(a.detach().unwrap().name(), "c");
        assert!(a.chained().is_none());
    }

    #[test]
    fn miss_is_answered_and_promoted() {
        let (near_backend, near) = tier("near");
        let (far_backend, far) = tier("far");
        far_backend.set("k", &Value::from(3_i32), None).unwrap();

        let cache = near.chain(far);

        assert_eq!(cache.get("k").unwrap(), Value::from(3_i32));
        assert_eq!(near_backend.peek("k"), Some(Value::from(3_i32)));
    }

    #[test]
    fn local_failure_falls_back() {
        let (near_backend, near) = tier("near");
        let (far_backend, far) = tier("far");
        far_backend.set("k", &Value::from("v"), None).unwrap();
        near_backend.fail_when(|op| matches!(op, BackendOp::Get(_)));

        let cache = near.chain(far);

        assert_eq!(cache.get("k").unwrap(), Value::from("v"));
    }

    #[test]
    fn chained_failure_reads_as_not_found() {
        let (_, near) = tier("near");
        let (far_backend, far) = tier("far");
        far_backend.fail_when(|op| matches!(op, BackendOp::Get(_)));

        let cache = near.chain(far);

        assert_eq!(cache.get("k").unwrap_err().kind(), ErrorKind::KeyNotFound);
    }

    #[test]
    fn promotion_respects_local_policy() {
        let near_backend = MockBackend::new();
        let options = Options::builder().kinds(KindSet::of([Kind::String])).build().unwrap();
        let near = Cache::new(near_backend.clone(), options);
        let (far_backend, far) = tier("far");
        far_backend.set("n", &Value::from(1_u8), None).unwrap();

        let cache = near.chain(far);

        assert_eq!(cache.get("n").unwrap(), Value::from(1_u8));
        assert_eq!(near_backend.peek("n"), None);
    }

    #[test]
    fn read_only_tier_is_not_promoted_into() {
        let near_backend = MockBackend::new();
        let options = Options::builder().writable(false).build().unwrap();
        let near = Cache::new(near_backend.clone(), options);
        let (far_backend, far) = tier("far");
        far_backend.set("k", &Value::from("v"), None).unwrap();

        let cache = near.chain(far);

        assert!(cache.has("k"));
        assert_eq!(near_backend.entry_count(), 0);
    }

    #[test]
    fn writes_are_mirrored_down_the_chain() {
        let (near_backend, near) = tier("near");
        let (far_backend, far) = tier("far");
        let cache = near.chain(far);

        cache.set("k", 1_i64).unwrap();
        assert_eq!(cache.increment("k", 4).unwrap(), 5);
        assert_eq!(far_backend.peek("k"), Some(Value::from(5_i64)));

        assert!(cache.remove("k"));
        assert_eq!(near_backend.entry_count(), 0);
        assert_eq!(far_backend.entry_count(), 0);
    }

    #[test]
    fn failed_local_write_is_not_mirrored() {
        let (near_backend, near) = tier("near");
        let (far_backend, far) = tier("far");
        near_backend.fail_when(|op| matches!(op, BackendOp::Set { .. }));

        let cache = near.chain(far);

        assert_eq!(cache.set("k", 1_u8).unwrap_err().kind(), ErrorKind::Backend);
        assert_eq!(far_backend.entry_count(), 0);
    }

    #[test]
    fn mirror_failures_are_logged_not_returned() {
        let capture = LogCapture::new();
        let _guard = tracing::subscriber::set_default(capture.subscriber());

        let (_, near) = tier("near");
        let (far_backend, far) = tier("far");
        far_backend.fail_when(|op| matches!(op, BackendOp::Set { .. }));

        let cache = near.chain(far);

        cache.set("k", 1_u8).unwrap();
        capture.assert_contains("chained tier write failed");
    }

    #[test]
    fn fallback_and_promotion_are_recorded() {
        let capture = LogCapture::new();
        let _guard = tracing::subscriber::set_default(capture.subscriber());

        let near = Cache::builder()
            .backend(MockBackend::new())
            .telemetry(TelemetryConfig::new().with_logs().build())
            .build();
        let (far_backend, far) = tier("far");
        far_backend.set("k", &Value::from("v"), None).unwrap();

        near.chain(far).get("k").unwrap();

        capture.assert_contains("cache.fallback");
        capture.assert_contains("cache.fallback_promotion");
    }
}
