// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Cache telemetry integration with `tracing` and OpenTelemetry.
//!
//! With the `logs` feature every cache operation can emit a structured
//! `tracing` event; with the `metrics` feature it can feed an OpenTelemetry
//! event counter and duration histogram. Both are switched on per cache
//! through [`TelemetryConfig`].

#[cfg(any(feature = "logs", feature = "metrics", test))]
use std::sync::Arc;
use std::time::Duration;

#[cfg(any(feature = "logs", feature = "metrics", test))]
use opentelemetry::logs::Severity;

use crate::cache::CacheName;
#[cfg(any(feature = "logs", feature = "metrics", test))]
use recorder::CacheTelemetryInner;

#[cfg(any(feature = "metrics", test))]
pub(crate) mod attributes;
mod config;
#[cfg(any(feature = "metrics", test))]
pub(crate) mod metrics;
#[cfg(any(feature = "logs", feature = "metrics", test))]
mod recorder;
#[cfg(test)]
pub(crate) mod testing;

pub use config::TelemetryConfig;

/// Records cache operations as logs and metrics.
///
/// Created through [`TelemetryConfig::build`] and handed to the cache builder
/// via `.telemetry()`. The default value records nothing. Clones share the
/// same instruments.
#[derive(Clone, Debug, Default)]
pub struct CacheTelemetry {
    #[cfg(any(feature = "logs", feature = "metrics", test))]
    inner: Option<Arc<CacheTelemetryInner>>,
}

impl CacheTelemetry {
    /// Returns telemetry that records nothing.
    #[must_use]
    pub fn disabled() -> Self {
        Self::default()
    }

    /// Returns `true` when logs or metrics are being recorded.
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        #[cfg(any(feature = "logs", feature = "metrics", test))]
        {
            self.inner.is_some()
        }
        #[cfg(not(any(feature = "logs", feature = "metrics", test)))]
        {
            false
        }
    }

    #[cfg_attr(
        not(any(feature = "logs", feature = "metrics", test)),
        expect(unused_variables, reason = "no-op when telemetry is compiled out")
    )]
    pub(crate) fn record(&self, cache_name: CacheName, operation: CacheOperation, activity: CacheActivity, duration: Duration) {
        #[cfg(any(feature = "logs", feature = "metrics", test))]
        if let Some(inner) = &self.inner {
            inner.record(cache_name, operation, activity, duration);
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CacheOperation {
    Get,
    Has,
    Set,
    CheckAndSet,
    Touch,
    Remove,
    Increment,
    Decrement,
    Open,
    Close,
}

impl CacheOperation {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Get => "cache.get",
            Self::Has => "cache.has",
            Self::Set => "cache.set",
            Self::CheckAndSet => "cache.check_and_set",
            Self::Touch => "cache.touch",
            Self::Remove => "cache.remove",
            Self::Increment => "cache.increment",
            Self::Decrement => "cache.decrement",
            Self::Open => "cache.open",
            Self::Close => "cache.close",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CacheActivity {
    Hit,
    Miss,
    Inserted,
    Replaced,
    Touched,
    Removed,
    Fallback,
    FallbackPromotion,
    Rejected,
    Ok,
    Error,
}

impl CacheActivity {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Hit => "cache.hit",
            Self::Miss => "cache.miss",
            Self::Inserted => "cache.inserted",
            Self::Replaced => "cache.replaced",
            Self::Touched => "cache.touched",
            Self::Removed => "cache.removed",
            Self::Fallback => "cache.fallback",
            Self::FallbackPromotion => "cache.fallback_promotion",
            Self::Rejected => "cache.rejected",
            Self::Ok => "cache.ok",
            Self::Error => "cache.error",
        }
    }

    #[cfg(any(feature = "logs", feature = "metrics", test))]
    pub fn severity(self) -> Severity {
        match self {
            Self::Hit | Self::Miss | Self::Ok => Severity::Debug,
            Self::Inserted
            | Self::Replaced
            | Self::Touched
            | Self::Removed
            | Self::Fallback
            | Self::FallbackPromotion
            | Self::Rejected => Severity::Info,
            Self::Error => Severity::Error,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cache_operation_as_str() {
        assert_eq!(CacheOperation::Get.as_str(), "cache.get");
        assert_eq!(CacheOperation::Has.as_str(), "cache.has");
        assert_eq!(CacheOperation::Set.as_str(), "cache.set");
        assert_eq!(CacheOperation::CheckAndSet.as_str(), "cache.check_and_set");
        assert_eq!(CacheOperation::Touch.as_str(), "cache.touch");
        assert_eq!(CacheOperation::Remove.as_str(), "cache.remove");
        assert_eq!(CacheOperation::Increment.as_str(), "cache.increment");
        assert_eq!(CacheOperation::Decrement.as_str(), "cache.decrement");
        assert_eq!(CacheOperation::Open.as_str(), "cache.open");
        assert_eq!(CacheOperation::Close.as_str(), "cache.close");
    }

    #[test]
    fn cache_activity_as_str() {
        assert_eq!(CacheActivity::Hit.as_str(), "cache.hit");
        assert_eq!(CacheActivity::Miss.as_str(), "cache.miss");
        assert_eq!(CacheActivity::Inserted.as_str(), "cache.inserted");
        assert_eq!(CacheActivity::Replaced.as_str(), "cache.replaced");
        assert_eq!(CacheActivity::Touched.as_str(), "cache.touched");
        assert_eq!(CacheActivity::Removed.as_str(), "cache.removed");
        assert_eq!(CacheActivity::Fallback.as_str(), "cache.fallback");
        assert_eq!(CacheActivity::FallbackPromotion.as_str(), "cache.fallback_promotion");
        assert_eq!(CacheActivity::Rejected.as_str(), "cache.rejected");
        assert_eq!(CacheActivity::Ok.as_str(), "cache.ok");
        assert_eq!(CacheActivity::Error.as_str(), "cache.error");
    }

    #[test]
    fn severity_levels() {
        assert_eq!(CacheActivity::Hit.severity(), Severity::Debug);
        assert_eq!(CacheActivity::Miss.severity(), Severity::Debug);
        assert_eq!(CacheActivity::Ok.severity(), Severity::Debug);
        assert_eq!(CacheActivity::Inserted.severity(), Severity::Info);
        assert_eq!(CacheActivity::FallbackPromotion.severity(), Severity::Info);
        assert_eq!(CacheActivity::Rejected.severity(), Severity::Info);
        assert_eq!(CacheActivity::Error.severity(), Severity::Error);
    }

    #[test]
    fn default_is_disabled() {
        let telemetry = CacheTelemetry::disabled();
        assert!(!telemetry.is_enabled());
        telemetry.record("cache", CacheOperation::Get, CacheActivity::Hit, Duration::ZERO);
    }
}
