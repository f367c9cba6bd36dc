// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Cache telemetry recording.

use std::time::Duration;

use opentelemetry::logs::Severity;
#[cfg(any(feature = "metrics", test))]
use opentelemetry::metrics::{Counter, Histogram};

use crate::cache::CacheName;
#[cfg(any(feature = "metrics", test))]
use crate::telemetry::attributes;
use crate::telemetry::{CacheActivity, CacheOperation};

#[derive(Debug)]
pub(crate) struct CacheTelemetryInner {
    pub(crate) logging_enabled: bool,
    #[cfg(any(feature = "metrics", test))]
    pub(crate) event_counter: Option<Counter<u64>>,
    #[cfg(any(feature = "metrics", test))]
    pub(crate) operation_duration: Option<Histogram<f64>>,
}

impl CacheTelemetryInner {
    #[inline]
    pub(crate) fn record(&self, cache_name: CacheName, operation: CacheOperation, activity: CacheActivity, duration: Duration) {
        #[cfg(any(feature = "metrics", test))]
        {
            let attrs = attributes::event_attributes(cache_name, operation, activity);

            if let Some(counter) = &self.event_counter {
                counter.add(1, &attrs);
            }

            if let Some(histogram) = &self.operation_duration {
                histogram.record(duration.as_secs_f64(), &attrs);
            }
        }

        if self.logging_enabled {
            emit(cache_name, operation, activity, duration);
        }
    }
}

fn emit(cache_name: CacheName, operation: CacheOperation, activity: CacheActivity, duration: Duration) {
    let op = operation.as_str();
    let act = activity.as_str();
    let duration_ns = u64::try_from(duration.as_nanos()).unwrap_or(u64::MAX);

    // Field names must match the keys in `attributes`.
    macro_rules! emit_event {
        ($level:ident) => {
            tracing::$level!(
                cache.name = cache_name,
                cache.operation = op,
                cache.activity = act,
                cache.duration_ns = duration_ns,
                "cache.event"
            )
        };
    }

    match activity.severity() {
        Severity::Error => emit_event!(error),
        Severity::Info => emit_event!(info),
        _ => emit_event!(debug),
    }
}
