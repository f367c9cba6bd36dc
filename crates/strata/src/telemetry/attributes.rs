// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Attribute keys shared by log events and metric points.
//!
//! The `tracing` macros in the recorder need literal field names, so the keys
//! below must be kept in step with them by hand.

use opentelemetry::KeyValue;

use crate::cache::CacheName;
use crate::telemetry::{CacheActivity, CacheOperation};

pub(crate) const CACHE_NAME: &str = "cache.name";
pub(crate) const CACHE_OPERATION: &str = "cache.operation";
pub(crate) const CACHE_ACTIVITY: &str = "cache.activity";

/// Only present on log events; metrics carry the duration as a histogram value.
#[cfg(test)]
pub(crate) const CACHE_DURATION_NS: &str = "cache.duration_ns";

/// Message of every log event.
#[cfg(test)]
pub(crate) const CACHE_EVENT: &str = "cache.event";

/// Attributes attached to every metric point of one cache operation.
pub(crate) fn event_attributes(cache_name: CacheName, operation: CacheOperation, activity: CacheActivity) -> [KeyValue; 3] {
    [
        KeyValue::new(CACHE_NAME, cache_name),
        KeyValue::new(CACHE_OPERATION, operation.as_str()),
        KeyValue::new(CACHE_ACTIVITY, activity.as_str()),
    ]
}
