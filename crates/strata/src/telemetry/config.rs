// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Telemetry configuration for cache operations.

#[cfg(any(feature = "metrics", test))]
use opentelemetry::metrics::{Meter, MeterProvider};

use crate::telemetry::CacheTelemetry;

/// Configuration for cache telemetry.
///
/// Everything starts disabled. Enable logs and/or metrics, then pass the built
/// [`CacheTelemetry`] to the cache builder via `.telemetry()`.
///
/// # Examples
///
/// ```
/// use strata::{Cache, TelemetryConfig};
///
/// let telemetry = TelemetryConfig::new().build();
/// assert!(!telemetry.is_enabled());
///
/// let cache = Cache::builder().memory().telemetry(telemetry).build();
/// ```
#[derive(Clone, Debug, Default)]
pub struct TelemetryConfig {
    #[cfg(any(feature = "logs", test))]
    logs_enabled: bool,
    #[cfg(any(feature = "metrics", test))]
    meter: Option<Meter>,
}

impl TelemetryConfig {
    /// Creates a configuration with everything disabled.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Emits a structured `tracing` event for every cache operation.
    #[cfg(any(feature = "logs", test))]
    #[cfg_attr(docsrs, doc(cfg(feature = "logs")))]
    #[must_use]
    pub fn with_logs(self) -> Self {
        Self {
            logs_enabled: true,
            ..self
        }
    }

    /// Records event counts and operation durations with meters from `provider`.
    #[cfg(any(feature = "metrics", test))]
    #[cfg_attr(docsrs, doc(cfg(feature = "metrics")))]
    #[must_use]
    pub fn with_metrics(mut self, provider: &dyn MeterProvider) -> Self {
        self.meter = Some(super::metrics::create_meter(provider));
        self
    }

    /// Builds the telemetry recorder from this configuration.
    #[must_use]
    pub fn build(self) -> CacheTelemetry {
        #[cfg(not(any(feature = "logs", feature = "metrics", test)))]
        {
            CacheTelemetry::default()
        }

        #[cfg(any(feature = "logs", feature = "metrics", test))]
        {
            #[cfg(any(feature = "logs", test))]
            let logging_enabled = self.logs_enabled;
            #[cfg(not(any(feature = "logs", test)))]
            let logging_enabled = false;

            #[cfg(any(feature = "metrics", test))]
            let (event_counter, operation_duration) = {
                use super::metrics::{create_event_counter, create_operation_duration_histogram};
                (
                    self.meter.as_ref().map(create_event_counter),
                    self.meter.as_ref().map(create_operation_duration_histogram),
                )
            };
            #[cfg(any(feature = "metrics", test))]
            let metrics_enabled = event_counter.is_some();
            #[cfg(not(any(feature = "metrics", test)))]
            let metrics_enabled = false;

            if !logging_enabled && !metrics_enabled {
                return CacheTelemetry::default();
            }

            CacheTelemetry {
                inner: Some(std::sync::Arc::new(super::recorder::CacheTelemetryInner {
                    logging_enabled,
                    #[cfg(any(feature = "metrics", test))]
                    event_counter,
                    #[cfg(any(feature = "metrics", test))]
                    operation_duration,
                })),
            }
        }
    }
}
