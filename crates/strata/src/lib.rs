// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
#![cfg_attr(docsrs, feature(doc_cfg))]

//! Tiered caching over interchangeable backends.
//!
//! A [`Cache`] applies one policy ([`Options`]) to one [`Backend`]: keys are
//! namespaced and validated, reads and writes can be switched off, and only
//! configured value kinds are admitted. Caches can be chained so that a miss
//! in a fast tier is answered by a slower one and promoted on the way back.
//!
//! Backends:
//! - `memory` (default): [`MemoryBackend`], an in-process store with per-entry TTL.
//! - `remote`: [`RemoteBackend`] over any [`RemoteClient`]; `redis` adds [`RedisClient`].
//! - `object`: [`ObjectBackend`] over any [`ObjectStore`], for text and bytes.
//!
//! Telemetry is opt-in through the `logs` and `metrics` features and
//! [`TelemetryConfig`].
//!
//! # Examples
//!
//! ## Single tier
//!
//! ```
//! use std::time::Duration;
//! use strata::{Cache, ErrorKind, Value};
//!
//! let cache = Cache::memory("app:", Some(Duration::from_secs(60)))?;
//!
//! cache.set("visits", 1_u32)?;
//! assert_eq!(cache.increment("visits", 2)?, 3);
//! assert_eq!(cache.get("visits")?, Value::U32(3));
//!
//! let error = cache.get("missing").unwrap_err();
//! assert_eq!(error.kind(), ErrorKind::KeyNotFound);
//! # Ok::<(), strata::Error>(())
//! ```
//!
//! ## Two tiers
//!
//! ```
//! use strata::{Cache, Value};
//!
//! let shared = Cache::memory("one:", None)?;
//! shared.set("key1", "v1")?;
//!
//! let mut local = Cache::memory("two:", None)?.chain(shared);
//! assert_eq!(local.get("key1")?, Value::from("v1"));
//!
//! // The value was promoted; the local tier answers on its own now.
//! let _shared = local.detach();
//! assert_eq!(local.get("key1")?, Value::from("v1"));
//! # Ok::<(), strata::Error>(())
//! ```

mod batch;
pub mod builder;
pub mod cache;
mod chain;
mod partial;
mod telemetry;

#[doc(inline)]
pub use builder::CacheBuilder;
#[doc(inline)]
pub use cache::Cache;
#[doc(inline)]
pub use partial::Partial;
#[cfg(feature = "memory")]
#[cfg_attr(docsrs, doc(cfg(feature = "memory")))]
#[doc(inline)]
pub use strata_memory::MemoryBackend;
#[cfg(feature = "object")]
#[cfg_attr(docsrs, doc(cfg(feature = "object")))]
#[doc(inline)]
pub use strata_object::{MemoryObjectStore, Object, ObjectBackend, ObjectOptions, ObjectStore};
#[cfg(feature = "redis")]
#[cfg_attr(docsrs, doc(cfg(feature = "redis")))]
#[doc(inline)]
pub use strata_remote::RedisClient;
#[cfg(feature = "remote")]
#[cfg_attr(docsrs, doc(cfg(feature = "remote")))]
#[doc(inline)]
pub use strata_remote::{RemoteBackend, RemoteClient, RemoteOptions, SetCondition};
#[cfg(any(feature = "test-util", test))]
#[doc(inline)]
pub use strata_tier::testing::{BackendOp, MockBackend};
#[doc(inline)]
pub use strata_tier::{Backend, Error, ErrorKind, Kind, KindSet, Options, OptionsBuilder, Result, TimestampFormat, Value};
#[doc(inline)]
pub use telemetry::{CacheTelemetry, TelemetryConfig};
