// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
#![cfg_attr(docsrs, feature(doc_cfg))]

//! Strata cache backend for remote key-value services that store text.
//!
//! [`RemoteBackend`] adapts any [`RemoteClient`] to the
//! [`strata_tier::Backend`] contract. Values travel as text; enable
//! [`RemoteOptions::with_manage_types`] to persist each value's kind next to it
//! so reads hand back the kind that was written instead of a string.
//!
//! Enable the `redis` feature for [`RedisClient`], which talks to Redis and
//! Valkey servers. The `test-util` feature provides [`testing::FakeRemote`],
//! an in-process server for tests.

mod backend;
mod client;
mod options;
#[cfg(feature = "redis")]
mod redis;
pub mod tags;
#[cfg(any(feature = "test-util", test))]
pub mod testing;

#[doc(inline)]
pub use backend::RemoteBackend;
#[doc(inline)]
pub use client::{RemoteClient, SetCondition};
#[doc(inline)]
pub use options::RemoteOptions;
#[cfg(feature = "redis")]
#[cfg_attr(docsrs, doc(cfg(feature = "redis")))]
#[doc(inline)]
pub use redis::RedisClient;
