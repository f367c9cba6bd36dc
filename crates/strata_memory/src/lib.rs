// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
#![cfg_attr(docsrs, feature(doc_cfg))]

//! Process-local cache backend backed by moka.
//!
//! This crate provides [`MemoryBackend`], a concurrent in-memory implementation
//! of [`strata_tier::Backend`] with per-entry lifetimes and `TinyLFU` eviction.
//! Use [`MemoryBackendBuilder`] to configure capacity without exposing moka
//! types.
//!
//! # Quick Start
//!
//! ```
//! use std::time::Duration;
//! use strata_memory::MemoryBackend;
//! use strata_tier::{Backend, Value};
//!
//! let backend = MemoryBackend::with_capacity(10_000);
//! backend.set("greeting", &Value::from("hello"), Some(Duration::from_secs(30)))?;
//! assert_eq!(backend.get("greeting")?, Some(Value::from("hello")));
//! # Ok::<(), strata_tier::Error>(())
//! ```

pub mod backend;
pub mod builder;
mod entry;

#[doc(inline)]
pub use backend::MemoryBackend;
#[doc(inline)]
pub use builder::MemoryBackendBuilder;
