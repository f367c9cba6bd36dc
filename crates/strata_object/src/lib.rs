// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
#![cfg_attr(docsrs, feature(doc_cfg))]

//! Strata cache backend for object storage.
//!
//! [`ObjectBackend`] stores each entry as a blob named after its key. Only
//! text and byte values are accepted, and the blob's content type decides how
//! it reads back: `text/*` objects come back as strings, anything else as
//! bytes. Objects cannot be modified in place, so conditional writes, lifetime
//! refreshes and arithmetic report
//! [`ErrorKind::NotImplemented`](strata_tier::ErrorKind::NotImplemented).
//!
//! The service itself is reached through the [`ObjectStore`] trait.
//! [`MemoryObjectStore`] keeps objects in process.
//!
//! # Examples
//!
//! ```
//! use strata_object::{MemoryObjectStore, ObjectBackend, ObjectOptions};
//! use strata_tier::{Backend, Value};
//!
//! let store = MemoryObjectStore::new();
//! let backend = ObjectBackend::new(store.clone(), ObjectOptions::new("reports").with_suffix(".txt"));
//!
//! backend.set("2024/q1", &Value::from("revenue up"), None)?;
//! assert!(store.contains("reports", "2024/q1.txt"));
//! assert_eq!(backend.get("2024/q1")?, Some(Value::from("revenue up")));
//! # Ok::<(), strata_tier::Error>(())
//! ```

mod backend;
mod options;
mod store;

#[doc(inline)]
pub use backend::ObjectBackend;
#[doc(inline)]
pub use options::{DEFAULT_CONTENT_TYPE, ObjectOptions};
#[doc(inline)]
pub use store::{MemoryObjectStore, Object, ObjectStore};
