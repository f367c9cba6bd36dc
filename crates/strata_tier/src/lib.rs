// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
#![cfg_attr(docsrs, feature(doc_cfg))]

//! Core abstractions shared by every strata cache backend.
//!
//! This crate defines the [`Backend`] trait that storage engines implement, the
//! [`Value`] model with its [`Kind`] classification, the per-cache [`Options`]
//! policy and the [`Error`] type used throughout the family of crates.
//!
//! # Values
//!
//! A [`Value`] is one of fifteen kinds: booleans, signed and unsigned integers
//! of every width, floats, text, durations, timestamps and byte sequences.
//! Text-only stores use [`Value::to_text`] and [`Value::from_text`] to move
//! values through strings without losing their kind.
//!
//! # Implementing a Backend
//!
//! ```
//! use std::collections::HashMap;
//! use std::sync::Mutex;
//! use std::time::Duration;
//!
//! use strata_tier::{Backend, Error, Result, Value};
//!
//! #[derive(Debug, Default)]
//! struct MapBackend(Mutex<HashMap<String, Value>>);
//!
//! impl Backend for MapBackend {
//!     fn name(&self) -> &'static str {
//!         "map"
//!     }
//!
//!     fn get(&self, key: &str) -> Result<Option<Value>> {
//!         Ok(self.0.lock().unwrap().get(key).cloned())
//!     }
//!
//!     fn contains(&self, key: &str) -> Result<bool> {
//!         Ok(self.0.lock().unwrap().contains_key(key))
//!     }
//!
//!     fn set(&self, key: &str, value: &Value, _ttl: Option<Duration>) -> Result<()> {
//!         self.0.lock().unwrap().insert(key.to_owned(), value.clone());
//!         Ok(())
//!     }
//!
//!     fn replace(&self, key: &str, value: &Value, _ttl: Option<Duration>) -> Result<bool> {
//!         let mut map = self.0.lock().unwrap();
//!         Ok(map.get_mut(key).map(|current| *current = value.clone()).is_some())
//!     }
//!
//!     fn touch(&self, key: &str, _ttl: Option<Duration>) -> Result<bool> {
//!         Ok(self.0.lock().unwrap().contains_key(key))
//!     }
//!
//!     fn remove(&self, key: &str) -> Result<bool> {
//!         Ok(self.0.lock().unwrap().remove(key).is_some())
//!     }
//!
//!     fn increment(&self, key: &str, _delta: i64) -> Result<i64> {
//!         Err(Error::not_implemented("increment", self.name()))
//!     }
//! }
//! ```

mod backend;
pub mod duration;
pub mod error;
mod kind;
pub mod options;
#[cfg(any(feature = "test-util", test))]
pub mod testing;
mod text;
mod value;

#[doc(inline)]
pub use backend::Backend;
#[doc(inline)]
pub use error::{Error, ErrorKind, Result};
#[doc(inline)]
pub use kind::{Kind, KindSet};
#[doc(inline)]
pub use options::{Options, OptionsBuilder};
#[doc(inline)]
pub use text::TimestampFormat;
#[doc(inline)]
pub use value::Value;
