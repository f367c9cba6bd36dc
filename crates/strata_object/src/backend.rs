// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::time::Duration;

use strata_tier::{Backend, Error, Kind, KindSet, Result, Value};

use crate::options::ObjectOptions;
use crate::store::{Object, ObjectStore};

/// A backend that keeps each entry as an object in a bucket.
///
/// Keys map to object names by appending the configured suffix. Strings are
/// stored as UTF-8 and bytes verbatim, both under the configured content type.
/// Entry lifetimes are handed to the store as object expiry.
#[derive(Debug)]
pub struct ObjectBackend<S> {
    store: S,
    options: ObjectOptions,
}

impl<S: ObjectStore> ObjectBackend<S> {
    /// Creates a backend over `store`.
    #[must_use]
    pub fn new(store: S, options: ObjectOptions) -> Self {
        Self { store, options }
    }

    /// The underlying store.
    #[must_use]
    pub fn store(&self) -> &S {
        &self.store
    }

    /// The backend's settings.
    #[must_use]
    pub fn options(&self) -> &ObjectOptions {
        &self.options
    }

    fn decode(key: &str, object: Object) -> Result<Value> {
        if object.is_text() {
            String::from_utf8(object.body)
                .map(Value::String)
                .map_err(|e| Error::conversion(e).with_key(key))
        } else {
            Ok(Value::Bytes(object.body))
        }
    }
}

impl<S: ObjectStore> Backend for ObjectBackend<S> {
    fn name(&self) -> &'static str {
        "object"
    }

    fn supported_kinds(&self) -> KindSet {
        KindSet::of([Kind::String, Kind::Bytes])
    }

    fn get(&self, key: &str) -> Result<Option<Value>> {
        self.store
            .get(self.options.bucket(), &self.options.object_name(key))?
            .map(|object| Self::decode(key, object))
            .transpose()
    }

    fn contains(&self, key: &str) -> Result<bool> {
        self.store.head(self.options.bucket(), &self.options.object_name(key))
    }

    fn set(&self, key: &str, value: &Value, ttl: Option<Duration>) -> Result<()> {
        let body = match value {
            Value::String(text) => text.as_bytes().to_vec(),
            Value::Bytes(bytes) => bytes.clone(),
            other => return Err(Error::unsupported_data_type(key, other.kind())),
        };
        let object = Object::new(body, self.options.content_type());
        self.store
            .put(self.options.bucket(), &self.options.object_name(key), object, ttl)
    }

    fn replace(&self, _key: &str, _value: &Value, _ttl: Option<Duration>) -> Result<bool> {
        Err(Error::not_implemented("replace", self.name()))
    }

    fn touch(&self, _key: &str, _ttl: Option<Duration>) -> Result<bool> {
        Err(Error::not_implemented("touch", self.name()))
    }

    fn remove(&self, key: &str) -> Result<bool> {
        self.store.delete(self.options.bucket(), &self.options.object_name(key))
    }

    fn increment(&self, _key: &str, _delta: i64) -> Result<i64> {
        Err(Error::not_implemented("increment", self.name()))
    }

    fn decrement(&self, _key: &str, _delta: i64) -> Result<i64> {
        Err(Error::not_implemented("decrement", self.name()))
    }
}
