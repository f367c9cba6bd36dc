// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Integration tests for `Backend` trait default implementations.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use strata_tier::{Backend, Error, ErrorKind, Kind, KindSet, Result, Value};

/// Minimal implementation that only provides required methods
#[derive(Debug, Default)]
struct MinimalBackend {
    data: Mutex<HashMap<String, Value>>,
}

impl Backend for MinimalBackend {
    fn name(&self) -> &'static str {
        "minimal"
    }

    fn get(&self, key: &str) -> Result<Option<Value>> {
        Ok(self.data.lock().expect("lock poisoned").get(key).cloned())
    }

    fn contains(&self, key: &str) -> Result<bool> {
        Ok(self.data.lock().expect("lock poisoned").contains_key(key))
    }

    fn set(&self, key: &str, value: &Value, _ttl: Option<Duration>) -> Result<()> {
        if key.is_empty() {
            return Err(Error::backend("set", key, "empty key"));
        }
        self.data.lock().expect("lock poisoned").insert(key.to_owned(), value.clone());
        Ok(())
    }

    fn replace(&self, key: &str, value: &Value, _ttl: Option<Duration>) -> Result<bool> {
        let mut data = self.data.lock().expect("lock poisoned");
        Ok(data.get_mut(key).map(|current| *current = value.clone()).is_some())
    }

    fn touch(&self, key: &str, _ttl: Option<Duration>) -> Result<bool> {
        Ok(self.data.lock().expect("lock poisoned").contains_key(key))
    }

    fn remove(&self, key: &str) -> Result<bool> {
        Ok(self.data.lock().expect("lock poisoned").remove(key).is_some())
    }

    fn increment(&self, key: &str, delta: i64) -> Result<i64> {
        let mut data = self.data.lock().expect("lock poisoned");
        let current = data.get_mut(key).ok_or_else(|| Error::key_not_found(key))?;
        *current = current.checked_add(delta)?;
        current.as_i64()
    }
}

fn keys(keys: &[&str]) -> Vec<String> {
    keys.iter().map(|key| (*key).to_owned()).collect()
}

#[test]
fn default_get_many_is_positional() {
    let backend = MinimalBackend::default();
    backend.set("b", &Value::from(2_u32), None).unwrap();

    let results = backend.get_many(&keys(&["a", "b"]));
    assert_eq!(results.len(), 2);
    assert_eq!(results[0].as_ref().unwrap(), &None);
    assert_eq!(results[1].as_ref().unwrap(), &Some(Value::from(2_u32)));
}

#[test]
fn default_set_many_reports_each_entry() {
    let backend = MinimalBackend::default();
    let entries = vec![("x".to_owned(), Value::from(true)), (String::new(), Value::from(false))];

    let results = backend.set_many(&entries, None);
    assert!(results[0].is_ok());
    assert_eq!(results[1].as_ref().unwrap_err().kind(), ErrorKind::Backend);
    assert!(backend.contains("x").unwrap());
}

#[test]
fn default_remove_many_reports_each_key() {
    let backend = MinimalBackend::default();
    backend.set("a", &Value::from("1"), None).unwrap();

    let results: Vec<bool> = backend
        .remove_many(&keys(&["a", "b"]))
        .into_iter()
        .map(|result| result.unwrap())
        .collect();
    assert_eq!(results, vec![true, false]);
}

#[test]
fn default_decrement_subtracts() {
    let backend = MinimalBackend::default();
    backend.set("n", &Value::from(5_u8), None).unwrap();

    assert_eq!(backend.decrement("n", 2).unwrap(), 3);
    assert_eq!(backend.get("n").unwrap(), Some(Value::from(3_u8)));
    assert_eq!(backend.decrement("n", i64::MIN).unwrap_err().kind(), ErrorKind::Conversion);
}

#[test]
fn default_lifecycle_and_kinds() {
    let backend = MinimalBackend::default();
    backend.open().unwrap();
    backend.close().unwrap();
    assert_eq!(backend.supported_kinds(), KindSet::all());
}

#[test]
fn boxed_backend_forwards_calls() {
    let backend: Box<dyn Backend> = Box::new(MinimalBackend::default());
    backend.set("k", &Value::from(1.5_f64), None).unwrap();

    assert_eq!(backend.name(), "minimal");
    assert_eq!(backend.get("k").unwrap().map(|value| value.kind()), Some(Kind::F64));
    assert!(backend.remove("k").unwrap());
    assert!(!backend.contains("k").unwrap());
}
