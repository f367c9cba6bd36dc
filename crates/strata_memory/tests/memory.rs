// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Integration tests for `MemoryBackend`.

use std::thread;
use std::time::Duration;

use strata_memory::MemoryBackend;
use strata_tier::{Backend, Kind, Value};

#[test]
fn every_kind_reads_back_unchanged() {
    let backend = MemoryBackend::new();
    let values = [
        Value::Bool(false),
        Value::I8(-8),
        Value::I16(-16),
        Value::I32(-32),
        Value::I64(-64),
        Value::U8(8),
        Value::U16(16),
        Value::U32(32),
        Value::U64(64),
        Value::F32(3.25),
        Value::F64(6.5),
        Value::from("text"),
        Value::Duration(Duration::from_millis(1500)),
        Value::Timestamp(jiff::Timestamp::UNIX_EPOCH),
        Value::Bytes(vec![0, 1, 2, 255]),
    ];

    for (i, value) in values.iter().enumerate() {
        let key = format!("k{i}");
        backend.set(&key, value, None).unwrap();
        assert_eq!(backend.get(&key).unwrap().as_ref(), Some(value));
    }
    assert_eq!(Kind::ALL.len(), values.len());
}

#[test]
fn entries_expire_after_their_ttl() {
    let backend = MemoryBackend::new();
    backend.set("short", &Value::from(1_u8), Some(Duration::from_millis(50))).unwrap();
    backend.set("forever", &Value::from(2_u8), None).unwrap();

    thread::sleep(Duration::from_millis(150));

    assert_eq!(backend.get("short").unwrap(), None);
    assert!(!backend.contains("short").unwrap());
    assert_eq!(backend.get("forever").unwrap(), Some(Value::from(2_u8)));
}

#[test]
fn touch_extends_lifetime() {
    let backend = MemoryBackend::new();
    backend.set("k", &Value::from("v"), Some(Duration::from_millis(200))).unwrap();

    thread::sleep(Duration::from_millis(120));
    assert!(backend.touch("k", Some(Duration::from_secs(60))).unwrap());
    thread::sleep(Duration::from_millis(160));

    assert_eq!(backend.get("k").unwrap(), Some(Value::from("v")));
}

#[test]
fn increment_does_not_extend_lifetime() {
    let backend = MemoryBackend::new();
    backend.set("n", &Value::from(1_i64), Some(Duration::from_millis(300))).unwrap();

    thread::sleep(Duration::from_millis(200));
    assert_eq!(backend.increment("n", 1).unwrap(), 2);
    thread::sleep(Duration::from_millis(200));

    assert_eq!(backend.get("n").unwrap(), None);
}

#[test]
fn bounded_backend_evicts() {
    let backend = MemoryBackend::with_capacity(10);
    for i in 0..200 {
        backend.set(&format!("k{i}"), &Value::from(i64::from(i)), None).unwrap();
    }
    assert!(backend.entry_count() <= 10);
}

#[test]
fn batch_defaults_cover_memory() {
    let backend = MemoryBackend::new();
    let entries = vec![("a".to_owned(), Value::from(1_u8)), ("b".to_owned(), Value::from(2_u8))];
    assert!(backend.set_many(&entries, None).iter().all(Result::is_ok));

    let removed: Vec<bool> = backend
        .remove_many(&["a".to_owned(), "zz".to_owned()])
        .into_iter()
        .map(Result::unwrap)
        .collect();
    assert_eq!(removed, vec![true, false]);
    assert_eq!(backend.get("b").unwrap(), Some(Value::from(2_u8)));
}
