// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! End-to-end behavior of caches and tier chains.

use std::time::Duration;

use strata::{Backend, Cache, ErrorKind, MemoryBackend, Options, Value};
use strata_remote::testing::FakeRemote;
use strata_remote::{RemoteBackend, RemoteOptions};
use strata_tier::testing::{BackendOp, MockBackend};

fn memory_tier(namespace: &str) -> Cache {
    Cache::memory(namespace, Some(Duration::from_secs(60))).unwrap()
}

#[test]
fn set_then_get() {
    let cache = memory_tier("");

    cache.set("key", "value").unwrap();

    assert_eq!(cache.get("key").unwrap(), Value::from("value"));
}

#[test]
fn chained_get_many_promotes_into_the_local_tier() {
    let shared = memory_tier("one:");
    for key in ["key1", "key2", "key3"] {
        shared.set(key, format!("{key}-value")).unwrap();
    }

    let mut local = memory_tier("two:").chain(shared);

    let found = local.get_many(&["key1", "key2", "key3"]).into_result().unwrap();
    assert_eq!(found.len(), 3);
    assert_eq!(found["key2"], Value::from("key2-value"));

    local.detach().unwrap();
    for key in ["key1", "key2", "key3"] {
        assert_eq!(local.get(key).unwrap(), Value::from(format!("{key}-value")));
    }
}

#[test]
fn string_only_remote_tier_restores_kinds() {
    let remote = FakeRemote::new();
    let options = RemoteOptions::new("fake://").with_manage_types(true);
    let cache = Cache::builder().remote(remote.clone(), options).build();

    cache.set("key", 8_u8).unwrap();

    assert_eq!(remote.raw("key").as_deref(), Some("8"));
    assert_eq!(cache.get("key").unwrap(), Value::U8(8));
}

#[test]
fn check_and_set_on_missing_key_is_not_found() {
    let cache = memory_tier("");

    let error = cache.check_and_set("missing", "x").unwrap_err();

    assert_eq!(error.kind(), ErrorKind::KeyNotFound);
    assert!(!cache.has("missing"));
}

#[test]
fn remove_many_clears_both_keys() {
    let cache = memory_tier("");
    cache.set_many([("foo", "bar"), ("bar", "bop")]).into_result().unwrap();

    let mut removed = cache.remove_many(&["foo", "bar"]);
    removed.sort();

    assert_eq!(removed, ["bar", "foo"]);
    assert!(!cache.has("foo"));
    assert!(!cache.has("bar"));
}

#[test]
fn increment_is_normalized_for_every_numeric_kind() {
    let cache = memory_tier("");
    let numbers = [
        Value::I8(1),
        Value::I16(1),
        Value::I32(1),
        Value::I64(1),
        Value::U8(1),
        Value::U16(1),
        Value::U32(1),
        Value::U64(1),
        Value::F32(1.0),
        Value::F64(1.0),
    ];

    for (i, number) in numbers.into_iter().enumerate() {
        let key = format!("n{i}");
        let kind = number.kind();
        cache.set(&key, number).unwrap();

        assert_eq!(cache.increment(&key, 1).unwrap(), 2, "{kind}");
        assert_eq!(cache.get(&key).unwrap().kind(), kind);
    }
}

#[test]
fn memory_increment_past_narrow_bound_fails() {
    let cache = memory_tier("");
    cache.set("n", 255_u8).unwrap();

    assert_eq!(cache.increment("n", 1).unwrap_err().kind(), ErrorKind::Conversion);
    assert_eq!(cache.get("n").unwrap(), Value::U8(255));
}

#[test]
fn remote_increment_past_narrow_bound_matches_memory() {
    let remote = FakeRemote::new();
    let options = RemoteOptions::new("fake://").with_manage_types(true);
    let cache = Cache::builder().remote(remote.clone(), options).build();
    cache.set("n", 255_u8).unwrap();

    assert_eq!(cache.increment("n", 1).unwrap_err().kind(), ErrorKind::Conversion);
    assert_eq!(cache.get("n").unwrap(), Value::U8(255));
    assert_eq!(remote.raw("n").as_deref(), Some("255"));
}

#[test]
fn namespaces_isolate_key_spaces() {
    let backend = MemoryBackend::new();
    let a = Cache::new(backend.clone(), Options::builder().namespace("a:").build().unwrap());
    let b = Cache::new(backend, Options::builder().namespace("b:").build().unwrap());

    a.set("k", 1_u8).unwrap();

    assert!(a.has("k"));
    assert!(!b.has("k"));
    assert_eq!(b.get("k").unwrap_err().kind(), ErrorKind::KeyNotFound);
}

#[test]
fn invalid_keys_are_rejected_whatever_the_backend_holds() {
    let backend = MockBackend::with_data([("Bad Key".to_owned(), Value::from("present"))]);
    let options = Options::builder().key_pattern("^[a-z_]+$").build().unwrap();
    let cache = Cache::new(backend.clone(), options);

    assert_eq!(cache.get("Bad Key").unwrap_err().kind(), ErrorKind::KeyInvalid);
    assert!(!cache.has("Bad Key"));
    assert!(backend.operations().is_empty());
}

#[test]
fn touch_after_set_leaves_value_unchanged() {
    let cache = memory_tier("");
    cache.set("k", "v").unwrap();

    assert!(cache.touch("k"));

    assert_eq!(cache.get("k").unwrap(), Value::from("v"));
}

#[test]
fn policy_violations_reach_no_tier() {
    let local = MockBackend::new();
    let chained = MockBackend::new();
    let options = Options::builder().readable(false).writable(false).build().unwrap();
    let cache = Cache::new(local.clone(), options).chain(Cache::new(chained.clone(), Options::default()));

    assert_eq!(cache.get("k").unwrap_err().kind(), ErrorKind::NotReadable);
    assert_eq!(cache.set("k", 1_u8).unwrap_err().kind(), ErrorKind::NotWritable);
    assert_eq!(cache.increment("k", 1).unwrap_err().kind(), ErrorKind::NotWritable);

    assert!(local.operations().is_empty());
    assert!(chained.operations().is_empty());
}

#[test]
fn local_backend_failure_is_answered_by_the_chain() {
    let local = MockBackend::new();
    local.fail_when(|op| matches!(op, BackendOp::Get(_)));
    let chained = memory_tier("");
    chained.set("k", 5_i16).unwrap();

    let cache = Cache::new(local.clone(), Options::default()).chain(chained);

    assert_eq!(cache.get("k").unwrap(), Value::I16(5));
    assert_eq!(local.peek("k"), Some(Value::I16(5)));
}

#[test]
fn exhausted_chain_yields_not_found() {
    let local = MockBackend::new();
    local.fail_when(|op| matches!(op, BackendOp::Get(_)));
    let cache = Cache::new(local, Options::default()).chain(memory_tier(""));

    assert_eq!(cache.get("k").unwrap_err().kind(), ErrorKind::KeyNotFound);
}

#[test]
fn writes_are_local_authoritative() {
    let chained = MockBackend::new();
    chained.fail_when(|_| true);
    let cache = memory_tier("").chain(Cache::new(chained, Options::default()));

    cache.set("n", 1_i64).unwrap();
    assert_eq!(cache.increment("n", 1).unwrap(), 2);
    assert!(cache.remove("n"));
}

#[test]
fn open_and_close_span_the_chain() {
    let remote = FakeRemote::new();
    let tier = Cache::new(
        RemoteBackend::new(remote.clone(), RemoteOptions::new("fake://")),
        Options::default(),
    );

    let cache = memory_tier("").chain(tier).open().unwrap();
    assert_eq!(remote.connect_count(), 1);

    cache.close().unwrap();
}

#[test]
fn unreachable_chained_tier_fails_open() {
    let remote = FakeRemote::new();
    remote.set_offline(true);
    let tier = Cache::new(
        RemoteBackend::new(remote, RemoteOptions::new("fake://")),
        Options::default(),
    );

    let error = memory_tier("").chain(tier).open().unwrap_err();

    assert_eq!(error.kind(), ErrorKind::Backend);
}

#[test]
fn backend_is_reachable_for_direct_inspection() {
    let cache = memory_tier("ns:");
    cache.set("k", true).unwrap();

    assert_eq!(cache.backend().get("ns:k").unwrap(), Some(Value::Bool(true)));
}
