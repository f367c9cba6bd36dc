// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! The object-storage client contract and an in-process implementation.

use std::collections::HashMap;
use std::fmt::Debug;
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::RwLock;
use strata_tier::Result;

/// A stored blob and the content type it was written with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Object {
    /// Raw object content.
    pub body: Vec<u8>,
    /// MIME type recorded with the object, e.g. `text/plain`.
    pub content_type: String,
}

impl Object {
    /// Creates an object.
    #[must_use]
    pub fn new(body: impl Into<Vec<u8>>, content_type: impl Into<String>) -> Self {
        Self {
            body: body.into(),
            content_type: content_type.into(),
        }
    }

    /// Returns `true` when the content type is textual (`text/*`).
    #[must_use]
    pub fn is_text(&self) -> bool {
        self.content_type
            .split(';')
            .next()
            .and_then(|mime| mime.trim().split_once('/'))
            .is_some_and(|(family, _)| family.eq_ignore_ascii_case("text"))
    }
}

/// Operations an object-storage service offers to [`ObjectBackend`](crate::ObjectBackend).
///
/// Implementations translate transport failures into
/// [`ErrorKind::Backend`](strata_tier::ErrorKind::Backend) errors. A missing
/// object is not a failure: `get` returns `Ok(None)` and `delete` returns
/// `Ok(false)`.
pub trait ObjectStore: Debug + Send + Sync {
    /// Downloads an object.
    fn get(&self, bucket: &str, name: &str) -> Result<Option<Object>>;

    /// Uploads an object, replacing any existing one. When `expires_after` is
    /// set the store drops the object once that much time has passed.
    fn put(&self, bucket: &str, name: &str, object: Object, expires_after: Option<Duration>) -> Result<()>;

    /// Checks whether an object exists without downloading it.
    fn head(&self, bucket: &str, name: &str) -> Result<bool>;

    /// Deletes an object. Returns `true` when one existed.
    fn delete(&self, bucket: &str, name: &str) -> Result<bool>;
}

type ObjectKey = (String, String);

#[derive(Debug, Clone)]
struct StoredObject {
    object: Object,
    expires_at: Option<Instant>,
}

impl StoredObject {
    fn is_live(&self, now: Instant) -> bool {
        self.expires_at.is_none_or(|deadline| deadline > now)
    }
}

/// An [`ObjectStore`] that keeps objects in process memory.
///
/// Clones share the same objects.
#[derive(Debug, Clone, Default)]
pub struct MemoryObjectStore {
    objects: Arc<RwLock<HashMap<ObjectKey, StoredObject>>>,
}

impl MemoryObjectStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` when a live object exists, bypassing the trait surface.
    #[must_use]
    pub fn contains(&self, bucket: &str, name: &str) -> bool {
        self.live(bucket, name).is_some()
    }

    /// Returns the names of every live object in `bucket`, sorted.
    #[must_use]
    pub fn names(&self, bucket: &str) -> Vec<String> {
        let now = Instant::now();
        let mut names: Vec<String> = self
            .objects
            .read()
            .iter()
            .filter(|((b, _), stored)| b == bucket && stored.is_live(now))
            .map(|((_, name), _)| name.clone())
            .collect();
        names.sort();
        names
    }

    fn live(&self, bucket: &str, name: &str) -> Option<Object> {
        let now = Instant::now();
        self.objects
            .read()
            .get(&(bucket.to_owned(), name.to_owned()))
            .filter(|stored| stored.is_live(now))
            .map(|stored| stored.object.clone())
    }
}

impl ObjectStore for MemoryObjectStore {
    fn get(&self, bucket: &str, name: &str) -> Result<Option<Object>> {
        Ok(self.live(bucket, name))
    }

    fn put(&self, bucket: &str, name: &str, object: Object, expires_after: Option<Duration>) -> Result<()> {
        let stored = StoredObject {
            object,
            expires_at: expires_after.map(|ttl| Instant::now() + ttl),
        };
        self.objects.write().insert((bucket.to_owned(), name.to_owned()), stored);
        Ok(())
    }

    fn head(&self, bucket: &str, name: &str) -> Result<bool> {
        Ok(self.contains(bucket, name))
    }

    fn delete(&self, bucket: &str, name: &str) -> Result<bool> {
        let now = Instant::now();
        let removed = self.objects.write().remove(&(bucket.to_owned(), name.to_owned()));
        Ok(removed.is_some_and(|stored| stored.is_live(now)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_detection() {
        assert!(Object::new("", "text/plain").is_text());
        assert!(Object::new("", "Text/CSV; charset=utf-8").is_text());
        assert!(!Object::new("", "application/json").is_text());
        assert!(!Object::new("", "").is_text());
    }

    #[test]
    fn buckets_are_separate() {
        let store = MemoryObjectStore::new();
        store.put("a", "k", Object::new("1", "text/plain"), None).unwrap();

        assert!(store.head("a", "k").unwrap());
        assert!(!store.head("b", "k").unwrap());
        assert_eq!(store.names("a"), vec!["k".to_owned()]);
        assert!(store.names("b").is_empty());
    }

    #[test]
    fn objects_expire() {
        let store = MemoryObjectStore::new();
        store
            .put("a", "k", Object::new("1", "text/plain"), Some(Duration::from_millis(30)))
            .unwrap();
        std::thread::sleep(Duration::from_millis(80));

        assert_eq!(store.get("a", "k").unwrap(), None);
        assert!(!store.delete("a", "k").unwrap());
    }

    #[test]
    fn delete_reports_presence() {
        let store = MemoryObjectStore::new();
        store.put("a", "k", Object::new("1", "text/plain"), None).unwrap();
        assert!(store.delete("a", "k").unwrap());
        assert!(!store.delete("a", "k").unwrap());
    }
}
