// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Kind tags persisted next to values in string-only stores.
//!
//! The kind of the value stored at `key` lives under the companion key
//! `gcm:<key>` as its decimal [`Kind::id`]. Tags are created write-if-absent, so
//! rewriting a key never reclassifies it, and they share the data key's
//! lifetime.

use std::time::Duration;

use strata_tier::{Error, Kind, Result};

use crate::client::{RemoteClient, SetCondition};

/// Prefix of every companion key.
pub const TYPE_TAG_PREFIX: &str = "gcm:";

/// Returns the companion key holding the kind of `key`.
///
/// ```
/// assert_eq!(strata_remote::tags::tag_key("users:42"), "gcm:users:42");
/// ```
#[must_use]
pub fn tag_key(key: &str) -> String {
    format!("{TYPE_TAG_PREFIX}{key}")
}

fn tag_keys(keys: &[String]) -> Vec<String> {
    keys.iter().map(|key| tag_key(key)).collect()
}

fn parse_tag(key: &str, text: &str) -> Result<Kind> {
    text.trim()
        .parse::<u8>()
        .ok()
        .and_then(Kind::from_id)
        .ok_or_else(|| Error::conversion(format!("'{text}' is not a known kind tag")).with_key(key))
}

/// Reads and writes the tags of one client.
#[derive(Debug)]
pub(crate) struct TypeTags<'a, C: ?Sized> {
    client: &'a C,
}

impl<'a, C: RemoteClient + ?Sized> TypeTags<'a, C> {
    pub(crate) fn new(client: &'a C) -> Self {
        Self { client }
    }

    /// Tags `key` with `kind` unless it is already tagged. Returns whether a
    /// new tag was written.
    pub(crate) fn record(&self, key: &str, kind: Kind, ttl: Option<Duration>) -> Result<bool> {
        self.client
            .set(&tag_key(key), &kind.id().to_string(), ttl, SetCondition::IfAbsent)
    }

    /// Gives the tag of `key` a new lifetime.
    pub(crate) fn refresh(&self, key: &str, ttl: Option<Duration>) -> Result<()> {
        self.client.expire(&tag_key(key), ttl).map(|_| ())
    }

    pub(crate) fn forget(&self, key: &str) -> Result<()> {
        self.client.delete(&tag_key(key)).map(|_| ())
    }

    pub(crate) fn forget_many(&self, keys: &[String]) -> Result<()> {
        self.client.delete_many(&tag_keys(keys)).map(|_| ())
    }

    /// Returns the kind recorded for `key`, if any.
    pub(crate) fn lookup(&self, key: &str) -> Result<Option<Kind>> {
        self.client
            .get(&tag_key(key))?
            .map(|text| parse_tag(key, &text))
            .transpose()
    }

    /// Returns the kinds recorded for `keys` in a single batch.
    pub(crate) fn lookup_many(&self, keys: &[String]) -> Result<Vec<Option<Result<Kind>>>> {
        let tags = self.client.get_many(&tag_keys(keys))?;
        Ok(keys
            .iter()
            .zip(tags)
            .map(|(key, tag)| tag.map(|text| parse_tag(key, &text)))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use strata_tier::ErrorKind;

    use super::*;
    use crate::testing::FakeRemote;

    #[test]
    fn record_never_reclassifies() {
        let remote = FakeRemote::new();
        let tags = TypeTags::new(&remote);

        assert!(tags.record("k", Kind::U8, None).unwrap());
        assert!(!tags.record("k", Kind::String, None).unwrap());
        assert_eq!(remote.raw("gcm:k").as_deref(), Some("8"));
        assert_eq!(tags.lookup("k").unwrap(), Some(Kind::U8));
    }

    #[test]
    fn lookup_many_is_positional() {
        let remote = FakeRemote::new();
        let tags = TypeTags::new(&remote);
        tags.record("b", Kind::Bool, None).unwrap();

        let kinds = tags.lookup_many(&["a".to_owned(), "b".to_owned()]).unwrap();
        assert!(kinds[0].is_none());
        assert_eq!(kinds[1].as_ref().map(|kind| *kind.as_ref().unwrap()), Some(Kind::Bool));
    }

    #[test]
    fn unknown_tags_are_conversion_errors() {
        let remote = FakeRemote::new();
        remote.set("gcm:k", "99", None, SetCondition::Always).unwrap();

        let error = TypeTags::new(&remote).lookup("k").unwrap_err();
        assert_eq!(error.kind(), ErrorKind::Conversion);
        assert_eq!(error.key(), Some("k"));
    }

    #[test]
    fn legacy_platform_ids_decode() {
        assert_eq!(parse_tag("k", "2").unwrap(), Kind::I64);
        assert_eq!(parse_tag("k", "7").unwrap(), Kind::U64);
    }
}
