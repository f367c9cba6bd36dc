// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use crate::{Error, Result};

/// The outcome of a batch operation that may succeed for only some keys.
///
/// Holds whatever the batch produced together with the most recent failure,
/// if there was one. Work done for the other keys is kept either way.
///
/// # Examples
///
/// ```
/// use strata::Cache;
///
/// let cache = Cache::memory("", None)?;
/// cache.set("a", 1_u8)?;
///
/// let partial = cache.get_many(&["a", "b"]);
/// assert!(!partial.is_complete());
/// assert_eq!(partial.value().len(), 1);
///
/// let (found, error) = partial.into_parts();
/// assert!(found.contains_key("a"));
/// assert!(error.is_some());
/// # Ok::<(), strata::Error>(())
/// ```
#[derive(Debug)]
#[must_use]
pub struct Partial<T> {
    value: T,
    error: Option<Error>,
}

impl<T> Partial<T> {
    /// Creates a partial result.
    pub fn new(value: T, error: Option<Error>) -> Self {
        Self { value, error }
    }

    /// What the batch produced.
    #[must_use]
    pub fn value(&self) -> &T {
        &self.value
    }

    /// Discards any error and returns what the batch produced.
    #[must_use]
    pub fn into_value(self) -> T {
        self.value
    }

    /// The most recent failure, if any key failed.
    #[must_use]
    pub fn error(&self) -> Option<&Error> {
        self.error.as_ref()
    }

    /// Returns `true` when no key failed.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.error.is_none()
    }

    /// Splits into the produced value and the most recent failure.
    #[must_use]
    pub fn into_parts(self) -> (T, Option<Error>) {
        (self.value, self.error)
    }

    /// Converts into a `Result`, dropping partial output when any key failed.
    ///
    /// # Errors
    ///
    /// Returns the most recent failure.
    pub fn into_result(self) -> Result<T> {
        match self.error {
            Some(error) => Err(error),
            None => Ok(self.value),
        }
    }
}

#[cfg(test)]
mod tests {
    use strata_tier::ErrorKind;

    use super::*;

    #[test]
    fn complete_partial_converts_to_ok() {
        let partial = Partial::new(vec![1, 2], None);
        assert!(partial.is_complete());
        assert_eq!(partial.into_result().unwrap(), vec![1, 2]);
    }

    #[test]
    fn failed_partial_keeps_value_and_error() {
        let partial = Partial::new(vec![1], Some(Error::key_not_found("k")));
        assert_eq!(partial.value(), &vec![1]);
        assert_eq!(partial.error().unwrap().kind(), ErrorKind::KeyNotFound);
        assert_eq!(partial.into_result().unwrap_err().kind(), ErrorKind::KeyNotFound);
    }
}
