// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

/// Content type applied to new objects unless configured otherwise.
pub const DEFAULT_CONTENT_TYPE: &str = "text/plain";

/// Settings for an [`ObjectBackend`](crate::ObjectBackend).
///
/// # Examples
///
/// ```
/// use strata_object::ObjectOptions;
///
/// let options = ObjectOptions::new("assets")
///     .with_suffix(".json")
///     .with_content_type("application/json");
///
/// assert_eq!(options.bucket(), "assets");
/// assert_eq!(options.object_name("ns:config"), "ns:config.json");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectOptions {
    bucket: String,
    suffix: String,
    content_type: String,
}

impl ObjectOptions {
    /// Creates options for objects stored in `bucket`.
    #[must_use]
    pub fn new(bucket: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            suffix: String::new(),
            content_type: DEFAULT_CONTENT_TYPE.to_owned(),
        }
    }

    /// Appends `suffix` to every object name, e.g. `.json`.
    #[must_use]
    pub fn with_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.suffix = suffix.into();
        self
    }

    /// Sets the content type recorded on written objects.
    #[must_use]
    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = content_type.into();
        self
    }

    /// The bucket holding the objects.
    #[must_use]
    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    /// The suffix appended to object names.
    #[must_use]
    pub fn suffix(&self) -> &str {
        &self.suffix
    }

    /// The content type recorded on written objects.
    #[must_use]
    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    /// Returns the object name used for a namespaced key.
    #[must_use]
    pub fn object_name(&self, key: &str) -> String {
        format!("{key}{}", self.suffix)
    }
}
