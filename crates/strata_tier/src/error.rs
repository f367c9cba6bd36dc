// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Error types for cache operations.

use std::fmt::{self, Display, Formatter};

/// Classifies why a cache operation failed.
///
/// Policy failures ([`NotReadable`](Self::NotReadable), [`NotWritable`](Self::NotWritable),
/// [`KeyInvalid`](Self::KeyInvalid), [`UnsupportedDataType`](Self::UnsupportedDataType)) are
/// raised before any backend is contacted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum ErrorKind {
    /// Reads are disabled for the cache.
    NotReadable,
    /// Writes are disabled for the cache.
    NotWritable,
    /// The namespaced key does not match the configured key pattern.
    KeyInvalid,
    /// The key is absent locally and in every chained tier.
    KeyNotFound,
    /// The value's kind is not in the cache's allowed set.
    UnsupportedDataType,
    /// The backend does not support the requested operation.
    NotImplemented,
    /// The backend or its client reported a failure.
    Backend,
    /// A value could not be converted to or from its stored form.
    Conversion,
    /// The cache was configured with invalid settings.
    InvalidConfiguration,
}

impl ErrorKind {
    /// Returns `true` for failures raised by the adapter's policy checks.
    #[must_use]
    pub fn is_policy(self) -> bool {
        matches!(
            self,
            Self::NotReadable | Self::NotWritable | Self::KeyInvalid | Self::UnsupportedDataType
        )
    }

    /// Returns a short, stable identifier for the kind.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::NotReadable => "cache is not readable",
            Self::NotWritable => "cache is not writable",
            Self::KeyInvalid => "key is invalid",
            Self::KeyNotFound => "key not found",
            Self::UnsupportedDataType => "unsupported data type",
            Self::NotImplemented => "operation not implemented",
            Self::Backend => "backend failure",
            Self::Conversion => "value conversion failed",
            Self::InvalidConfiguration => "invalid configuration",
        }
    }
}

impl Display for ErrorKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Names the operation and key an error relates to, when known.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct ErrorContext {
    operation: Option<&'static str>,
    key: Option<String>,
}

impl ErrorContext {
    fn key(key: impl Into<String>) -> Self {
        Self {
            operation: None,
            key: Some(key.into()),
        }
    }

    fn operation(operation: &'static str, key: impl Into<String>) -> Self {
        Self {
            operation: Some(operation),
            key: Some(key.into()),
        }
    }
}

impl Display for ErrorContext {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match (self.operation, self.key.as_deref()) {
            (Some(operation), Some(key)) => write!(f, " ({operation} '{key}')"),
            (None, Some(key)) => write!(f, " ('{key}')"),
            (Some(operation), None) => write!(f, " ({operation})"),
            (None, None) => Ok(()),
        }
    }
}

/// An error from a cache operation.
///
/// Every error carries an [`ErrorKind`]; backend failures additionally keep the
/// underlying cause, reachable through [`std::error::Error::source()`].
///
/// # Example
///
/// ```
/// use strata_tier::{Error, ErrorKind};
///
/// let error = Error::key_not_found("user:42");
/// assert_eq!(error.kind(), ErrorKind::KeyNotFound);
/// assert_eq!(error.key(), Some("user:42"));
/// ```
#[ohno::error]
#[display("{kind}{context}")]
pub struct Error {
    kind: ErrorKind,
    context: ErrorContext,
}

impl Error {
    /// Creates an error of the given kind with no further context.
    #[must_use]
    pub fn from_kind(kind: ErrorKind) -> Self {
        Self::new(kind, ErrorContext::default())
    }

    /// Reads are disabled.
    #[must_use]
    pub fn not_readable() -> Self {
        Self::from_kind(ErrorKind::NotReadable)
    }

    /// Writes are disabled.
    #[must_use]
    pub fn not_writable() -> Self {
        Self::from_kind(ErrorKind::NotWritable)
    }

    /// The namespaced key failed validation.
    #[must_use]
    pub fn key_invalid(key: impl Into<String>) -> Self {
        Self::new(ErrorKind::KeyInvalid, ErrorContext::key(key))
    }

    /// The key is absent.
    #[must_use]
    pub fn key_not_found(key: impl Into<String>) -> Self {
        Self::new(ErrorKind::KeyNotFound, ErrorContext::key(key))
    }

    /// The value kind is not allowed for this cache.
    #[must_use]
    pub fn unsupported_data_type(key: impl Into<String>, kind: impl Display) -> Self {
        Self::caused_by(
            ErrorKind::UnsupportedDataType,
            ErrorContext::key(key),
            format!("values of kind {kind} are not accepted"),
        )
    }

    /// The backend does not implement `operation`.
    #[must_use]
    pub fn not_implemented(operation: &'static str, backend: &str) -> Self {
        Self::caused_by(
            ErrorKind::NotImplemented,
            ErrorContext {
                operation: Some(operation),
                key: None,
            },
            format!("{backend} does not support {operation}"),
        )
    }

    /// The backend failed while running `operation` against `key`.
    pub fn backend(
        operation: &'static str,
        key: impl Into<String>,
        cause: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        Self::caused_by(ErrorKind::Backend, ErrorContext::operation(operation, key), cause)
    }

    /// A value could not be converted.
    pub fn conversion(cause: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Self::caused_by(ErrorKind::Conversion, ErrorContext::default(), cause)
    }

    /// The cache configuration is invalid.
    pub fn invalid_configuration(cause: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Self::caused_by(ErrorKind::InvalidConfiguration, ErrorContext::default(), cause)
    }

    /// Attaches the key the error relates to, keeping any operation already recorded.
    #[must_use]
    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.context.key = Some(key.into());
        self
    }

    /// Returns the error classification.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Returns the key the error relates to, if any.
    #[must_use]
    pub fn key(&self) -> Option<&str> {
        self.context.key.as_deref()
    }

    /// Returns the backend operation that failed, if any.
    #[must_use]
    pub fn operation(&self) -> Option<&'static str> {
        self.context.operation
    }
}

/// A specialized [`Result`] type for cache operations.
pub type Result<T> = std::result::Result<T, Error>;
