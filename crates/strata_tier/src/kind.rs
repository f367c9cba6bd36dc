// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::fmt::{self, Display, Formatter};

/// The classification of a cached [`Value`](crate::Value).
///
/// Each kind has a stable numeric identifier that backends may persist next to
/// the stored text so the original kind can be restored on read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum Kind {
    /// A boolean.
    Bool = 1,
    /// An 8-bit signed integer.
    I8 = 3,
    /// A 16-bit signed integer.
    I16 = 4,
    /// A 32-bit signed integer.
    I32 = 5,
    /// A 64-bit signed integer.
    I64 = 6,
    /// An 8-bit unsigned integer.
    U8 = 8,
    /// A 16-bit unsigned integer.
    U16 = 9,
    /// A 32-bit unsigned integer.
    U32 = 10,
    /// A 64-bit unsigned integer.
    U64 = 11,
    /// A 32-bit float.
    F32 = 12,
    /// A 64-bit float.
    F64 = 13,
    /// UTF-8 text.
    String = 14,
    /// A span of time.
    Duration = 15,
    /// An instant in time.
    Timestamp = 16,
    /// An opaque byte sequence.
    Bytes = 17,
}

impl Kind {
    /// Every kind, in identifier order.
    pub const ALL: [Self; 15] = [
        Self::Bool,
        Self::I8,
        Self::I16,
        Self::I32,
        Self::I64,
        Self::U8,
        Self::U16,
        Self::U32,
        Self::U64,
        Self::F32,
        Self::F64,
        Self::String,
        Self::Duration,
        Self::Timestamp,
        Self::Bytes,
    ];

    /// Returns the persisted identifier.
    #[must_use]
    pub fn id(self) -> u8 {
        self as u8
    }

    /// Resolves a persisted identifier.
    ///
    /// Identifiers 2 and 7 denote platform-width integers and resolve to
    /// [`Kind::I64`] and [`Kind::U64`].
    #[must_use]
    pub fn from_id(id: u8) -> Option<Self> {
        match id {
            1 => Some(Self::Bool),
            2 | 6 => Some(Self::I64),
            3 => Some(Self::I8),
            4 => Some(Self::I16),
            5 => Some(Self::I32),
            7 | 11 => Some(Self::U64),
            8 => Some(Self::U8),
            9 => Some(Self::U16),
            10 => Some(Self::U32),
            12 => Some(Self::F32),
            13 => Some(Self::F64),
            14 => Some(Self::String),
            15 => Some(Self::Duration),
            16 => Some(Self::Timestamp),
            17 => Some(Self::Bytes),
            _ => None,
        }
    }

    /// Returns `true` for the integer and float kinds.
    #[must_use]
    pub fn is_numeric(self) -> bool {
        !matches!(self, Self::Bool | Self::String | Self::Duration | Self::Timestamp | Self::Bytes)
    }

    /// Returns the lowercase name of the kind.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Bool => "bool",
            Self::I8 => "i8",
            Self::I16 => "i16",
            Self::I32 => "i32",
            Self::I64 => "i64",
            Self::U8 => "u8",
            Self::U16 => "u16",
            Self::U32 => "u32",
            Self::U64 => "u64",
            Self::F32 => "f32",
            Self::F64 => "f64",
            Self::String => "string",
            Self::Duration => "duration",
            Self::Timestamp => "timestamp",
            Self::Bytes => "bytes",
        }
    }
}

impl Display for Kind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A set of [`Kind`]s a cache accepts for writes.
///
/// # Example
///
/// ```
/// use strata_tier::{Kind, KindSet};
///
/// let kinds = KindSet::of([Kind::String, Kind::Bytes]);
/// assert!(kinds.contains(Kind::Bytes));
/// assert!(!kinds.contains(Kind::I64));
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct KindSet(u32);

impl KindSet {
    /// A set containing no kinds.
    #[must_use]
    pub const fn none() -> Self {
        Self(0)
    }

    /// A set containing exactly `kinds`.
    #[must_use]
    pub fn of(kinds: impl IntoIterator<Item = Kind>) -> Self {
        kinds.into_iter().collect()
    }

    /// A set containing every kind.
    #[must_use]
    pub fn all() -> Self {
        Kind::ALL.into_iter().collect()
    }

    /// Adds `kind` to the set.
    #[must_use]
    pub fn with(self, kind: Kind) -> Self {
        Self(self.0 | Self::bit(kind))
    }

    /// Removes `kind` from the set.
    #[must_use]
    pub fn without(self, kind: Kind) -> Self {
        Self(self.0 & !Self::bit(kind))
    }

    /// Returns `true` when `kind` is a member.
    #[must_use]
    pub fn contains(self, kind: Kind) -> bool {
        self.0 & Self::bit(kind) != 0
    }

    /// Returns the kinds present in both sets.
    #[must_use]
    pub fn intersection(self, other: Self) -> Self {
        Self(self.0 & other.0)
    }

    /// Returns `true` when the set has no members.
    #[must_use]
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Iterates over the members in identifier order.
    pub fn iter(self) -> impl Iterator<Item = Kind> {
        Kind::ALL.into_iter().filter(move |kind| self.contains(*kind))
    }

    fn bit(kind: Kind) -> u32 {
        1 << kind.id()
    }
}

impl Default for KindSet {
    fn default() -> Self {
        Self::all()
    }
}

impl FromIterator<Kind> for KindSet {
    fn from_iter<T: IntoIterator<Item = Kind>>(iter: T) -> Self {
        iter.into_iter().fold(Self::none(), Self::with)
    }
}

impl std::fmt::Debug for KindSet {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}
