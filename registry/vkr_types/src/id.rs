//! Type index handle.
//!
//! `TypeId` is a 32-bit index into the [`TypeTable`](crate::TypeTable).
//! Every reference between types (member types, handle parents, bitmask
//! enums, alias targets) goes through a `TypeId`, so self-referential and
//! forward-declared structures never form ownership cycles.

use std::fmt;

/// A 32-bit index into the type table.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[repr(transparent)]
pub struct TypeId(u32);

impl TypeId {
    /// Create an id from a raw u32 value.
    #[inline]
    pub const fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    /// Get the raw u32 value.
    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }

    /// Position in the table's storage.
    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Debug for TypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeId({})", self.0)
    }
}
