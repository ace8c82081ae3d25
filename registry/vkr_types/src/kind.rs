//! The closed type model.
//!
//! Every registered type is a [`TypeDef`] whose [`TypeKind`] is one of the
//! eight registry categories. References between types are [`TypeId`]s, so
//! a struct whose member points back at itself is an ordinary entry.

use rustc_hash::FxHashMap;

use crate::{Member, TypeId};

/// A registered type definition.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct TypeDef {
    /// The type name.
    pub name: String,

    /// Table index for this type.
    pub id: TypeId,

    /// The kind of type.
    pub kind: TypeKind,
}

impl TypeDef {
    #[inline]
    pub fn is_alias(&self) -> bool {
        matches!(self.kind, TypeKind::Alias { .. })
    }

    /// Struct or union layout, if this is one.
    pub fn struct_def(&self) -> Option<&StructDef> {
        match &self.kind {
            TypeKind::Struct(def) | TypeKind::Union(def) => Some(def),
            _ => None,
        }
    }

    /// Handle metadata, if this is a handle.
    pub fn handle_def(&self) -> Option<&HandleDef> {
        match &self.kind {
            TypeKind::Handle(def) => Some(def),
            _ => None,
        }
    }

    /// Enumeration metadata, if this is an enumeration.
    pub fn enum_def(&self) -> Option<&EnumDef> {
        match &self.kind {
            TypeKind::Enum(def) => Some(def),
            _ => None,
        }
    }
}

/// The kind of a registry type.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum TypeKind {
    /// A scalar, platform, define or basetype typedef.
    Base {
        /// Typedef target (`uint32_t` for `VkBool32`).
        underlying: Option<TypeId>,
    },

    /// Another name for `target`. Chains are already collapsed.
    Alias { target: TypeId },

    Struct(StructDef),

    Union(StructDef),

    Handle(HandleDef),

    FunctionPointer,

    Bitmask {
        /// The flag-bits enumeration (`None` for reserved flag types).
        backing_enum: Option<TypeId>,
        /// `VkFlags` or `VkFlags64`.
        flags_type: Option<TypeId>,
    },

    Enum(EnumDef),
}

/// Members of a struct or union, in declaration order.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct StructDef {
    pub members: Vec<Member>,

    /// Only ever written by the implementation.
    pub returned_only: bool,

    /// Structs whose `pNext` chain may carry this one.
    pub extends: Vec<TypeId>,

    /// Structs that may appear in this one's `pNext` chain.
    pub extended_by: Vec<TypeId>,
}

impl StructDef {
    /// Look up a member by name.
    pub fn member(&self, name: &str) -> Option<&Member> {
        self.members.iter().find(|m| m.name == name)
    }
}

/// Handle metadata.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct HandleDef {
    /// Pointer-sized (`VK_DEFINE_HANDLE`) rather than an opaque 64-bit value.
    pub dispatchable: bool,

    /// Owning handle; the first one when several are listed.
    pub parent: Option<TypeId>,

    /// `VkObjectType` value naming this handle.
    pub object_type: Option<String>,
}

/// Enumeration metadata plus the merged value set.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct EnumDef {
    /// Merged values, canonical entries and aliases, in declaration order.
    pub values: Vec<EnumValue>,

    pub is_bitmask: bool,

    /// Underlying width in bits (32 unless declared otherwise).
    pub bitwidth: u32,
}

impl EnumDef {
    /// Look up a value by name.
    pub fn value(&self, name: &str) -> Option<&EnumValue> {
        self.values.iter().find(|v| v.name == name)
    }

    /// Canonical (non-alias) values.
    pub fn canonical(&self) -> impl Iterator<Item = &EnumValue> {
        self.values.iter().filter(|v| v.alias_of.is_none())
    }

    /// Name to integer value for every name, aliases included.
    pub fn integer_values(&self) -> FxHashMap<&str, i64> {
        self.values
            .iter()
            .map(|v| (v.name.as_str(), v.value))
            .collect()
    }
}

/// One enumeration value.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct EnumValue {
    pub name: String,
    pub value: i64,

    /// Canonical name this value is a synonym of.
    pub alias_of: Option<String>,

    pub comment: Option<String>,
}
