//! Resolved members and parameters.
//!
//! A [`Member`] is a struct member or a command parameter after modifier
//! resolution: its base [`TypeId`] plus the [`Modifier`]s wrapped around it,
//! listed outermost first. `const char* const* ppNames` becomes
//! `[DynamicArray { is_const: true }]` over `string` once its
//! `null-terminated` inner level has collapsed.

use smallvec::SmallVec;

use crate::TypeId;

/// Modifier stack; two levels cover nearly every declarator in practice.
pub type Modifiers = SmallVec<[Modifier; 2]>;

/// A resolved struct member or command parameter.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Member {
    pub name: String,

    /// Base type with aliases collapsed.
    pub ty: TypeId,

    /// Outermost first.
    pub modifiers: Modifiers,

    pub optional: bool,

    /// Written through by the callee: outermost level is a pointer to non-const data.
    pub is_output: bool,

    /// Bitfield width (`uint32_t instanceCustomIndex:24`).
    pub bit_size: Option<u32>,

    /// Allowed values (`sType` members list their structure tag here).
    pub values: Vec<String>,
}

impl Member {
    /// The outermost modifier, if any.
    #[inline]
    pub fn outermost(&self) -> Option<&Modifier> {
        self.modifiers.first()
    }

    /// A bare value of the base type.
    #[inline]
    pub fn is_value(&self) -> bool {
        self.modifiers.is_empty()
    }

    /// Whether this is a polymorphic extension-chain slot.
    pub fn is_chain_pointer(&self) -> bool {
        matches!(self.outermost(), Some(Modifier::ChainPointer { .. }))
    }

    /// Whether the outermost level is any kind of pointer.
    pub fn is_pointer(&self) -> bool {
        self.outermost().is_some_and(Modifier::is_pointer)
    }

    /// Length expression of the outermost dynamic array, if any.
    pub fn length(&self) -> Option<&LengthExpr> {
        match self.outermost() {
            Some(Modifier::DynamicArray { len, .. }) => Some(len),
            _ => None,
        }
    }
}

/// One level of indirection or arrayness.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum Modifier {
    /// `T*`; `is_const` applies to the pointee.
    Pointer { is_const: bool },

    /// `T[N]` with a literal or constant length.
    FixedArray { len: ArrayLen, is_const: bool },

    /// `T*` whose element count is given by `len`.
    DynamicArray { len: LengthExpr, is_const: bool },

    /// `void* pNext`: points at any struct that extends the owner.
    ChainPointer { is_const: bool },
}

impl Modifier {
    /// Pointer-like levels, dynamic arrays and chain slots included.
    pub fn is_pointer(&self) -> bool {
        !matches!(self, Modifier::FixedArray { .. })
    }

    pub fn is_const(&self) -> bool {
        match self {
            Modifier::Pointer { is_const }
            | Modifier::FixedArray { is_const, .. }
            | Modifier::DynamicArray { is_const, .. }
            | Modifier::ChainPointer { is_const } => *is_const,
        }
    }
}

/// Length of a fixed-size array.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ArrayLen {
    pub value: u64,

    /// API constant the length was written as (`VK_UUID_SIZE`).
    pub constant: Option<String>,
}

/// A piece of a dynamic array length expression.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum LengthToken {
    /// Operators, literals and whitespace, kept verbatim.
    Text(String),

    /// A sibling field path (`count`, `pInfo->count` or `pInfos[].count`).
    Field {
        path: String,
        /// The named field is itself a pointer and must be dereferenced.
        deref: bool,
    },

    /// An API constant.
    Constant(String),
}

/// A resolved dynamic array length.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct LengthExpr {
    /// The expression as written.
    pub source: String,
    pub tokens: Vec<LengthToken>,
}

impl LengthExpr {
    /// The sibling name when the length is exactly one sibling field.
    pub fn as_sibling(&self) -> Option<&str> {
        match self.tokens.as_slice() {
            [LengthToken::Field { path, .. }] if !path.contains(['-', '[']) => Some(path),
            _ => None,
        }
    }

    /// Every field path the expression reads.
    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.tokens.iter().filter_map(|t| match t {
            LengthToken::Field { path, .. } => Some(path.as_str()),
            _ => None,
        })
    }

    /// Render as a C expression, reading fields through `object`.
    ///
    /// `object` is the expression holding the siblings (`info`, `args`);
    /// `None` renders the fields as bare locals, as in a parameter list.
    pub fn render(&self, object: Option<&str>) -> String {
        let mut out = String::with_capacity(self.source.len());
        for token in &self.tokens {
            match token {
                LengthToken::Text(text) | LengthToken::Constant(text) => out.push_str(text),
                LengthToken::Field { path, deref } => {
                    if *deref {
                        out.push('*');
                    }
                    if let Some(object) = object {
                        out.push_str(object);
                        out.push('.');
                    }
                    out.push_str(path);
                }
            }
        }
        out
    }
}

#[cfg(test)]
mod tests;
