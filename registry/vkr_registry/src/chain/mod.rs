//! Structure chains.
//!
//! A `pNext` member is a [`ChainPointer`](vkr_types::Modifier::ChainPointer):
//! it points at any structure that declares it extends the owner, told
//! apart at run time by the `sType` tag. The table maps each tag to its
//! structure once, so emitters can ask a chain slot for its tag and downcast
//! a tag to a concrete structure.

use rustc_hash::FxHashMap;
use vkr_types::well_known;
use vkr_types::{TypeId, TypeTable};

/// The `sType` value identifying a structure.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ChainTag {
    /// Enumerant name (`VK_STRUCTURE_TYPE_APPLICATION_INFO`).
    pub name: String,
    /// Integer value, when the enumerant is active.
    pub value: Option<i64>,
}

/// Tag ↔ structure mapping for active structures.
#[derive(Clone, Debug, Default)]
pub struct ChainTable {
    by_tag: FxHashMap<String, TypeId>,
    tags: FxHashMap<TypeId, ChainTag>,
    extenders: FxHashMap<TypeId, Vec<TypeId>>,
}

impl ChainTable {
    /// Build from the structures `is_active` accepts.
    ///
    /// Expects members and `extended_by` to be resolved already.
    #[tracing::instrument(level = "debug", skip_all)]
    pub fn build(types: &TypeTable, is_active: impl Fn(TypeId) -> bool) -> Self {
        let values = types
            .get_by_name(well_known::STRUCTURE_TYPE)
            .and_then(|def| def.enum_def())
            .map(vkr_types::EnumDef::integer_values)
            .unwrap_or_default();

        let mut table = ChainTable::default();
        for def in types.unique_types().filter(|def| is_active(def.id)) {
            let Some(layout) = def.struct_def() else {
                continue;
            };
            let tag = layout
                .member(well_known::STRUCTURE_TYPE_MEMBER)
                .and_then(|member| member.values.first());
            if let Some(tag) = tag {
                table.by_tag.entry(tag.clone()).or_insert(def.id);
                table.tags.insert(
                    def.id,
                    ChainTag {
                        name: tag.clone(),
                        value: values.get(tag.as_str()).copied(),
                    },
                );
            }
            if !layout.extended_by.is_empty() {
                table.extenders.insert(def.id, layout.extended_by.clone());
            }
        }

        tracing::debug!(tags = table.tags.len(), "chain table built");
        table
    }

    /// Structure identified by a tag name.
    #[inline]
    pub fn struct_for(&self, tag: &str) -> Option<TypeId> {
        self.by_tag.get(tag).copied()
    }

    /// Tag of a structure.
    #[inline]
    pub fn tag_of(&self, ty: TypeId) -> Option<&ChainTag> {
        self.tags.get(&ty)
    }

    /// Structures that may appear in `base`'s chain.
    pub fn extenders(&self, base: TypeId) -> &[TypeId] {
        self.extenders
            .get(&base)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// The chain slot of structure `owner`.
    pub fn slot(&self, owner: TypeId) -> ChainSlot<'_> {
        ChainSlot { table: self, owner }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.tags.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }
}

/// View of one structure's `pNext` slot.
#[derive(Copy, Clone, Debug)]
pub struct ChainSlot<'a> {
    table: &'a ChainTable,
    owner: TypeId,
}

impl<'a> ChainSlot<'a> {
    #[inline]
    pub fn owner(&self) -> TypeId {
        self.owner
    }

    /// Tag of the structure owning the slot.
    pub fn tag(&self) -> Option<&'a ChainTag> {
        self.table.tag_of(self.owner)
    }

    /// The structure a tag names, if it may be chained here.
    pub fn downcast(&self, tag: &str) -> Option<TypeId> {
        let ty = self.table.struct_for(tag)?;
        self.candidates().contains(&ty).then_some(ty)
    }

    /// Every structure that may be chained here.
    pub fn candidates(&self) -> &'a [TypeId] {
        self.table.extenders(self.owner)
    }
}
