//! The type table.
//!
//! Name → canonical [`TypeDef`]. Types are registered from their raw
//! declarations in document order, then [`TypeTable::link`] turns every raw
//! declaration into a [`TypeKind`], resolving the names each one mentions.
//!
//! # Design
//!
//! - Dense `Vec<TypeDef>` indexed by [`TypeId`]; `FxHashMap` for name lookup
//! - Alias chains are collapsed at link time, so `Alias { target }` always
//!   names a non-alias type and [`TypeTable::resolve`] is a single hop
//! - Only alias-to-alias loops are cycles; a struct reaching itself through a
//!   pointer member is a plain `TypeId` reference
//! - The raw declaration stays attached to its entry for the modifier phase

use rustc_hash::FxHashMap;
use vkr_diagnostic::{RegistryError, Result};
use vkr_xml::{EnumsKind, RawEnums, RawType};

use crate::well_known;
use crate::{EnumDef, HandleDef, StructDef, TypeDef, TypeId, TypeKind};

/// Registry of every declared type.
#[derive(Clone, Debug)]
pub struct TypeTable {
    defs: Vec<TypeDef>,
    /// Raw declaration per entry; `None` for built-ins.
    sources: Vec<Option<RawType>>,
    by_name: FxHashMap<String, TypeId>,
}

impl Default for TypeTable {
    fn default() -> Self {
        Self::new()
    }
}

impl TypeTable {
    /// Create a table holding only the built-in `string` type.
    pub fn new() -> Self {
        let mut table = TypeTable {
            defs: Vec::new(),
            sources: Vec::new(),
            by_name: FxHashMap::default(),
        };
        table.insert(well_known::STRING, None);
        table
    }

    #[allow(clippy::cast_possible_truncation)]
    fn insert(&mut self, name: &str, source: Option<RawType>) -> TypeId {
        let id = TypeId::from_raw(self.defs.len() as u32);
        self.defs.push(TypeDef {
            name: name.to_owned(),
            id,
            kind: TypeKind::Base { underlying: None },
        });
        self.sources.push(source);
        self.by_name.insert(name.to_owned(), id);
        id
    }

    /// Register a raw type declaration. A repeated name keeps the first one.
    pub fn register(&mut self, raw: RawType) -> TypeId {
        if let Some(&id) = self.by_name.get(&raw.name) {
            tracing::debug!(name = %raw.name, "type declared twice, keeping first");
            return id;
        }
        let name = raw.name.clone();
        self.insert(&name, Some(raw))
    }

    /// Resolve every registered declaration into its kind.
    ///
    /// `enums` supplies bitmask/bitwidth metadata for enumeration types; an
    /// `<enums>` block with no matching type declaration registers one.
    #[tracing::instrument(level = "debug", skip_all, fields(types = self.defs.len()))]
    pub fn link(&mut self, enums: &[RawEnums]) -> Result<()> {
        let blocks: FxHashMap<&str, &RawEnums> = enums
            .iter()
            .filter(|block| block.kind != EnumsKind::Constants)
            .map(|block| (block.name.as_str(), block))
            .collect();

        for block in enums {
            if block.kind != EnumsKind::Constants && !self.by_name.contains_key(&block.name) {
                let raw = RawType {
                    name: block.name.clone(),
                    category: Some("enum".to_owned()),
                    ..RawType::default()
                };
                self.insert(&block.name, Some(raw));
            }
        }

        // Aliases first, so every later lookup is a single hop.
        for index in 0..self.defs.len() {
            let id = self.defs[index].id;
            if self.source(id).and_then(|raw| raw.alias.as_ref()).is_some() {
                let target = self.collapse_alias(id)?;
                self.defs[index].kind = TypeKind::Alias { target };
            }
        }

        for index in 0..self.defs.len() {
            let id = self.defs[index].id;
            let Some(raw) = self.source(id) else {
                continue;
            };
            if raw.alias.is_some() {
                continue;
            }
            let kind = self.kind_of(raw, &blocks)?;
            self.defs[index].kind = kind;
        }

        self.link_extenders();
        tracing::debug!(types = self.defs.len(), "type table linked");
        Ok(())
    }

    /// Follow raw alias names to the first non-alias declaration.
    fn collapse_alias(&self, id: TypeId) -> Result<TypeId> {
        let mut path = vec![self.defs[id.index()].name.clone()];
        let mut current = id;
        while let Some(target) = self.source(current).and_then(|raw| raw.alias.as_deref()) {
            if path.iter().any(|seen| seen == target) {
                path.push(target.to_owned());
                return Err(RegistryError::CyclicAlias { path });
            }
            current = self.lookup(target).ok_or_else(|| RegistryError::UnknownType {
                name: target.to_owned(),
                referrer: path.last().cloned().unwrap_or_default(),
            })?;
            path.push(target.to_owned());
        }
        Ok(current)
    }

    fn kind_of(&self, raw: &RawType, enums: &FxHashMap<&str, &RawEnums>) -> Result<TypeKind> {
        let resolve = |name: &str| self.resolve_from(name, &raw.name);
        let resolve_opt = |name: Option<&String>| name.map(|n| resolve(n)).transpose();

        let kind = match raw.category.as_deref() {
            Some("struct" | "union") => {
                let def = StructDef {
                    members: Vec::new(),
                    returned_only: raw.returned_only,
                    extends: raw
                        .struct_extends
                        .iter()
                        .map(|name| resolve(name))
                        .collect::<Result<_>>()?,
                    extended_by: Vec::new(),
                };
                if raw.category.as_deref() == Some("union") {
                    TypeKind::Union(def)
                } else {
                    TypeKind::Struct(def)
                }
            }
            Some("handle") => {
                let parent = raw
                    .parent
                    .as_deref()
                    .and_then(|list| list.split(',').map(str::trim).find(|p| !p.is_empty()))
                    .map(resolve)
                    .transpose()?;
                TypeKind::Handle(HandleDef {
                    dispatchable: raw.inner_type.as_deref() == Some(well_known::DEFINE_HANDLE),
                    parent,
                    object_type: raw.object_type.clone(),
                })
            }
            Some("funcpointer") => TypeKind::FunctionPointer,
            Some("bitmask") => TypeKind::Bitmask {
                backing_enum: resolve_opt(raw.requires.as_ref().or(raw.bitvalues.as_ref()))?,
                flags_type: resolve_opt(raw.inner_type.as_ref())?,
            },
            Some("enum") => {
                let block = enums.get(raw.name.as_str());
                TypeKind::Enum(EnumDef {
                    values: Vec::new(),
                    is_bitmask: block.map_or_else(
                        || raw.name.contains("FlagBits"),
                        |b| b.kind == EnumsKind::Bitmask,
                    ),
                    bitwidth: block.and_then(|b| b.bitwidth).unwrap_or(32),
                })
            }
            Some("basetype") => TypeKind::Base {
                underlying: resolve_opt(raw.inner_type.as_ref())?,
            },
            // define, include and plain C/platform types.
            _ => TypeKind::Base { underlying: None },
        };
        Ok(kind)
    }

    /// Fill `extended_by` as the inverse of `extends`.
    fn link_extenders(&mut self) {
        let mut edges: Vec<(TypeId, TypeId)> = Vec::new();
        for def in &self.defs {
            if let Some(s) = def.struct_def() {
                edges.extend(s.extends.iter().map(|&base| (base, def.id)));
            }
        }
        for (base, extender) in edges {
            if let TypeKind::Struct(s) | TypeKind::Union(s) = &mut self.defs[base.index()].kind {
                if !s.extended_by.contains(&extender) {
                    s.extended_by.push(extender);
                }
            }
        }
    }

    // === Lookup Methods ===

    /// Look up a name without collapsing aliases.
    #[inline]
    pub fn lookup(&self, name: &str) -> Option<TypeId> {
        self.by_name.get(name).copied()
    }

    /// Resolve a name to its canonical (non-alias) type.
    pub fn resolve(&self, name: &str) -> Result<TypeId> {
        self.resolve_from(name, "registry query")
    }

    /// Resolve a name mentioned by `referrer`, for diagnostics.
    pub fn resolve_from(&self, name: &str, referrer: &str) -> Result<TypeId> {
        let id = self.lookup(name).ok_or_else(|| RegistryError::UnknownType {
            name: name.to_owned(),
            referrer: referrer.to_owned(),
        })?;
        Ok(self.canonical(id))
    }

    /// Collapse an alias to its target.
    #[inline]
    pub fn canonical(&self, id: TypeId) -> TypeId {
        match self.defs[id.index()].kind {
            TypeKind::Alias { target } => target,
            _ => id,
        }
    }

    #[inline]
    pub fn get(&self, id: TypeId) -> &TypeDef {
        &self.defs[id.index()]
    }

    #[inline]
    pub fn get_by_name(&self, name: &str) -> Option<&TypeDef> {
        self.lookup(name).map(|id| self.get(id))
    }

    #[inline]
    pub fn name(&self, id: TypeId) -> &str {
        &self.defs[id.index()].name
    }

    /// The raw declaration behind an entry.
    #[inline]
    pub fn source(&self, id: TypeId) -> Option<&RawType> {
        self.sources[id.index()].as_ref()
    }

    /// Mutable access for the resolver phases that fill in members and values.
    #[inline]
    pub fn get_mut(&mut self, id: TypeId) -> &mut TypeDef {
        &mut self.defs[id.index()]
    }

    /// Alias names whose target is `id`, in declaration order.
    pub fn aliases_of(&self, id: TypeId) -> impl Iterator<Item = &TypeDef> {
        self.defs
            .iter()
            .filter(move |def| matches!(def.kind, TypeKind::Alias { target } if target == id))
    }

    // === Iteration ===

    /// Every type in declaration order.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &TypeDef> {
        self.defs.iter()
    }

    /// Every non-alias type in declaration order.
    pub fn unique_types(&self) -> impl DoubleEndedIterator<Item = &TypeDef> {
        self.defs.iter().filter(|def| !def.is_alias())
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.defs.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.defs.is_empty()
    }
}
