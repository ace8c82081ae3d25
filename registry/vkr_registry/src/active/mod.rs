//! Extension/version resolution.
//!
//! Applies the require/remove directives of the core versions and the
//! selected extensions, in that order, producing the [`ActiveSet`]: which
//! types, commands and enumeration values exist, and which versions or
//! extensions brought each one in.
//!
//! # Design
//!
//! - Directives run in ascending declaration order; a later `remove` undoes
//!   an earlier `require` and a later `require` undoes an earlier `remove`
//! - Origins are kept sorted (features before extensions, then by index), so
//!   "the first extension" of an entity is well defined
//! - Naming an entity the document never declares is fatal
//! - [`close`] then pulls in every type an active entity mentions

mod closure;
pub(crate) mod depends;
pub(crate) mod filter;
pub(crate) mod select;

use rustc_hash::{FxHashMap, FxHashSet};
use vkr_diagnostic::{EntityKind, RegistryError, Result};
use vkr_types::enum_merge::{extension_value, ValueSpec};
use vkr_types::{ConstantTable, TypeId, TypeTable};
use vkr_xml::{BlockKind, RawBlock, RawCommand, RawDocument, RawEnumRef, RawItem};

use crate::feature::Origin;
pub(crate) use closure::close;

/// An enumeration value added by an `<enum extends=...>` directive.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ValueDef {
    /// Canonical enumeration type.
    pub enumeration: TypeId,
    pub name: String,
    pub spec: ValueSpec,
    pub comment: Option<String>,
    pub origin: Origin,
}

/// Entities made active by the applied versions and extensions.
#[derive(Clone, Debug, Default)]
pub struct ActiveSet {
    /// Origins per type, indexed by [`TypeId`]; empty when inactive.
    types: Vec<Vec<Origin>>,
    removed_types: Vec<bool>,
    /// Origins per raw command, in document order.
    commands: Vec<Vec<Origin>>,
    removed_commands: Vec<bool>,
    values: Vec<ValueDef>,
    removed_values: FxHashSet<String>,
}

fn add_origins(list: &mut Vec<Origin>, origins: &[Origin]) -> bool {
    let mut changed = false;
    for &origin in origins {
        if let Err(at) = list.binary_search(&origin) {
            list.insert(at, origin);
            changed = true;
        }
    }
    changed
}

impl ActiveSet {
    pub fn new(type_count: usize, command_count: usize) -> Self {
        ActiveSet {
            types: vec![Vec::new(); type_count],
            removed_types: vec![false; type_count],
            commands: vec![Vec::new(); command_count],
            removed_commands: vec![false; command_count],
            values: Vec::new(),
            removed_values: FxHashSet::default(),
        }
    }

    #[inline]
    pub fn is_type_active(&self, id: TypeId) -> bool {
        !self.types[id.index()].is_empty()
    }

    /// Whether a directive removed this type and nothing required it again.
    #[inline]
    pub fn is_type_removed(&self, id: TypeId) -> bool {
        self.removed_types[id.index()]
    }

    #[inline]
    pub fn type_origins(&self, id: TypeId) -> &[Origin] {
        &self.types[id.index()]
    }

    #[inline]
    pub fn is_command_active(&self, index: usize) -> bool {
        !self.commands[index].is_empty()
    }

    /// Whether a directive removed this command and nothing required it again.
    #[inline]
    pub fn is_command_removed(&self, index: usize) -> bool {
        self.removed_commands[index]
    }

    #[inline]
    pub fn command_origins(&self, index: usize) -> &[Origin] {
        &self.commands[index]
    }

    /// Values added by directives, in application order.
    pub fn values(&self) -> &[ValueDef] {
        &self.values
    }

    #[inline]
    pub fn is_value_removed(&self, name: &str) -> bool {
        self.removed_values.contains(name)
    }

    /// Number of active types.
    pub fn type_count(&self) -> usize {
        self.types.iter().filter(|o| !o.is_empty()).count()
    }

    /// Number of active commands.
    pub fn command_count(&self) -> usize {
        self.commands.iter().filter(|o| !o.is_empty()).count()
    }

    pub(crate) fn merge_type_origins(&mut self, id: TypeId, origins: &[Origin]) -> bool {
        self.removed_types[id.index()] = false;
        add_origins(&mut self.types[id.index()], origins)
    }

    pub(crate) fn merge_command_origins(&mut self, index: usize, origins: &[Origin]) -> bool {
        self.removed_commands[index] = false;
        add_origins(&mut self.commands[index], origins)
    }

    fn remove_type(&mut self, id: TypeId) {
        self.types[id.index()].clear();
        self.removed_types[id.index()] = true;
    }

    fn remove_command(&mut self, index: usize) {
        self.commands[index].clear();
        self.removed_commands[index] = true;
    }

    fn define_value(&mut self, def: ValueDef) {
        self.removed_values.remove(&def.name);
        self.values.push(def);
    }

    fn restore_value(&mut self, name: &str) {
        self.removed_values.remove(name);
    }

    fn remove_value(&mut self, name: &str) {
        self.values.retain(|def| def.name != name);
        self.removed_values.insert(name.to_owned());
    }
}

/// Name lookups over the raw document used while applying directives.
#[derive(Debug)]
pub struct EntityIndex<'a> {
    commands: &'a [RawCommand],
    command_ids: FxHashMap<&'a str, usize>,
    /// Every enumeration value or constant the document defines anywhere.
    enum_names: FxHashSet<&'a str>,
}

impl<'a> EntityIndex<'a> {
    pub fn new(doc: &'a RawDocument) -> Self {
        let mut command_ids = FxHashMap::default();
        for (at, cmd) in doc.commands.iter().enumerate() {
            command_ids.entry(cmd.name.as_str()).or_insert(at);
        }

        let mut enum_names: FxHashSet<&str> = doc
            .enums
            .iter()
            .flat_map(|block| block.values.iter().map(|v| v.name.as_str()))
            .collect();
        let blocks = doc
            .features
            .iter()
            .flat_map(|f| &f.blocks)
            .chain(doc.extensions.iter().flat_map(|e| &e.blocks));
        for block in blocks {
            for item in &block.items {
                if let RawItem::Enum(r) = item {
                    if !r.is_reference() {
                        enum_names.insert(r.name.as_str());
                    }
                }
            }
        }

        EntityIndex {
            commands: &doc.commands,
            command_ids,
            enum_names,
        }
    }

    #[inline]
    pub fn command(&self, name: &str) -> Option<usize> {
        self.command_ids.get(name).copied()
    }

    #[inline]
    pub fn raw_command(&self, index: usize) -> &'a RawCommand {
        &self.commands[index]
    }

    #[inline]
    pub fn command_len(&self) -> usize {
        self.commands.len()
    }

    fn knows_enum(&self, name: &str, constants: &ConstantTable) -> bool {
        self.enum_names.contains(name) || constants.contains(name)
    }
}

/// One version or extension's applicable blocks.
#[derive(Clone, Debug)]
pub struct DirectiveSource<'a> {
    pub name: &'a str,
    pub origin: Origin,
    /// Extension number, for offset-valued enumerants.
    pub number: Option<u32>,
    pub blocks: Vec<&'a RawBlock>,
}

fn unresolved(source: &DirectiveSource<'_>, kind: EntityKind, name: &str) -> RegistryError {
    RegistryError::UnresolvedRequire {
        source_name: source.name.to_owned(),
        kind,
        name: name.to_owned(),
    }
}

/// Apply every directive of `sources`, in order.
///
/// Constants that extensions define (`*_SPEC_VERSION`, `*_EXTENSION_NAME`)
/// are added to `constants` as their extension is applied.
#[tracing::instrument(level = "debug", skip_all, fields(sources = sources.len()))]
pub fn apply(
    sources: &[DirectiveSource<'_>],
    types: &TypeTable,
    index: &EntityIndex<'_>,
    constants: &mut ConstantTable,
) -> Result<ActiveSet> {
    let mut set = ActiveSet::new(types.len(), index.command_len());

    for source in sources {
        for block in &source.blocks {
            for item in &block.items {
                match block.kind {
                    BlockKind::Require => {
                        require(&mut set, source, item, types, index, constants)?;
                    }
                    BlockKind::Remove => remove(&mut set, source, item, types, index, constants)?,
                }
            }
        }
    }

    tracing::debug!(
        types = set.type_count(),
        commands = set.command_count(),
        values = set.values.len(),
        "directives applied"
    );
    Ok(set)
}

fn require(
    set: &mut ActiveSet,
    source: &DirectiveSource<'_>,
    item: &RawItem,
    types: &TypeTable,
    index: &EntityIndex<'_>,
    constants: &mut ConstantTable,
) -> Result<()> {
    match item {
        RawItem::Type(name) => {
            let id = types
                .lookup(name)
                .ok_or_else(|| unresolved(source, EntityKind::Type, name))?;
            set.merge_type_origins(id, &[source.origin]);
        }
        RawItem::Command(name) => {
            let at = index
                .command(name)
                .ok_or_else(|| unresolved(source, EntityKind::Command, name))?;
            set.merge_command_origins(at, &[source.origin]);
        }
        RawItem::Enum(r) => require_enum(set, source, r, types, index, constants)?,
    }
    Ok(())
}

fn require_enum(
    set: &mut ActiveSet,
    source: &DirectiveSource<'_>,
    r: &RawEnumRef,
    types: &TypeTable,
    index: &EntityIndex<'_>,
    constants: &mut ConstantTable,
) -> Result<()> {
    if let Some(extends) = &r.extends {
        let enumeration = types.resolve_from(extends, source.name)?;
        match extension_value(r, source.number)? {
            Some(spec) => set.define_value(ValueDef {
                enumeration,
                name: r.name.clone(),
                spec,
                comment: r.comment.clone(),
                origin: source.origin,
            }),
            None if index.knows_enum(&r.name, constants) => set.restore_value(&r.name),
            None => return Err(unresolved(source, EntityKind::Enum, &r.name)),
        }
        return Ok(());
    }

    if r.is_reference() {
        if !index.knows_enum(&r.name, constants) {
            return Err(unresolved(source, EntityKind::Enum, &r.name));
        }
        set.restore_value(&r.name);
    } else if let Some(alias) = &r.alias {
        constants.define_alias(&r.name, alias)?;
    } else if let Some(value) = &r.value {
        constants.define(&r.name, value, None);
    } else {
        return Err(RegistryError::parse(
            0,
            format!(
                "`{}` in `{}` has a position but no enumeration to extend",
                r.name, source.name
            ),
        ));
    }
    Ok(())
}

fn remove(
    set: &mut ActiveSet,
    source: &DirectiveSource<'_>,
    item: &RawItem,
    types: &TypeTable,
    index: &EntityIndex<'_>,
    constants: &ConstantTable,
) -> Result<()> {
    match item {
        RawItem::Type(name) => {
            let id = types
                .lookup(name)
                .ok_or_else(|| unresolved(source, EntityKind::Type, name))?;
            set.remove_type(id);
        }
        RawItem::Command(name) => {
            let at = index
                .command(name)
                .ok_or_else(|| unresolved(source, EntityKind::Command, name))?;
            set.remove_command(at);
        }
        RawItem::Enum(r) => {
            if !index.knows_enum(&r.name, constants) {
                return Err(unresolved(source, EntityKind::Enum, &r.name));
            }
            set.remove_value(&r.name);
        }
    }
    Ok(())
}
