//! Registry build pipeline.
//!
//! Runs the phases in order over one document:
//!
//! 1. parse and API filtering
//! 2. type table registration and linking, API constants
//! 3. extension selection and directive application, dependency closure
//! 4. member modifiers, commands, enumeration merging
//! 5. platform partitioning, chain and handle tables
//!
//! Any error aborts the build; there is no partial registry.

use rustc_hash::{FxHashMap, FxHashSet};
use smallvec::SmallVec;
use vkr_diagnostic::{RegistryError, Result};
use vkr_types::modifier::{annotate_all, FieldKind, ModifierContext};
use vkr_types::well_known;
use vkr_types::{ConstantTable, Member, TypeId, TypeKind, TypeTable};
use vkr_xml::{
    BlockKind, EnumsKind, RawBlock, RawDocument, RawEnumValue, RawExtension, RawFeature, RawItem,
};

use crate::active::depends::applicable;
use crate::active::filter::filter_api;
use crate::active::select::select_extensions;
use crate::active::{apply, close, ActiveSet, DirectiveSource, EntityIndex};
use crate::chain::ChainTable;
use crate::command::{self, CommandTable};
use crate::enums::merge_enums;
use crate::feature::{ApiVersion, EntityRef, Extension, ExtensionKind, Feature, Origin};
use crate::handle_info::HandleInfoTable;
use crate::platform::{bucket, PlatformTable, ValueRef};
use crate::{Registry, RegistryOptions};

/// Read the configured document and build a registry from it.
pub fn build_from_path(options: &RegistryOptions) -> Result<Registry> {
    let path = options.registry_path();
    let source = std::fs::read_to_string(&path).map_err(|err| RegistryError::Io {
        path: path.display().to_string(),
        message: err.to_string(),
    })?;
    build_from_str(&source, options)
}

/// Build a registry from document text.
#[tracing::instrument(level = "debug", skip_all, fields(api = %options.api))]
pub fn build_from_str(source: &str, options: &RegistryOptions) -> Result<Registry> {
    let mut doc = vkr_xml::parse(source)?;
    filter_api(&mut doc, options);

    let mut types = TypeTable::new();
    for raw in std::mem::take(&mut doc.types) {
        types.register(raw);
    }
    types.link(&doc.enums)?;
    let mut constants = api_constants(&doc)?;

    let selected = select_extensions(&doc, options)?;
    let names: FxHashSet<&str> = doc
        .features
        .iter()
        .map(|f| f.name.as_str())
        .chain(selected.iter().map(|e| e.name.as_str()))
        .collect();

    let mut sources = Vec::with_capacity(doc.features.len() + selected.len());
    let mut features = Vec::with_capacity(doc.features.len());
    for (at, raw) in doc.features.iter().enumerate() {
        let blocks = applicable(&raw.blocks, &names)?;
        features.push(feature_model(raw, &blocks)?);
        sources.push(DirectiveSource {
            name: &raw.name,
            origin: Origin::Feature(at),
            number: None,
            blocks,
        });
    }
    let mut extensions = Vec::with_capacity(selected.len());
    for (at, raw) in selected.iter().enumerate() {
        let blocks = applicable(&raw.blocks, &names)?;
        extensions.push(extension_model(raw, &blocks));
        sources.push(DirectiveSource {
            name: &raw.name,
            origin: Origin::Extension(at),
            number: Some(raw.number),
            blocks,
        });
    }

    let index = EntityIndex::new(&doc);
    let mut set = apply(&sources, &types, &index, &mut constants)?;
    close(&mut set, &types, &index)?;

    let mut active: Vec<bool> = types.iter().map(|def| set.is_type_active(def.id)).collect();
    if let Some(string) = types.lookup(well_known::STRING) {
        active[string.index()] = true;
    }

    annotate_structs(&mut types, &constants, &active)?;
    let commands = build_commands(&types, &constants, &index, &set, &features)?;
    merge_enums(&mut types, &doc, &set, &active)?;

    let platforms = partition(&doc, &types, &active, &set, &index, &commands, &extensions, options);
    let is_active = |id: TypeId| active[id.index()];
    let chain = ChainTable::build(&types, is_active);
    let handle_infos = HandleInfoTable::build(&types, &commands, is_active);
    let api_version = api_version(&types, &features);

    tracing::debug!(
        types = set.type_count(),
        commands = commands.len(),
        features = features.len(),
        extensions = extensions.len(),
        version = %api_version,
        "registry built"
    );

    Ok(Registry {
        types,
        active,
        constants,
        commands,
        features,
        extensions,
        platforms,
        chain,
        handle_infos,
        api_version,
    })
}

/// Constants from the `API Constants` block. Values first, then aliases.
fn api_constants(doc: &RawDocument) -> Result<ConstantTable> {
    let mut constants = ConstantTable::new();
    let values: Vec<&RawEnumValue> = doc
        .enums
        .iter()
        .filter(|b| b.kind == EnumsKind::Constants)
        .flat_map(|b| &b.values)
        .collect();
    for value in &values {
        if let Some(literal) = &value.value {
            constants.define(&value.name, literal, value.ctype.as_deref());
        }
    }
    for value in &values {
        if let Some(target) = &value.alias {
            constants.define_alias(&value.name, target)?;
        }
    }
    tracing::debug!(constants = constants.len(), "API constants defined");
    Ok(constants)
}

/// Required and removed entities of the applicable blocks.
fn directives(blocks: &[&RawBlock]) -> (Vec<EntityRef>, Vec<EntityRef>) {
    let mut requires = Vec::new();
    let mut removes = Vec::new();
    for block in blocks {
        let out = match block.kind {
            BlockKind::Require => &mut requires,
            BlockKind::Remove => &mut removes,
        };
        out.extend(block.items.iter().map(|item| match item {
            RawItem::Type(name) => EntityRef::Type(name.clone()),
            RawItem::Command(name) => EntityRef::Command(name.clone()),
            RawItem::Enum(r) => EntityRef::Enum(r.name.clone()),
        }));
    }
    (requires, removes)
}

fn feature_model(raw: &RawFeature, blocks: &[&RawBlock]) -> Result<Feature> {
    let version = ApiVersion::parse_feature_number(&raw.number).ok_or_else(|| {
        RegistryError::parse(
            0,
            format!("feature `{}` has malformed number `{}`", raw.name, raw.number),
        )
    })?;
    let (requires, removes) = directives(blocks);
    Ok(Feature {
        name: raw.name.clone(),
        version,
        requires,
        removes,
    })
}

/// Last valued enumerant required under `suffix`.
fn named_constant(blocks: &[&RawBlock], suffix: &str) -> Option<String> {
    blocks
        .iter()
        .filter(|b| b.kind == BlockKind::Require)
        .flat_map(|b| &b.items)
        .filter_map(|item| match item {
            RawItem::Enum(r) if r.value.is_some() && r.name.ends_with(suffix) => Some(&r.name),
            _ => None,
        })
        .last()
        .cloned()
}

fn extension_model(raw: &RawExtension, blocks: &[&RawBlock]) -> Extension {
    let (requires, removes) = directives(blocks);
    Extension {
        name: raw.name.clone(),
        number: raw.number,
        kind: raw.kind.as_deref().and_then(ExtensionKind::parse),
        author: raw.author.clone(),
        platform: raw.platform.clone(),
        promoted_to: raw.promoted_to.clone(),
        deprecated_by: raw.deprecated_by.clone(),
        dependencies: raw.requires.clone(),
        special_use: raw.special_use.clone(),
        provisional: raw.provisional,
        name_enum: named_constant(blocks, "_EXTENSION_NAME"),
        spec_version_enum: named_constant(blocks, "_SPEC_VERSION"),
        requires,
        removes,
    }
}

/// Resolve the members of every active structure and union.
#[tracing::instrument(level = "debug", skip_all)]
fn annotate_structs(types: &mut TypeTable, constants: &ConstantTable, active: &[bool]) -> Result<()> {
    let view: &TypeTable = types;
    let mut resolved: Vec<(TypeId, Vec<Member>)> = Vec::new();
    for def in view.unique_types() {
        if !active[def.id.index()] || def.struct_def().is_none() {
            continue;
        }
        let Some(raw) = view.source(def.id) else {
            continue;
        };
        let ctx = ModifierContext {
            owner: &def.name,
            kind: FieldKind::Member,
            siblings: &raw.members,
            types: view,
            constants,
        };
        resolved.push((def.id, annotate_all(&raw.members, &ctx)?));
    }

    let count = resolved.len();
    for (id, members) in resolved {
        if let TypeKind::Struct(s) | TypeKind::Union(s) = &mut types.get_mut(id).kind {
            s.members = members;
            s.extends.retain(|ext| active[ext.index()]);
            s.extended_by.retain(|ext| active[ext.index()]);
        }
    }
    tracing::debug!(structs = count, "members resolved");
    Ok(())
}

/// Build every active command, then register active aliases.
#[tracing::instrument(level = "debug", skip_all)]
fn build_commands(
    types: &TypeTable,
    constants: &ConstantTable,
    index: &EntityIndex<'_>,
    set: &ActiveSet,
    features: &[Feature],
) -> Result<CommandTable> {
    let mut table = CommandTable::new();
    let active: Vec<usize> = (0..index.command_len())
        .filter(|&at| set.is_command_active(at))
        .collect();

    for &at in &active {
        let raw = index.raw_command(at);
        if raw.alias.is_some() {
            continue;
        }
        let mut cmd = command::build(raw, types, constants)?;
        cmd.feature = set.command_origins(at).iter().find_map(|origin| match origin {
            Origin::Feature(f) => Some(features[*f].name.clone()),
            Origin::Extension(_) => None,
        });
        table.insert(cmd);
    }

    for &at in &active {
        let raw = index.raw_command(at);
        if raw.alias.is_none() {
            continue;
        }
        let mut target = raw;
        while let Some(next) = target.alias.as_deref().and_then(|name| index.command(name)) {
            target = index.raw_command(next);
        }
        table.insert_alias(&raw.name, &target.name)?;
    }

    tracing::debug!(commands = table.len(), "commands built");
    Ok(table)
}

/// Assign every active entity to its platform bucket.
#[allow(clippy::too_many_arguments)]
#[tracing::instrument(level = "debug", skip_all)]
fn partition(
    doc: &RawDocument,
    types: &TypeTable,
    active: &[bool],
    set: &ActiveSet,
    index: &EntityIndex<'_>,
    commands: &CommandTable,
    extensions: &[Extension],
    options: &RegistryOptions,
) -> PlatformTable {
    let mut table = PlatformTable::new(&doc.platforms, extensions, options);

    for def in types.iter().filter(|def| active[def.id.index()]) {
        table.add_type(def.id, bucket(set.type_origins(def.id), extensions));
    }

    let mut seen: FxHashSet<&str> = FxHashSet::default();
    for at in (0..index.command_len()).filter(|&at| set.is_command_active(at)) {
        let name = index.raw_command(at).name.as_str();
        if commands.contains(name) && seen.insert(name) {
            table.add_command(name, bucket(set.command_origins(at), extensions));
        }
    }

    // Every directive origin of a value; a value several extensions add
    // belongs to core as soon as one of them is platform independent.
    let mut value_origins: FxHashMap<&str, SmallVec<[Origin; 2]>> = FxHashMap::default();
    for def in set.values() {
        let origins = value_origins.entry(def.name.as_str()).or_default();
        if !origins.contains(&def.origin) {
            origins.push(def.origin);
        }
    }
    for origins in value_origins.values_mut() {
        origins.sort_unstable();
    }

    for def in types.unique_types().filter(|def| active[def.id.index()]) {
        let Some(layout) = def.enum_def() else {
            continue;
        };
        let own = bucket(set.type_origins(def.id), extensions);
        for value in &layout.values {
            let platform = match value_origins.get(value.name.as_str()) {
                Some(origins) => bucket(origins, extensions),
                None => own,
            };
            let value = ValueRef {
                enumeration: def.id,
                name: value.name.clone(),
            };
            table.add_value(value, platform);
        }
    }
    table
}

/// Highest applied core version, with the header version as patch level.
fn api_version(types: &TypeTable, features: &[Feature]) -> ApiVersion {
    let mut version = features.iter().map(|f| f.version).max().unwrap_or_default();
    version.patch = types
        .lookup(well_known::HEADER_VERSION)
        .and_then(|id| types.source(id))
        .and_then(|raw| raw.name_tail.as_deref())
        .and_then(|tail| tail.trim().parse().ok())
        .unwrap_or(0);
    version
}
