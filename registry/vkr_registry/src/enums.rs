//! Enumeration merging phase.
//!
//! Feeds each active enumeration's contributions to
//! [`vkr_types::enum_merge::merge`]: its own block and core-version
//! directives count as core, extension directives as extension.

use rustc_hash::FxHashMap;
use vkr_diagnostic::Result;
use vkr_types::enum_merge::{
    block_value, extension_value, merge, Contribution, EnumDeclarations, ValueSpec,
};
use vkr_types::{EnumValue, TypeId, TypeKind, TypeTable};
use vkr_xml::{EnumsKind, RawBlock, RawDocument, RawEnums, RawItem};

use crate::active::{ActiveSet, ValueDef};
use crate::feature::Origin;

type Declarations = FxHashMap<TypeId, EnumDeclarations>;

fn entry<'a>(decls: &'a mut Declarations, types: &TypeTable, id: TypeId) -> &'a mut EnumDeclarations {
    let id = types.canonical(id);
    decls
        .entry(id)
        .or_insert_with(|| EnumDeclarations::new(types.name(id)))
}

/// Every value declaration in the document, active or not, per enumeration.
fn declarations(doc: &RawDocument, types: &TypeTable) -> Result<Declarations> {
    let mut decls = Declarations::default();

    for block in doc.enums.iter().filter(|b| b.kind != EnumsKind::Constants) {
        let Some(id) = types.lookup(&block.name) else {
            continue;
        };
        let decl = entry(&mut decls, types, id);
        for value in &block.values {
            decl.declare(&value.name, block_value(value)?);
        }
    }

    let feature_blocks = doc.features.iter().map(|f| (None, &f.blocks));
    let extension_blocks = doc.extensions.iter().map(|e| (Some(e.number), &e.blocks));
    for (number, blocks) in feature_blocks.chain(extension_blocks) {
        for item in blocks.iter().flat_map(|b: &RawBlock| &b.items) {
            let RawItem::Enum(r) = item else {
                continue;
            };
            let Some(extends) = &r.extends else {
                continue;
            };
            let Some(id) = types.lookup(extends) else {
                tracing::trace!(value = %r.name, extends = %extends, "extends an unknown type");
                continue;
            };
            if let Some(spec) = extension_value(r, number)? {
                entry(&mut decls, types, id).declare(&r.name, spec);
            }
        }
    }
    Ok(decls)
}

fn contribution(def: &ValueDef, decl: &EnumDeclarations) -> Result<Contribution> {
    let (value, alias) = match &def.spec {
        ValueSpec::Value(value) => (*value, None),
        ValueSpec::Alias(target) => (decl.value_of(target)?, Some(target.clone())),
    };
    Ok(Contribution {
        name: def.name.clone(),
        value,
        alias,
        comment: def.comment.clone(),
    })
}

/// Fill in the values of every active enumeration.
#[tracing::instrument(level = "debug", skip_all)]
pub(crate) fn merge_enums(
    types: &mut TypeTable,
    doc: &RawDocument,
    set: &ActiveSet,
    active: &[bool],
) -> Result<()> {
    let decls = declarations(doc, types)?;
    let blocks: FxHashMap<&str, &RawEnums> = doc
        .enums
        .iter()
        .filter(|b| b.kind != EnumsKind::Constants)
        .map(|b| (b.name.as_str(), b))
        .collect();

    let mut merged: Vec<(TypeId, Vec<EnumValue>)> = Vec::new();
    for def in types.unique_types() {
        if !active[def.id.index()] || def.enum_def().is_none() {
            continue;
        }
        let empty = EnumDeclarations::new(&def.name);
        let decl = decls.get(&def.id).unwrap_or(&empty);

        let mut core = Vec::new();
        let own = blocks.get(def.name.as_str()).map(|b| b.values.as_slice());
        for value in own.unwrap_or_default() {
            if set.is_value_removed(&value.name) {
                continue;
            }
            core.push(Contribution {
                name: value.name.clone(),
                value: decl.value_of(&value.name)?,
                alias: value.alias.clone(),
                comment: value.comment.clone(),
            });
        }

        let mut extension = Vec::new();
        for value in set.values().iter().filter(|v| v.enumeration == def.id) {
            let c = contribution(value, decl)?;
            match value.origin {
                Origin::Feature(_) => core.push(c),
                Origin::Extension(_) => extension.push(c),
            }
        }
        merged.push((def.id, merge(&core, &extension)));
    }

    let count = merged.len();
    for (id, values) in merged {
        if let TypeKind::Enum(def) = &mut types.get_mut(id).kind {
            def.values = values;
        }
    }
    tracing::debug!(enums = count, "enumerations merged");
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]
mod tests;
