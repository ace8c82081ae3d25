//! Dependency closure.
//!
//! A type mentioned by an active struct, command, handle, bitmask or alias
//! is active too, and inherits the origins of whoever mentions it. Command
//! aliases pull in their target command the same way.

use vkr_diagnostic::{RegistryError, Result};
use vkr_types::{TypeId, TypeKind, TypeTable};

use super::{ActiveSet, EntityIndex};
use crate::feature::Origin;

/// Extend `set` until every mentioned type is active.
#[tracing::instrument(level = "debug", skip_all)]
pub(crate) fn close(set: &mut ActiveSet, types: &TypeTable, index: &EntityIndex<'_>) -> Result<()> {
    let explicit = (set.type_count(), set.command_count());

    for at in 0..index.command_len() {
        if set.is_command_active(at) {
            close_alias(set, index, at)?;
        }
    }

    let mut pending: Vec<TypeId> = Vec::new();
    for at in 0..index.command_len() {
        if !set.is_command_active(at) {
            continue;
        }
        let raw = index.raw_command(at);
        let origins = set.command_origins(at).to_vec();
        if raw.alias.is_none() {
            let id = lookup(types, &raw.return_type, &raw.name)?;
            pull(set, types, id, &raw.name, &origins, &mut pending)?;
        }
        for param in &raw.params {
            let referrer = format!("{}.{}", raw.name, param.name);
            let id = lookup(types, &param.type_name, &referrer)?;
            pull(set, types, id, &referrer, &origins, &mut pending)?;
        }
    }

    // Reverse so the stack pops in declaration order.
    pending.extend(
        types
            .iter()
            .map(|def| def.id)
            .filter(|&id| set.is_type_active(id))
            .rev(),
    );
    while let Some(id) = pending.pop() {
        let origins = set.type_origins(id).to_vec();
        for (referenced, referrer) in references(types, id)? {
            pull(set, types, referenced, &referrer, &origins, &mut pending)?;
        }
    }

    tracing::debug!(
        types = set.type_count() - explicit.0,
        commands = set.command_count() - explicit.1,
        "closure added"
    );
    Ok(())
}

fn lookup(types: &TypeTable, name: &str, referrer: &str) -> Result<TypeId> {
    types.lookup(name).ok_or_else(|| RegistryError::UnknownType {
        name: name.to_owned(),
        referrer: referrer.to_owned(),
    })
}

/// Activate the alias chain of command `at`.
fn close_alias(set: &mut ActiveSet, index: &EntityIndex<'_>, at: usize) -> Result<()> {
    let origins = set.command_origins(at).to_vec();
    let mut path = vec![index.raw_command(at).name.clone()];
    let mut current = at;
    while let Some(target) = index.raw_command(current).alias.as_deref() {
        if path.iter().any(|seen| seen == target) {
            path.push(target.to_owned());
            return Err(RegistryError::CyclicAlias { path });
        }
        let unknown = || RegistryError::UnknownCommand {
            name: target.to_owned(),
            referrer: index.raw_command(current).name.clone(),
        };
        let next = index.command(target).ok_or_else(unknown)?;
        if set.is_command_removed(next) {
            return Err(unknown());
        }
        set.merge_command_origins(next, &origins);
        path.push(target.to_owned());
        current = next;
    }
    Ok(())
}

fn pull(
    set: &mut ActiveSet,
    types: &TypeTable,
    id: TypeId,
    referrer: &str,
    origins: &[Origin],
    pending: &mut Vec<TypeId>,
) -> Result<()> {
    if set.is_type_removed(id) {
        return Err(RegistryError::UnknownType {
            name: types.name(id).to_owned(),
            referrer: referrer.to_owned(),
        });
    }
    if set.merge_type_origins(id, origins) {
        tracing::trace!(ty = types.name(id), referrer, "pulled in");
        pending.push(id);
    }
    Ok(())
}

/// Types mentioned by a type, with the name to blame if one is missing.
fn references(types: &TypeTable, id: TypeId) -> Result<Vec<(TypeId, String)>> {
    let def = types.get(id);
    let owner = || def.name.clone();
    let mut out = Vec::new();
    match &def.kind {
        TypeKind::Alias { target } => out.push((*target, owner())),
        TypeKind::Handle(handle) => out.extend(handle.parent.map(|p| (p, owner()))),
        TypeKind::Bitmask {
            backing_enum,
            flags_type,
        } => {
            out.extend(backing_enum.map(|e| (e, owner())));
            out.extend(flags_type.map(|f| (f, owner())));
        }
        TypeKind::Base { underlying } => out.extend(underlying.map(|u| (u, owner()))),
        TypeKind::Struct(_) | TypeKind::Union(_) => {
            for member in types.source(id).map(|raw| raw.members.as_slice()).unwrap_or_default() {
                let referrer = format!("{}.{}", def.name, member.name);
                out.push((lookup(types, &member.type_name, &referrer)?, referrer));
            }
        }
        TypeKind::FunctionPointer | TypeKind::Enum(_) => {}
    }
    Ok(out)
}
