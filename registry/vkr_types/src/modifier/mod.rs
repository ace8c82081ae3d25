//! Type modifier resolution.
//!
//! Turns a raw `<member>`/`<param>` into a [`Member`]: base type resolved
//! through the [`TypeTable`], declarator levels turned into [`Modifier`]s
//! outermost first, `len`/`altlen` attached to pointer levels, and the
//! optional/output flags inferred.
//!
//! # Composition
//!
//! Fixed arrays are outermost, then pointers from the outermost `*` inward.
//! The comma-separated length list applies to pointer levels in that same
//! order. A `null-terminated` level and everything inside it collapse into
//! the built-in `string` type. A single `void*` named `pNext` becomes a
//! [`Modifier::ChainPointer`].
//!
//! # Optionality
//!
//! A member is optional when its `optional` list starts with `true`. A
//! parameter is also optional when it is a pure output. Nothing else is
//! optional.

mod declarator;
mod length;

use vkr_diagnostic::Result;
use vkr_xml::RawMember;

use crate::well_known;
use crate::{ArrayLen, ConstantTable, Member, Modifier, Modifiers, TypeTable};
use declarator::parse_declarator;
pub use length::length_expr;

/// Whether a field is a struct member or a command parameter.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum FieldKind {
    Member,
    Parameter,
}

/// Everything [`annotate`] needs to know about a field's surroundings.
#[derive(Copy, Clone, Debug)]
pub struct ModifierContext<'a> {
    /// Struct or command name.
    pub owner: &'a str,
    pub kind: FieldKind,
    /// All members or parameters of the owner, the field itself included.
    pub siblings: &'a [RawMember],
    pub types: &'a TypeTable,
    pub constants: &'a ConstantTable,
}

/// Resolve one member or parameter.
pub fn annotate(raw: &RawMember, ctx: &ModifierContext<'_>) -> Result<Member> {
    let referrer = format!("{}.{}", ctx.owner, raw.name);
    let decl = parse_declarator(&raw.declarator, &referrer)?;

    let lengths: Vec<&str> = raw
        .altlen
        .as_deref()
        .or(raw.len.as_deref())
        .map(|list| list.split(',').map(str::trim).collect())
        .unwrap_or_default();

    let mut base_name = raw.type_name.as_str();
    let mut modifiers = Modifiers::new();

    for extent in &decl.arrays {
        modifiers.push(Modifier::FixedArray {
            len: ArrayLen {
                value: ctx.constants.array_len(extent, &referrer)?,
                constant: ctx.constants.contains(extent).then(|| extent.clone()),
            },
            is_const: decl.const_element,
        });
    }

    let levels = decl.pointers.len();
    for (depth, &is_const) in decl.pointers.iter().rev().enumerate() {
        let modifier = match lengths.get(depth).copied() {
            Some(well_known::NULL_TERMINATED) => {
                base_name = well_known::STRING;
                break;
            }
            Some(expr) => Modifier::DynamicArray {
                len: length_expr(expr, &raw.name, ctx)?,
                is_const,
            },
            None if levels == 1
                && raw.name == well_known::NEXT_MEMBER
                && raw.type_name == well_known::VOID =>
            {
                Modifier::ChainPointer { is_const }
            }
            None => Modifier::Pointer { is_const },
        };
        modifiers.push(modifier);
    }

    if lengths.len() > levels && !decl.arrays.is_empty() {
        tracing::trace!(member = %referrer, "length on fixed array ignored");
    }

    let ty = ctx.types.resolve_from(base_name, &referrer)?;
    let is_output = matches!(
        modifiers.first(),
        Some(Modifier::Pointer { is_const: false } | Modifier::DynamicArray { is_const: false, .. })
    );
    let marked = raw
        .optional
        .as_deref()
        .and_then(|list| list.split(',').next())
        .is_some_and(|first| first.trim() == "true");

    Ok(Member {
        name: raw.name.clone(),
        ty,
        modifiers,
        optional: marked || (ctx.kind == FieldKind::Parameter && is_output),
        is_output,
        bit_size: decl.bit_size,
        values: raw.values.clone(),
    })
}

/// Resolve every field of an owner, preserving declaration order.
pub fn annotate_all(fields: &[RawMember], ctx: &ModifierContext<'_>) -> Result<Vec<Member>> {
    fields.iter().map(|raw| annotate(raw, ctx)).collect()
}
