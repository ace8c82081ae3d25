//! Dynamic array length expressions.
//!
//! A length is a sibling name (`count`), a path through a pointer-to-struct
//! sibling (`pAllocateInfo->descriptorSetCount`), a path through the
//! elements of a sibling array (`pInfos[].geometryCount`), or arithmetic over those,
//! numbers and API constants (`(rasterizationSamples + 31) / 32`,
//! `2*VK_UUID_SIZE`). Any other identifier is fatal.

use vkr_diagnostic::{RegistryError, Result};
use vkr_xml::RawMember;

use super::ModifierContext;
use crate::{LengthExpr, LengthToken};

/// Resolve the length expression `expr` of member `member`.
pub fn length_expr(expr: &str, member: &str, ctx: &ModifierContext<'_>) -> Result<LengthExpr> {
    let mut tokens: Vec<LengthToken> = Vec::new();

    let bytes = expr.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        let start = i;
        let b = bytes[i];
        if b.is_ascii_alphabetic() || b == b'_' {
            i = scan_path(bytes, i);
            let path = &expr[start..i];
            tokens.push(reference(path, expr, member, ctx)?);
        } else if b.is_ascii_digit() {
            while i < bytes.len() && (bytes[i].is_ascii_alphanumeric() || bytes[i] == b'.') {
                i += 1;
            }
            push_text(&mut tokens, &expr[start..i]);
        } else {
            let ch_len = expr[i..].chars().next().map_or(1, char::len_utf8);
            i += ch_len;
            push_text(&mut tokens, &expr[start..i]);
        }
    }

    Ok(LengthExpr {
        source: expr.to_owned(),
        tokens,
    })
}

fn push_text(tokens: &mut Vec<LengthToken>, text: &str) {
    if let Some(LengthToken::Text(prev)) = tokens.last_mut() {
        prev.push_str(text);
    } else {
        tokens.push(LengthToken::Text(text.to_owned()));
    }
}

fn is_ident(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

/// End of an identifier plus any `->field` or `[].field` continuations
/// starting at `i`.
fn scan_path(bytes: &[u8], mut i: usize) -> usize {
    loop {
        while i < bytes.len() && is_ident(bytes[i]) {
            i += 1;
        }
        let Some(sep) = SEPARATORS
            .iter()
            .find(|sep| bytes.get(i..i + sep.len()) == Some(sep.as_bytes()))
        else {
            return i;
        };
        let next = i + sep.len();
        if !bytes.get(next).is_some_and(|&b| b.is_ascii_alphabetic() || b == b'_') {
            return i;
        }
        i = next;
    }
}

/// Steps from a field into a member of the struct it points at.
const SEPARATORS: [&str; 2] = ["->", "[]."];

fn segments(path: &str) -> impl Iterator<Item = &str> {
    path.split("->").flat_map(|part| part.split("[]."))
}

fn reference(
    path: &str,
    expr: &str,
    member: &str,
    ctx: &ModifierContext<'_>,
) -> Result<LengthToken> {
    let unresolved = || RegistryError::UnresolvedLengthReference {
        owner: ctx.owner.to_owned(),
        member: member.to_owned(),
        expr: expr.to_owned(),
        reference: path.to_owned(),
    };

    let mut steps = segments(path);
    let head = steps.next().unwrap_or_default();

    let Some(mut field) = find(ctx.siblings, head) else {
        if head == path && ctx.constants.contains(path) {
            return Ok(LengthToken::Constant(path.to_owned()));
        }
        return Err(unresolved());
    };

    for segment in steps {
        let ty = ctx.types.resolve_from(&field.type_name, ctx.owner)?;
        field = ctx
            .types
            .source(ty)
            .and_then(|raw| find(&raw.members, segment))
            .ok_or_else(unresolved)?;
    }

    Ok(LengthToken::Field {
        path: path.to_owned(),
        deref: field.declarator.contains('*'),
    })
}

fn find<'a>(members: &'a [RawMember], name: &str) -> Option<&'a RawMember> {
    members.iter().find(|m| m.name == name)
}
