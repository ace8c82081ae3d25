//! Integer values of enumeration declarations.

use vkr_diagnostic::{RegistryError, Result};
use vkr_xml::{RawEnumRef, RawEnumValue};

use crate::constants::parse_integer;
use crate::well_known::{EXTENSION_ENUM_BASE, EXTENSION_ENUM_BLOCK};

/// How a declaration obtains its value.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum ValueSpec {
    Value(i64),
    /// Same value as the named entry of the same enumeration.
    Alias(String),
}

fn malformed(name: &str, what: &str) -> RegistryError {
    RegistryError::parse(0, format!("enum value `{name}`: {what}"))
}

fn literal(name: &str, text: &str) -> Result<i64> {
    parse_integer(text)
        .and_then(|v| i64::try_from(v).ok())
        .ok_or_else(|| malformed(name, &format!("`{text}` is not an integer")))
}

fn bit(name: &str, text: &str) -> Result<i64> {
    let pos = text
        .trim()
        .parse::<u32>()
        .map_err(|_| malformed(name, &format!("bad bitpos `{text}`")))?;
    1i64
        .checked_shl(pos)
        .ok_or_else(|| malformed(name, &format!("bitpos {pos} out of range")))
}

/// Value of an `<enum>` declared directly inside an `<enums>` block.
pub fn block_value(raw: &RawEnumValue) -> Result<ValueSpec> {
    if let Some(alias) = &raw.alias {
        return Ok(ValueSpec::Alias(alias.clone()));
    }
    if let Some(pos) = &raw.bitpos {
        return bit(&raw.name, pos).map(ValueSpec::Value);
    }
    match &raw.value {
        Some(value) => literal(&raw.name, value).map(ValueSpec::Value),
        None => Err(malformed(&raw.name, "no value, bitpos or alias")),
    }
}

/// Value of an `<enum extends=...>` inside a require block.
///
/// `extension` is the number of the declaring extension; an explicit
/// `extnumber` overrides it. Offsets land in the extension's block:
/// `1_000_000_000 + (extnumber - 1) * 1000 + offset`, negated for `dir="-"`.
/// Returns `None` for a bare reference.
pub fn extension_value(raw: &RawEnumRef, extension: Option<u32>) -> Result<Option<ValueSpec>> {
    if let Some(alias) = &raw.alias {
        return Ok(Some(ValueSpec::Alias(alias.clone())));
    }
    if let Some(value) = &raw.value {
        return literal(&raw.name, value).map(|v| Some(ValueSpec::Value(v)));
    }
    if let Some(pos) = &raw.bitpos {
        return bit(&raw.name, pos).map(|v| Some(ValueSpec::Value(v)));
    }
    if let Some(offset) = &raw.offset {
        let offset = literal(&raw.name, offset)?;
        let number = match &raw.extnumber {
            Some(text) => literal(&raw.name, text)?,
            None => extension
                .map(i64::from)
                .ok_or_else(|| malformed(&raw.name, "offset without an extension number"))?,
        };
        let value = EXTENSION_ENUM_BASE + (number - 1) * EXTENSION_ENUM_BLOCK + offset;
        return Ok(Some(ValueSpec::Value(if raw.negative { -value } else { value })));
    }
    Ok(None)
}
