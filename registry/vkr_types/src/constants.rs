//! API constants.
//!
//! Holds the `API Constants` block plus the constants extensions define
//! (`VK_KHR_SURFACE_SPEC_VERSION`, `VK_KHR_SURFACE_EXTENSION_NAME`). Each keeps
//! its literal text; integral literals also carry their value so fixed array
//! lengths can be evaluated.

use rustc_hash::FxHashMap;
use vkr_diagnostic::{RegistryError, Result};

/// One API constant.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Constant {
    pub name: String,

    /// Literal as written (`16`, `(~0U)`, `1000.0F`, `"VK_KHR_surface"`).
    pub literal: String,

    /// Integer value when the literal is integral.
    pub value: Option<i128>,

    /// Declared C type (`uint32_t`, `float`).
    pub ctype: Option<String>,

    /// Canonical constant this one is another name for.
    pub alias_of: Option<String>,
}

/// API constants in declaration order.
#[derive(Clone, Debug, Default)]
pub struct ConstantTable {
    entries: Vec<Constant>,
    by_name: FxHashMap<String, usize>,
}

impl ConstantTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Define a constant from its literal. A repeated name keeps the first definition.
    pub fn define(&mut self, name: &str, literal: &str, ctype: Option<&str>) {
        if self.by_name.contains_key(name) {
            tracing::trace!(name, "constant redefined, keeping first");
            return;
        }
        self.insert(Constant {
            name: name.to_owned(),
            literal: literal.to_owned(),
            value: parse_integer(literal),
            ctype: ctype.map(str::to_owned),
            alias_of: None,
        });
    }

    /// Define `name` as another name for `target`.
    pub fn define_alias(&mut self, name: &str, target: &str) -> Result<()> {
        if self.by_name.contains_key(name) {
            return Ok(());
        }
        let target = self.get(target).ok_or_else(|| RegistryError::UnknownConstant {
            name: target.to_owned(),
            referrer: name.to_owned(),
        })?;
        let canonical = target.alias_of.clone().unwrap_or_else(|| target.name.clone());
        let constant = Constant {
            name: name.to_owned(),
            literal: target.literal.clone(),
            value: target.value,
            ctype: target.ctype.clone(),
            alias_of: Some(canonical),
        };
        self.insert(constant);
        Ok(())
    }

    fn insert(&mut self, constant: Constant) {
        self.by_name
            .insert(constant.name.clone(), self.entries.len());
        self.entries.push(constant);
    }

    #[inline]
    pub fn get(&self, name: &str) -> Option<&Constant> {
        self.by_name.get(name).map(|&i| &self.entries[i])
    }

    #[inline]
    pub fn contains(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    /// Evaluate a fixed array length written as a literal or a constant name.
    pub fn array_len(&self, text: &str, referrer: &str) -> Result<u64> {
        if let Some(value) = parse_integer(text) {
            return u64::try_from(value).map_err(|_| RegistryError::UnknownConstant {
                name: text.to_owned(),
                referrer: referrer.to_owned(),
            });
        }
        self.get(text)
            .and_then(|c| c.value)
            .and_then(|v| u64::try_from(v).ok())
            .ok_or_else(|| RegistryError::UnknownConstant {
                name: text.to_owned(),
                referrer: referrer.to_owned(),
            })
    }

    pub fn iter(&self) -> impl Iterator<Item = &Constant> {
        self.entries.iter()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Parse a C integer literal: decimal, hex, negative, `U`/`L` suffixes and
/// the `(~0U)` / `(~0ULL)` complement forms.
pub fn parse_integer(literal: &str) -> Option<i128> {
    let mut text = literal.trim();
    while let Some(inner) = text.strip_prefix('(').and_then(|t| t.strip_suffix(')')) {
        text = inner.trim();
    }

    if let Some(operand) = text.strip_prefix('~') {
        let wide = operand.to_ascii_uppercase().contains("LL");
        let value = parse_integer(operand)?;
        let mask: i128 = if wide {
            i128::from(u64::MAX)
        } else {
            i128::from(u32::MAX)
        };
        return Some(!value & mask);
    }

    let (negative, digits) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text),
    };
    let digits = digits.trim_end_matches(['u', 'U', 'l', 'L']);
    let value = match digits
        .strip_prefix("0x")
        .or_else(|| digits.strip_prefix("0X"))
    {
        Some(hex) => i128::from_str_radix(hex, 16).ok()?,
        None => {
            if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
                return None;
            }
            digits.parse::<i128>().ok()?
        }
    };
    Some(if negative { -value } else { value })
}
