//! Enumeration value merging.
//!
//! An enumeration's values arrive from several places: its own `<enums>`
//! block, core versions extending it, and extensions extending it. The
//! merger folds the active contributions into one ordered set where every
//! integer value has exactly one canonical name.
//!
//! # Policy
//!
//! - Output order is first declaration: core contributions, then extension
//!   contributions, each in document order
//! - A name declared twice is merged into its first declaration
//! - Per integer value the first core declaration is canonical, falling back
//!   to the first extension declaration; every other name with that value
//!   becomes an alias of it
//! - An explicit alias whose target is not active stands on its own with the
//!   target's value
//!
//! Alias values are resolved beforehand through [`EnumDeclarations`], which
//! sees every declaration in the document, active or not.

mod value;

use rustc_hash::{FxHashMap, FxHashSet};
use vkr_diagnostic::{RegistryError, Result};

use crate::EnumValue;
pub use value::{block_value, extension_value, ValueSpec};

/// One active declaration of an enumeration value.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Contribution {
    pub name: String,
    /// Resolved integer value, aliases included.
    pub value: i64,
    /// Explicit alias target as declared.
    pub alias: Option<String>,
    pub comment: Option<String>,
}

/// Merge core and extension contributions into one deterministic value set.
pub fn merge(core: &[Contribution], extension: &[Contribution]) -> Vec<EnumValue> {
    let mut seen: FxHashSet<&str> = FxHashSet::default();
    let mut entries: Vec<&Contribution> = Vec::with_capacity(core.len() + extension.len());
    for c in core.iter().chain(extension) {
        if seen.insert(c.name.as_str()) {
            entries.push(c);
        } else {
            tracing::trace!(name = %c.name, "enum value redeclared, merged");
        }
    }

    let present = |name: &str| seen.contains(name);
    let stands_alone = |c: &Contribution| c.alias.as_deref().is_none_or(|t| !present(t));

    // Core entries precede extension entries, so first-wins over the whole
    // sequence gives the core-first, then-declaration-order tie break.
    let mut canonical: FxHashMap<i64, &str> = FxHashMap::default();
    for c in entries.iter().filter(|c| stands_alone(c)) {
        canonical.entry(c.value).or_insert(c.name.as_str());
    }

    entries
        .iter()
        .map(|c| {
            let owner = canonical.get(&c.value).copied();
            EnumValue {
                name: c.name.clone(),
                value: c.value,
                alias_of: owner.filter(|&n| n != c.name).map(str::to_owned),
                comment: c.comment.clone(),
            }
        })
        .collect()
}

/// Every declaration of one enumeration's values, for resolving aliases.
#[derive(Clone, Debug)]
pub struct EnumDeclarations {
    enumeration: String,
    specs: FxHashMap<String, ValueSpec>,
}

impl EnumDeclarations {
    pub fn new(enumeration: &str) -> Self {
        EnumDeclarations {
            enumeration: enumeration.to_owned(),
            specs: FxHashMap::default(),
        }
    }

    /// Record a declaration; the first declaration of a name wins.
    pub fn declare(&mut self, name: &str, spec: ValueSpec) {
        self.specs.entry(name.to_owned()).or_insert(spec);
    }

    #[inline]
    pub fn contains(&self, name: &str) -> bool {
        self.specs.contains_key(name)
    }

    /// Integer value of `name`, following alias chains.
    pub fn value_of(&self, name: &str) -> Result<i64> {
        let mut path: Vec<String> = Vec::new();
        let mut current = name;
        loop {
            let spec = self
                .specs
                .get(current)
                .ok_or_else(|| RegistryError::UnknownEnumValue {
                    name: current.to_owned(),
                    enumeration: self.enumeration.clone(),
                })?;
            path.push(current.to_owned());
            match spec {
                ValueSpec::Value(value) => return Ok(*value),
                ValueSpec::Alias(target) => {
                    if path.iter().any(|seen| seen == target) {
                        path.push(target.clone());
                        return Err(RegistryError::CyclicAlias { path });
                    }
                    current = target;
                }
            }
        }
    }
}
