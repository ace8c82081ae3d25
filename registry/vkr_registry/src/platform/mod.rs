//! Platform partitioning.
//!
//! Every active type, command and enumeration value lands in exactly one
//! bucket keyed by its platform guard macro. The core bucket (empty name,
//! empty guard) comes first, then platforms in declaration order.
//!
//! An entity is core when any version or platform-independent extension
//! brought it in; otherwise it belongs to the platform of the first
//! extension that did.

use rustc_hash::FxHashMap;
use vkr_types::TypeId;
use vkr_xml::RawPlatform;

use crate::feature::{Extension, Origin};
use crate::RegistryOptions;

/// An enumeration value owned by a bucket.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ValueRef {
    pub enumeration: TypeId,
    pub name: String,
}

/// One platform bucket.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Platform {
    /// Platform name; empty for core.
    pub name: String,
    /// Guard macro (`VK_USE_PLATFORM_WIN32_KHR`); empty for core.
    pub guard: String,
    pub comment: Option<String>,
    /// Types in declaration order.
    pub types: Vec<TypeId>,
    /// Command names in declaration order, aliases included.
    pub commands: Vec<String>,
    pub enum_values: Vec<ValueRef>,
    /// Selected extensions for this platform.
    pub extensions: Vec<String>,
}

impl Platform {
    fn new(name: &str, guard: &str, comment: Option<String>) -> Self {
        Platform {
            name: name.to_owned(),
            guard: guard.to_owned(),
            comment,
            types: Vec::new(),
            commands: Vec::new(),
            enum_values: Vec::new(),
            extensions: Vec::new(),
        }
    }

    #[inline]
    pub fn is_core(&self) -> bool {
        self.name.is_empty()
    }
}

/// Platform name for an entity brought in by `origins`; `None` is core.
pub fn bucket<'a>(origins: &[Origin], extensions: &'a [Extension]) -> Option<&'a str> {
    let mut first = None;
    for origin in origins {
        match origin {
            Origin::Feature(_) => return None,
            Origin::Extension(at) => match extensions[*at].platform.as_deref() {
                None => return None,
                Some(platform) => {
                    first.get_or_insert(platform);
                }
            },
        }
    }
    first
}

/// The finished partition, with reverse lookups.
#[derive(Clone, Debug, Default)]
pub struct PlatformTable {
    platforms: Vec<Platform>,
    type_bucket: FxHashMap<TypeId, usize>,
    command_bucket: FxHashMap<String, usize>,
}

impl PlatformTable {
    /// Core bucket plus every declared platform the options accept or a
    /// selected extension targets.
    pub fn new(declared: &[RawPlatform], extensions: &[Extension], options: &RegistryOptions) -> Self {
        let mut platforms = vec![Platform::new("", "", None)];
        for raw in declared {
            let used = extensions
                .iter()
                .any(|ext| ext.platform.as_deref() == Some(raw.name.as_str()));
            if used || options.accepts_platform(&raw.name) {
                platforms.push(Platform::new(&raw.name, &raw.protect, raw.comment.clone()));
            }
        }
        let mut table = PlatformTable {
            platforms,
            ..PlatformTable::default()
        };
        for ext in extensions {
            let at = table.slot(ext.platform.as_deref());
            table.platforms[at].extensions.push(ext.name.clone());
        }
        table
    }

    fn slot(&self, platform: Option<&str>) -> usize {
        platform
            .and_then(|name| self.platforms.iter().position(|p| p.name == name))
            .unwrap_or(0)
    }

    pub fn add_type(&mut self, id: TypeId, platform: Option<&str>) {
        let at = self.slot(platform);
        self.platforms[at].types.push(id);
        self.type_bucket.insert(id, at);
    }

    pub fn add_command(&mut self, name: &str, platform: Option<&str>) {
        let at = self.slot(platform);
        self.platforms[at].commands.push(name.to_owned());
        self.command_bucket.insert(name.to_owned(), at);
    }

    pub fn add_value(&mut self, value: ValueRef, platform: Option<&str>) {
        let at = self.slot(platform);
        self.platforms[at].enum_values.push(value);
    }

    // === Lookup Methods ===

    pub fn get(&self, name: &str) -> Option<&Platform> {
        self.platforms.iter().find(|p| p.name == name)
    }

    /// The core bucket.
    pub fn core(&self) -> &Platform {
        &self.platforms[0]
    }

    /// Guard key of the bucket owning a type; empty for core.
    pub fn guard_of_type(&self, id: TypeId) -> Option<&str> {
        self.type_bucket
            .get(&id)
            .map(|&at| self.platforms[at].guard.as_str())
    }

    /// Guard key of the bucket owning a command; empty for core.
    pub fn guard_of_command(&self, name: &str) -> Option<&str> {
        self.command_bucket
            .get(name)
            .map(|&at| self.platforms[at].guard.as_str())
    }

    // === Iteration ===

    pub fn iter(&self) -> impl Iterator<Item = &Platform> {
        self.platforms.iter()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.platforms.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.platforms.is_empty()
    }
}
