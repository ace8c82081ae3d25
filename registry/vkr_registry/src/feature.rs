//! Core versions and extensions as the registry reports them.

use std::fmt;

/// A `major.minor.patch` API version.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ApiVersion {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
}

impl ApiVersion {
    pub const fn new(major: u32, minor: u32, patch: u32) -> Self {
        ApiVersion {
            major,
            minor,
            patch,
        }
    }

    /// Parse a feature `number` attribute (`1.3`).
    pub fn parse_feature_number(text: &str) -> Option<Self> {
        let (major, minor) = text.trim().split_once('.')?;
        Some(ApiVersion::new(major.parse().ok()?, minor.parse().ok()?, 0))
    }
}

impl fmt::Display for ApiVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

/// An entity named by a require or remove directive.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum EntityRef {
    Type(String),
    Command(String),
    Enum(String),
}

impl EntityRef {
    pub fn name(&self) -> &str {
        match self {
            EntityRef::Type(name) | EntityRef::Command(name) | EntityRef::Enum(name) => name,
        }
    }
}

/// Which version or extension activated an entity.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum Origin {
    /// Index into [`Registry::features`](crate::Registry::features).
    Feature(usize),
    /// Index into [`Registry::extensions`](crate::Registry::extensions).
    Extension(usize),
}

/// An applied core version.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Feature {
    /// `VK_VERSION_1_1`.
    pub name: String,
    pub version: ApiVersion,
    /// Entities required, in directive order.
    pub requires: Vec<EntityRef>,
    /// Entities removed, in directive order.
    pub removes: Vec<EntityRef>,
}

/// Whether an extension hangs off the instance or a device.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum ExtensionKind {
    Instance,
    Device,
}

impl ExtensionKind {
    pub fn parse(text: &str) -> Option<Self> {
        match text {
            "instance" => Some(ExtensionKind::Instance),
            "device" => Some(ExtensionKind::Device),
            _ => None,
        }
    }
}

/// A selected extension.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Extension {
    pub name: String,
    pub number: u32,
    pub kind: Option<ExtensionKind>,
    /// Author tag (`KHR`, `EXT`); `None` for unauthored extensions.
    pub author: Option<String>,
    /// Platform name; `None` for platform-independent extensions.
    pub platform: Option<String>,
    /// Core version or extension this one was promoted into.
    pub promoted_to: Option<String>,
    pub deprecated_by: Option<String>,
    /// Versions and extensions this one depends on.
    pub dependencies: Vec<String>,
    pub special_use: Vec<String>,
    pub provisional: bool,
    /// The `*_EXTENSION_NAME` constant.
    pub name_enum: Option<String>,
    /// The `*_SPEC_VERSION` constant.
    pub spec_version_enum: Option<String>,
    /// Entities required, in directive order.
    pub requires: Vec<EntityRef>,
    /// Entities removed, in directive order.
    pub removes: Vec<EntityRef>,
}

impl Extension {
    /// Whether this extension was promoted into a core version.
    pub fn is_promoted_to_core(&self) -> bool {
        self.promoted_to
            .as_deref()
            .is_some_and(|target| target.starts_with("VK_VERSION_"))
    }
}
