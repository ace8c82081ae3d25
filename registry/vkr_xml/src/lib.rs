//! Document reader for the Vulkan API registry.
//!
//! Turns the XML registry document into a [`RawDocument`]: the named
//! sections (platforms, types, enums, commands, features, extensions) in
//! declaration order, with nothing resolved yet.
//!
//! ```text
//! vk.xml ──parse_tree──▶ XmlElement ──parse──▶ RawDocument
//! ```

mod raw;
mod reader;
mod tree;

pub use raw::{
    BlockKind, EnumsKind, RawBlock, RawCommand, RawDocument, RawEnumRef, RawEnumValue, RawEnums,
    RawExtension, RawFeature, RawItem, RawMember, RawPlatform, RawType,
};
pub use reader::parse;
pub use tree::{parse_tree, XmlElement, XmlNode};
