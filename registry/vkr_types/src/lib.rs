//! Vulkan registry type model.
//!
//! This crate holds the semantic model shared by the resolver phases:
//!
//! - [`TypeTable`]: name → canonical [`TypeDef`], alias collapsing, cycle
//!   detection
//! - [`modifier`]: pointer/array/chain-pointer resolution for members and
//!   parameters, dynamic array lengths, optionality
//! - [`ConstantTable`]: API constants used by fixed array lengths
//! - [`enum_merge`]: core/extension enumeration value merging
//!
//! Types refer to each other through [`TypeId`] indices, never through
//! owned pointers.

mod constants;
pub mod enum_merge;
mod id;
mod kind;
mod member;
pub mod modifier;
mod table;
pub mod well_known;

pub use constants::{parse_integer, Constant, ConstantTable};
pub use id::TypeId;
pub use kind::{EnumDef, EnumValue, HandleDef, StructDef, TypeDef, TypeKind};
pub use member::{ArrayLen, LengthExpr, LengthToken, Member, Modifier, Modifiers};
pub use table::TypeTable;
