//! Raw registry sections.
//!
//! These mirror the document vocabulary one-to-one. No names are resolved
//! here; the type table and the resolver phases turn them into the semantic
//! model. Every sequence keeps declaration order.

/// The parsed document, split into its named sections.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RawDocument {
    pub platforms: Vec<RawPlatform>,
    pub types: Vec<RawType>,
    pub enums: Vec<RawEnums>,
    pub commands: Vec<RawCommand>,
    pub features: Vec<RawFeature>,
    pub extensions: Vec<RawExtension>,
}

/// `<platform name="win32" protect="VK_USE_PLATFORM_WIN32_KHR"/>`
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RawPlatform {
    pub name: String,
    pub protect: String,
    pub comment: Option<String>,
}

/// A `<type>` element from the `<types>` section.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RawType {
    pub name: String,
    /// `category` attribute; `None` for plain C types from platform headers.
    pub category: Option<String>,
    pub alias: Option<String>,
    pub api: Option<String>,
    /// Handle parent list (`parent="VkDevice"`).
    pub parent: Option<String>,
    /// Bitmask flag-bits enum (`requires`) or platform header dependency.
    pub requires: Option<String>,
    /// 64-bit bitmask flag-bits enum.
    pub bitvalues: Option<String>,
    /// Text of the inner `<type>` child (`VK_DEFINE_HANDLE`, `uint32_t`, `VkFlags`).
    pub inner_type: Option<String>,
    pub struct_extends: Vec<String>,
    pub returned_only: bool,
    pub object_type: Option<String>,
    pub members: Vec<RawMember>,
    /// Text following the `<name>` child of a define (`280` in `VK_HEADER_VERSION 280`).
    pub name_tail: Option<String>,
    pub position: u64,
}

/// A struct `<member>` or command `<param>`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RawMember {
    pub name: String,
    pub type_name: String,
    /// C declarator text with the type and name removed: `"const * "`, `"[VK_UUID_SIZE]"`, `":24"`.
    pub declarator: String,
    pub len: Option<String>,
    pub altlen: Option<String>,
    pub optional: Option<String>,
    pub values: Vec<String>,
    pub api: Option<String>,
}

/// Kind of an `<enums>` block.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum EnumsKind {
    Enum,
    Bitmask,
    Constants,
}

/// An `<enums>` block.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RawEnums {
    pub name: String,
    pub kind: EnumsKind,
    pub bitwidth: Option<u32>,
    pub values: Vec<RawEnumValue>,
}

/// An `<enum>` inside an `<enums>` block.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RawEnumValue {
    pub name: String,
    pub value: Option<String>,
    pub bitpos: Option<String>,
    pub alias: Option<String>,
    pub comment: Option<String>,
    pub api: Option<String>,
    /// C type of an API constant (`uint32_t`, `float`).
    pub ctype: Option<String>,
}

/// A `<command>` element.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RawCommand {
    pub name: String,
    pub alias: Option<String>,
    pub api: Option<String>,
    pub return_type: String,
    pub params: Vec<RawMember>,
    pub success_codes: Vec<String>,
    pub error_codes: Vec<String>,
    pub position: u64,
}

/// A `<feature>` (core version).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RawFeature {
    pub name: String,
    pub number: String,
    pub api: Option<String>,
    pub blocks: Vec<RawBlock>,
}

/// An `<extension>`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RawExtension {
    pub name: String,
    pub number: u32,
    /// `instance` or `device`.
    pub kind: Option<String>,
    pub author: Option<String>,
    pub supported: Vec<String>,
    pub platform: Option<String>,
    pub promoted_to: Option<String>,
    pub deprecated_by: Option<String>,
    /// Extension/version dependencies, from `requires` or `depends`.
    pub requires: Vec<String>,
    pub special_use: Vec<String>,
    pub provisional: bool,
    pub blocks: Vec<RawBlock>,
}

/// Whether a block enables or disables its items.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum BlockKind {
    Require,
    Remove,
}

/// A `<require>` or `<remove>` block.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RawBlock {
    pub kind: BlockKind,
    pub api: Option<String>,
    /// Dependency expression (`depends`, or legacy `feature`/`extension`).
    pub depends: Option<String>,
    pub items: Vec<RawItem>,
}

/// One directive item inside a block.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RawItem {
    Type(String),
    Command(String),
    Enum(RawEnumRef),
}

/// An `<enum>` inside a `<require>`/`<remove>` block.
///
/// With `extends` it adds a value to an enumeration; with `value`/`alias`
/// alone it defines an extension constant; with only `name` it references an
/// existing constant or value.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RawEnumRef {
    pub name: String,
    pub extends: Option<String>,
    pub value: Option<String>,
    pub bitpos: Option<String>,
    pub offset: Option<String>,
    pub negative: bool,
    pub extnumber: Option<String>,
    pub alias: Option<String>,
    pub comment: Option<String>,
    pub api: Option<String>,
}

impl RawEnumRef {
    /// Whether this item only references an existing name.
    pub fn is_reference(&self) -> bool {
        self.extends.is_none()
            && self.value.is_none()
            && self.bitpos.is_none()
            && self.offset.is_none()
            && self.alias.is_none()
    }
}
