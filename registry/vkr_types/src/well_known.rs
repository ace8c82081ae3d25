//! Well-known registry names.
//!
//! Names the resolver treats specially. Kept in one place so phases never
//! compare against scattered string literals.

/// Base type standing in for null-terminated `char` arrays.
pub const STRING: &str = "string";

/// Element type of extension-chain slots.
pub const VOID: &str = "void";

/// Member name of the extension-chain slot.
pub const NEXT_MEMBER: &str = "pNext";

/// Member holding a chainable struct's tag.
pub const STRUCTURE_TYPE_MEMBER: &str = "sType";

/// Enumeration of chain tags.
pub const STRUCTURE_TYPE: &str = "VkStructureType";

/// Enumeration of handle object types.
pub const OBJECT_TYPE: &str = "VkObjectType";

/// `len` marker for strings.
pub const NULL_TERMINATED: &str = "null-terminated";

/// Define carrying the header patch version.
pub const HEADER_VERSION: &str = "VK_HEADER_VERSION";

/// Name of the API constants `<enums>` block.
pub const API_CONSTANTS: &str = "API Constants";

/// Handle-defining macro for pointer-sized handles.
pub const DEFINE_HANDLE: &str = "VK_DEFINE_HANDLE";

/// Dispatch roots.
pub const INSTANCE: &str = "VkInstance";
pub const PHYSICAL_DEVICE: &str = "VkPhysicalDevice";
pub const DEVICE: &str = "VkDevice";
pub const COMMAND_BUFFER: &str = "VkCommandBuffer";

/// Instance-parented handle that still dispatches through the device.
pub const SWAPCHAIN: &str = "VkSwapchainKHR";

/// Base of extension enum values: `1_000_000_000 + (ext - 1) * 1000 + offset`.
pub const EXTENSION_ENUM_BASE: i64 = 1_000_000_000;

/// Value block width reserved per extension.
pub const EXTENSION_ENUM_BLOCK: i64 = 1000;
