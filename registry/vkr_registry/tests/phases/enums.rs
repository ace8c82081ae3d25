//! Enumeration merge tests.
//!
//! These verify:
//! - Extension values computed from extension number and offset
//! - Promoted names stay canonical, extension synonyms alias them
//! - Values from unselected extensions never appear

use pretty_assertions::assert_eq;
use vkr_types::EnumValue;

use crate::common::{registry, registry_with, win32};

fn value<'a>(values: &'a [EnumValue], name: &str) -> &'a EnumValue {
    values
        .iter()
        .find(|v| v.name == name)
        .unwrap_or_else(|| panic!("`{name}` not merged"))
}

#[test]
fn test_core_values_keep_declared_order() {
    let registry = registry();
    let values = registry.enum_values("VkResult").unwrap();
    let names: Vec<&str> = values.iter().map(|v| v.name.as_str()).collect();
    assert_eq!(
        names[..4],
        [
            "VK_SUCCESS",
            "VK_NOT_READY",
            "VK_ERROR_OUT_OF_HOST_MEMORY",
            "VK_ERROR_INITIALIZATION_FAILED",
        ]
    );
    assert_eq!(value(values, "VK_SUCCESS").comment.as_deref(), Some("Command completed successfully"));
}

#[test]
fn test_extension_values_use_extension_number() {
    let registry = registry();
    let results = registry.enum_values("VkResult").unwrap();
    assert_eq!(value(results, "VK_ERROR_SURFACE_LOST_KHR").value, -1_000_000_000);

    let objects = registry.enum_values("VkObjectType").unwrap();
    assert_eq!(value(objects, "VK_OBJECT_TYPE_SURFACE_KHR").value, 1_000_000_000);
    assert_eq!(value(objects, "VK_OBJECT_TYPE_SWAPCHAIN_KHR").value, 1_000_001_000);
}

#[test]
fn test_promoted_value_is_canonical() {
    let registry = registry();
    let stypes = registry.enum_values("VkStructureType").unwrap();

    let core = value(stypes, "VK_STRUCTURE_TYPE_PHYSICAL_DEVICE_FEATURES_2");
    assert_eq!(core.value, 1_000_059_000);
    assert_eq!(core.alias_of, None);

    let khr = value(stypes, "VK_STRUCTURE_TYPE_PHYSICAL_DEVICE_FEATURES_2_KHR");
    assert_eq!(khr.value, 1_000_059_000);
    assert_eq!(
        khr.alias_of.as_deref(),
        Some("VK_STRUCTURE_TYPE_PHYSICAL_DEVICE_FEATURES_2")
    );
}

#[test]
fn test_shared_extension_number_aliases_first_name() {
    let registry = registry();
    let results = registry.enum_values("VkResult").unwrap();

    let khr = value(results, "VK_ERROR_OUT_OF_POOL_MEMORY_KHR");
    assert_eq!(khr.value, -1_000_069_000);
    assert_eq!(khr.alias_of, None);

    let ext = value(results, "VK_ERROR_OUT_OF_POOL_MEMORY_EXT");
    assert_eq!(ext.value, -1_000_069_000);
    assert_eq!(ext.alias_of.as_deref(), Some("VK_ERROR_OUT_OF_POOL_MEMORY_KHR"));
}

#[test]
fn test_unselected_extension_values_are_absent() {
    let registry = registry();
    let stypes = registry.enum_values("VkStructureType").unwrap();
    assert!(stypes.iter().all(|v| v.name != "VK_STRUCTURE_TYPE_PRIVATE_DATA_NV"));
    assert!(stypes
        .iter()
        .all(|v| v.name != "VK_STRUCTURE_TYPE_WIN32_SURFACE_CREATE_INFO_KHR"));

    let registry = registry_with(&win32());
    let stypes = registry.enum_values("VkStructureType").unwrap();
    assert_eq!(
        value(stypes, "VK_STRUCTURE_TYPE_WIN32_SURFACE_CREATE_INFO_KHR").value,
        1_000_008_000
    );
}

#[test]
fn test_bitmask_values() {
    let registry = registry();
    let id = registry.resolve("VkCommandPoolCreateFlagBits").unwrap();
    let def = registry.get(id).enum_def().unwrap();
    assert!(def.is_bitmask);
    assert_eq!(def.bitwidth, 32);
    let bits = def.integer_values();
    assert_eq!(bits["VK_COMMAND_POOL_CREATE_TRANSIENT_BIT"], 1);
    assert_eq!(bits["VK_COMMAND_POOL_CREATE_RESET_COMMAND_BUFFER_BIT"], 2);
}

#[test]
fn test_api_constants() {
    let registry = registry();
    let constants = registry.constants();
    assert_eq!(constants.get("VK_UUID_SIZE").unwrap().value, Some(16));
    let luid = constants.get("VK_LUID_SIZE_KHR").unwrap();
    assert_eq!(luid.alias_of.as_deref(), Some("VK_LUID_SIZE"));
    assert_eq!(luid.value, Some(8));
    assert_eq!(
        constants.get("VK_KHR_SWAPCHAIN_EXTENSION_NAME").unwrap().literal,
        "\"VK_KHR_swapchain\""
    );
}
