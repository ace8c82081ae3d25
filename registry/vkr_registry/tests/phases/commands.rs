//! Command table tests.
//!
//! These verify:
//! - Dispatch classification through handle parent chains
//! - Parameter order, optionality and length expressions
//! - Alias lookup and the introducing core version

use pretty_assertions::assert_eq;
use vkr_registry::{DispatchClass, Registry};
use vkr_types::{LengthToken, Modifier};

use crate::common::registry;

fn dispatch(registry: &Registry, name: &str) -> DispatchClass {
    registry
        .dispatch_class(name)
        .unwrap_or_else(|| panic!("`{name}` is not an active command"))
}

#[test]
fn test_global_commands() {
    let registry = registry();
    assert_eq!(dispatch(&registry, "vkCreateInstance"), DispatchClass::Global);
    assert_eq!(dispatch(&registry, "vkEnumerateInstanceVersion"), DispatchClass::Global);
}

#[test]
fn test_instance_commands() {
    let registry = registry();
    for name in [
        "vkDestroyInstance",
        "vkEnumeratePhysicalDevices",
        "vkGetPhysicalDeviceProperties",
        "vkCreateDevice",
        "vkDestroySurfaceKHR",
    ] {
        assert_eq!(dispatch(&registry, name), DispatchClass::Instance, "{name}");
    }
}

#[test]
fn test_device_commands() {
    let registry = registry();
    for name in [
        "vkDestroyDevice",
        "vkGetDeviceQueue",
        "vkCmdDraw",
        "vkFreeCommandBuffers",
        "vkCreateSwapchainKHR",
        "vkDestroySwapchainKHR",
    ] {
        assert_eq!(dispatch(&registry, name), DispatchClass::Device, "{name}");
    }
}

#[test]
fn test_parameters_keep_declared_order() {
    let registry = registry();
    let cmd = registry.command("vkGetDeviceQueue").unwrap();
    let names: Vec<&str> = cmd.params.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, ["device", "queueFamilyIndex", "queueIndex", "pQueue"]);
    assert_eq!(registry.name(cmd.return_type), "void");
}

#[test]
fn test_output_parameters_are_optional() {
    let registry = registry();
    let cmd = registry.command("vkEnumeratePhysicalDevices").unwrap();

    let count = cmd.find_parameter("pPhysicalDeviceCount").unwrap();
    assert!(count.is_output);
    assert!(count.optional);

    let instance = cmd.find_parameter("instance").unwrap();
    assert!(!instance.optional);
    assert!(instance.is_value());
}

#[test]
fn test_length_through_pointer_sibling_is_dereferenced() {
    let registry = registry();
    let cmd = registry.command("vkEnumeratePhysicalDevices").unwrap();
    let devices = cmd.find_parameter("pPhysicalDevices").unwrap();
    let len = devices.length().unwrap();
    assert_eq!(len.render(None), "*pPhysicalDeviceCount");
    assert_eq!(len.as_sibling(), Some("pPhysicalDeviceCount"));
}

#[test]
fn test_length_through_struct_field() {
    let registry = registry();
    let cmd = registry.command("vkAllocateCommandBuffers").unwrap();
    let buffers = cmd.find_parameter("pCommandBuffers").unwrap();
    let len = buffers.length().unwrap();
    assert_eq!(len.render(None), "pAllocateInfo->commandBufferCount");
    assert_eq!(len.as_sibling(), None);
    assert_eq!(
        len.tokens,
        [LengthToken::Field {
            path: "pAllocateInfo->commandBufferCount".to_owned(),
            deref: false,
        }]
    );
    assert!(matches!(
        buffers.outermost(),
        Some(Modifier::DynamicArray { is_const: false, .. })
    ));
}

#[test]
fn test_alias_resolves_to_target() {
    let registry = registry();
    let cmd = registry.command("vkGetPhysicalDeviceFeatures2KHR").unwrap();
    assert_eq!(cmd.name, "vkGetPhysicalDeviceFeatures2");
    assert_eq!(cmd.aliases, ["vkGetPhysicalDeviceFeatures2KHR"]);
    assert_eq!(cmd.feature.as_deref(), Some("VK_VERSION_1_1"));
    assert!(cmd.is_instance());
    assert!(registry.command_table().contains("vkGetPhysicalDeviceFeatures2KHR"));
}

#[test]
fn test_success_and_error_codes() {
    let registry = registry();
    let cmd = registry.command("vkCreateInstance").unwrap();
    assert_eq!(cmd.success_codes, ["VK_SUCCESS"]);
    assert_eq!(
        cmd.error_codes,
        ["VK_ERROR_OUT_OF_HOST_MEMORY", "VK_ERROR_INITIALIZATION_FAILED"]
    );
    assert_eq!(cmd.feature.as_deref(), Some("VK_VERSION_1_0"));
}

#[test]
fn test_inactive_commands_are_absent() {
    let registry = registry();
    assert!(registry.command("vkCreateWin32SurfaceKHR").is_none());
    assert!(registry.dispatch_class("vkCreateWin32SurfaceKHR").is_none());
    assert!(registry.commands().all(|cmd| cmd.name != "vkCreateWin32SurfaceKHR"));
}
