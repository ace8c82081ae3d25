//! Platform partition tests.
//!
//! These verify:
//! - Only selected platforms get buckets, core always first
//! - Entities land in the bucket of the extension that brought them in
//! - The buckets cover every active entity exactly once

use pretty_assertions::assert_eq;
use rustc_hash::FxHashSet;
use vkr_registry::{Registry, RegistryOptions};

use crate::common::{registry, registry_with, win32};

fn bucket_names(registry: &Registry) -> Vec<&str> {
    registry.platforms().map(|p| p.name.as_str()).collect()
}

fn assert_disjoint_cover(registry: &Registry) {
    let mut types = FxHashSet::default();
    let mut commands = FxHashSet::default();
    let mut values = FxHashSet::default();
    for platform in registry.platforms() {
        for &id in &platform.types {
            assert!(types.insert(id), "{} in two buckets", registry.name(id));
        }
        for name in &platform.commands {
            assert!(commands.insert(name.as_str()), "{name} in two buckets");
        }
        for value in &platform.enum_values {
            assert!(values.insert(value.name.as_str()), "{} in two buckets", value.name);
        }
    }

    assert_eq!(types.len(), registry.types().count());
    let command_names: usize = registry.commands().map(|cmd| 1 + cmd.aliases.len()).sum();
    assert_eq!(commands.len(), command_names);
    let value_count: usize = registry
        .unique_types()
        .filter_map(|def| def.enum_def())
        .map(|def| def.values.len())
        .sum();
    assert_eq!(values.len(), value_count);
}

#[test]
fn test_default_options_have_only_core() {
    let registry = registry();
    assert_eq!(bucket_names(&registry), [""]);
    let core = registry.platform_table().core();
    assert!(core.is_core());
    assert!(core.guard.is_empty());
    assert!(core.extensions.iter().any(|e| e == "VK_KHR_swapchain"));
}

#[test]
fn test_win32_bucket_contents() {
    let registry = registry_with(&win32());
    assert_eq!(bucket_names(&registry), ["", "win32"]);

    let win32 = registry.platform("win32").unwrap();
    assert_eq!(win32.guard, "VK_USE_PLATFORM_WIN32_KHR");
    assert_eq!(win32.extensions, ["VK_KHR_win32_surface"]);
    assert_eq!(win32.commands, ["vkCreateWin32SurfaceKHR"]);

    let info = registry.resolve("VkWin32SurfaceCreateInfoKHR").unwrap();
    let hwnd = registry.resolve("HWND").unwrap();
    assert!(win32.types.contains(&info));
    assert!(win32.types.contains(&hwnd));
    assert!(win32
        .enum_values
        .iter()
        .any(|v| v.name == "VK_STRUCTURE_TYPE_WIN32_SURFACE_CREATE_INFO_KHR"));

    let table = registry.platform_table();
    assert_eq!(table.guard_of_type(info), Some("VK_USE_PLATFORM_WIN32_KHR"));
    assert_eq!(table.guard_of_command("vkCreateWin32SurfaceKHR"), Some("VK_USE_PLATFORM_WIN32_KHR"));
}

#[test]
fn test_shared_types_stay_core() {
    let registry = registry_with(&win32());
    let surface = registry.resolve("VkSurfaceKHR").unwrap();
    let table = registry.platform_table();
    assert_eq!(table.guard_of_type(surface), Some(""));
    assert_eq!(table.guard_of_command("vkDestroySurfaceKHR"), Some(""));
    assert!(table.core().types.contains(&surface));
}

#[test]
fn test_command_aliases_share_the_bucket() {
    let registry = registry();
    let core = registry.platform_table().core();
    assert!(core.commands.iter().any(|c| c == "vkGetPhysicalDeviceFeatures2"));
    assert!(core.commands.iter().any(|c| c == "vkGetPhysicalDeviceFeatures2KHR"));
}

#[test]
fn test_everything_declares_every_platform() {
    let registry = registry_with(&RegistryOptions::everything());
    assert_eq!(bucket_names(&registry), ["", "xlib", "win32"]);
    assert!(registry.platform("xlib").unwrap().types.is_empty());
    assert!(registry.extension("VK_NV_private_data").is_some());
    assert!(registry.extension("VK_KHR_extension_90").is_none());
}

#[test]
fn test_partition_is_a_disjoint_cover() {
    assert_disjoint_cover(&registry());
    assert_disjoint_cover(&registry_with(&win32()));
    assert_disjoint_cover(&registry_with(&RegistryOptions::everything()));
}
