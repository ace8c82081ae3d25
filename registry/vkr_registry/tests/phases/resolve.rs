//! Type resolution tests.
//!
//! These verify:
//! - Every referenced type resolves to an active canonical type
//! - Alias chains collapse
//! - Member modifiers, fixed array lengths and the `string` collapse
//! - Fatal errors: unknown names, alias cycles, unresolved member and
//!   parameter lengths

use pretty_assertions::assert_eq;
use vkr_registry::{build_from_path, build_from_str, RegistryError, RegistryOptions};
use vkr_types::{Modifier, TypeKind};

use crate::common::{fixture_path, registry, MINI_VK};

#[test]
fn test_every_referenced_type_is_active_and_canonical() {
    let registry = registry();
    for def in registry.unique_types() {
        let Some(layout) = def.struct_def() else {
            continue;
        };
        for member in &layout.members {
            assert!(registry.is_active(member.ty), "{}.{}", def.name, member.name);
            assert!(!registry.get(member.ty).is_alias(), "{}.{}", def.name, member.name);
        }
    }
    for cmd in registry.commands() {
        assert!(registry.is_active(cmd.return_type), "{}", cmd.name);
        for param in &cmd.params {
            assert!(registry.is_active(param.ty), "{}.{}", cmd.name, param.name);
        }
    }
}

#[test]
fn test_alias_collapses_to_target() {
    let registry = registry();
    let target = registry.resolve("VkPhysicalDeviceFeatures2").unwrap();
    assert_eq!(registry.resolve("VkPhysicalDeviceFeatures2KHR").unwrap(), target);

    let alias = registry.type_id("VkPhysicalDeviceFeatures2KHR").unwrap();
    assert_ne!(alias, target);
    assert!(matches!(registry.get(alias).kind, TypeKind::Alias { target: t } if t == target));
}

#[test]
fn test_basetype_keeps_its_name() {
    let registry = registry();
    let bool32 = registry.resolve("VkBool32").unwrap();
    let uint32 = registry.resolve("uint32_t").unwrap();
    assert_ne!(bool32, uint32);
    assert!(matches!(
        registry.get(bool32).kind,
        TypeKind::Base { underlying: Some(u) } if u == uint32
    ));
}

#[test]
fn test_unknown_and_inactive_types_do_not_resolve() {
    let registry = registry();
    assert!(matches!(
        registry.resolve("VkNotAType"),
        Err(RegistryError::UnknownType { .. })
    ));
    // Declared, but only the Win32 extension requires it.
    assert!(registry.resolve("VkWin32SurfaceCreateInfoKHR").is_err());
    assert!(registry.type_table().lookup("VkWin32SurfaceCreateInfoKHR").is_some());
}

#[test]
fn test_dispatchable_handles() {
    let registry = registry();
    for name in ["VkInstance", "VkPhysicalDevice", "VkDevice", "VkQueue", "VkCommandBuffer"] {
        assert!(registry.is_dispatchable(registry.resolve(name).unwrap()), "{name}");
    }
    for name in ["VkBuffer", "VkDeviceMemory", "VkSurfaceKHR", "uint64_t"] {
        assert!(!registry.is_dispatchable(registry.resolve(name).unwrap()), "{name}");
    }
}

#[test]
fn test_member_modifiers() {
    let registry = registry();

    let info = registry.resolve("VkInstanceCreateInfo").unwrap();
    let layout = registry.get(info).struct_def().unwrap();
    let names = layout
        .member("ppEnabledExtensionNames")
        .unwrap();
    assert_eq!(registry.name(names.ty), "string");
    assert!(matches!(
        names.outermost(),
        Some(Modifier::DynamicArray { is_const: true, .. })
    ));
    assert_eq!(names.length().unwrap().source, "enabledExtensionCount");

    let app_name = registry
        .get(registry.resolve("VkApplicationInfo").unwrap())
        .struct_def()
        .unwrap()
        .member("pApplicationName")
        .unwrap();
    assert_eq!(app_name.ty, registry.string_type());
    assert!(app_name.is_value());
    assert!(app_name.optional);

    let props = registry.resolve("VkPhysicalDeviceProperties").unwrap();
    let layout = registry.get(props).struct_def().unwrap();
    assert!(layout.returned_only);
    let Some(Modifier::FixedArray { len, .. }) = layout.member("deviceName").unwrap().outermost()
    else {
        panic!("deviceName is not a fixed array");
    };
    assert_eq!(len.value, 256);
    assert_eq!(len.constant.as_deref(), Some("VK_MAX_PHYSICAL_DEVICE_NAME_SIZE"));
}

#[test]
fn test_chain_pointer_members() {
    let registry = registry();
    let features = registry.resolve("VkPhysicalDeviceFeatures2").unwrap();
    let next = registry.get(features).struct_def().unwrap().member("pNext").unwrap();
    assert!(next.is_chain_pointer());
    assert!(matches!(
        next.outermost(),
        Some(Modifier::ChainPointer { is_const: false })
    ));

    let sc = registry.resolve("VkDeviceCreateInfo").unwrap();
    let next = registry.get(sc).struct_def().unwrap().member("pNext").unwrap();
    assert!(matches!(
        next.outermost(),
        Some(Modifier::ChainPointer { is_const: true })
    ));
}

#[test]
fn test_api_filter_drops_other_apis() {
    let registry = registry();
    let names: Vec<&str> = registry.features().iter().map(|f| f.name.as_str()).collect();
    assert_eq!(names, ["VK_VERSION_1_0", "VK_VERSION_1_1"]);
    assert_eq!(registry.api_version().to_string(), "1.1.280");
}

#[test]
fn test_build_from_path_reads_the_fixture() {
    let options = RegistryOptions::default().with_registry_file(fixture_path());
    let registry = build_from_path(&options).unwrap();
    assert!(registry.command("vkCreateInstance").is_some());
}

#[test]
fn test_missing_length_field_aborts() {
    let source = MINI_VK.replace(r#"len="descriptorSetCount""#, r#"len="descriptorSetTotal""#);
    let err = build_from_str(&source, &RegistryOptions::default()).unwrap_err();
    assert_eq!(
        err,
        RegistryError::UnresolvedLengthReference {
            owner: "vkFreeDescriptorSets".to_owned(),
            member: "pDescriptorSets".to_owned(),
            expr: "descriptorSetTotal".to_owned(),
            reference: "descriptorSetTotal".to_owned(),
        }
    );
    assert_eq!(err.code().as_str(), "E2004");
}

#[test]
fn test_missing_struct_member_length_aborts() {
    let source = MINI_VK.replacen(
        r#"len="enabledExtensionCount,null-terminated""#,
        r#"len="enabledNameCount,null-terminated""#,
        1,
    );
    let err = build_from_str(&source, &RegistryOptions::default()).unwrap_err();
    assert_eq!(
        err,
        RegistryError::UnresolvedLengthReference {
            owner: "VkInstanceCreateInfo".to_owned(),
            member: "ppEnabledExtensionNames".to_owned(),
            expr: "enabledNameCount".to_owned(),
            reference: "enabledNameCount".to_owned(),
        }
    );
}

#[test]
fn test_alias_cycle_aborts() {
    let source = MINI_VK.replace(
        r#"name="VkPhysicalDeviceFeatures2KHR" alias="VkPhysicalDeviceFeatures2""#,
        r#"name="VkPhysicalDeviceFeatures2KHR" alias="VkPhysicalDeviceFeatures2KHR""#,
    );
    let err = build_from_str(&source, &RegistryOptions::default()).unwrap_err();
    assert!(matches!(err, RegistryError::CyclicAlias { .. }));
}

#[test]
fn test_unknown_required_type_aborts() {
    let source = MINI_VK.replace(
        r#"<type name="VkSwapchainCreateInfoKHR"/>"#,
        r#"<type name="VkSwapchainCreateInfoXYZ"/>"#,
    );
    let err = build_from_str(&source, &RegistryOptions::default()).unwrap_err();
    assert_eq!(
        err,
        RegistryError::UnresolvedRequire {
            source_name: "VK_KHR_swapchain".to_owned(),
            kind: vkr_diagnostic::EntityKind::Type,
            name: "VkSwapchainCreateInfoXYZ".to_owned(),
        }
    );
}
