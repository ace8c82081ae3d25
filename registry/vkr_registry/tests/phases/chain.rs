//! Structure chain tests.

use pretty_assertions::assert_eq;
use vkr_registry::ChainTag;

use crate::common::registry;

#[test]
fn test_tag_maps_to_structure() {
    let registry = registry();
    let chain = registry.chain();
    let features = registry.resolve("VkPhysicalDeviceFeatures2").unwrap();

    assert_eq!(
        chain.struct_for("VK_STRUCTURE_TYPE_PHYSICAL_DEVICE_FEATURES_2"),
        Some(features)
    );
    assert_eq!(
        chain.tag_of(features),
        Some(&ChainTag {
            name: "VK_STRUCTURE_TYPE_PHYSICAL_DEVICE_FEATURES_2".to_owned(),
            value: Some(1_000_059_000),
        })
    );
    assert_eq!(chain.struct_for("VK_STRUCTURE_TYPE_PRIVATE_DATA_NV"), None);
}

#[test]
fn test_slot_downcasts_extenders_only() {
    let registry = registry();
    let chain = registry.chain();
    let device_info = registry.resolve("VkDeviceCreateInfo").unwrap();
    let features = registry.resolve("VkPhysicalDeviceFeatures2").unwrap();

    assert_eq!(chain.extenders(device_info), [features]);
    let slot = chain.slot(device_info);
    assert_eq!(slot.owner(), device_info);
    assert_eq!(slot.tag().map(|t| t.value), Some(Some(3)));
    assert_eq!(
        slot.downcast("VK_STRUCTURE_TYPE_PHYSICAL_DEVICE_FEATURES_2"),
        Some(features)
    );
    assert_eq!(slot.downcast("VK_STRUCTURE_TYPE_BUFFER_CREATE_INFO"), None);

    let instance_info = registry.resolve("VkInstanceCreateInfo").unwrap();
    assert!(chain.slot(instance_info).candidates().is_empty());
}

#[test]
fn test_extended_by_is_the_inverse_of_extends() {
    let registry = registry();
    let device_info = registry.resolve("VkDeviceCreateInfo").unwrap();
    let features = registry.resolve("VkPhysicalDeviceFeatures2").unwrap();
    let base = registry.get(device_info).struct_def().unwrap();
    let extender = registry.get(features).struct_def().unwrap();
    assert_eq!(base.extended_by, [features]);
    assert_eq!(extender.extends, [device_info]);
}

#[test]
fn test_inactive_structures_have_no_tag() {
    let registry = registry();
    let win32 = registry
        .type_table()
        .lookup("VkWin32SurfaceCreateInfoKHR")
        .unwrap();
    assert_eq!(registry.chain().tag_of(win32), None);
    assert!(registry.chain().len() >= 8);
}
