//! Handle lifetime tests.
//!
//! These verify:
//! - Create, pool-allocate and get commands with their parameter indices
//! - Destroy and free commands, pool resets
//! - Object type enumerants from the attribute, the comment or the name

use pretty_assertions::assert_eq;
use vkr_registry::{CreateKind, HandleDestroyCommand, HandleInfo, Registry};

use crate::common::{registry, registry_with, win32};

fn info<'a>(registry: &'a Registry, handle: &str) -> &'a HandleInfo {
    let id = registry.resolve(handle).unwrap();
    registry
        .handle_infos()
        .handle_info(id)
        .unwrap_or_else(|| panic!("no handle info for `{handle}`"))
}

#[test]
fn test_pool_allocated_handle() {
    let registry = registry();
    let buffers = info(&registry, "VkCommandBuffer");
    assert_eq!(buffers.parent, Some(registry.resolve("VkDevice").unwrap()));
    assert_eq!(buffers.pool, Some(registry.resolve("VkCommandPool").unwrap()));
    assert_eq!(buffers.object_type.as_deref(), Some("VK_OBJECT_TYPE_COMMAND_BUFFER"));

    let [create] = buffers.create_cmds.as_slice() else {
        panic!("expected one create command, got {:?}", buffers.create_cmds);
    };
    assert_eq!(create.command, "vkAllocateCommandBuffers");
    assert_eq!(create.kind, CreateKind::PoolAllocate);
    assert_eq!(create.pool_member.as_deref(), Some("commandPool"));
    assert_eq!(create.parent_param, Some(0));
    assert_eq!(create.create_info_param, Some(1));
    assert_eq!(create.handle_param, 2);
    assert_eq!(
        create.create_info,
        Some(registry.resolve("VkCommandBufferAllocateInfo").unwrap())
    );

    assert_eq!(
        buffers.destroy_cmd,
        Some(HandleDestroyCommand {
            command: "vkFreeCommandBuffers".to_owned(),
            parent_param: Some(0),
            pool_param: Some(1),
            handle_param: Some(3),
        })
    );
}

#[test]
fn test_pool_knows_its_element() {
    let registry = registry();
    let pool = info(&registry, "VkCommandPool");
    assert_eq!(pool.pool_elem, Some(registry.resolve("VkCommandBuffer").unwrap()));
    assert_eq!(pool.object_type.as_deref(), Some("VK_OBJECT_TYPE_COMMAND_POOL"));
    assert!(pool.create_cmds[0].is_create());
    assert_eq!(
        pool.destroy_cmd.as_ref().map(|d| d.command.as_str()),
        Some("vkDestroyCommandPool")
    );
}

#[test]
fn test_descriptor_pool_reset() {
    let registry = registry();
    let sets = info(&registry, "VkDescriptorSet");
    assert_eq!(sets.object_type.as_deref(), Some("VK_OBJECT_TYPE_DESCRIPTOR_SET"));
    assert_eq!(
        sets.reset_pool_cmd,
        Some(HandleDestroyCommand {
            command: "vkResetDescriptorPool".to_owned(),
            parent_param: Some(0),
            pool_param: Some(1),
            handle_param: None,
        })
    );

    let reset = registry.command("vkResetDescriptorPool").unwrap();
    let handles = registry.handle_infos();
    let (pool, elem) = handles.command_pool_reset(reset).unwrap();
    assert_eq!(registry.name(pool.handle), "VkDescriptorPool");
    assert_eq!(registry.name(elem.handle), "VkDescriptorSet");
    assert!(handles.is_reset_pool_command(reset));
    assert!(!handles.is_destroy_command(reset));
}

#[test]
fn test_allocate_without_pool_is_a_create() {
    let registry = registry();
    let memory = info(&registry, "VkDeviceMemory");
    assert_eq!(memory.create_cmds[0].command, "vkAllocateMemory");
    assert_eq!(memory.create_cmds[0].kind, CreateKind::Create);
    assert_eq!(memory.pool, None);

    let destroy = memory.destroy_cmd.as_ref().unwrap();
    assert_eq!(destroy.command, "vkFreeMemory");
    assert_eq!(destroy.parent_param, Some(0));
    assert_eq!(destroy.handle_param, Some(1));
}

#[test]
fn test_get_commands() {
    let registry = registry();
    let handles = registry.handle_infos();

    let devices = info(&registry, "VkPhysicalDevice");
    assert!(devices.create_cmds[0].is_get());
    assert_eq!(devices.create_cmds[0].command, "vkEnumeratePhysicalDevices");
    assert_eq!(devices.create_cmds[0].handle_param, 2);
    assert_eq!(devices.destroy_cmd, None);

    let queue = registry.command("vkGetDeviceQueue").unwrap();
    assert!(handles.is_get_command(queue));
    let (created, create) = handles.command_handle_created(queue).unwrap();
    assert_eq!(registry.name(created.handle), "VkQueue");
    assert_eq!(create.handle_param, 3);
}

#[test]
fn test_root_handle_has_no_parent() {
    let registry = registry();
    let instance = info(&registry, "VkInstance");
    assert_eq!(instance.parent, None);
    assert_eq!(instance.create_cmds[0].parent_param, None);
    let destroy = instance.destroy_cmd.as_ref().unwrap();
    assert_eq!(destroy.parent_param, None);
    assert_eq!(destroy.handle_param, Some(0));
}

#[test]
fn test_create_and_destroy_queries() {
    let registry = registry();
    let handles = registry.handle_infos();
    let create = registry.command("vkCreateBuffer").unwrap();
    let destroy = registry.command("vkDestroyBuffer").unwrap();
    let allocate = registry.command("vkAllocateDescriptorSets").unwrap();

    assert!(handles.is_create_command(create));
    assert!(!handles.is_create_command(destroy));
    assert!(handles.is_pool_allocate_command(allocate));
    assert!(handles.is_destroy_command(destroy));
    assert_eq!(
        handles.command_handle_destroyed(destroy).map(|i| registry.name(i.handle)),
        Some("VkBuffer")
    );
    assert!(!handles.is_destroy_command(registry.command("vkCmdDraw").unwrap()));
}

#[test]
fn test_platform_create_commands_follow_selection() {
    let registry = registry();
    let surface = info(&registry, "VkSurfaceKHR");
    assert!(surface.create_cmds.is_empty());
    assert_eq!(surface.parent, Some(registry.resolve("VkInstance").unwrap()));
    assert_eq!(
        surface.destroy_cmd.as_ref().map(|d| d.command.as_str()),
        Some("vkDestroySurfaceKHR")
    );

    let registry = registry_with(&win32());
    let surface = info(&registry, "VkSurfaceKHR");
    let names: Vec<&str> = surface.create_cmds.iter().map(|c| c.command.as_str()).collect();
    assert_eq!(names, ["vkCreateWin32SurfaceKHR"]);
}

#[test]
fn test_every_active_handle_has_info() {
    let registry = registry();
    let handles = registry.handle_infos();
    for def in registry.unique_types().filter(|def| def.handle_def().is_some()) {
        assert!(handles.handle_info(def.id).is_some(), "{}", def.name);
    }
    assert_eq!(
        handles.len(),
        registry
            .unique_types()
            .filter(|def| def.handle_def().is_some())
            .count()
    );
}
