//! Handle lifetimes.
//!
//! For every active handle type: which commands create it, which destroys
//! it, which pool it lives in and which command resets that pool. Interception
//! layers use this to track object lifetimes.
//!
//! # Recognized shapes
//!
//! - Create: `vkCreate*`, `vkAllocate*` and a fixed list of getters. The
//!   first handle value is the parent, a const pointer to a structure other
//!   than the allocator is the create info, a non-const pointer to a handle
//!   is the result.
//! - `vkAllocate*` whose create info holds a handle allocates from that pool;
//!   otherwise (`vkAllocateMemory`) it is a plain create.
//! - Destroy: `vkDestroy*(parent?, handle, allocator)`, and
//!   `vkFree*(parent, pool, count, handles)` except `vkFreeMemory`, which is a
//!   destroy.
//! - Pool reset: `vkResetDescriptorPool(parent, pool, ...)`.
//!
//! Commands that don't fit their shape are skipped with a warning.

use rustc_hash::FxHashMap;
use vkr_types::well_known;
use vkr_types::{Member, Modifier, TypeId, TypeKind, TypeTable};

use crate::command::{Command, CommandTable};

/// Getter commands that hand out existing handles.
const GET_COMMANDS: [&str; 5] = [
    "vkEnumeratePhysicalDevices",
    "vkGetDeviceQueue",
    "vkGetDeviceQueue2",
    "vkGetSwapchainImagesKHR",
    "vkGetDisplayPlaneSupportedDisplaysKHR",
];

const POOL_RESET_COMMANDS: [&str; 1] = ["vkResetDescriptorPool"];

const ALLOCATION_CALLBACKS: &str = "VkAllocationCallbacks";
const FREE_MEMORY: &str = "vkFreeMemory";
const UNKNOWN_OBJECT_TYPE: &str = "VK_OBJECT_TYPE_UNKNOWN";

/// How a create command produces its handles.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum CreateKind {
    /// New handles that belong to no pool (`vkCreateImage`).
    Create,
    /// New handles allocated from a pool (`vkAllocateDescriptorSets`).
    PoolAllocate,
    /// Existing handles (`vkGetDeviceQueue`).
    Get,
}

/// A command that creates or hands out a handle type.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct HandleCreateCommand {
    pub command: String,
    /// Index of the parent handle parameter.
    pub parent_param: Option<usize>,
    pub create_info: Option<TypeId>,
    pub create_info_param: Option<usize>,
    /// Member of the create info naming the pool.
    pub pool_member: Option<String>,
    /// Index of the output handle parameter.
    pub handle_param: usize,
    pub kind: CreateKind,
}

impl HandleCreateCommand {
    #[inline]
    pub fn is_create(&self) -> bool {
        self.kind == CreateKind::Create
    }

    #[inline]
    pub fn is_pool_allocate(&self) -> bool {
        self.kind == CreateKind::PoolAllocate
    }

    #[inline]
    pub fn is_get(&self) -> bool {
        self.kind == CreateKind::Get
    }
}

/// A command that destroys handles, or resets a pool.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct HandleDestroyCommand {
    pub command: String,
    pub parent_param: Option<usize>,
    pub pool_param: Option<usize>,
    /// `None` for pool resets.
    pub handle_param: Option<usize>,
}

/// Lifetime information for one handle type.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct HandleInfo {
    pub handle: TypeId,
    /// Parent as its create commands see it.
    pub parent: Option<TypeId>,
    pub pool: Option<TypeId>,
    /// Handle type allocated from this one, when this is a pool.
    pub pool_elem: Option<TypeId>,
    pub create_cmds: Vec<HandleCreateCommand>,
    pub destroy_cmd: Option<HandleDestroyCommand>,
    /// Command that frees every handle of this type in its pool.
    pub reset_pool_cmd: Option<HandleDestroyCommand>,
    /// `VkObjectType` enumerant.
    pub object_type: Option<String>,
}

impl HandleInfo {
    fn new(handle: TypeId, parent: Option<TypeId>, pool: Option<TypeId>) -> Self {
        HandleInfo {
            handle,
            parent,
            pool,
            pool_elem: None,
            create_cmds: Vec::new(),
            destroy_cmd: None,
            reset_pool_cmd: None,
            object_type: None,
        }
    }
}

/// Handle info for every active handle type, in declaration order.
#[derive(Clone, Debug, Default)]
pub struct HandleInfoTable {
    infos: Vec<HandleInfo>,
    by_handle: FxHashMap<TypeId, usize>,
}

/// Parameter shapes the recognizers look for.
fn handle_value(types: &TypeTable, p: &Member) -> Option<TypeId> {
    (p.is_value() && matches!(types.get(p.ty).kind, TypeKind::Handle(_))).then_some(p.ty)
}

/// `Some(is_const)` for a single pointer or array level.
fn single_indirection(p: &Member) -> Option<bool> {
    match p.modifiers.as_slice() {
        [Modifier::Pointer { is_const } | Modifier::DynamicArray { is_const, .. }] => Some(*is_const),
        _ => None,
    }
}

fn is_struct(types: &TypeTable, id: TypeId) -> bool {
    matches!(types.get(id).kind, TypeKind::Struct(_) | TypeKind::Union(_))
}

fn is_handle(types: &TypeTable, id: TypeId) -> bool {
    matches!(types.get(id).kind, TypeKind::Handle(_))
}

impl HandleInfoTable {
    /// Build from the active commands and handle types.
    #[tracing::instrument(level = "debug", skip_all, fields(commands = commands.len()))]
    pub fn build(
        types: &TypeTable,
        commands: &CommandTable,
        is_active: impl Fn(TypeId) -> bool,
    ) -> Self {
        let mut table = HandleInfoTable::default();

        for cmd in commands.iter() {
            if cmd.name.starts_with("vkCreate") || cmd.name.starts_with("vkAllocate") {
                table.add_create(types, cmd);
            }
        }
        for name in GET_COMMANDS {
            if let Some(cmd) = commands.get(name) {
                table.add_create(types, cmd);
            }
        }

        for def in types.unique_types() {
            if let TypeKind::Handle(handle) = &def.kind {
                if is_active(def.id) && !table.by_handle.contains_key(&def.id) {
                    tracing::debug!(handle = %def.name, "no create command found");
                    table.insert(HandleInfo::new(def.id, handle.parent, None));
                }
            }
        }

        for cmd in commands.iter() {
            if cmd.name == FREE_MEMORY || cmd.name.starts_with("vkDestroy") {
                table.add_destroy(types, cmd);
            } else if cmd.name.starts_with("vkFree") {
                table.add_free(types, cmd);
            }
        }
        for name in POOL_RESET_COMMANDS {
            if let Some(cmd) = commands.get(name) {
                table.add_pool_reset(types, cmd);
            }
        }

        table.link_object_types(types);
        table.link_pools();
        tracing::debug!(handles = table.infos.len(), "handle info built");
        table
    }

    fn insert(&mut self, info: HandleInfo) -> usize {
        let at = self.infos.len();
        self.by_handle.insert(info.handle, at);
        self.infos.push(info);
        at
    }

    fn add_create(&mut self, types: &TypeTable, cmd: &Command) {
        let mut parent_param = None;
        let mut create_info_param = None;
        let mut handle_param = None;
        for (at, p) in cmd.params.iter().enumerate() {
            if handle_value(types, p).is_some() && parent_param.is_none() {
                parent_param = Some(at);
            }
            let Some(is_const) = single_indirection(p) else {
                continue;
            };
            if is_const && is_struct(types, p.ty) && types.name(p.ty) != ALLOCATION_CALLBACKS {
                if create_info_param.is_some() {
                    tracing::warn!(command = %cmd.name, "several create info parameters, skipped");
                    return;
                }
                create_info_param = Some(at);
            } else if !is_const && is_handle(types, p.ty) {
                if handle_param.is_some() {
                    tracing::warn!(command = %cmd.name, "several handle outputs, skipped");
                    return;
                }
                handle_param = Some(at);
            }
        }
        let Some(handle_param) = handle_param else {
            tracing::warn!(command = %cmd.name, "no handle parameter found, skipped");
            return;
        };

        let parent = parent_param.map(|at| cmd.params[at].ty);
        let create_info = create_info_param.map(|at| cmd.params[at].ty);
        let mut pool_member = None;
        let mut pool = None;
        let kind = if cmd.name.starts_with("vkCreate") {
            CreateKind::Create
        } else if cmd.name.starts_with("vkAllocate") {
            let members = create_info
                .and_then(|id| types.get(id).struct_def())
                .map(|def| def.members.as_slice())
                .unwrap_or_default();
            if let Some(member) = members.iter().find(|m| handle_value(types, m).is_some()) {
                pool_member = Some(member.name.clone());
                pool = Some(member.ty);
                CreateKind::PoolAllocate
            } else {
                CreateKind::Create
            }
        } else {
            CreateKind::Get
        };

        let handle = cmd.params[handle_param].ty;
        let create = HandleCreateCommand {
            command: cmd.name.clone(),
            parent_param,
            create_info,
            create_info_param,
            pool_member,
            handle_param,
            kind,
        };
        let at = match self.by_handle.get(&handle) {
            Some(&at) => {
                let info = &self.infos[at];
                if info.parent != parent || info.pool != pool {
                    tracing::warn!(
                        command = %cmd.name,
                        handle = types.name(handle),
                        "create command disagrees on parent or pool"
                    );
                }
                at
            }
            None => self.insert(HandleInfo::new(handle, parent, pool)),
        };
        self.infos[at].create_cmds.push(create);
    }

    fn add_destroy(&mut self, types: &TypeTable, cmd: &Command) {
        let (parent_param, rest) = match cmd.params.len() {
            2 => (None, 0),
            3 if handle_value(types, &cmd.params[0]).is_some() => (Some(0), 1),
            _ => {
                tracing::warn!(command = %cmd.name, "unexpected destroy shape, skipped");
                return;
            }
        };
        let Some(handle) = handle_value(types, &cmd.params[rest]) else {
            tracing::warn!(command = %cmd.name, "destroyed parameter is not a handle, skipped");
            return;
        };
        let allocator = &cmd.params[rest + 1];
        let allocator_ok = matches!(allocator.modifiers.as_slice(), [Modifier::Pointer { .. }])
            && is_struct(types, allocator.ty);
        if !allocator_ok {
            tracing::warn!(command = %cmd.name, "missing allocator parameter, skipped");
            return;
        }
        self.set_destroy(
            types,
            handle,
            HandleDestroyCommand {
                command: cmd.name.clone(),
                parent_param,
                pool_param: None,
                handle_param: Some(rest),
            },
        );
    }

    fn add_free(&mut self, types: &TypeTable, cmd: &Command) {
        let shape = match cmd.params.as_slice() {
            [parent, pool, count, handles] => handle_value(types, parent)
                .and(handle_value(types, pool))
                .filter(|_| count.is_value() && types.name(count.ty) == "uint32_t")
                .filter(|_| matches!(handles.outermost(), Some(Modifier::DynamicArray { .. })))
                .filter(|_| handles.modifiers.len() == 1 && is_handle(types, handles.ty))
                .map(|_| handles.ty),
            _ => None,
        };
        let Some(handle) = shape else {
            tracing::warn!(command = %cmd.name, "unexpected free shape, skipped");
            return;
        };
        self.set_destroy(
            types,
            handle,
            HandleDestroyCommand {
                command: cmd.name.clone(),
                parent_param: Some(0),
                pool_param: Some(1),
                handle_param: Some(3),
            },
        );
    }

    fn set_destroy(&mut self, types: &TypeTable, handle: TypeId, destroy: HandleDestroyCommand) {
        let Some(&at) = self.by_handle.get(&handle) else {
            tracing::warn!(command = %destroy.command, "destroys a handle with no info, skipped");
            return;
        };
        let info = &mut self.infos[at];
        if let Some(existing) = &info.destroy_cmd {
            tracing::warn!(
                handle = types.name(handle),
                kept = %existing.command,
                ignored = %destroy.command,
                "second destroy command"
            );
            return;
        }
        info.destroy_cmd = Some(destroy);
    }

    fn add_pool_reset(&mut self, types: &TypeTable, cmd: &Command) {
        let [parent, pool, ..] = cmd.params.as_slice() else {
            tracing::warn!(command = %cmd.name, "unexpected pool reset shape, skipped");
            return;
        };
        if handle_value(types, parent).is_none() {
            tracing::warn!(command = %cmd.name, "pool reset without parent handle, skipped");
            return;
        }
        let Some(pool) = handle_value(types, pool) else {
            return;
        };
        let Some(info) = self.infos.iter_mut().find(|info| info.pool == Some(pool)) else {
            return;
        };
        if info.reset_pool_cmd.is_none() {
            info.reset_pool_cmd = Some(HandleDestroyCommand {
                command: cmd.name.clone(),
                parent_param: Some(0),
                pool_param: Some(1),
                handle_param: None,
            });
        }
    }

    /// Attach `VkObjectType` enumerants: the handle's own `objtypeenum`,
    /// else the enumerant whose comment or name spells the handle.
    fn link_object_types(&mut self, types: &TypeTable) {
        for info in &mut self.infos {
            info.object_type = types
                .get(info.handle)
                .handle_def()
                .and_then(|h| h.object_type.clone());
        }

        let Some(object_types) = types
            .get_by_name(well_known::OBJECT_TYPE)
            .and_then(|def| def.enum_def())
        else {
            return;
        };
        for value in object_types.canonical() {
            if value.name == UNKNOWN_OBJECT_TYPE {
                continue;
            }
            let by_comment = value
                .comment
                .as_deref()
                .and_then(|c| types.lookup(c))
                .map(|id| types.canonical(id))
                .filter(|id| self.by_handle.contains_key(id));
            let handle = by_comment.or_else(|| {
                types
                    .lookup(&handle_name(&value.name))
                    .map(|id| types.canonical(id))
            });
            let Some(&at) = handle.and_then(|id| self.by_handle.get(&id)) else {
                tracing::warn!(value = %value.name, "object type names no known handle");
                continue;
            };
            self.infos[at]
                .object_type
                .get_or_insert_with(|| value.name.clone());
        }

        for info in &self.infos {
            if info.object_type.is_none() {
                tracing::warn!(handle = types.name(info.handle), "no object type");
            }
        }
    }

    fn link_pools(&mut self) {
        let pools: Vec<(TypeId, TypeId)> = self
            .infos
            .iter()
            .filter_map(|info| info.pool.map(|pool| (pool, info.handle)))
            .collect();
        for (pool, elem) in pools {
            if let Some(&at) = self.by_handle.get(&pool) {
                self.infos[at].pool_elem = Some(elem);
            }
        }
    }

    // === Lookup Methods ===

    pub fn handle_info(&self, handle: TypeId) -> Option<&HandleInfo> {
        self.by_handle.get(&handle).map(|&at| &self.infos[at])
    }

    /// The handle type a command creates, and how.
    pub fn command_handle_created(&self, cmd: &Command) -> Option<(&HandleInfo, &HandleCreateCommand)> {
        cmd.params
            .iter()
            .filter(|p| single_indirection(p) == Some(false))
            .filter_map(|p| self.handle_info(p.ty))
            .find_map(|info| {
                info.create_cmds
                    .iter()
                    .find(|create| create.command == cmd.name)
                    .map(|create| (info, create))
            })
    }

    pub fn is_create_command(&self, cmd: &Command) -> bool {
        self.command_handle_created(cmd)
            .is_some_and(|(_, create)| create.is_create())
    }

    pub fn is_pool_allocate_command(&self, cmd: &Command) -> bool {
        self.command_handle_created(cmd)
            .is_some_and(|(_, create)| create.is_pool_allocate())
    }

    pub fn is_get_command(&self, cmd: &Command) -> bool {
        self.command_handle_created(cmd)
            .is_some_and(|(_, create)| create.is_get())
    }

    /// The handle type a command destroys.
    pub fn command_handle_destroyed(&self, cmd: &Command) -> Option<&HandleInfo> {
        cmd.params
            .iter()
            .filter_map(|p| self.handle_info(p.ty))
            .find(|info| {
                info.destroy_cmd
                    .as_ref()
                    .is_some_and(|destroy| destroy.command == cmd.name)
            })
    }

    pub fn is_destroy_command(&self, cmd: &Command) -> bool {
        self.command_handle_destroyed(cmd).is_some()
    }

    /// The pool a command resets, and the handle type it frees.
    pub fn command_pool_reset(&self, cmd: &Command) -> Option<(&HandleInfo, &HandleInfo)> {
        cmd.params.iter().filter(|p| p.is_value()).find_map(|p| {
            let pool = self.handle_info(p.ty)?;
            let elem = self.handle_info(pool.pool_elem?)?;
            elem.reset_pool_cmd
                .as_ref()
                .is_some_and(|reset| reset.command == cmd.name)
                .then_some((pool, elem))
        })
    }

    pub fn is_reset_pool_command(&self, cmd: &Command) -> bool {
        self.command_pool_reset(cmd).is_some()
    }

    // === Iteration ===

    pub fn iter(&self) -> impl Iterator<Item = &HandleInfo> {
        self.infos.iter()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.infos.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.infos.is_empty()
    }
}

/// `VK_OBJECT_TYPE_DEBUG_REPORT_CALLBACK_EXT` → `VkDebugReportCallbackEXT`.
fn handle_name(object_type: &str) -> String {
    let tail = object_type
        .strip_prefix("VK_OBJECT_TYPE_")
        .unwrap_or(object_type);
    let words: Vec<&str> = tail.split('_').collect();
    let mut name = String::from("Vk");
    for (at, word) in words.iter().enumerate() {
        let upper = word.to_ascii_uppercase();
        if at + 1 == words.len() && matches!(upper.as_str(), "EXT" | "KHR") {
            name.push_str(&upper);
            continue;
        }
        let mut chars = word.chars();
        if let Some(first) = chars.next() {
            name.push(first.to_ascii_uppercase());
            name.push_str(&chars.as_str().to_ascii_lowercase());
        }
    }
    name
}
