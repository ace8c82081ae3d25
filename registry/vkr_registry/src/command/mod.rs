//! The command table.
//!
//! Each active command gets its parameters resolved through the modifier
//! phase, in declared order, and a [`DispatchClass`] derived from its first
//! parameter.
//!
//! # Dispatch
//!
//! The first parameter decides. A bare handle value walks its parent chain
//! until it reaches `VkDevice` (device scope) or `VkInstance` (instance
//! scope). `VkSwapchainKHR` is device scope even though its declared parent
//! is the surface. No parameters, or a first parameter that is not a handle
//! value, is global.

use rustc_hash::FxHashMap;
use vkr_diagnostic::{RegistryError, Result};
use vkr_types::modifier::{annotate_all, FieldKind, ModifierContext};
use vkr_types::well_known;
use vkr_types::{ConstantTable, Member, TypeId, TypeKind, TypeTable};
use vkr_xml::RawCommand;

/// Which dispatch chain a command travels through.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum DispatchClass {
    Instance,
    Device,
    Global,
}

impl DispatchClass {
    pub fn as_str(self) -> &'static str {
        match self {
            DispatchClass::Instance => "instance",
            DispatchClass::Device => "device",
            DispatchClass::Global => "global",
        }
    }
}

/// A resolved command.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Command {
    pub name: String,
    pub return_type: TypeId,
    /// Parameters in declared (call-site) order.
    pub params: Vec<Member>,
    pub dispatch: DispatchClass,
    pub success_codes: Vec<String>,
    pub error_codes: Vec<String>,
    /// Core version that introduced the command.
    pub feature: Option<String>,
    /// Active alias names, in declaration order.
    pub aliases: Vec<String>,
}

impl Command {
    pub fn find_parameter(&self, name: &str) -> Option<&Member> {
        self.params.iter().find(|p| p.name == name)
    }

    #[inline]
    pub fn is_instance(&self) -> bool {
        self.dispatch == DispatchClass::Instance
    }

    #[inline]
    pub fn is_device(&self) -> bool {
        self.dispatch == DispatchClass::Device
    }
}

/// Classify a command by its first parameter.
pub fn classify(name: &str, params: &[Member], types: &TypeTable) -> Result<DispatchClass> {
    let Some(first) = params.first() else {
        return Ok(DispatchClass::Global);
    };
    if !first.is_value() || !matches!(types.get(first.ty).kind, TypeKind::Handle(_)) {
        return Ok(DispatchClass::Global);
    }

    let ambiguous = |reason: String| RegistryError::AmbiguousDispatchClass {
        command: name.to_owned(),
        reason,
    };
    let mut visited: Vec<TypeId> = Vec::new();
    let mut current = first.ty;
    loop {
        match types.name(current) {
            well_known::DEVICE | well_known::SWAPCHAIN => return Ok(DispatchClass::Device),
            well_known::INSTANCE => return Ok(DispatchClass::Instance),
            _ => {}
        }
        if visited.contains(&current) {
            return Err(ambiguous(format!(
                "handle parent chain of `{}` loops",
                types.name(first.ty)
            )));
        }
        visited.push(current);
        let parent = types.get(current).handle_def().and_then(|h| h.parent);
        current = parent.map(|p| types.canonical(p)).ok_or_else(|| {
            ambiguous(format!(
                "handle `{}` reaches neither an instance nor a device",
                types.name(first.ty)
            ))
        })?;
    }
}

/// Resolve a non-alias command.
pub fn build(raw: &RawCommand, types: &TypeTable, constants: &ConstantTable) -> Result<Command> {
    let ctx = ModifierContext {
        owner: &raw.name,
        kind: FieldKind::Parameter,
        siblings: &raw.params,
        types,
        constants,
    };
    let params = annotate_all(&raw.params, &ctx)?;
    let dispatch = classify(&raw.name, &params, types)?;
    tracing::trace!(command = %raw.name, dispatch = dispatch.as_str(), "command built");

    Ok(Command {
        name: raw.name.clone(),
        return_type: types.resolve_from(&raw.return_type, &raw.name)?,
        params,
        dispatch,
        success_codes: raw.success_codes.clone(),
        error_codes: raw.error_codes.clone(),
        feature: None,
        aliases: Vec::new(),
    })
}

/// Active commands in declaration order, with alias lookup.
#[derive(Clone, Debug, Default)]
pub struct CommandTable {
    commands: Vec<Command>,
    /// Canonical and alias names to their command.
    by_name: FxHashMap<String, usize>,
}

impl CommandTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a canonical command. A repeated name keeps the first one.
    pub fn insert(&mut self, command: Command) {
        if self.by_name.contains_key(&command.name) {
            tracing::debug!(command = %command.name, "command declared twice, keeping first");
            return;
        }
        self.by_name.insert(command.name.clone(), self.commands.len());
        self.commands.push(command);
    }

    /// Register `alias` as another name for `target`.
    pub fn insert_alias(&mut self, alias: &str, target: &str) -> Result<()> {
        let at = *self
            .by_name
            .get(target)
            .ok_or_else(|| RegistryError::UnknownCommand {
                name: target.to_owned(),
                referrer: alias.to_owned(),
            })?;
        if self.by_name.contains_key(alias) {
            return Ok(());
        }
        self.by_name.insert(alias.to_owned(), at);
        self.commands[at].aliases.push(alias.to_owned());
        Ok(())
    }

    // === Lookup Methods ===

    /// Look up a command by canonical or alias name.
    #[inline]
    pub fn get(&self, name: &str) -> Option<&Command> {
        self.by_name.get(name).map(|&at| &self.commands[at])
    }

    #[inline]
    pub fn get_mut(&mut self, name: &str) -> Option<&mut Command> {
        self.by_name.get(name).map(|&at| &mut self.commands[at])
    }

    #[inline]
    pub fn contains(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    // === Iteration ===

    /// Canonical commands in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &Command> {
        self.commands.iter()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}
