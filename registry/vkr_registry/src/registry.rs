//! The finished registry.
//!
//! Built once by the pipeline, immutable afterwards and `Send + Sync`, so
//! emitters may share one instance across threads without locking. Every
//! query only sees active entities.

use vkr_diagnostic::{RegistryError, Result};
use vkr_types::well_known;
use vkr_types::{ConstantTable, EnumValue, TypeDef, TypeId, TypeTable};

use crate::chain::ChainTable;
use crate::command::{Command, CommandTable, DispatchClass};
use crate::feature::{ApiVersion, Extension, Feature};
use crate::handle_info::HandleInfoTable;
use crate::platform::{Platform, PlatformTable};

/// The resolved registry model.
#[derive(Clone, Debug)]
pub struct Registry {
    pub(crate) types: TypeTable,
    /// Active flag per [`TypeId`].
    pub(crate) active: Vec<bool>,
    pub(crate) constants: ConstantTable,
    pub(crate) commands: CommandTable,
    pub(crate) features: Vec<Feature>,
    pub(crate) extensions: Vec<Extension>,
    pub(crate) platforms: PlatformTable,
    pub(crate) chain: ChainTable,
    pub(crate) handle_infos: HandleInfoTable,
    pub(crate) api_version: ApiVersion,
}

impl Registry {
    // === Types ===

    /// Resolve an active type name to its canonical type.
    pub fn resolve(&self, name: &str) -> Result<TypeId> {
        let id = self.type_id(name).ok_or_else(|| RegistryError::UnknownType {
            name: name.to_owned(),
            referrer: "registry query".to_owned(),
        })?;
        Ok(self.types.canonical(id))
    }

    /// Id of an active type name, without collapsing aliases.
    pub fn type_id(&self, name: &str) -> Option<TypeId> {
        self.types.lookup(name).filter(|&id| self.is_active(id))
    }

    #[inline]
    pub fn get(&self, id: TypeId) -> &TypeDef {
        self.types.get(id)
    }

    /// Active type by name, alias entries included.
    pub fn type_by_name(&self, name: &str) -> Option<&TypeDef> {
        self.type_id(name).map(|id| self.types.get(id))
    }

    #[inline]
    pub fn name(&self, id: TypeId) -> &str {
        self.types.name(id)
    }

    #[inline]
    pub fn is_active(&self, id: TypeId) -> bool {
        self.active.get(id.index()).copied().unwrap_or(false)
    }

    /// Active types in declaration order, aliases included.
    pub fn types(&self) -> impl Iterator<Item = &TypeDef> {
        self.types.iter().filter(|def| self.is_active(def.id))
    }

    /// Active non-alias types in declaration order.
    pub fn unique_types(&self) -> impl Iterator<Item = &TypeDef> {
        self.types.unique_types().filter(|def| self.is_active(def.id))
    }

    /// Whether a type is a dispatchable handle (`VkInstance`, `VkDevice`, ...).
    pub fn is_dispatchable(&self, id: TypeId) -> bool {
        self.types
            .get(self.types.canonical(id))
            .handle_def()
            .is_some_and(|handle| handle.dispatchable)
    }

    /// Deduplicated values of an active enumeration.
    pub fn enum_values(&self, name: &str) -> Option<&[EnumValue]> {
        let id = self.resolve(name).ok()?;
        self.types
            .get(id)
            .enum_def()
            .map(|def| def.values.as_slice())
    }

    /// The whole type table, inactive entries included.
    pub fn type_table(&self) -> &TypeTable {
        &self.types
    }

    // === Commands ===

    /// Look up a command by canonical or alias name.
    pub fn command(&self, name: &str) -> Option<&Command> {
        self.commands.get(name)
    }

    /// Canonical commands in declaration order.
    pub fn commands(&self) -> impl Iterator<Item = &Command> {
        self.commands.iter()
    }

    pub fn command_table(&self) -> &CommandTable {
        &self.commands
    }

    pub fn dispatch_class(&self, command: &str) -> Option<DispatchClass> {
        self.command(command).map(|cmd| cmd.dispatch)
    }

    // === Platforms ===

    /// Buckets: core first, then platforms in declaration order.
    pub fn platforms(&self) -> impl Iterator<Item = &Platform> {
        self.platforms.iter()
    }

    /// Bucket by platform name; `""` is core.
    pub fn platform(&self, name: &str) -> Option<&Platform> {
        self.platforms.get(name)
    }

    pub fn platform_table(&self) -> &PlatformTable {
        &self.platforms
    }

    // === Versions and extensions ===

    pub fn features(&self) -> &[Feature] {
        &self.features
    }

    pub fn extensions(&self) -> &[Extension] {
        &self.extensions
    }

    pub fn extension(&self, name: &str) -> Option<&Extension> {
        self.extensions.iter().find(|ext| ext.name == name)
    }

    pub fn api_version(&self) -> ApiVersion {
        self.api_version
    }

    // === Derived tables ===

    pub fn constants(&self) -> &ConstantTable {
        &self.constants
    }

    pub fn chain(&self) -> &ChainTable {
        &self.chain
    }

    pub fn handle_infos(&self) -> &HandleInfoTable {
        &self.handle_infos
    }

    /// The built-in null-terminated string type.
    pub fn string_type(&self) -> TypeId {
        self.types
            .lookup(well_known::STRING)
            .unwrap_or_else(|| TypeId::from_raw(0))
    }
}
