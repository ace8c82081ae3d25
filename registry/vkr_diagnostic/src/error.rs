//! The registry error taxonomy.
//!
//! Every variant aborts the build: there is no local recovery and no partial
//! registry. The launcher prints the `Display` rendering prefixed with the
//! stable [`ErrorCode`].

use thiserror::Error;

use crate::ErrorCode;

/// Which kind of entity a require/remove directive referred to.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Type,
    Command,
    Enum,
}

impl EntityKind {
    pub fn as_str(self) -> &'static str {
        match self {
            EntityKind::Type => "type",
            EntityKind::Command => "command",
            EntityKind::Enum => "enum",
        }
    }
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A fatal registry build error.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// The document is not well-formed or violates the registry vocabulary.
    #[error("malformed registry document at byte {position}: {message}")]
    Parse { position: u64, message: String },

    /// The registry document could not be read.
    #[error("cannot read registry document `{path}`: {message}")]
    Io { path: String, message: String },

    /// A required top-level section is absent.
    #[error("registry document has no <{section}> section")]
    MissingSection { section: &'static str },

    /// A type name was never registered.
    #[error("unknown type `{name}` referenced from `{referrer}`")]
    UnknownType { name: String, referrer: String },

    /// A command name was never declared.
    #[error("unknown command `{name}` referenced from `{referrer}`")]
    UnknownCommand { name: String, referrer: String },

    /// An enumeration value name cannot be found in its enumeration.
    #[error("unknown value `{name}` in enumeration `{enumeration}`")]
    UnknownEnumValue { name: String, enumeration: String },

    /// A fixed array length or constant alias names an unknown constant.
    #[error("unknown API constant `{name}` referenced from `{referrer}`")]
    UnknownConstant { name: String, referrer: String },

    /// An extension declares a platform that the document never defines.
    #[error("extension `{extension}` names unknown platform `{platform}`")]
    UnknownPlatform { platform: String, extension: String },

    /// Alias resolution revisited a name already on the resolution path.
    #[error("alias cycle: {}", .path.join(" -> "))]
    CyclicAlias { path: Vec<String> },

    /// A dynamic array length names something that is neither a sibling
    /// member/parameter nor an API constant.
    #[error("length `{expr}` of `{owner}.{member}` references unknown name `{reference}`")]
    UnresolvedLengthReference {
        owner: String,
        member: String,
        expr: String,
        reference: String,
    },

    /// A version or extension directive names an entity that does not exist.
    #[error("`{source_name}` requires unknown {kind} `{name}`")]
    UnresolvedRequire {
        source_name: String,
        kind: EntityKind,
        name: String,
    },

    /// A command matches no dispatch class rule.
    #[error("cannot classify dispatch of command `{command}`: {reason}")]
    AmbiguousDispatchClass { command: String, reason: String },
}

impl RegistryError {
    /// Stable diagnostic code for this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            RegistryError::Parse { .. } => ErrorCode::E1001,
            RegistryError::MissingSection { .. } => ErrorCode::E1002,
            RegistryError::Io { .. } => ErrorCode::E1003,
            RegistryError::UnknownType { .. } => ErrorCode::E2001,
            RegistryError::UnknownCommand { .. } => ErrorCode::E2002,
            RegistryError::CyclicAlias { .. } => ErrorCode::E2003,
            RegistryError::UnresolvedLengthReference { .. } => ErrorCode::E2004,
            RegistryError::UnknownEnumValue { .. } => ErrorCode::E2005,
            RegistryError::UnknownConstant { .. } => ErrorCode::E2006,
            RegistryError::UnknownPlatform { .. } => ErrorCode::E2007,
            RegistryError::UnresolvedRequire { .. } => ErrorCode::E3001,
            RegistryError::AmbiguousDispatchClass { .. } => ErrorCode::E9001,
        }
    }

    /// Build a [`RegistryError::Parse`] at `position`.
    pub fn parse(position: u64, message: impl Into<String>) -> Self {
        RegistryError::Parse {
            position,
            message: message.into(),
        }
    }

    /// Render as `error[E####]: message`, the launcher's diagnostic line.
    pub fn render(&self) -> String {
        format!("error[{}]: {self}", self.code())
    }
}

/// Result alias used across the registry crates.
pub type Result<T, E = RegistryError> = std::result::Result<T, E>;
