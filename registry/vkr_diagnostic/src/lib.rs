//! Diagnostics for the Vulkan registry resolver.
//!
//! Provides the error taxonomy every phase reports through ([`RegistryError`])
//! and the stable [`ErrorCode`]s the launcher surfaces.

mod error;
mod error_code;

pub use error::{EntityKind, RegistryError, Result};
pub use error_code::ErrorCode;
