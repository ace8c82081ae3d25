//! Vulkan registry resolution.
//!
//! Turns a `vk.xml` registry document into a resolved, queryable model for
//! code generators:
//!
//! - [`active`]: API filtering, extension selection, require/remove
//!   directives and the dependency closure
//! - [`command`]: parameter resolution and dispatch classification
//! - [`platform`]: core and per-platform buckets
//! - [`chain`]: `sType` tag ↔ structure mapping for `pNext` chains
//! - [`handle_info`]: create/destroy/pool commands per handle type
//!
//! [`build_from_str`] and [`build_from_path`] run every phase and return an
//! immutable [`Registry`].
//!
//! # Tracing
//!
//! Phases are instrumented with `tracing`. Call [`init_tracing`] and set
//! `RUST_LOG` to see them:
//!
//! ```bash
//! RUST_LOG=vkr_registry=debug vkgen
//! RUST_LOG=vkr_registry::active=trace vkgen
//! ```

pub mod active;
pub mod chain;
pub mod command;
mod enums;
mod feature;
pub mod handle_info;
mod options;
mod pipeline;
pub mod platform;
mod registry;

use std::sync::Once;

pub use active::depends::evaluate as evaluate_depends;
pub use active::{apply, ActiveSet, DirectiveSource, EntityIndex, ValueDef};
pub use chain::{ChainSlot, ChainTable, ChainTag};
pub use command::{classify, Command, CommandTable, DispatchClass};
pub use feature::{ApiVersion, EntityRef, Extension, ExtensionKind, Feature, Origin};
pub use handle_info::{
    CreateKind, HandleCreateCommand, HandleDestroyCommand, HandleInfo, HandleInfoTable,
};
pub use options::{RegistryOptions, DEFAULT_API, DEFAULT_AUTHORS, DEFAULT_REGISTRY_FILE};
pub use pipeline::{build_from_path, build_from_str};
pub use platform::{bucket, Platform, PlatformTable, ValueRef};
pub use registry::Registry;

pub use vkr_diagnostic::{ErrorCode, RegistryError, Result};

static TRACING_INIT: Once = Once::new();

/// Initialize the tracing subscriber.
///
/// Respects `RUST_LOG`; does nothing when it is unset. Safe to call more
/// than once.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        if std::env::var("RUST_LOG").is_ok() {
            let filter = EnvFilter::from_default_env();
            tracing_subscriber::registry()
                .with(fmt::layer().with_target(true).with_level(true))
                .with(filter)
                .init();
        }
    });
}
