//! Shared fixture loading for phase tests.

use std::path::PathBuf;

use vkr_registry::{build_from_str, Registry, RegistryOptions};

/// The reduced registry every phase test runs against.
pub const MINI_VK: &str = include_str!("../../fixtures/mini_vk.xml");

pub fn fixture_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/mini_vk.xml")
}

/// Default options: core platform, `KHR`/`EXT` authors.
pub fn registry() -> Registry {
    registry_with(&RegistryOptions::default())
}

pub fn registry_with(options: &RegistryOptions) -> Registry {
    vkr_registry::init_tracing();
    build_from_str(MINI_VK, options).unwrap()
}

/// Default options plus the Win32 platform.
pub fn win32() -> RegistryOptions {
    RegistryOptions::default().with_platforms(["", "win32"])
}
