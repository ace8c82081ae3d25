//! Property tests over option subsets.
//!
//! These verify, for any platform/author/block selection:
//! 1. Determinism: two builds produce identical partitions
//! 2. Uniqueness: no two canonical enumerants share a value
//! 3. Closure: every member and parameter type is active

use std::hash::{Hash, Hasher};

use proptest::prelude::*;
use rustc_hash::{FxHashSet, FxHasher};
use vkr_registry::{Platform, Registry, RegistryOptions};

use crate::common::registry_with;

const PLATFORMS: [&str; 2] = ["xlib", "win32"];
const AUTHORS: [&str; 4] = ["", "KHR", "EXT", "NV"];
const EXTENSIONS: [&str; 7] = [
    "VK_KHR_surface",
    "VK_KHR_swapchain",
    "VK_KHR_win32_surface",
    "VK_KHR_get_physical_device_properties2",
    "VK_KHR_maintenance1",
    "VK_EXT_pool_overflow",
    "VK_NV_private_data",
];

fn options_strategy() -> impl Strategy<Value = RegistryOptions> {
    (
        prop::sample::subsequence(PLATFORMS.to_vec(), 0..=PLATFORMS.len()),
        prop::sample::subsequence(AUTHORS.to_vec(), 0..=AUTHORS.len()),
        prop::sample::subsequence(EXTENSIONS.to_vec(), 0..=2),
    )
        .prop_map(|(platforms, authors, blocked)| {
            let mut options = RegistryOptions::default()
                .with_platforms(std::iter::once("").chain(platforms))
                .with_authors(authors);
            for name in blocked {
                options = options.block_extension(name);
            }
            options
        })
}

fn partition_hash(registry: &Registry) -> u64 {
    let mut hasher = FxHasher::default();
    let platforms: Vec<&Platform> = registry.platforms().collect();
    platforms.hash(&mut hasher);
    hasher.finish()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn prop_build_is_deterministic(options in options_strategy()) {
        let first = registry_with(&options);
        let second = registry_with(&options);

        let a: Vec<&Platform> = first.platforms().collect();
        let b: Vec<&Platform> = second.platforms().collect();
        prop_assert_eq!(a, b);
        prop_assert_eq!(partition_hash(&first), partition_hash(&second));
        prop_assert_eq!(first.api_version(), second.api_version());
    }

    #[test]
    fn prop_canonical_values_are_unique(options in options_strategy()) {
        let registry = registry_with(&options);
        for def in registry.unique_types() {
            let Some(layout) = def.enum_def() else {
                continue;
            };
            let mut seen = FxHashSet::default();
            for value in layout.canonical() {
                prop_assert!(
                    seen.insert(value.value),
                    "{}: {} repeats value {}",
                    def.name,
                    value.name,
                    value.value
                );
            }
        }
    }

    #[test]
    fn prop_closure_is_complete(options in options_strategy()) {
        let registry = registry_with(&options);
        for cmd in registry.commands() {
            for param in &cmd.params {
                prop_assert!(registry.is_active(param.ty), "{}.{}", cmd.name, param.name);
            }
        }
        for def in registry.unique_types() {
            for member in def.struct_def().map(|s| s.members.as_slice()).unwrap_or_default() {
                prop_assert!(registry.is_active(member.ty), "{}.{}", def.name, member.name);
            }
        }
    }
}

#[test]
fn registry_is_shareable_across_threads() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<Registry>();
}
