//! Registry build configuration.
//!
//! Controls which API the document is filtered for and which extensions are
//! selected. Platform, author and support filters are ANDed; the allow list
//! is then added and the block list removed.

use std::collections::BTreeSet;
use std::path::PathBuf;

/// Default registry document file name.
pub const DEFAULT_REGISTRY_FILE: &str = "vk.xml";

/// Default API name for `api`/`supported` filtering.
pub const DEFAULT_API: &str = "vulkan";

/// Extension authors selected by default (`""` is core).
pub const DEFAULT_AUTHORS: [&str; 3] = ["", "KHR", "EXT"];

/// Configuration for a registry build.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RegistryOptions {
    /// API name; elements whose `api` list omits it are dropped.
    pub api: String,

    /// Platform names to select extensions for; `""` is core.
    /// `None` selects every platform.
    pub platforms: Option<BTreeSet<String>>,

    /// Extension author tags to select; `""` covers extensions without one.
    /// `None` selects every author.
    pub authors: Option<BTreeSet<String>>,

    /// Extensions selected regardless of the filters.
    pub allowed_extensions: BTreeSet<String>,

    /// Extensions never selected.
    pub blocked_extensions: BTreeSet<String>,

    /// Document location override.
    pub registry_file: Option<PathBuf>,
}

impl Default for RegistryOptions {
    fn default() -> Self {
        Self {
            api: DEFAULT_API.to_owned(),
            platforms: Some(BTreeSet::from([String::new()])),
            authors: Some(DEFAULT_AUTHORS.iter().map(|&a| a.to_owned()).collect()),
            allowed_extensions: BTreeSet::new(),
            blocked_extensions: BTreeSet::new(),
            registry_file: None,
        }
    }
}

impl RegistryOptions {
    /// Select every platform and every author.
    pub fn everything() -> Self {
        Self {
            platforms: None,
            authors: None,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_api(mut self, api: &str) -> Self {
        api.clone_into(&mut self.api);
        self
    }

    /// Restrict to the given platforms (`""` is core).
    #[must_use]
    pub fn with_platforms<'a>(mut self, platforms: impl IntoIterator<Item = &'a str>) -> Self {
        self.platforms = Some(platforms.into_iter().map(str::to_owned).collect());
        self
    }

    /// Restrict to the given author tags (`""` covers unauthored extensions).
    #[must_use]
    pub fn with_authors<'a>(mut self, authors: impl IntoIterator<Item = &'a str>) -> Self {
        self.authors = Some(authors.into_iter().map(str::to_owned).collect());
        self
    }

    #[must_use]
    pub fn allow_extension(mut self, name: &str) -> Self {
        self.allowed_extensions.insert(name.to_owned());
        self
    }

    #[must_use]
    pub fn block_extension(mut self, name: &str) -> Self {
        self.blocked_extensions.insert(name.to_owned());
        self
    }

    #[must_use]
    pub fn with_registry_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.registry_file = Some(path.into());
        self
    }

    /// The document to read: the override, or `vk.xml` in the working directory.
    pub fn registry_path(&self) -> PathBuf {
        self.registry_file
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_REGISTRY_FILE))
    }

    /// Whether an `api` attribute admits the configured API.
    pub fn accepts_api(&self, api: Option<&str>) -> bool {
        api.is_none_or(|list| list.split(',').any(|a| a.trim() == self.api))
    }

    /// Whether a platform (`""` for none) passes the platform filter.
    pub fn accepts_platform(&self, platform: &str) -> bool {
        self.platforms
            .as_ref()
            .is_none_or(|set| set.contains(platform))
    }

    /// Whether an author tag (`""` for none) passes the author filter.
    pub fn accepts_author(&self, author: &str) -> bool {
        self.authors.as_ref().is_none_or(|set| set.contains(author))
    }
}
