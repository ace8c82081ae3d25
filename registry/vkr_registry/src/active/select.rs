//! Extension selection.

use rustc_hash::FxHashSet;
use vkr_diagnostic::{RegistryError, Result};
use vkr_xml::{RawDocument, RawExtension};

use crate::RegistryOptions;

/// Placeholder extensions that only reserve a number.
pub(crate) fn is_reserved(ext: &RawExtension) -> bool {
    ext.name.contains("RESERVED") || ext.name.ends_with(&ext.number.to_string())
}

fn matches_filters(ext: &RawExtension, options: &RegistryOptions) -> bool {
    options.accepts_platform(ext.platform.as_deref().unwrap_or(""))
        && options.accepts_author(ext.author.as_deref().unwrap_or(""))
        && ext.supported.iter().any(|s| *s == options.api)
}

/// Pick the extensions to apply, in document order.
///
/// Platform, author and support filters select; the allow list adds and the
/// block list removes. Every extension's platform must be declared.
#[tracing::instrument(level = "debug", skip_all, fields(extensions = doc.extensions.len()))]
pub(crate) fn select_extensions<'a>(
    doc: &'a RawDocument,
    options: &RegistryOptions,
) -> Result<Vec<&'a RawExtension>> {
    let declared: FxHashSet<&str> = doc.platforms.iter().map(|p| p.name.as_str()).collect();
    for ext in &doc.extensions {
        if let Some(platform) = &ext.platform {
            if !declared.contains(platform.as_str()) {
                return Err(RegistryError::UnknownPlatform {
                    platform: platform.clone(),
                    extension: ext.name.clone(),
                });
            }
        }
    }

    let known: FxHashSet<&str> = doc.extensions.iter().map(|e| e.name.as_str()).collect();
    for name in options
        .allowed_extensions
        .iter()
        .chain(&options.blocked_extensions)
    {
        if !known.contains(name.as_str()) {
            tracing::warn!(extension = %name, "allow/block list names an unknown extension");
        }
    }

    let mut selected = Vec::new();
    for ext in &doc.extensions {
        if is_reserved(ext) {
            tracing::debug!(extension = %ext.name, "reserved extension skipped");
            continue;
        }
        let wanted = matches_filters(ext, options) || options.allowed_extensions.contains(&ext.name);
        if wanted && !options.blocked_extensions.contains(&ext.name) {
            selected.push(ext);
        }
    }

    tracing::debug!(selected = selected.len(), "extensions selected");
    Ok(selected)
}
