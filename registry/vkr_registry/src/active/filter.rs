//! API filtering.
//!
//! The document describes several APIs at once; anything whose `api`
//! attribute omits the configured one is dropped before resolution.

use vkr_xml::{RawBlock, RawDocument, RawItem};

use crate::RegistryOptions;

/// Drop every element not meant for `options.api`.
#[tracing::instrument(level = "debug", skip_all, fields(api = %options.api))]
pub(crate) fn filter_api(doc: &mut RawDocument, options: &RegistryOptions) {
    let accepts = |api: Option<&str>| options.accepts_api(api);
    let before = (doc.types.len(), doc.commands.len(), doc.features.len());

    doc.types.retain(|ty| accepts(ty.api.as_deref()));
    for ty in &mut doc.types {
        ty.members.retain(|m| accepts(m.api.as_deref()));
    }

    doc.commands.retain(|cmd| accepts(cmd.api.as_deref()));
    for cmd in &mut doc.commands {
        cmd.params.retain(|p| accepts(p.api.as_deref()));
    }

    for block in &mut doc.enums {
        block.values.retain(|v| accepts(v.api.as_deref()));
    }

    doc.features.retain(|feature| accepts(feature.api.as_deref()));
    for feature in &mut doc.features {
        filter_blocks(&mut feature.blocks, options);
    }
    for extension in &mut doc.extensions {
        filter_blocks(&mut extension.blocks, options);
    }

    tracing::debug!(
        types = before.0 - doc.types.len(),
        commands = before.1 - doc.commands.len(),
        features = before.2 - doc.features.len(),
        "api filter dropped"
    );
}

fn filter_blocks(blocks: &mut Vec<RawBlock>, options: &RegistryOptions) {
    blocks.retain(|block| options.accepts_api(block.api.as_deref()));
    for block in blocks {
        block.items.retain(|item| match item {
            RawItem::Enum(r) => options.accepts_api(r.api.as_deref()),
            RawItem::Type(_) | RawItem::Command(_) => true,
        });
    }
}
