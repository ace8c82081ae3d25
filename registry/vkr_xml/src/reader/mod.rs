//! Section extraction.
//!
//! Walks the `<registry>` root and lifts each section into its raw form.
//! Fails fast: a required section that is missing, or an element missing a
//! mandatory name, aborts the read with a [`RegistryError`].
//!
//! Sections outside the registry model (`<tags>`, `<formats>`,
//! `<spirvextensions>`, `<sync>`, `<videocodecs>`, ...) are skipped.

use vkr_diagnostic::{RegistryError, Result};

use crate::raw::{
    BlockKind, EnumsKind, RawBlock, RawCommand, RawDocument, RawEnumRef, RawEnumValue, RawEnums,
    RawExtension, RawFeature, RawItem, RawMember, RawPlatform, RawType,
};
use crate::tree::{parse_tree, XmlElement, XmlNode};

/// Parse a registry document into its raw sections.
#[tracing::instrument(level = "debug", skip_all, fields(bytes = source.len()))]
pub fn parse(source: &str) -> Result<RawDocument> {
    let root = parse_tree(source)?;
    if root.tag != "registry" {
        return Err(RegistryError::parse(
            root.position,
            format!("expected <registry> root, found <{}>", root.tag),
        ));
    }

    let types = root
        .child("types")
        .ok_or(RegistryError::MissingSection { section: "types" })?;
    let commands = root
        .child("commands")
        .ok_or(RegistryError::MissingSection { section: "commands" })?;
    let platforms = root
        .child("platforms")
        .ok_or(RegistryError::MissingSection { section: "platforms" })?;
    if root.child("enums").is_none() {
        return Err(RegistryError::MissingSection { section: "enums" });
    }
    if root.child("feature").is_none() {
        return Err(RegistryError::MissingSection { section: "feature" });
    }

    let document = RawDocument {
        platforms: platforms
            .children_named("platform")
            .map(read_platform)
            .collect::<Result<_>>()?,
        types: types
            .children_named("type")
            .map(read_type)
            .collect::<Result<_>>()?,
        enums: root
            .children_named("enums")
            .map(read_enums)
            .collect::<Result<_>>()?,
        commands: commands
            .children_named("command")
            .map(read_command)
            .collect::<Result<_>>()?,
        features: root
            .children_named("feature")
            .map(read_feature)
            .collect::<Result<_>>()?,
        extensions: root
            .child("extensions")
            .map(|section| {
                section
                    .children_named("extension")
                    .map(read_extension)
                    .collect::<Result<Vec<_>>>()
            })
            .transpose()?
            .unwrap_or_default(),
    };

    tracing::debug!(
        types = document.types.len(),
        enums = document.enums.len(),
        commands = document.commands.len(),
        features = document.features.len(),
        extensions = document.extensions.len(),
        "document read"
    );
    Ok(document)
}

fn required_attr(el: &XmlElement, key: &str) -> Result<String> {
    el.attr(key).map(str::to_owned).ok_or_else(|| {
        RegistryError::parse(
            el.position,
            format!("<{}> is missing required attribute `{key}`", el.tag),
        )
    })
}

fn owned_attr(el: &XmlElement, key: &str) -> Option<String> {
    el.attr(key).map(str::to_owned)
}

fn read_platform(el: &XmlElement) -> Result<RawPlatform> {
    Ok(RawPlatform {
        name: required_attr(el, "name")?,
        protect: required_attr(el, "protect")?,
        comment: owned_attr(el, "comment"),
    })
}

/// Text of the nodes that follow the `<name>` child, up to the next element.
fn name_tail(el: &XmlElement) -> Option<String> {
    let mut seen_name = false;
    let mut tail = String::new();
    for node in &el.children {
        match node {
            XmlNode::Element(child) if child.tag == "name" => seen_name = true,
            XmlNode::Element(_) if seen_name => break,
            XmlNode::Text(text) if seen_name => tail.push_str(text),
            _ => {}
        }
    }
    seen_name.then_some(tail)
}

fn read_type(el: &XmlElement) -> Result<RawType> {
    let name = match el.attr("name") {
        Some(name) => name.to_owned(),
        None => el
            .child_text("name")
            .or_else(|| el.child("proto").and_then(|proto| proto.child_text("name")))
            .ok_or_else(|| {
                RegistryError::parse(el.position, "<type> has neither a name attribute nor <name>")
            })?,
    };

    Ok(RawType {
        name,
        category: owned_attr(el, "category"),
        alias: owned_attr(el, "alias"),
        api: owned_attr(el, "api"),
        parent: owned_attr(el, "parent"),
        requires: owned_attr(el, "requires"),
        bitvalues: owned_attr(el, "bitvalues"),
        inner_type: el.child_text("type"),
        struct_extends: el.attr_list("structextends"),
        returned_only: el.attr("returnedonly") == Some("true"),
        object_type: owned_attr(el, "objtypeenum"),
        members: el
            .children_named("member")
            .map(read_member)
            .collect::<Result<_>>()?,
        name_tail: name_tail(el),
        position: el.position,
    })
}

/// Read a `<member>` or `<param>`.
fn read_member(el: &XmlElement) -> Result<RawMember> {
    let name = el.child_text("name").ok_or_else(|| {
        RegistryError::parse(el.position, format!("<{}> has no <name>", el.tag))
    })?;
    let type_name = el.child_text("type").ok_or_else(|| {
        RegistryError::parse(el.position, format!("<{}> `{name}` has no <type>", el.tag))
    })?;

    let mut declarator = String::new();
    for node in &el.children {
        match node {
            XmlNode::Text(text) => declarator.push_str(text),
            XmlNode::Element(child) if !matches!(child.tag.as_str(), "type" | "name" | "comment") => {
                declarator.push_str(&child.text());
            }
            XmlNode::Element(_) => {}
        }
    }

    Ok(RawMember {
        name,
        type_name,
        declarator,
        len: owned_attr(el, "len"),
        altlen: owned_attr(el, "altlen"),
        optional: owned_attr(el, "optional"),
        values: el.attr_list("values"),
        api: owned_attr(el, "api"),
    })
}

fn read_enums(el: &XmlElement) -> Result<RawEnums> {
    let name = required_attr(el, "name")?;
    let kind = match el.attr("type") {
        Some("enum") => EnumsKind::Enum,
        Some("bitmask") => EnumsKind::Bitmask,
        Some("constants") | None => EnumsKind::Constants,
        Some(other) => {
            return Err(RegistryError::parse(
                el.position,
                format!("<enums name=\"{name}\"> has unknown type `{other}`"),
            ))
        }
    };
    let bitwidth = el
        .attr("bitwidth")
        .map(|w| {
            w.parse::<u32>().map_err(|_| {
                RegistryError::parse(el.position, format!("bad bitwidth `{w}` on `{name}`"))
            })
        })
        .transpose()?;

    let values = el
        .children_named("enum")
        .map(|ev| {
            Ok(RawEnumValue {
                name: required_attr(ev, "name")?,
                value: owned_attr(ev, "value"),
                bitpos: owned_attr(ev, "bitpos"),
                alias: owned_attr(ev, "alias"),
                comment: owned_attr(ev, "comment"),
                api: owned_attr(ev, "api"),
                ctype: owned_attr(ev, "type"),
            })
        })
        .collect::<Result<_>>()?;

    Ok(RawEnums {
        name,
        kind,
        bitwidth,
        values,
    })
}

fn read_command(el: &XmlElement) -> Result<RawCommand> {
    if let Some(alias) = el.attr("alias") {
        return Ok(RawCommand {
            name: required_attr(el, "name")?,
            alias: Some(alias.to_owned()),
            api: owned_attr(el, "api"),
            position: el.position,
            ..RawCommand::default()
        });
    }

    let proto = el
        .child("proto")
        .ok_or_else(|| RegistryError::parse(el.position, "<command> has no <proto>"))?;
    let proto = read_member(proto)?;

    Ok(RawCommand {
        name: proto.name,
        alias: None,
        api: owned_attr(el, "api"),
        return_type: proto.type_name,
        params: el
            .children_named("param")
            .map(read_member)
            .collect::<Result<_>>()?,
        success_codes: el.attr_list("successcodes"),
        error_codes: el.attr_list("errorcodes"),
        position: el.position,
    })
}

fn read_blocks(el: &XmlElement) -> Vec<RawBlock> {
    el.elements()
        .filter_map(|block| {
            let kind = match block.tag.as_str() {
                "require" => BlockKind::Require,
                "remove" => BlockKind::Remove,
                _ => return None,
            };
            let depends = owned_attr(block, "depends")
                .or_else(|| owned_attr(block, "feature"))
                .or_else(|| owned_attr(block, "extension"));
            Some(RawBlock {
                kind,
                api: owned_attr(block, "api"),
                depends,
                items: block.elements().filter_map(read_item).collect(),
            })
        })
        .collect()
}

fn read_item(el: &XmlElement) -> Option<RawItem> {
    let name = el.attr("name")?.to_owned();
    match el.tag.as_str() {
        "type" => Some(RawItem::Type(name)),
        "command" => Some(RawItem::Command(name)),
        "enum" => Some(RawItem::Enum(RawEnumRef {
            name,
            extends: owned_attr(el, "extends"),
            value: owned_attr(el, "value"),
            bitpos: owned_attr(el, "bitpos"),
            offset: owned_attr(el, "offset"),
            negative: el.attr("dir") == Some("-"),
            extnumber: owned_attr(el, "extnumber"),
            alias: owned_attr(el, "alias"),
            comment: owned_attr(el, "comment"),
            api: owned_attr(el, "api"),
        })),
        // <comment>, <feature struct=...> and friends carry no entities.
        _ => None,
    }
}

fn read_feature(el: &XmlElement) -> Result<RawFeature> {
    Ok(RawFeature {
        name: required_attr(el, "name")?,
        number: owned_attr(el, "number").unwrap_or_default(),
        api: owned_attr(el, "api"),
        blocks: read_blocks(el),
    })
}

fn read_extension(el: &XmlElement) -> Result<RawExtension> {
    let name = required_attr(el, "name")?;
    let number = required_attr(el, "number")?;
    let number = number.parse::<u32>().map_err(|_| {
        RegistryError::parse(
            el.position,
            format!("extension `{name}` has bad number `{number}`"),
        )
    })?;

    let mut requires = el.attr_list("requires");
    if requires.is_empty() {
        if let Some(depends) = el.attr("depends") {
            requires = dependency_names(depends);
        }
    }

    Ok(RawExtension {
        name,
        number,
        kind: owned_attr(el, "type"),
        author: owned_attr(el, "author"),
        supported: el.attr_list("supported"),
        platform: owned_attr(el, "platform"),
        promoted_to: owned_attr(el, "promotedto"),
        deprecated_by: owned_attr(el, "deprecatedby"),
        requires,
        special_use: el.attr_list("specialuse"),
        provisional: el.attr("provisional") == Some("true"),
        blocks: read_blocks(el),
    })
}

/// Every name mentioned in a dependency expression, in order, deduplicated.
fn dependency_names(expr: &str) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    for piece in expr.split(|c| matches!(c, ',' | '+' | '(' | ')')) {
        let piece = piece.trim();
        if !piece.is_empty() && !names.iter().any(|n| n == piece) {
            names.push(piece.to_owned());
        }
    }
    names
}
