//! Structural XML tree.
//!
//! The registry vocabulary mixes markup and C text inside the same element
//! (`<member>const <type>void</type>* <name>pNext</name></member>`), so the
//! tree keeps text nodes in document order next to child elements.
//!
//! Built in one pass over `quick-xml` events; any reader error, mismatched
//! end tag, or unclosed element becomes a [`RegistryError::Parse`].

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use vkr_diagnostic::{RegistryError, Result};

/// A node inside an element: either a child element or a run of text.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum XmlNode {
    Element(XmlElement),
    Text(String),
}

/// An XML element with attributes and ordered children.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct XmlElement {
    /// Element tag name.
    pub tag: String,
    /// Attributes in declaration order.
    pub attrs: Vec<(String, String)>,
    /// Child nodes in document order.
    pub children: Vec<XmlNode>,
    /// Byte offset of the start tag.
    pub position: u64,
}

impl XmlElement {
    /// Look up an attribute value.
    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Look up an attribute and split it on commas, dropping empty pieces.
    pub fn attr_list(&self, key: &str) -> Vec<String> {
        self.attr(key)
            .map(|v| {
                v.split(',')
                    .filter(|s| !s.is_empty())
                    .map(str::to_owned)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Iterate over child elements, skipping text.
    pub fn elements(&self) -> impl Iterator<Item = &XmlElement> {
        self.children.iter().filter_map(|node| match node {
            XmlNode::Element(el) => Some(el),
            XmlNode::Text(_) => None,
        })
    }

    /// Iterate over child elements with the given tag.
    pub fn children_named<'a>(&'a self, tag: &'a str) -> impl Iterator<Item = &'a XmlElement> {
        self.elements().filter(move |el| el.tag == tag)
    }

    /// First child element with the given tag.
    pub fn child(&self, tag: &str) -> Option<&XmlElement> {
        self.elements().find(|el| el.tag == tag)
    }

    /// Concatenated text of this element and all descendants.
    pub fn text(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        for node in &self.children {
            match node {
                XmlNode::Text(t) => out.push_str(t),
                XmlNode::Element(el) => el.collect_text(out),
            }
        }
    }

    /// Text of the first child element with the given tag, trimmed.
    pub fn child_text(&self, tag: &str) -> Option<String> {
        self.child(tag).map(|el| el.text().trim().to_owned())
    }
}

fn position_of(raw: impl TryInto<u64>) -> u64 {
    raw.try_into().unwrap_or(u64::MAX)
}

fn open_element(start: &BytesStart<'_>, position: u64) -> Result<XmlElement> {
    let tag = std::str::from_utf8(start.name().as_ref())
        .map_err(|err| RegistryError::parse(position, err.to_string()))?
        .to_owned();

    let mut attrs = Vec::new();
    for attr in start.attributes() {
        let attr = attr.map_err(|err| RegistryError::parse(position, err.to_string()))?;
        let key = std::str::from_utf8(attr.key.as_ref())
            .map_err(|err| RegistryError::parse(position, err.to_string()))?
            .to_owned();
        let value = attr
            .unescape_value()
            .map_err(|err| RegistryError::parse(position, err.to_string()))?
            .into_owned();
        attrs.push((key, value));
    }

    Ok(XmlElement {
        tag,
        attrs,
        children: Vec::new(),
        position,
    })
}

fn attach(
    stack: &mut [XmlElement],
    root: &mut Option<XmlElement>,
    element: XmlElement,
) -> Result<()> {
    if let Some(parent) = stack.last_mut() {
        parent.children.push(XmlNode::Element(element));
        return Ok(());
    }
    if root.is_some() {
        return Err(RegistryError::parse(
            element.position,
            format!("second root element <{}>", element.tag),
        ));
    }
    *root = Some(element);
    Ok(())
}

/// Parse a complete document into its root element.
pub fn parse_tree(source: &str) -> Result<XmlElement> {
    let mut reader = Reader::from_str(source);
    let mut stack: Vec<XmlElement> = Vec::new();
    let mut root = None;

    loop {
        let position = position_of(reader.buffer_position());
        match reader.read_event() {
            Ok(Event::Start(start)) => stack.push(open_element(&start, position)?),
            Ok(Event::Empty(start)) => {
                let element = open_element(&start, position)?;
                attach(&mut stack, &mut root, element)?;
            }
            Ok(Event::End(_)) => {
                let element = stack.pop().ok_or_else(|| {
                    RegistryError::parse(position, "end tag without matching start tag")
                })?;
                attach(&mut stack, &mut root, element)?;
            }
            Ok(Event::Text(text)) => {
                if let Some(top) = stack.last_mut() {
                    let text = text
                        .unescape()
                        .map_err(|err| RegistryError::parse(position, err.to_string()))?;
                    top.children.push(XmlNode::Text(text.into_owned()));
                }
            }
            Ok(Event::CData(data)) => {
                if let Some(top) = stack.last_mut() {
                    let text = String::from_utf8_lossy(&data.into_inner()).into_owned();
                    top.children.push(XmlNode::Text(text));
                }
            }
            Ok(Event::Eof) => break,
            // Declarations, comments, processing instructions, doctype.
            Ok(_) => {}
            Err(err) => {
                return Err(RegistryError::parse(
                    position_of(reader.error_position()),
                    err.to_string(),
                ))
            }
        }
    }

    if let Some(open) = stack.last() {
        return Err(RegistryError::parse(
            open.position,
            format!("unclosed element <{}>", open.tag),
        ));
    }

    root.ok_or_else(|| RegistryError::parse(0, "document has no root element"))
}
