//! In-memory XML tree
//!
//! Elements keep their original start tag (name and raw attributes) and every
//! other node is kept as the reader produced it, so a document that is not
//! modified serializes back to the same markup.

use quick_xml::events::{BytesStart, Event};
use std::borrow::Cow;

#[derive(Debug, Clone, PartialEq)]
pub struct XmlDocument {
    /// Whether the source started with a UTF-8 byte order mark
    pub bom: bool,
    /// Declaration, comments, doctype and whitespace before the root element
    pub prolog: Vec<XmlNode>,
    pub root: XmlElement,
    /// Comments, processing instructions and whitespace after the root element
    pub epilog: Vec<XmlNode>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum XmlNode {
    Element(XmlElement),
    /// Text, CDATA, comment, processing instruction, declaration or doctype
    Other(Event<'static>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct XmlElement {
    pub(crate) start: BytesStart<'static>,
    pub children: Vec<XmlNode>,
    /// Written as `<name/>` in the source
    pub self_closing: bool,
}

impl XmlElement {
    pub(crate) fn from_start(start: BytesStart<'static>, self_closing: bool) -> Self {
        XmlElement {
            start,
            children: Vec::new(),
            self_closing,
        }
    }

    /// Qualified tag name exactly as written, including any namespace prefix
    pub fn name(&self) -> &[u8] {
        self.start.name().into_inner()
    }

    pub fn name_lossy(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(self.name())
    }

    /// Direct child elements, skipping text and other nodes
    pub fn child_elements(&self) -> impl Iterator<Item = &XmlElement> {
        self.children.iter().filter_map(|node| match node {
            XmlNode::Element(element) => Some(element),
            XmlNode::Other(_) => None,
        })
    }

    // Inspection helpers for callers examining a parsed document. Pruning
    // itself only walks `children`.

    /// Every element below this one in document order
    pub fn descendants(&self) -> Vec<&XmlElement> {
        let mut found = Vec::new();
        for child in self.child_elements() {
            found.push(child);
            found.extend(child.descendants());
        }
        found
    }

    /// Concatenated unescaped character data of this element and its descendants
    pub fn text(&self) -> String {
        let mut text = String::new();
        for node in &self.children {
            match node {
                XmlNode::Element(element) => text.push_str(&element.text()),
                XmlNode::Other(Event::Text(t)) => match t.unescape() {
                    Ok(value) => text.push_str(&value),
                    Err(_) => text.push_str(&String::from_utf8_lossy(t)),
                },
                XmlNode::Other(Event::CData(c)) => text.push_str(&String::from_utf8_lossy(c)),
                XmlNode::Other(_) => {}
            }
        }
        text
    }
}

impl XmlDocument {
    /// Count of elements carrying `name`, root included. Inspection helper,
    /// not used by pruning.
    pub fn count_elements(&self, name: &str) -> usize {
        let root_match = usize::from(self.root.name() == name.as_bytes());
        root_match
            + self
                .root
                .descendants()
                .iter()
                .filter(|element| element.name() == name.as_bytes())
                .count()
    }
}
