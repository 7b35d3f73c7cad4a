//! Building an [`XmlDocument`] from raw bytes
//!
//! quick-xml is a pull parser and does not enforce document-level rules such as
//! a single root element or closed tags at end of input, so those are checked
//! while the tree is assembled.

use quick_xml::Reader;
use quick_xml::events::{BytesStart, BytesText, Event};

use super::models::{XmlDocument, XmlElement, XmlNode};
use crate::error::XmlSyntaxError;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

pub fn parse_document(xml: &[u8]) -> Result<XmlDocument, XmlSyntaxError> {
    let bom = xml.starts_with(UTF8_BOM);
    let body = xml.strip_prefix(UTF8_BOM).unwrap_or(xml);

    let mut reader = Reader::from_reader(body);
    // Keep whitespace text so untouched regions are written back unchanged
    reader.config_mut().trim_text(false);
    reader.config_mut().check_end_names = true;

    let mut builder = TreeBuilder::default();
    let mut buf = Vec::new();

    loop {
        let event = reader
            .read_event_into(&mut buf)
            .map_err(|e| XmlSyntaxError::new(reader.error_position(), e.to_string()))?;
        let position = reader.buffer_position();

        let step = match event {
            Event::Start(e) => check_start_tag(&e)
                .map(|()| builder.open(XmlElement::from_start(e.into_owned(), false))),
            Event::Empty(e) => check_start_tag(&e).and_then(|()| {
                builder.push(XmlNode::Element(XmlElement::from_start(e.into_owned(), true)))
            }),
            Event::End(e) => builder.close(e.name().as_ref()),
            Event::Text(ref t) if builder.at_top_level() && !is_blank(t) => {
                Err("text outside the root element".to_string())
            }
            Event::CData(_) if builder.at_top_level() => {
                Err("CDATA outside the root element".to_string())
            }
            Event::Text(t) => check_text(&t)
                .and_then(|()| builder.push(XmlNode::Other(Event::Text(t.into_owned())))),
            Event::Eof => break,
            other => builder.push(XmlNode::Other(other.into_owned())),
        };
        step.map_err(|detail| XmlSyntaxError::new(position, detail))?;
        buf.clear();
    }

    builder
        .finish(bom)
        .map_err(|detail| XmlSyntaxError::new(reader.buffer_position(), detail))
}

fn is_blank(bytes: &[u8]) -> bool {
    bytes.iter().all(u8::is_ascii_whitespace)
}

/// Element name, attribute syntax and attribute values of a start tag
fn check_start_tag(start: &BytesStart<'_>) -> Result<(), String> {
    let name = start.name();
    if !is_xml_name(name.as_ref()) {
        return Err(format!(
            "invalid element name <{}>",
            String::from_utf8_lossy(name.as_ref())
        ));
    }

    let element = String::from_utf8_lossy(name.as_ref());
    let mut attributes = start.attributes();
    attributes.with_checks(true);
    for attribute in attributes {
        let attribute =
            attribute.map_err(|e| format!("malformed attribute in <{element}>: {e}"))?;
        let key = attribute.key.as_ref();
        if !is_xml_name(key) {
            return Err(format!(
                "invalid attribute name {} in <{element}>",
                String::from_utf8_lossy(key)
            ));
        }
        attribute.unescape_value().map_err(|e| {
            format!(
                "invalid value for attribute {} in <{element}>: {e}",
                String::from_utf8_lossy(key)
            )
        })?;
    }
    Ok(())
}

/// Character data must only reference predefined or numeric entities
fn check_text(text: &BytesText<'_>) -> Result<(), String> {
    text.unescape()
        .map(|_| ())
        .map_err(|e| format!("invalid character data: {e}"))
}

/// XML `Name` production, with every non-ASCII byte accepted as a name character
fn is_xml_name(name: &[u8]) -> bool {
    let Some((&first, rest)) = name.split_first() else {
        return false;
    };
    is_name_start(first)
        && rest
            .iter()
            .all(|&b| is_name_start(b) || b.is_ascii_digit() || b == b'-' || b == b'.')
}

fn is_name_start(b: u8) -> bool {
    b.is_ascii_alphabetic() || b == b'_' || b == b':' || b >= 0x80
}

#[derive(Default)]
struct TreeBuilder {
    open: Vec<XmlElement>,
    prolog: Vec<XmlNode>,
    root: Option<XmlElement>,
    epilog: Vec<XmlNode>,
}

impl TreeBuilder {
    fn at_top_level(&self) -> bool {
        self.open.is_empty()
    }

    fn open(&mut self, element: XmlElement) {
        self.open.push(element);
    }

    fn close(&mut self, name: &[u8]) -> Result<(), String> {
        let Some(element) = self.open.pop() else {
            return Err(format!(
                "unexpected closing tag </{}>",
                String::from_utf8_lossy(name)
            ));
        };
        if element.name() != name {
            return Err(format!(
                "expected </{}>, found </{}>",
                element.name_lossy(),
                String::from_utf8_lossy(name)
            ));
        }
        self.push(XmlNode::Element(element))
    }

    fn push(&mut self, node: XmlNode) -> Result<(), String> {
        if let Some(parent) = self.open.last_mut() {
            parent.children.push(node);
            return Ok(());
        }

        match node {
            XmlNode::Element(element) => {
                if self.root.is_some() {
                    return Err(format!(
                        "second root element <{}>",
                        element.name_lossy()
                    ));
                }
                self.root = Some(element);
            }
            other if self.root.is_none() => self.prolog.push(other),
            other => self.epilog.push(other),
        }
        Ok(())
    }

    fn finish(self, bom: bool) -> Result<XmlDocument, String> {
        if let Some(unclosed) = self.open.last() {
            return Err(format!("unclosed element <{}>", unclosed.name_lossy()));
        }
        let root = self.root.ok_or_else(|| "root element is missing".to_string())?;

        Ok(XmlDocument {
            bom,
            prolog: self.prolog,
            root,
            epilog: self.epilog,
        })
    }
}
