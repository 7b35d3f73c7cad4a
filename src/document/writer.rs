//! Serializing an [`XmlDocument`] back to bytes

use quick_xml::Writer;
use quick_xml::events::Event;
use std::io;

use super::models::{XmlDocument, XmlElement, XmlNode};

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

pub fn write_document(document: &XmlDocument) -> io::Result<Vec<u8>> {
    let mut out = Vec::new();
    if document.bom {
        out.extend_from_slice(UTF8_BOM);
    }

    let mut writer = Writer::new(out);
    for node in &document.prolog {
        write_node(&mut writer, node)?;
    }
    write_element(&mut writer, &document.root)?;
    for node in &document.epilog {
        write_node(&mut writer, node)?;
    }

    Ok(writer.into_inner())
}

fn write_node(writer: &mut Writer<Vec<u8>>, node: &XmlNode) -> io::Result<()> {
    match node {
        XmlNode::Element(element) => write_element(writer, element),
        XmlNode::Other(event) => emit(writer, event.borrow()),
    }
}

fn write_element(writer: &mut Writer<Vec<u8>>, element: &XmlElement) -> io::Result<()> {
    if element.self_closing && element.children.is_empty() {
        return emit(writer, Event::Empty(element.start.borrow()));
    }

    emit(writer, Event::Start(element.start.borrow()))?;
    for child in &element.children {
        write_node(writer, child)?;
    }
    emit(writer, Event::End(element.start.to_end()))
}

fn emit(writer: &mut Writer<Vec<u8>>, event: Event<'_>) -> io::Result<()> {
    writer
        .write_event(event)
        .map_err(|e| io::Error::other(e.to_string()))
}
