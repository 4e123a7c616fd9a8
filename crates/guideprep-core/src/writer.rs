use crate::dom::*;
use quick_xml::escape::partial_escape;
use quick_xml::events::{BytesCData, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;

#[derive(Debug, thiserror::Error)]
pub enum WriteError {
    #[error(transparent)]
    Xml(#[from] quick_xml::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Serialize a document back to markup. No XML declaration is emitted.
pub fn serialize(doc: &Document) -> Result<String, WriteError> {
    let mut writer = Writer::new(Vec::new());
    for &child in doc.children(doc.root()) {
        write_node(doc, child, &mut writer)?;
    }
    Ok(String::from_utf8_lossy(&writer.into_inner()).into_owned())
}

/// Serialize a single node and its subtree.
pub fn serialize_node(doc: &Document, id: NodeId) -> Result<String, WriteError> {
    let mut writer = Writer::new(Vec::new());
    write_node(doc, id, &mut writer)?;
    Ok(String::from_utf8_lossy(&writer.into_inner()).into_owned())
}

fn write_node(doc: &Document, id: NodeId, writer: &mut Writer<Vec<u8>>) -> Result<(), WriteError> {
    match doc.kind(id) {
        NodeKind::Root => {
            for &child in doc.children(id) {
                write_node(doc, child, writer)?;
            }
        }
        NodeKind::Element {
            name,
            attributes,
            self_closing,
        } => {
            let start = BytesStart::new(name.as_str())
                .with_attributes(attributes.iter().map(|a| (a.name.as_str(), a.value.as_str())));
            if *self_closing && !doc.has_children(id) {
                writer.write_event(Event::Empty(start))?;
            } else {
                writer.write_event(Event::Start(start))?;
                for &child in doc.children(id) {
                    write_node(doc, child, writer)?;
                }
                writer.write_event(Event::End(BytesEnd::new(name.as_str())))?;
            }
        }
        NodeKind::Text(text) => {
            writer.write_event(Event::Text(BytesText::from_escaped(partial_escape(text))))?;
        }
        NodeKind::CData(text) => writer.write_event(Event::CData(BytesCData::new(text.as_str())))?,
        NodeKind::Comment(text) => {
            writer.write_event(Event::Comment(BytesText::from_escaped(text.as_str())))?
        }
        NodeKind::ProcessingInstruction(text) => {
            writer.write_event(Event::PI(BytesText::from_escaped(text.as_str())))?
        }
        NodeKind::DocType(text) => {
            writer.write_event(Event::DocType(BytesText::from_escaped(text.as_str())))?
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;

    fn round_trip(input: &str) -> String {
        serialize(&parse(input).unwrap()).unwrap()
    }

    #[test]
    fn test_round_trip_preserves_markup() {
        let input = "<!DOCTYPE html>\n<html><body class=\"x\">\n  <p>a &amp; b</p>\n  <br/>\n</body></html>";
        assert_eq!(round_trip(input), input);
    }

    #[test]
    fn test_declaration_is_omitted() {
        let out = round_trip("<?xml version=\"1.0\" encoding=\"utf-8\"?><html></html>");
        assert_eq!(out, "<html></html>");
    }

    #[test]
    fn test_attribute_values_are_escaped() {
        let mut doc = Document::new();
        let span = doc.create_element("span");
        doc.set_attribute(span, "onClick", "toggle(\"a\")");
        let root = doc.root();
        doc.append_child(root, span);
        assert_eq!(
            serialize(&doc).unwrap(),
            "<span onClick=\"toggle(&quot;a&quot;)\"></span>"
        );
    }

    #[test]
    fn test_created_elements_get_end_tags() {
        let mut doc = Document::new();
        let root = doc.root();
        let ul = doc.create_element("ul");
        doc.append_child(root, ul);
        assert_eq!(serialize(&doc).unwrap(), "<ul></ul>");
    }

    #[test]
    fn test_self_closing_with_new_children_gets_end_tag() {
        let mut doc = parse("<div/>").unwrap();
        let div = doc.children(doc.root())[0];
        let t = doc.create_text("x < y");
        doc.append_child(div, t);
        assert_eq!(serialize(&doc).unwrap(), "<div>x &lt; y</div>");
    }

    #[test]
    fn test_comment_and_cdata_round_trip() {
        let input = "<html><!-- keep --><script><![CDATA[if (a < b) {}]]></script></html>";
        assert_eq!(round_trip(input), input);
    }
}
