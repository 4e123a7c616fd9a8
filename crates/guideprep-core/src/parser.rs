use crate::dom::*;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("Parse error at byte {position}: {message}")]
pub struct ParseError {
    pub position: usize,
    pub message: String,
}

/// Parse XML-compatible markup into a [`Document`]. The XML declaration,
/// if any, is dropped.
pub fn parse(input: &str) -> Result<Document, ParseError> {
    let mut reader = Reader::from_str(input);
    reader.trim_text(false);
    reader.check_end_names(true);
    reader.expand_empty_elements(false);

    let mut doc = Document::new();
    let mut open: Vec<(NodeId, String)> = Vec::new();

    loop {
        let event = reader.read_event().map_err(|e| ParseError {
            position: reader.buffer_position(),
            message: e.to_string(),
        })?;
        let parent = open.last().map(|(id, _)| *id).unwrap_or(doc.root());

        let kind = match event {
            Event::Start(e) => {
                let id = element(&mut doc, &e, false).map_err(|message| ParseError {
                    position: reader.buffer_position(),
                    message,
                })?;
                doc.append_child(parent, id);
                let name = doc.element_name(id).unwrap_or_default().to_string();
                open.push((id, name));
                continue;
            }
            Event::Empty(e) => {
                let id = element(&mut doc, &e, true).map_err(|message| ParseError {
                    position: reader.buffer_position(),
                    message,
                })?;
                doc.append_child(parent, id);
                continue;
            }
            Event::End(_) => {
                if open.pop().is_none() {
                    return Err(ParseError {
                        position: reader.buffer_position(),
                        message: "Unexpected closing tag with no matching open tag".to_string(),
                    });
                }
                continue;
            }
            Event::Text(e) if e.is_empty() => continue,
            Event::Text(e) => {
                let text = e.unescape().map_err(|e| ParseError {
                    position: reader.buffer_position(),
                    message: e.to_string(),
                })?;
                NodeKind::Text(text.into_owned())
            }
            Event::CData(e) => NodeKind::CData(String::from_utf8_lossy(&e).into_owned()),
            Event::Comment(e) => NodeKind::Comment(String::from_utf8_lossy(&e).into_owned()),
            Event::PI(e) => {
                NodeKind::ProcessingInstruction(String::from_utf8_lossy(&e).into_owned())
            }
            Event::DocType(e) => NodeKind::DocType(String::from_utf8_lossy(&e).into_owned()),
            Event::Decl(_) => continue,
            Event::Eof => break,
        };
        let id = doc.create_node(kind);
        doc.append_child(parent, id);
    }

    if let Some((_, name)) = open.last() {
        return Err(ParseError {
            position: input.len(),
            message: format!("Unclosed element <{name}>: reached end of input"),
        });
    }

    Ok(doc)
}

fn element(doc: &mut Document, start: &BytesStart<'_>, self_closing: bool) -> Result<NodeId, String> {
    let name = String::from_utf8_lossy(start.name().as_ref()).into_owned();
    let mut attributes: Vec<Attribute> = Vec::new();
    for attr in start.attributes() {
        let attr = attr.map_err(|e| e.to_string())?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attr.unescape_value().map_err(|e| e.to_string())?.into_owned();
        match attributes.iter_mut().find(|a| a.name == key) {
            Some(existing) => existing.value = value,
            None => attributes.push(Attribute { name: key, value }),
        }
    }
    Ok(doc.create_node(NodeKind::Element {
        name,
        attributes,
        self_closing,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixture_path(name: &str) -> std::path::PathBuf {
        std::path::PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests").join("fixtures").join(name)
    }

    #[test]
    fn test_simple_element_with_text() {
        let doc = parse("<p class=\"lead\">Hello &amp; welcome</p>").unwrap();
        let top = doc.children(doc.root());
        assert_eq!(top.len(), 1);
        let p = top[0];
        assert_eq!(doc.element_name(p), Some("p"));
        assert_eq!(doc.attribute(p, "class"), Some("lead"));
        assert_eq!(doc.text_content(p), "Hello & welcome");
    }

    #[test]
    fn test_declaration_is_dropped() {
        let doc = parse("<?xml version=\"1.0\"?>\n<html/>").unwrap();
        let kinds: Vec<_> = doc.children(doc.root()).iter().map(|&n| doc.kind(n).clone()).collect();
        assert_eq!(kinds.len(), 2);
        assert_eq!(kinds[0], NodeKind::Text("\n".to_string()));
        assert!(matches!(&kinds[1], NodeKind::Element { name, self_closing: true, .. } if name == "html"));
    }

    #[test]
    fn test_self_closing_flag() {
        let doc = parse("<div><img src=\"a.png\"/><span></span></div>").unwrap();
        let div = doc.children(doc.root())[0];
        let children = doc.children(div);
        assert!(matches!(doc.kind(children[0]), NodeKind::Element { self_closing: true, .. }));
        assert!(matches!(doc.kind(children[1]), NodeKind::Element { self_closing: false, .. }));
        assert_eq!(doc.attribute(children[0], "src"), Some("a.png"));
    }

    #[test]
    fn test_doctype_comment_and_cdata() {
        let doc = parse("<!DOCTYPE html><html><!-- note --><script><![CDATA[a<b]]></script></html>").unwrap();
        let top = doc.children(doc.root());
        assert!(matches!(doc.kind(top[0]), NodeKind::DocType(s) if s == "html"));
        let html = top[1];
        let children = doc.children(html);
        assert!(matches!(doc.kind(children[0]), NodeKind::Comment(s) if s == " note "));
        assert_eq!(doc.text_content(children[1]), "a<b");
    }

    #[test]
    fn test_attribute_entities_are_unescaped() {
        let doc = parse("<a title=\"&quot;x&quot; &lt; y\">t</a>").unwrap();
        let a = doc.children(doc.root())[0];
        assert_eq!(doc.attribute(a, "title"), Some("\"x\" < y"));
    }

    #[test]
    fn test_mismatched_tags() {
        let err = parse("<div><p>text</div></p>").unwrap_err();
        assert!(!err.message.is_empty());
    }

    #[test]
    fn test_unclosed_element() {
        let err = parse("<body><div>text").unwrap_err();
        assert!(err.message.contains("Unclosed element <div>"), "{}", err.message);
    }

    #[test]
    fn test_user_guide_fixture_parses() {
        let input = std::fs::read_to_string(fixture_path("user_guide.html")).unwrap();
        let doc = parse(&input).unwrap();
        assert!(doc.find_by_id("ul", "MainMenu").is_some());
        assert!(doc.find_element("body").is_some());
    }
}
