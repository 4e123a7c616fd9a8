use crate::config::TocOptions;
use crate::dom::*;

const MAX_HEADING_LEVEL: u8 = 6;

/// Fill `list` with one `<li><a href="#id">text</a></li>` per `h<level>`
/// child of `origin` that carries an `id`. Each entry's nested list is
/// built from the heading's next sibling at `level + 1` and attached after
/// the entry only when non-empty. Returns the number of entries added at
/// all depths.
pub fn build_table_of_contents(
    doc: &mut Document,
    options: &TocOptions,
    list: NodeId,
    origin: Option<NodeId>,
    level: u8,
) -> usize {
    let Some(origin) = origin else {
        return 0;
    };
    if level > MAX_HEADING_LEVEL {
        return 0;
    }

    let tag = format!("h{level}");
    let headings: Vec<(NodeId, String)> = doc
        .children(origin)
        .iter()
        .copied()
        .filter(|&c| doc.is_element(c, &tag))
        .filter_map(|c| doc.attribute(c, "id").map(|id| (c, id.to_string())))
        .collect();

    let mut added = 0;
    for (heading, id) in headings {
        let item = doc.create_element("li");
        doc.append_child(list, item);
        let link = doc.create_element("a");
        doc.set_attribute(link, "href", &format!("#{id}"));
        let text = doc.text_content(heading);
        doc.set_text(link, &text);
        doc.append_child(item, link);
        added += 1;

        let sublist = doc.create_element(&options.list_tag);
        let next = doc.next_sibling(heading);
        let nested = build_table_of_contents(doc, options, sublist, next, level + 1);
        if nested > 0 {
            doc.append_child(list, sublist);
            added += nested;
        }
    }
    added
}
