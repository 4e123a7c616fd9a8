use crate::config::CollapsibleOptions;
use crate::dom::*;

/// Prepend a toggle control to every element whose class list contains
/// `options.class`. Not idempotent: a second run adds a second control.
///
/// With the default options each target gains
/// `<span onClick="..." class="control"><div class="image"> </div></span>`
/// as its first child.
pub fn inject_controls(doc: &mut Document, options: &CollapsibleOptions) -> usize {
    let targets = doc.select(doc.root(), |d, n| d.has_class(n, &options.class));

    for &target in &targets {
        let control = doc.create_element(&options.control_tag);
        doc.set_attribute(control, "onClick", &options.on_click);
        doc.set_attribute(control, "class", &options.control_class);

        let indicator = doc.create_element("div");
        doc.set_attribute(indicator, "class", &options.indicator_class);
        // keeps the indicator from being written as <div/>
        doc.set_text(indicator, " ");
        doc.append_child(control, indicator);

        doc.prepend_child(target, control);
    }

    log::debug!("injected {} collapsible control(s)", targets.len());
    targets.len()
}
