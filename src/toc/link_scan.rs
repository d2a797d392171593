use markup5ever_rcdom::Handle;

use super::HeadingPattern;
use super::builder::TocBuilder;
use crate::dom;

/// Local fragment target of an `<a href="#...">`, if any.
pub(crate) fn fragment_target(node: &Handle) -> Option<String> {
    if !dom::is_tag(node, "a") {
        return None;
    }
    let href = dom::attr(node, "href")?;
    let target = href.trim().strip_prefix('#')?;
    if target.is_empty() {
        return None;
    }
    Some(target.to_string())
}

pub(super) fn collect(root: &Handle, pattern: &HeadingPattern, builder: &mut TocBuilder) {
    for node in dom::descendant_elements(root) {
        let Some(target) = fragment_target(&node) else {
            continue;
        };
        let Some(heading) = pattern.parse(&dom::visible_text(&node)) else {
            continue;
        };
        builder.push(target, heading);
    }
}
