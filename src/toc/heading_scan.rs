use markup5ever_rcdom::Handle;

use super::builder::TocBuilder;
use super::{HeadingPattern, section_id_for};
use crate::dom;

// Body paragraphs opening with "1. " are usually numbered prose, not headings.
const MAX_TITLE_CHARS: usize = 150;

pub(super) fn collect(root: &Handle, pattern: &HeadingPattern, builder: &mut TocBuilder) {
    for node in dom::descendant_elements(root) {
        let Some(tag) = dom::tag_name(&node) else {
            continue;
        };
        if tag != "p" && !dom::is_heading_tag(&tag) {
            continue;
        }

        let Some(heading) = pattern.parse(&dom::visible_text(&node)) else {
            continue;
        };
        if heading.title.chars().count() > MAX_TITLE_CHARS {
            continue;
        }

        let id = section_id_for(&heading.number);
        builder.push(id, heading);
    }
}
