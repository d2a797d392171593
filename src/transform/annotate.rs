use markup5ever_rcdom::Handle;

use super::TransformReport;
use crate::config::AnnotationClasses;
use crate::dom;

pub(super) const PREVIEW_ACTIVATION: &str = "image";

pub(super) fn annotate(
    root: &Handle,
    classes: &AnnotationClasses,
    preview_attribute: &str,
    report: &mut TransformReport,
) {
    for node in dom::descendant_elements(root) {
        let Some(tag) = dom::tag_name(&node) else {
            continue;
        };

        match tag.as_str() {
            "table" => {
                dom::add_class(&node, &classes.table);
                report.tables += 1;
            }
            "th" => {
                dom::add_class(&node, &classes.header_cell);
                report.cells += 1;
            }
            "td" => {
                dom::add_class(&node, &classes.data_cell);
                report.cells += 1;
            }
            "img" => {
                dom::add_class(&node, &classes.image);
                if !dom::has_attr(&node, preview_attribute) {
                    dom::set_attr(&node, preview_attribute, PREVIEW_ACTIVATION);
                }
                report.images += 1;
            }
            _ => {}
        }
    }
}
