use std::collections::HashMap;
use std::rc::Rc;

use markup5ever_rcdom::{Handle, Node, NodeData};

use super::scroll::{ContainerMetrics, LayoutProbe};
use crate::config::LayoutConfig;
use crate::dom;

/// Estimated vertical flow of a rendered document: blocks stack in document
/// order, text wraps at a fixed line length and images take a fixed height.
/// Hidden subtrees take no space and have no position.
#[derive(Debug, Clone)]
pub struct FlowLayout {
    offsets: HashMap<*const Node, f64>,
    content_height: f64,
    container_top: f64,
    scroll_top: f64,
}

impl FlowLayout {
    pub fn measure(root: &Handle, config: &LayoutConfig) -> Self {
        let mut flow = Flow {
            config,
            offsets: HashMap::new(),
            cursor: 0.0,
        };
        flow.visit(root);

        Self {
            content_height: flow.cursor,
            offsets: flow.offsets,
            container_top: config.container_top_px,
            scroll_top: 0.0,
        }
    }

    pub fn scrolled_to(mut self, scroll_top: f64) -> Self {
        self.scroll_top = scroll_top.max(0.0);
        self
    }

    pub fn container(&self) -> ContainerMetrics {
        ContainerMetrics {
            top: self.container_top,
            scroll_top: self.scroll_top,
        }
    }

    pub fn content_height(&self) -> f64 {
        self.content_height
    }

    /// Offset of `node` from the top of the content, independent of scroll.
    pub fn offset_of(&self, node: &Handle) -> Option<f64> {
        self.offsets.get(&Rc::as_ptr(node)).copied()
    }
}

impl LayoutProbe for FlowLayout {
    fn element_top(&self, node: &Handle) -> Option<f64> {
        self.offset_of(node)
            .map(|offset| self.container_top + offset - self.scroll_top)
    }
}

struct Flow<'a> {
    config: &'a LayoutConfig,
    offsets: HashMap<*const Node, f64>,
    cursor: f64,
}

impl Flow<'_> {
    fn visit(&mut self, node: &Handle) {
        for child in dom::children(node) {
            if !dom::is_element(&child) || dom::hides_itself(&child) {
                continue;
            }
            self.offsets.insert(Rc::as_ptr(&child), self.cursor);

            let has_blocks = dom::children(&child)
                .iter()
                .filter_map(dom::tag_name)
                .any(|tag| dom::is_block_tag(&tag));
            if has_blocks {
                self.visit(&child);
                continue;
            }

            let top = self.cursor;
            self.place_inline(&child, top);
            self.cursor += self.block_height(&child);
        }
    }

    // Inline content shares the top edge of its block.
    fn place_inline(&mut self, node: &Handle, top: f64) {
        for child in dom::children(node) {
            if !dom::is_element(&child) || dom::hides_itself(&child) {
                continue;
            }
            self.offsets.insert(Rc::as_ptr(&child), top);
            self.place_inline(&child, top);
        }
    }

    fn block_height(&self, node: &Handle) -> f64 {
        let mut text = String::new();
        let mut images = 0usize;
        visible_content(node, &mut text, &mut images);

        let chars = dom::normalize_text(&text).chars().count();
        let per_line = self.config.chars_per_line.max(1);
        let lines = chars.div_ceil(per_line);

        let height = lines as f64 * self.config.line_height_px
            + images as f64 * self.config.image_height_px;
        if height > 0.0 {
            height + self.config.block_spacing_px
        } else {
            0.0
        }
    }
}

fn visible_content(node: &Handle, text: &mut String, images: &mut usize) {
    match &node.data {
        NodeData::Text { contents } => text.push_str(&contents.borrow()),
        NodeData::Element { .. } => {
            if dom::hides_itself(node) {
                return;
            }
            if dom::is_tag(node, "img") {
                *images += 1;
            }
            if dom::is_tag(node, "script") || dom::is_tag(node, "style") {
                return;
            }
            for child in dom::children(node) {
                visible_content(&child, text, images);
            }
        }
        _ => {}
    }
}
