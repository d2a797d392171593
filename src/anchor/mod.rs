use std::rc::Rc;

use markup5ever_rcdom::{Handle, RcDom};
use tracing::debug;

use crate::config::ReaderConfig;
use crate::dom;

mod flow_layout;
mod scroll;
#[cfg(test)]
mod tests;

pub use flow_layout::FlowLayout;
pub use scroll::{ContainerMetrics, LayoutProbe, ScrollBehavior, ScrollCommand, scroll_command};

/// The committed display tree. Lookups always run against this tree, never
/// against a cached copy of an earlier load.
pub struct RenderedDocument {
    _dom: RcDom,
    root: Handle,
    image_class: String,
    preview_attribute: String,
}

impl RenderedDocument {
    pub fn parse(html: &str) -> Self {
        Self::parse_with(html, &ReaderConfig::default())
    }

    pub fn parse_with(html: &str, config: &ReaderConfig) -> Self {
        let parsed = dom::parse_html(html);
        let root = dom::body(&parsed);
        Self {
            _dom: parsed,
            root,
            image_class: config.classes.image.clone(),
            preview_attribute: config.preview_attribute.clone(),
        }
    }

    pub fn root(&self) -> &Handle {
        &self.root
    }

    /// Every element carrying `id`, in document order. Anchors also carry
    /// identifiers through `name`.
    pub fn candidates(&self, id: &str) -> Vec<Handle> {
        dom::descendant_elements(&self.root)
            .into_iter()
            .filter(|node| {
                dom::attr(node, "id").as_deref() == Some(id)
                    || (dom::is_tag(node, "a") && dom::attr(node, "name").as_deref() == Some(id))
            })
            .collect()
    }

    /// Picks the scroll target for `id`. Anchor candidates stand for their
    /// enclosing block and hidden candidates are dropped; of the survivors the
    /// last in document order wins. With no visible survivor the last
    /// candidate is used anyway. `None` only when nothing carries `id`.
    pub fn resolve(&self, id: &str) -> Option<Handle> {
        let candidates = self.candidates(id);
        if candidates.is_empty() {
            debug!(id, "no element carries identifier");
            return None;
        }

        let mut fallback = None;
        let mut visible: Option<Handle> = None;
        for candidate in &candidates {
            let target = if dom::is_tag(candidate, "a") {
                self.semantic_container(candidate)
                    .unwrap_or_else(|| candidate.clone())
            } else {
                candidate.clone()
            };

            if self.is_hidden(&target) {
                fallback = Some(target);
                continue;
            }
            visible = Some(target);
        }

        if visible.is_none() {
            debug!(
                id,
                candidates = candidates.len(),
                "every candidate is hidden, using the last one"
            );
        }
        visible.or(fallback)
    }

    /// True when the node or one of its ancestors up to the body is hidden.
    pub fn is_hidden(&self, node: &Handle) -> bool {
        let mut current = Some(node.clone());
        while let Some(node) = current {
            if dom::hides_itself(&node) {
                return true;
            }
            if Rc::ptr_eq(&node, &self.root) {
                return false;
            }
            current = dom::parent_of(&node);
        }
        false
    }

    /// The full-size source for a click on an annotated image. Other nodes,
    /// including unannotated images, yield `None`.
    pub fn preview_source(&self, node: &Handle) -> Option<String> {
        if !dom::is_tag(node, "img") || !dom::has_class(node, &self.image_class) {
            return None;
        }
        if !dom::has_attr(node, &self.preview_attribute) {
            return None;
        }
        dom::attr(node, "src").filter(|src| !src.is_empty())
    }

    pub fn preview_images(&self) -> Vec<String> {
        dom::descendant_elements(&self.root)
            .iter()
            .filter_map(|node| self.preview_source(node))
            .collect()
    }

    pub fn images(&self) -> Vec<Handle> {
        dom::descendant_elements(&self.root)
            .into_iter()
            .filter(|node| dom::is_tag(node, "img"))
            .collect()
    }

    fn semantic_container(&self, node: &Handle) -> Option<Handle> {
        let mut current = dom::parent_of(node);
        while let Some(candidate) = current {
            if Rc::ptr_eq(&candidate, &self.root) {
                return None;
            }
            let is_block = dom::tag_name(&candidate)
                .is_some_and(|tag| dom::is_heading_tag(&tag) || matches!(tag.as_str(), "p" | "li" | "div"));
            if is_block {
                return Some(candidate);
            }
            current = dom::parent_of(&candidate);
        }
        None
    }
}

/// Short label for logs: tag, id and leading text.
pub fn describe(node: &Handle) -> String {
    let tag = dom::tag_name(node).unwrap_or_else(|| "#text".to_string());
    let text: String = dom::text_content(node).chars().take(60).collect();
    match dom::attr(node, "id") {
        Some(id) => format!("<{tag} id=\"{id}\"> {text}"),
        None => format!("<{tag}> {text}"),
    }
}
