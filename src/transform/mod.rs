use anyhow::Result;
use markup5ever_rcdom::Handle;
use serde::Serialize;
use tracing::{info, warn};

use crate::config::{AnnotationClasses, ReaderConfig, SuppressionMode};
use crate::dom;
use crate::toc::{self, TocEntry};

mod annotate;
mod contents_block;
mod section_markers;

pub use contents_block::{BlockKind, ScanState, Verdict};
pub use section_markers::{
    SECTION_HEADING_CLASS, SECTION_MARKER_CLASS, SUBSECTION_HEADING_CLASS, SUBSECTION_MARKER_CLASS,
};

use contents_block::ContentsClassifier;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TransformReport {
    pub contents_found: bool,
    pub suppressed_blocks: usize,
    pub canonicalized: usize,
    pub already_canonical: usize,
    pub unmatched: Vec<String>,
    pub tables: usize,
    pub cells: usize,
    pub images: usize,
}

#[derive(Debug, Clone)]
pub struct TransformOutput {
    pub html: String,
    pub report: TransformReport,
}

#[derive(Debug, Clone)]
pub struct ContentTransformer {
    classifier: ContentsClassifier,
    suppression: SuppressionMode,
    classes: AnnotationClasses,
    preview_attribute: String,
}

impl ContentTransformer {
    pub fn new(config: &ReaderConfig) -> Result<Self> {
        Ok(Self {
            classifier: ContentsClassifier::new()?,
            suppression: config.suppression,
            classes: config.classes.clone(),
            preview_attribute: config.preview_attribute.clone(),
        })
    }

    /// Suppresses the embedded contents listing, canonicalizes section
    /// markers for `toc`, then annotates tables, cells and images. Applying it
    /// to its own output changes nothing.
    pub fn transform(&self, raw_html: &str, toc: &[TocEntry]) -> TransformOutput {
        let parsed = dom::parse_html(raw_html);
        let root = dom::body(&parsed);
        let mut report = TransformReport::default();

        contents_block::suppress(
            &root,
            &self.classifier,
            self.suppression,
            &self.classes.hidden,
            &mut report,
        );
        section_markers::canonicalize(&root, toc, &mut report);
        annotate::annotate(&root, &self.classes, &self.preview_attribute, &mut report);

        if !report.unmatched.is_empty() {
            warn!(
                unmatched = report.unmatched.len(),
                "some sections have no heading in the body and will not scroll"
            );
        }
        info!(
            contents_found = report.contents_found,
            suppressed = report.suppressed_blocks,
            markers = report.canonicalized + report.already_canonical,
            tables = report.tables,
            images = report.images,
            "transformed document content"
        );

        TransformOutput {
            html: dom::serialize_children(&root),
            report,
        }
    }
}

/// Transforms with the default configuration.
pub fn transform(raw_html: &str, toc: &[TocEntry]) -> String {
    match ContentTransformer::new(&ReaderConfig::default()) {
        Ok(transformer) => transformer.transform(raw_html, toc).html,
        Err(err) => {
            warn!(error = %err, "content transformer unavailable, passing document through");
            raw_html.to_string()
        }
    }
}

/// A block whose visible text is carried entirely by in-document links, the
/// shape of an embedded contents listing entry.
fn is_listing_entry(node: &Handle) -> bool {
    fn walk(node: &Handle, outside: &mut String, linked: &mut bool) {
        if toc::fragment_target(node).is_some() {
            if !dom::text_content(node).is_empty() {
                *linked = true;
            }
            return;
        }
        if let markup5ever_rcdom::NodeData::Text { contents } = &node.data {
            outside.push_str(&contents.borrow());
        }
        for child in dom::children(node) {
            walk(&child, outside, linked);
        }
    }

    let mut outside = String::new();
    let mut linked = false;
    walk(node, &mut outside, &mut linked);
    linked && outside.trim().is_empty()
}

/// Bookmark anchors (`<a id>` / `<a name>` without `href`) mark headings in
/// the body, never entries of the listing.
fn has_bookmark_anchor(node: &Handle) -> bool {
    let is_bookmark = |candidate: &Handle| {
        dom::is_tag(candidate, "a")
            && !dom::has_attr(candidate, "href")
            && (dom::has_attr(candidate, "id") || dom::has_attr(candidate, "name"))
    };

    is_bookmark(node) || dom::descendant_elements(node).iter().any(is_bookmark)
}
