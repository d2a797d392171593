use anyhow::{Context, Result};
use markup5ever_rcdom::Handle;
use regex::Regex;
use tracing::debug;

use super::section_markers::SECTION_MARKER_CLASS;
use super::{TransformReport, has_bookmark_anchor, is_listing_entry};
use crate::config::SuppressionMode;
use crate::dom;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanState {
    Scanning,
    InContents,
    ContentStarted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockKind {
    ContentsHeading,
    GenuineContent,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Keep,
    Suppress,
}

impl ScanState {
    pub fn step(self, kind: BlockKind) -> (ScanState, Verdict) {
        match (self, kind) {
            (ScanState::Scanning, BlockKind::ContentsHeading) => {
                (ScanState::InContents, Verdict::Suppress)
            }
            (ScanState::Scanning, _) => (ScanState::Scanning, Verdict::Keep),
            (ScanState::InContents, BlockKind::GenuineContent) => {
                (ScanState::ContentStarted, Verdict::Keep)
            }
            (ScanState::InContents, _) => (ScanState::InContents, Verdict::Suppress),
            (ScanState::ContentStarted, _) => (ScanState::ContentStarted, Verdict::Keep),
        }
    }
}

#[derive(Debug, Clone)]
pub(super) struct ContentsClassifier {
    contents_heading: Regex,
    first_section: Regex,
    trailing_page: Regex,
}

impl ContentsClassifier {
    pub(super) fn new() -> Result<Self> {
        Ok(Self {
            contents_heading: Regex::new(r"(?i)^contents?$")
                .context("failed to compile contents heading regex")?,
            first_section: Regex::new(r"^1\.\s+\p{Lu}")
                .context("failed to compile first section regex")?,
            trailing_page: Regex::new(r"(?:\s|[.…·]{2,})\d+$")
                .context("failed to compile trailing page regex")?,
        })
    }

    pub(super) fn classify(&self, node: &Handle) -> BlockKind {
        let text = dom::text_content(node);
        if text.is_empty() {
            return BlockKind::Other;
        }
        if self.contents_heading.is_match(&text) {
            return BlockKind::ContentsHeading;
        }
        if dom::has_class(node, SECTION_MARKER_CLASS) || has_bookmark_anchor(node) {
            return BlockKind::GenuineContent;
        }
        if self.first_section.is_match(&text)
            && !self.trailing_page.is_match(&text)
            && !is_listing_entry(node)
        {
            return BlockKind::GenuineContent;
        }
        BlockKind::Other
    }
}

fn is_container_tag(tag: &str) -> bool {
    matches!(
        tag,
        "div"
            | "section"
            | "article"
            | "main"
            | "nav"
            | "header"
            | "footer"
            | "aside"
            | "ul"
            | "ol"
            | "li"
            | "dl"
            | "blockquote"
            | "figure"
            | "form"
            | "center"
            | "details"
    )
}

fn has_block_children(node: &Handle) -> bool {
    dom::children(node)
        .iter()
        .filter_map(dom::tag_name)
        .any(|tag| dom::is_block_tag(&tag))
}

struct Scan<'a> {
    classifier: &'a ContentsClassifier,
    state: ScanState,
    marks: Vec<Handle>,
}

impl Scan<'_> {
    // Containers holding blocks are descended into and never suppressed whole,
    // so a wrapper around the entire body cannot be hidden.
    fn visit(&mut self, node: &Handle) {
        for child in dom::children(node) {
            if self.state == ScanState::ContentStarted {
                return;
            }
            let Some(tag) = dom::tag_name(&child) else {
                continue;
            };

            if is_container_tag(&tag) && has_block_children(&child) {
                if self.state == ScanState::InContents
                    && dom::has_class(&child, SECTION_MARKER_CLASS)
                {
                    self.apply(&child, BlockKind::GenuineContent);
                    continue;
                }
                self.visit(&child);
                continue;
            }

            let kind = self.classifier.classify(&child);
            self.apply(&child, kind);
        }
    }

    fn apply(&mut self, node: &Handle, kind: BlockKind) {
        let (next, verdict) = self.state.step(kind);
        if verdict == Verdict::Suppress {
            self.marks.push(node.clone());
        }
        self.state = next;
    }
}

/// Marks are tentative: a listing that is never followed by recognizable
/// content is left untouched.
pub(super) fn suppress(
    root: &Handle,
    classifier: &ContentsClassifier,
    mode: SuppressionMode,
    hidden_class: &str,
    report: &mut TransformReport,
) {
    let mut scan = Scan {
        classifier,
        state: ScanState::Scanning,
        marks: Vec::new(),
    };
    scan.visit(root);

    report.contents_found = scan.state != ScanState::Scanning;
    match scan.state {
        ScanState::Scanning => {
            debug!("no contents heading found");
            return;
        }
        ScanState::InContents => {
            debug!(
                tentative = scan.marks.len(),
                "contents listing has no recognizable end, leaving it visible"
            );
            return;
        }
        ScanState::ContentStarted => {}
    }

    for node in &scan.marks {
        match mode {
            SuppressionMode::Hide => {
                if !dom::has_attr(node, "hidden") {
                    dom::set_attr(node, "hidden", "");
                }
                dom::add_class(node, hidden_class);
            }
            SuppressionMode::Remove => {
                dom::detach(node);
            }
        }
    }
    report.suppressed_blocks = scan.marks.len();
}
