use anyhow::{Context, Result};
use markup5ever_rcdom::Handle;
use regex::Regex;
use tracing::{debug, warn};

use super::{TransformReport, is_listing_entry};
use crate::dom;
use crate::toc::{self, TocEntry};

pub const SECTION_MARKER_CLASS: &str = "section-marker";
pub const SUBSECTION_MARKER_CLASS: &str = "subsection-marker";
pub const SECTION_HEADING_CLASS: &str = "section-heading";
pub const SUBSECTION_HEADING_CLASS: &str = "subsection-heading";

enum MarkerMatch {
    Canonical,
    Found(Handle),
}

fn heading_matcher(entry: &TocEntry) -> Result<Regex> {
    let title = entry
        .title
        .split_whitespace()
        .map(regex::escape)
        .collect::<Vec<String>>()
        .join(r"\s+");
    let pattern = format!(r"^{}\.?\s+{}\.?$", regex::escape(&entry.number), title);
    Regex::new(&pattern).with_context(|| format!("failed to compile heading matcher for {}", entry.id))
}

fn is_candidate_tag(tag: &str) -> bool {
    tag == "p" || tag == "div" || dom::is_heading_tag(tag)
}

// First visible body element, in document order, whose text is the entry's
// heading. Hidden subtrees, navigation links and markers owned by other
// entries are never searched.
fn find_marker(node: &Handle, entry: &TocEntry, matcher: &Regex) -> Option<MarkerMatch> {
    for child in dom::children(node) {
        let Some(tag) = dom::tag_name(&child) else {
            continue;
        };
        if dom::hides_itself(&child) || toc::fragment_target(&child).is_some() {
            continue;
        }

        if dom::has_class(&child, SECTION_MARKER_CLASS) {
            if dom::attr(&child, "id").as_deref() == Some(entry.id.as_str()) {
                return Some(MarkerMatch::Canonical);
            }
            continue;
        }

        if is_candidate_tag(&tag)
            && matcher.is_match(&dom::visible_text(&child))
            && !is_listing_entry(&child)
        {
            if let Some(found) = refine(child, entry, matcher) {
                return Some(found);
            }
            continue;
        }

        if let Some(found) = find_marker(&child, entry, matcher) {
            return Some(found);
        }
    }
    None
}

// Narrows a match to the innermost block carrying the same text, so siblings
// inside a wrapper (images, anchors) survive the replacement. A wrapper around
// another entry's marker is not a match.
fn refine(node: Handle, entry: &TocEntry, matcher: &Regex) -> Option<MarkerMatch> {
    let mut foreign_marker = false;
    for child in dom::children(&node) {
        let Some(tag) = dom::tag_name(&child) else {
            continue;
        };
        if dom::hides_itself(&child) {
            continue;
        }
        if dom::has_class(&child, SECTION_MARKER_CLASS) {
            if dom::attr(&child, "id").as_deref() == Some(entry.id.as_str()) {
                return Some(MarkerMatch::Canonical);
            }
            foreign_marker = true;
            continue;
        }
        if is_candidate_tag(&tag) && matcher.is_match(&dom::visible_text(&child)) {
            return refine(child, entry, matcher);
        }
    }

    if foreign_marker {
        return None;
    }
    Some(MarkerMatch::Found(node))
}

fn build_marker(entry: &TocEntry) -> Handle {
    let (marker_class, heading_tag, heading_class) = if entry.level == 1 {
        (SECTION_MARKER_CLASS.to_string(), "h2", SECTION_HEADING_CLASS)
    } else {
        (
            format!("{SECTION_MARKER_CLASS} {SUBSECTION_MARKER_CLASS}"),
            "h3",
            SUBSECTION_HEADING_CLASS,
        )
    };

    let label = format!("{}. {}", entry.number, entry.title);
    let heading = dom::element(
        heading_tag,
        &[("class", heading_class)],
        vec![dom::text_node(&label)],
    );
    dom::element(
        "div",
        &[("id", entry.id.as_str()), ("class", marker_class.as_str())],
        vec![heading],
    )
}

/// Replaces the first body occurrence of each entry's heading with a
/// canonical marker carrying the entry id. Entries without a match are
/// recorded and skipped.
pub(super) fn canonicalize(root: &Handle, toc: &[TocEntry], report: &mut TransformReport) {
    for entry in toc::iter_entries(toc) {
        let matcher = match heading_matcher(entry) {
            Ok(matcher) => matcher,
            Err(err) => {
                warn!(id = %entry.id, error = %err, "skipping section marker");
                report.unmatched.push(entry.id.clone());
                continue;
            }
        };

        match find_marker(root, entry, &matcher) {
            Some(MarkerMatch::Canonical) => report.already_canonical += 1,
            Some(MarkerMatch::Found(node)) => {
                if dom::replace_node(&node, build_marker(entry)) {
                    report.canonicalized += 1;
                } else {
                    report.unmatched.push(entry.id.clone());
                }
            }
            None => {
                debug!(id = %entry.id, number = %entry.number, "no body heading matches entry");
                report.unmatched.push(entry.id.clone());
            }
        }
    }
}
