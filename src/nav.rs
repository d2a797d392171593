use std::collections::HashSet;

use crate::toc::{self, TocEntry};

fn entry_matches(entry: &TocEntry, query: &str) -> bool {
    entry.title.to_lowercase().contains(query) || entry.number.to_lowercase().contains(query)
}

/// Case-insensitive substring filter over titles and numbers. A parent stays
/// when it or one of its children matches, and keeps only the matching
/// children. A blank query returns the tree unchanged.
pub fn filter_sections(toc: &[TocEntry], query: &str) -> Vec<TocEntry> {
    let query = query.trim().to_lowercase();
    if query.is_empty() {
        return toc.to_vec();
    }

    toc.iter()
        .filter_map(|section| {
            let children = section
                .children
                .iter()
                .filter(|child| entry_matches(child, &query))
                .cloned()
                .collect::<Vec<TocEntry>>();

            if entry_matches(section, &query) || !children.is_empty() {
                Some(TocEntry {
                    children,
                    ..section.clone()
                })
            } else {
                None
            }
        })
        .collect()
}

/// Sidebar state kept beside the outline: which parents are expanded and
/// which entry is active. Keyed by entry id so the outline itself stays
/// immutable.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NavigationState {
    expanded: HashSet<String>,
    active: Option<String>,
}

impl NavigationState {
    /// Every level-1 entry expanded and the first entry active.
    pub fn new(toc: &[TocEntry]) -> Self {
        Self {
            expanded: toc
                .iter()
                .filter(|entry| entry.level == 1)
                .map(|entry| entry.id.clone())
                .collect(),
            active: toc.first().map(|entry| entry.id.clone()),
        }
    }

    pub fn is_expanded(&self, id: &str) -> bool {
        self.expanded.contains(id)
    }

    /// Flips expansion and returns the new state.
    pub fn toggle(&mut self, id: &str) -> bool {
        if self.expanded.remove(id) {
            false
        } else {
            self.expanded.insert(id.to_string());
            true
        }
    }

    pub fn select(&mut self, id: &str) {
        self.active = Some(id.to_string());
    }

    pub fn active(&self) -> Option<&str> {
        self.active.as_deref()
    }

    /// Children shown under `entry` in the sidebar.
    pub fn visible_children<'a>(&self, entry: &'a TocEntry) -> &'a [TocEntry] {
        if self.is_expanded(&entry.id) {
            &entry.children
        } else {
            &[]
        }
    }
}

/// Renders the outline as indented text, or the empty-outline message.
pub fn outline_lines(toc: &[TocEntry]) -> Vec<String> {
    if toc.is_empty() {
        return vec!["No sections found".to_string()];
    }

    toc::iter_entries(toc)
        .map(|entry| {
            let indent = "  ".repeat(entry.level.saturating_sub(1));
            match entry.page {
                Some(page) => format!("{indent}{} {} ({}) p.{page}", entry.number, entry.title, entry.id),
                None => format!("{indent}{} {} ({})", entry.number, entry.title, entry.id),
            }
        })
        .collect()
}
