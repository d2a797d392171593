use std::collections::HashSet;

use tracing::debug;

use super::{NumberedHeading, TocEntry};

const MAX_LEVEL: usize = 2;

/// Assembles the two-level tree in document order. Shared by both
/// extraction strategies.
#[derive(Debug, Default)]
pub(super) struct TocBuilder {
    entries: Vec<TocEntry>,
    seen_ids: HashSet<String>,
}

impl TocBuilder {
    pub(super) fn push(&mut self, id: String, heading: NumberedHeading) {
        if heading.level > MAX_LEVEL {
            debug!(number = %heading.number, "skipping entry deeper than two levels");
            return;
        }
        if self.seen_ids.contains(&id) {
            debug!(id = %id, "skipping duplicate entry");
            return;
        }

        let entry = TocEntry {
            id: id.clone(),
            number: heading.number,
            title: heading.title,
            level: heading.level,
            page: heading.page,
            children: Vec::new(),
        };

        if entry.level == 1 {
            self.entries.push(entry);
        } else {
            let Some(parent) = self.entries.last_mut() else {
                debug!(number = %entry.number, "discarding subsection without a parent");
                return;
            };
            parent.children.push(entry);
        }

        self.seen_ids.insert(id);
    }

    pub(super) fn finish(self) -> Vec<TocEntry> {
        self.entries
    }
}
