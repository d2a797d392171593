use anyhow::{Context, Result};
use markup5ever_rcdom::Handle;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::dom;

mod builder;
mod heading_scan;
mod link_scan;
#[cfg(test)]
mod tests;

use builder::TocBuilder;
pub(crate) use link_scan::fragment_target;

/// One recovered outline node. Level-1 entries own their level-2 children;
/// deeper levels never appear.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TocEntry {
    pub id: String,
    pub number: String,
    pub title: String,
    pub level: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<TocEntry>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TocStrategy {
    #[default]
    Auto,
    Links,
    Headings,
}

impl TocStrategy {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Auto => "auto",
            Self::Links => "links",
            Self::Headings => "headings",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NumberedHeading {
    pub number: String,
    pub title: String,
    pub level: usize,
    pub page: Option<u32>,
}

/// `<digits>(.<digits>)*. <title>` with an optional trailing page number,
/// separated by whitespace, a single period or a dot leader (spaced or not).
#[derive(Debug, Clone)]
pub struct HeadingPattern {
    numbered: Regex,
}

impl HeadingPattern {
    pub fn new() -> Result<Self> {
        Ok(Self {
            numbered: Regex::new(
                r"^(?P<number>\d+(?:\.\d+)*)\.\s+(?P<title>.*?)(?:(?:\s*(?:[.…·]\s*){2,}|\s*\.\s+|\s+)(?P<page>\d+))?$",
            )
            .context("failed to compile numbered heading regex")?,
        })
    }

    pub fn parse(&self, text: &str) -> Option<NumberedHeading> {
        let normalized = dom::normalize_text(text);
        let captures = self.numbered.captures(&normalized)?;

        let number = captures.name("number")?.as_str().to_string();
        let title = captures
            .name("title")
            .map(|value| value.as_str().trim_end_matches(is_leader_char).trim())
            .unwrap_or_default();
        if !title.chars().any(char::is_alphabetic) {
            return None;
        }

        let page = captures
            .name("page")
            .and_then(|value| value.as_str().parse::<u32>().ok());
        let level = number.split('.').count();

        Some(NumberedHeading {
            number,
            title: title.to_string(),
            level,
            page,
        })
    }
}

// Leader punctuation and spacing left between a title and its page number.
fn is_leader_char(c: char) -> bool {
    matches!(c, '.' | '…' | '·') || c.is_whitespace()
}

/// `"2.3"` becomes `"section-2-3"`.
pub fn section_id_for(number: &str) -> String {
    format!("section-{}", number.replace('.', "-"))
}

#[derive(Debug, Clone)]
pub struct TocExtractor {
    strategy: TocStrategy,
    pattern: HeadingPattern,
}

impl TocExtractor {
    pub fn new(strategy: TocStrategy) -> Result<Self> {
        Ok(Self {
            strategy,
            pattern: HeadingPattern::new()?,
        })
    }

    pub fn strategy(&self) -> TocStrategy {
        self.strategy
    }

    pub fn extract(&self, raw_html: &str) -> Vec<TocEntry> {
        let parsed = dom::parse_html(raw_html);
        self.extract_from(&dom::body(&parsed))
    }

    pub fn extract_from(&self, root: &Handle) -> Vec<TocEntry> {
        let toc = match self.strategy {
            TocStrategy::Links => self.from_links(root),
            TocStrategy::Headings => self.from_headings(root),
            TocStrategy::Auto => {
                let toc = self.from_links(root);
                if toc.is_empty() {
                    debug!("no numbered contents links found, scanning headings");
                    self.from_headings(root)
                } else {
                    toc
                }
            }
        };

        if toc.is_empty() {
            warn!(strategy = self.strategy.as_str(), "no numbered sections recognized");
        } else {
            info!(
                strategy = self.strategy.as_str(),
                sections = toc.len(),
                entries = entry_count(&toc),
                "extracted table of contents"
            );
        }
        toc
    }

    fn from_links(&self, root: &Handle) -> Vec<TocEntry> {
        let mut builder = TocBuilder::default();
        link_scan::collect(root, &self.pattern, &mut builder);
        builder.finish()
    }

    fn from_headings(&self, root: &Handle) -> Vec<TocEntry> {
        let mut builder = TocBuilder::default();
        heading_scan::collect(root, &self.pattern, &mut builder);
        builder.finish()
    }
}

/// Extracts with [`TocStrategy::Auto`]. An empty result means extraction
/// failed, not that the document has no sections.
pub fn extract_toc(raw_html: &str) -> Vec<TocEntry> {
    match TocExtractor::new(TocStrategy::Auto) {
        Ok(extractor) => extractor.extract(raw_html),
        Err(err) => {
            warn!(error = %err, "table of contents extractor unavailable");
            Vec::new()
        }
    }
}

/// Parents and children in document order.
pub fn iter_entries(toc: &[TocEntry]) -> impl Iterator<Item = &TocEntry> {
    toc.iter()
        .flat_map(|entry| std::iter::once(entry).chain(entry.children.iter()))
}

pub fn entry_count(toc: &[TocEntry]) -> usize {
    iter_entries(toc).count()
}

pub fn find_entry<'a>(toc: &'a [TocEntry], id: &str) -> Option<&'a TocEntry> {
    iter_entries(toc).find(|entry| entry.id == id)
}
