use anyhow::Result;
use markup5ever_rcdom::Handle;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::anchor::{self, ContainerMetrics, LayoutProbe, RenderedDocument, ScrollCommand};
use crate::config::ReaderConfig;
use crate::nav::NavigationState;
use crate::source::DocumentSource;
use crate::toc::{self, TocEntry, TocExtractor};
use crate::transform::{ContentTransformer, TransformReport};

pub const LOAD_ERROR_MESSAGE: &str = "Error loading document. Please refresh the page.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LoadState {
    Loading,
    Ready,
    Failed,
}

pub type PreviewCallback = Box<dyn FnMut(&str)>;

/// One reading view. Each load replaces the outline, the cleaned content and
/// the navigation state wholesale; nothing survives from an earlier load.
pub struct ReaderSession {
    config: ReaderConfig,
    extractor: TocExtractor,
    transformer: ContentTransformer,
    state: LoadState,
    toc: Vec<TocEntry>,
    html: String,
    report: TransformReport,
    navigation: NavigationState,
    rendered: Option<RenderedDocument>,
    pending_scroll: Option<String>,
    on_preview: PreviewCallback,
}

impl ReaderSession {
    pub fn new(config: ReaderConfig, on_preview: PreviewCallback) -> Result<Self> {
        Ok(Self {
            extractor: TocExtractor::new(config.toc_strategy)?,
            transformer: ContentTransformer::new(&config)?,
            config,
            state: LoadState::Loading,
            toc: Vec::new(),
            html: String::new(),
            report: TransformReport::default(),
            navigation: NavigationState::default(),
            rendered: None,
            pending_scroll: None,
            on_preview,
        })
    }

    pub fn load(&mut self, source: &dyn DocumentSource) -> LoadState {
        self.reset();

        let raw = match source.fetch() {
            Ok(raw) => raw,
            Err(err) => {
                let reason = format!("{err:#}");
                warn!(source = %source.describe(), error = %reason, "failed to load document");
                self.html = format!("<div class=\"doc-load-error\">{LOAD_ERROR_MESSAGE}</div>");
                self.state = LoadState::Failed;
                return self.state;
            }
        };

        self.toc = self.extractor.extract(&raw);
        let output = self.transformer.transform(&raw, &self.toc);
        self.html = output.html;
        self.report = output.report;
        self.navigation = NavigationState::new(&self.toc);
        self.state = LoadState::Ready;

        info!(
            source = %source.describe(),
            sections = self.toc.len(),
            entries = toc::entry_count(&self.toc),
            bytes = self.html.len(),
            "document ready"
        );
        self.state
    }

    fn reset(&mut self) {
        self.state = LoadState::Loading;
        self.toc.clear();
        self.html.clear();
        self.report = TransformReport::default();
        self.navigation = NavigationState::default();
        self.rendered = None;
        self.pending_scroll = None;
    }

    pub fn state(&self) -> LoadState {
        self.state
    }

    pub fn is_loading(&self) -> bool {
        self.state == LoadState::Loading
    }

    pub fn toc(&self) -> &[TocEntry] {
        &self.toc
    }

    pub fn content_html(&self) -> &str {
        &self.html
    }

    pub fn report(&self) -> &TransformReport {
        &self.report
    }

    pub fn navigation(&self) -> &NavigationState {
        &self.navigation
    }

    pub fn navigation_mut(&mut self) -> &mut NavigationState {
        &mut self.navigation
    }

    pub fn config(&self) -> &ReaderConfig {
        &self.config
    }

    pub fn rendered(&self) -> Option<&RenderedDocument> {
        self.rendered.as_ref()
    }

    /// The content has been committed to the display.
    pub fn commit_rendered(&mut self) {
        if self.state == LoadState::Loading {
            debug!("render signal before load finished, ignoring");
            return;
        }
        self.rendered = Some(RenderedDocument::parse_with(&self.html, &self.config));
    }

    /// Runs a selection queued before the render signal.
    pub fn flush_pending_scroll(
        &mut self,
        probe: &dyn LayoutProbe,
        container: ContainerMetrics,
    ) -> Option<ScrollCommand> {
        if self.rendered.is_none() {
            return None;
        }
        let id = self.pending_scroll.take()?;
        self.scroll_to(&id, probe, container)
    }

    /// Marks `id` active and scrolls to it. Before the render signal the
    /// request is queued instead, replacing any earlier one.
    pub fn select_section(
        &mut self,
        id: &str,
        probe: &dyn LayoutProbe,
        container: ContainerMetrics,
    ) -> Option<ScrollCommand> {
        self.navigation.select(id);
        if self.rendered.is_none() {
            debug!(id, "content not rendered yet, deferring scroll");
            self.pending_scroll = Some(id.to_string());
            return None;
        }
        self.scroll_to(id, probe, container)
    }

    pub fn has_pending_scroll(&self) -> bool {
        self.pending_scroll.is_some()
    }

    fn scroll_to(
        &self,
        id: &str,
        probe: &dyn LayoutProbe,
        container: ContainerMetrics,
    ) -> Option<ScrollCommand> {
        let document = self.rendered.as_ref()?;
        let Some(target) = document.resolve(id) else {
            warn!(id, "section has no target in the document, not scrolling");
            return None;
        };

        let command = anchor::scroll_command(&target, container, probe, self.config.scroll_offset_px);
        match &command {
            Some(command) => debug!(id, target = %anchor::describe(&target), top = command.top, "scrolling to section"),
            None => warn!(id, "section target is not laid out, not scrolling"),
        }
        command
    }

    /// Delegated click on the rendered content. Returns true when the node is
    /// an annotated image and the preview callback ran.
    pub fn click(&mut self, node: &Handle) -> bool {
        let Some(source) = self
            .rendered
            .as_ref()
            .and_then(|document| document.preview_source(node))
        else {
            return false;
        };
        (self.on_preview)(&source);
        true
    }
}
