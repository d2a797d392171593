use std::fs;
use std::path::Path;

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::toc::TocStrategy;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SuppressionMode {
    /// Keep listing blocks in the tree but hide them, so identifier lookups
    /// can still see link targets inside them.
    #[default]
    Hide,
    Remove,
}

impl SuppressionMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Hide => "hide",
            Self::Remove => "remove",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnnotationClasses {
    pub table: String,
    pub header_cell: String,
    pub data_cell: String,
    pub image: String,
    pub hidden: String,
}

impl Default for AnnotationClasses {
    fn default() -> Self {
        Self {
            table: "doc-table".to_string(),
            header_cell: "doc-th".to_string(),
            data_cell: "doc-td".to_string(),
            image: "doc-image".to_string(),
            hidden: "doc-contents-hidden".to_string(),
        }
    }
}

/// Constants of the estimated reading-pane layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    pub line_height_px: f64,
    pub chars_per_line: usize,
    pub block_spacing_px: f64,
    pub image_height_px: f64,
    pub container_top_px: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            line_height_px: 28.8,
            chars_per_line: 90,
            block_spacing_px: 12.0,
            image_height_px: 320.0,
            container_top_px: 56.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReaderConfig {
    pub toc_strategy: TocStrategy,
    pub suppression: SuppressionMode,
    pub scroll_offset_px: f64,
    pub preview_attribute: String,
    pub classes: AnnotationClasses,
    pub layout: LayoutConfig,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            toc_strategy: TocStrategy::Auto,
            suppression: SuppressionMode::Hide,
            scroll_offset_px: 80.0,
            preview_attribute: "data-preview".to_string(),
            classes: AnnotationClasses::default(),
            layout: LayoutConfig::default(),
        }
    }
}

impl ReaderConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
        let config: ReaderConfig = serde_json::from_slice(&raw)
            .with_context(|| format!("failed to parse {}", path.display()))?;
        config.validate()?;

        info!(
            path = %path.display(),
            strategy = config.toc_strategy.as_str(),
            suppression = config.suppression.as_str(),
            "loaded reader config"
        );
        Ok(config)
    }

    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if !self.scroll_offset_px.is_finite() {
            bail!("scroll_offset_px must be a finite number");
        }
        if self.layout.chars_per_line == 0 {
            bail!("layout.chars_per_line must be positive");
        }
        if self.preview_attribute.trim().is_empty() {
            bail!("preview_attribute must not be empty");
        }

        let classes = [
            &self.classes.table,
            &self.classes.header_cell,
            &self.classes.data_cell,
            &self.classes.image,
            &self.classes.hidden,
        ];
        if classes
            .iter()
            .any(|class| class.is_empty() || class.contains(char::is_whitespace))
        {
            bail!("annotation classes must be single non-empty class names");
        }
        Ok(())
    }
}
