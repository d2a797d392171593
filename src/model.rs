use guidebook::anchor::ScrollCommand;
use guidebook::session::LoadState;
use guidebook::transform::TransformReport;
use serde::Serialize;

pub const RENDER_MANIFEST_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize)]
pub struct RenderManifest {
    pub manifest_version: u32,
    pub generated_at: String,
    pub source_path: String,
    pub source_sha256: String,
    pub output_path: Option<String>,
    pub output_sha256: String,
    pub toc_strategy: String,
    pub suppression: String,
    pub section_count: usize,
    pub entry_count: usize,
    pub transform: TransformReport,
    pub preview_images: Vec<String>,
    pub warnings: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ResolveOutcome {
    pub section: String,
    pub state: LoadState,
    pub known_entry: bool,
    pub target: Option<String>,
    pub scroll: Option<ScrollCommand>,
}
